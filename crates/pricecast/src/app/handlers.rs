//! HTTP request handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use axum::Form;

use crate::form::{row_to_form_data, FormState, ValidationError};

use super::{render_page, AppContext, Flash, Page, CSRF_FIELD};

/// Query pairs in request order. Repeated keys are kept.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// First `sample` value of the query string, if any. An unparsable query
/// counts as empty.
fn sample_param(query: QueryPairs) -> Option<String> {
    let Query(pairs) = query
        .inspect_err(|err| tracing::debug!("ignoring query string: {err}"))
        .ok()?;
    pairs.into_iter().find(|(key, _)| key == "sample").map(|(_, value)| value)
}

/// Form state for the request: defaults, or the chosen sample's values.
/// Returns the state and the sample id when it is known.
fn initial_state<'a>(ctx: &AppContext, sample: Option<&'a str>) -> (FormState, &'a str) {
    let sample = sample.unwrap_or("");
    match ctx.samples().get(sample) {
        Some(row) => {
            let data = row_to_form_data(row, ctx.schema());
            (FormState::with_data(ctx.form(), data), sample)
        }
        None => (FormState::defaults(ctx.form()), ""),
    }
}

/// `GET /`: the form, optionally prefilled from `?sample=<id>`.
pub async fn index(
    State(ctx): State<Arc<AppContext>>,
    query: QueryPairs,
) -> Html<String> {
    let sample = sample_param(query);
    let (state, current_sample) = initial_state(&ctx, sample.as_deref());
    let token = ctx.csrf().issue();
    Html(render_page(&Page {
        ctx: &ctx,
        state: &state,
        errors: None,
        flashes: &[],
        prediction: None,
        current_sample,
        csrf_token: &token,
    }))
}

/// `POST /`: validate the submission and run the model.
pub async fn submit(
    State(ctx): State<Arc<AppContext>>,
    query: QueryPairs,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    // A body that is not an urlencoded form is treated as empty so the
    // CSRF check reports it.
    let data = match form {
        Ok(Form(data)) => data,
        Err(err) => {
            tracing::debug!("ignoring request body: {err}");
            HashMap::new()
        }
    };
    let sample = sample_param(query);
    let (mut state, current_sample) = initial_state(&ctx, sample.as_deref());
    state.merge(ctx.form(), &data);

    let mut flashes = Vec::new();
    let mut errors = None;
    let mut prediction = None;

    if let Some(err) = ctx.startup_error() {
        flashes.push(Flash::error(err.to_string()));
    } else {
        let validated = ctx
            .csrf()
            .verify(data.get(CSRF_FIELD).map(String::as_str))
            .map_err(|e| ValidationError::form_level(e.to_string()))
            .and_then(|()| state.validate(ctx.form()));

        match validated {
            Ok(form) => match ctx.predict(&form) {
                Some(Ok(value)) => {
                    tracing::info!(prediction = value, "predicted");
                    prediction = Some(value);
                }
                Some(Err(err)) => {
                    tracing::warn!("prediction failed: {err}");
                    flashes.push(Flash::error(format!("Prediction error: {err}")));
                }
                None => {}
            },
            Err(err) => {
                tracing::debug!(fields = ?err.invalid_fields().collect::<Vec<_>>(), "invalid submission");
                flashes.push(Flash::error(err.to_string()));
                errors = Some(err);
            }
        }
    }

    let token = ctx.csrf().issue();
    Html(render_page(&Page {
        ctx: &ctx,
        state: &state,
        errors: errors.as_ref(),
        flashes: &flashes,
        prediction,
        current_sample,
        csrf_token: &token,
    }))
}

/// `GET /reset`: back to a blank form.
pub async fn reset() -> Redirect {
    Redirect::to("/")
}
