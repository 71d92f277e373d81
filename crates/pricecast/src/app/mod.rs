//! Web application: startup context, routes and page rendering.

mod csrf;
mod handlers;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::config::Config;
use crate::data::Table;
use crate::error::StartupError;
use crate::form::{form_to_feature_row, FormSpec, ValidatedForm};
use crate::inference::{
    resolve_feature_order, FeatureMismatchWarning, FeatureOrder, PredictionError, Predictor,
};
use crate::samples::{SampleSet, CURATED_SAMPLES};
use crate::schema::{Schema, SchemaError};

pub use csrf::{CsrfError, CsrfGuard, CSRF_FIELD, TOKEN_TTL};
pub use render::{render_page, Flash, Page};

/// Immutable state computed once at startup and shared by every request.
#[derive(Debug)]
pub struct AppContext {
    schema: Schema,
    form: FormSpec,
    predictor: Result<Predictor, StartupError>,
    feature_order: Vec<String>,
    mismatch: Option<FeatureMismatchWarning>,
    samples: SampleSet,
    csv_path: PathBuf,
    model_path: PathBuf,
    csrf: CsrfGuard,
}

impl AppContext {
    /// Load the dataset, the model and the samples named by `config`.
    ///
    /// Failures do not abort startup; they are kept and shown on the page.
    pub fn load(config: &Config) -> Self {
        let csv_path = config.resolve_csv_path();
        let model_path = config.resolve_model_path();
        let csrf = CsrfGuard::new(config.secret_key.clone());

        let (table, schema) = match load_schema(&csv_path) {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::error!(path = %csv_path.display(), "{err}");
                return Self {
                    schema: Schema::default(),
                    form: FormSpec::default(),
                    predictor: Err(err),
                    feature_order: Vec::new(),
                    mismatch: None,
                    samples: SampleSet::default(),
                    csv_path,
                    model_path,
                    csrf,
                };
            }
        };

        let predictor = Predictor::load(&model_path).map_err(StartupError::from);
        let (schema, order) = match &predictor {
            Ok(predictor) => align_to_model(schema, predictor),
            Err(err) => {
                tracing::error!(path = %model_path.display(), "{err}");
                (schema, FeatureOrder::default())
            }
        };

        let form = FormSpec::from_schema(&schema);
        let samples = SampleSet::load(&table, CURATED_SAMPLES, schema.feature_columns());

        tracing::info!(
            n_features = schema.n_features(),
            n_groups = schema.groups().len(),
            n_fields = form.fields().len(),
            ready = predictor.is_ok(),
            "application context ready"
        );

        Self {
            schema,
            form,
            predictor,
            feature_order: order.names,
            mismatch: order.mismatch,
            samples,
            csv_path,
            model_path,
            csrf,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn form(&self) -> &FormSpec {
        &self.form
    }

    pub fn predictor(&self) -> Option<&Predictor> {
        self.predictor.as_ref().ok()
    }

    pub fn startup_error(&self) -> Option<&StartupError> {
        self.predictor.as_ref().err()
    }

    /// Features, in order, that model inputs are built from.
    pub fn feature_order(&self) -> &[String] {
        if self.feature_order.is_empty() {
            self.schema.feature_columns()
        } else {
            &self.feature_order
        }
    }

    pub fn mismatch(&self) -> Option<&FeatureMismatchWarning> {
        self.mismatch.as_ref()
    }

    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn csrf(&self) -> &CsrfGuard {
        &self.csrf
    }

    /// Run the model on a validated form.
    ///
    /// Returns `None` when startup failed and there is no model to run.
    pub fn predict(&self, form: &ValidatedForm) -> Option<Result<f64, PredictionError>> {
        let predictor = self.predictor()?;
        let row = form_to_feature_row(form, &self.schema, self.feature_order());
        Some(predictor.predict(&row))
    }
}

fn load_schema(path: &Path) -> Result<(Table, Schema), StartupError> {
    let table = Table::from_path(path).map_err(SchemaError::from)?;
    let schema = Schema::infer(&table)?;
    Ok((table, schema))
}

/// Resolve the model's feature order and narrow `schema` to it when needed.
fn align_to_model(schema: Schema, predictor: &Predictor) -> (Schema, FeatureOrder) {
    let order = resolve_feature_order(
        predictor.feature_names(),
        predictor.n_features(),
        schema.feature_columns(),
    );
    if let Some(warning) = &order.mismatch {
        tracing::warn!("{warning}");
    }
    if !order.narrows(schema.feature_columns()) {
        return (schema, order);
    }
    let narrowed = schema.narrow_to(&order.names);
    tracing::info!(
        n_features = narrowed.n_features(),
        "narrowed schema to model features"
    );
    (narrowed, order)
}

/// Routes: `GET /`, `POST /` and `GET /reset`.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .route("/reset", get(handlers::reset))
        .with_state(ctx)
}
