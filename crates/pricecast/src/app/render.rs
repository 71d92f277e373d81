//! HTML page rendering.

use std::fmt::{self, Display, Write as _};

use crate::form::{FieldKind, FieldSpec, FormState, ValidationError, SUBMIT_LABEL};

use super::{AppContext, CSRF_FIELD};

const TITLE: &str = "Car Price Prediction";

/// One-shot error message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub message: String,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything needed to render the index page for one request.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub ctx: &'a AppContext,
    pub state: &'a FormState,
    pub errors: Option<&'a ValidationError>,
    pub flashes: &'a [Flash],
    pub prediction: Option<f64>,
    /// Selected sample id, blank when none.
    pub current_sample: &'a str,
    pub csrf_token: &'a str,
}

/// HTML-escaped text.
struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                _ => f.write_char(ch)?,
            }
        }
        Ok(())
    }
}

fn esc(s: &str) -> Escaped<'_> {
    Escaped(s)
}

fn selected(is: bool) -> &'static str {
    if is {
        " selected"
    } else {
        ""
    }
}

/// Render the index page.
pub fn render_page(page: &Page<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    // Writing into a String cannot fail.
    let _ = page.write_to(&mut html);
    html
}

impl Page<'_> {
    fn write_to(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<!doctype html>")?;
        writeln!(out, "<html lang=\"en\">")?;
        writeln!(
            out,
            "<head><meta charset=\"utf-8\"><title>{TITLE}</title></head>"
        )?;
        writeln!(out, "<body>\n<main>\n<h1>{TITLE}</h1>")?;

        self.write_flashes(out)?;
        if let Some(err) = self.ctx.startup_error() {
            writeln!(out, "<div class=\"alert alert-error\">{}</div>", esc(&err.to_string()))?;
        }
        writeln!(
            out,
            "<p class=\"paths\">Dataset: <code>{}</code> Model: <code>{}</code></p>",
            esc(&self.ctx.csv_path().display().to_string()),
            esc(&self.ctx.model_path().display().to_string()),
        )?;

        self.write_sample_picker(out)?;
        if let Some(warning) = self.ctx.mismatch() {
            writeln!(
                out,
                "<div class=\"alert alert-warning\">{}</div>",
                esc(&warning.to_string())
            )?;
        }

        self.write_form(out)?;

        if let Some(value) = self.prediction {
            writeln!(
                out,
                "<div class=\"prediction\">Predicted selling price: <strong>{value:.2}</strong></div>"
            )?;
        }
        writeln!(out, "<p><a href=\"/reset\">Reset</a></p>")?;
        writeln!(out, "</main>\n</body>\n</html>")
    }

    fn write_flashes(&self, out: &mut String) -> fmt::Result {
        if self.flashes.is_empty() {
            return Ok(());
        }
        writeln!(out, "<ul class=\"flashes\">")?;
        for flash in self.flashes {
            writeln!(out, "<li class=\"flash flash-error\">{}</li>", esc(&flash.message))?;
        }
        writeln!(out, "</ul>")
    }

    fn write_sample_picker(&self, out: &mut String) -> fmt::Result {
        let options = self.ctx.samples().options();
        if options.is_empty() {
            return Ok(());
        }
        writeln!(out, "<form method=\"get\" action=\"/\" class=\"sample-picker\">")?;
        writeln!(out, "<label for=\"sample\">Sample</label>")?;
        writeln!(out, "<select id=\"sample\" name=\"sample\">")?;
        writeln!(
            out,
            "<option value=\"\"{}>Custom</option>",
            selected(self.current_sample.is_empty())
        )?;
        for option in options {
            writeln!(
                out,
                "<option value=\"{}\"{}>{}</option>",
                esc(&option.id),
                selected(option.id == self.current_sample),
                esc(&option.label)
            )?;
        }
        writeln!(out, "</select>\n<button type=\"submit\">Load</button>\n</form>")
    }

    fn write_form(&self, out: &mut String) -> fmt::Result {
        if let Some(errors) = self.errors {
            if !errors.form_errors().is_empty() {
                writeln!(out, "<ul class=\"errors form-errors\">")?;
                for message in errors.form_errors() {
                    writeln!(out, "<li>{}</li>", esc(message))?;
                }
                writeln!(out, "</ul>")?;
            }
        }

        if self.current_sample.is_empty() {
            writeln!(out, "<form method=\"post\" action=\"/\">")?;
        } else {
            writeln!(
                out,
                "<form method=\"post\" action=\"/?sample={}\">",
                esc(self.current_sample)
            )?;
        }
        writeln!(
            out,
            "<input type=\"hidden\" name=\"{CSRF_FIELD}\" value=\"{}\">",
            esc(self.csrf_token)
        )?;
        for field in self.ctx.form().fields() {
            self.write_field(out, field)?;
        }
        writeln!(out, "<button type=\"submit\">{SUBMIT_LABEL}</button>\n</form>")
    }

    fn write_field(&self, out: &mut String, field: &FieldSpec) -> fmt::Result {
        let messages = self
            .errors
            .map(|e| e.field_errors(&field.name))
            .unwrap_or(&[]);
        let class = if messages.is_empty() {
            "field"
        } else {
            "field has-error"
        };
        let name = esc(&field.name);
        let value = self.state.value(&field.name);

        writeln!(out, "<div class=\"{class}\">")?;
        writeln!(out, "<label for=\"{name}\">{}</label>", esc(&field.label))?;
        match &field.kind {
            FieldKind::Select { choices } => {
                writeln!(out, "<select id=\"{name}\" name=\"{name}\">")?;
                for choice in choices {
                    writeln!(
                        out,
                        "<option value=\"{}\"{}>{}</option>",
                        esc(&choice.value),
                        selected(choice.value == value),
                        esc(&choice.label)
                    )?;
                }
                writeln!(out, "</select>")?;
            }
            FieldKind::Integer => writeln!(
                out,
                "<input id=\"{name}\" name=\"{name}\" type=\"number\" step=\"1\" value=\"{}\">",
                esc(value)
            )?,
            FieldKind::Float => writeln!(
                out,
                "<input id=\"{name}\" name=\"{name}\" type=\"text\" value=\"{}\">",
                esc(value)
            )?,
        }
        for message in messages {
            writeln!(out, "<span class=\"error\">{}</span>", esc(message))?;
        }
        writeln!(out, "</div>")
    }
}
