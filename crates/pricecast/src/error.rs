//! Startup errors surfaced on the page.

use crate::inference::ModelLoadError;
use crate::schema::SchemaError;

/// Failure while preparing the application context.
///
/// The server keeps running and shows the error instead of the prediction.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Model load error: {0}")]
    Model(#[from] ModelLoadError),
}
