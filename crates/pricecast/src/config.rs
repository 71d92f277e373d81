//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;

/// Dataset file name looked up in the application root when the configured
/// dataset is missing.
pub const FALLBACK_CSV_NAME: &str = "PricePredictionCleanedUp.csv";

/// Serve a price prediction form built from a CSV dataset.
#[derive(Parser, Debug, Clone)]
#[command(name = "pricecast", version, about)]
pub struct Config {
    /// Dataset used to infer the form (relative paths resolve against the app root)
    #[arg(long, env = "CSV_PATH", default_value = "training/PricePredictionCleanedUp.csv")]
    pub csv_path: PathBuf,

    /// XGBoost JSON model (relative paths resolve against the app root)
    #[arg(long, env = "MODEL_PATH", default_value = "models/xgboost_price_model.json")]
    pub model_path: PathBuf,

    /// Secret used to sign CSRF tokens
    #[arg(long, env = "SECRET_KEY", default_value = "dev-secret-key", hide_env_values = true)]
    pub secret_key: String,

    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Application root directory
    #[arg(long, env = "APP_ROOT", default_value = ".")]
    pub app_root: PathBuf,
}

impl Config {
    /// Configuration rooted at `app_root` with every other value at its default.
    pub fn with_root(app_root: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: PathBuf::from("training").join(FALLBACK_CSV_NAME),
            model_path: PathBuf::from("models/xgboost_price_model.json"),
            secret_key: "dev-secret-key".to_string(),
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            app_root: app_root.into(),
        }
    }

    fn rooted(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.app_root.join(path)
        }
    }

    /// Dataset path, falling back to `<app_root>/PricePredictionCleanedUp.csv`
    /// when the configured file does not exist but the fallback does.
    pub fn resolve_csv_path(&self) -> PathBuf {
        let configured = self.rooted(&self.csv_path);
        if configured.exists() {
            return configured;
        }
        let fallback = self.app_root.join(FALLBACK_CSV_NAME);
        if fallback.exists() {
            tracing::info!(path = %fallback.display(), "using fallback dataset");
            return fallback;
        }
        configured
    }

    pub fn resolve_model_path(&self) -> PathBuf {
        self.rooted(&self.model_path)
    }
}
