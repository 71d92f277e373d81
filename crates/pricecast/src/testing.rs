//! Fixture helpers shared by unit and integration tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Config, FALLBACK_CSV_NAME};

/// Directory holding the fixture datasets and models.
pub fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases")
}

/// The sample cars dataset.
pub fn cars_csv() -> PathBuf {
    test_cases_dir().join("cars").join(FALLBACK_CSV_NAME)
}

/// A model fixture by file stem, e.g. `price_model`.
pub fn model_json(name: &str) -> PathBuf {
    test_cases_dir().join("xgboost").join(format!("{name}.json"))
}

/// Lay out an application root with the dataset and model at their default
/// locations and return a config pointing at it.
///
/// `None` leaves the corresponding file out.
pub fn stage_app_root(root: &Path, csv: Option<&Path>, model: Option<&Path>) -> io::Result<Config> {
    let config = Config::with_root(root);
    if let Some(csv) = csv {
        copy_into(csv, &root.join(&config.csv_path))?;
    }
    if let Some(model) = model {
        copy_into(model, &root.join(&config.model_path))?;
    }
    Ok(config)
}

fn copy_into(src: &Path, dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst).map(|_| ())
}
