//! Central Configuration Constants
//!
//! Single source of truth for default locations. Environment overrides are
//! wired through the CLI (`PHISHGUARD_MODELS_DIR`, `PHISHGUARD_LEDGER`).

use std::path::PathBuf;

/// App name
pub const APP_NAME: &str = "PhishGuard";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scaler artifact file name inside the models directory
pub const SCALER_FILE: &str = "scaler.json";

/// Classifier artifact file name inside the models directory
pub const CLASSIFIER_FILE: &str = "phishing_model.json";

/// Default models directory (relative to the working directory)
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Models directory when no flag or env override is given
pub fn default_models_dir() -> PathBuf {
    PathBuf::from(DEFAULT_MODELS_DIR)
}

/// Ledger database path when no flag or env override is given
pub fn default_ledger_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("phishguard")
        .join("predictions.db")
}
