mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, GeneratorConfig, QuizConfig, UiConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/memolil[-dev]/` based on MEMOLIL_ENV.
///
/// Set MEMOLIL_ENV=dev to use development data directory. MEMOLIL_DATA_DIR
/// replaces the whole path.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("MEMOLIL_DATA_DIR").filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("MEMOLIL_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("memolil-dev")
            } else {
                base_dir.join("memolil")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
