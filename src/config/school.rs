//! School configuration loading from config.toml
//!
//! The configuration names the current academic year and the subject catalogue
//! that is seeded into the database on startup.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Academic year used for fee summaries when none is given (e.g., "2025-2026")
    pub academic_year: String,
    /// Subjects to seed
    #[serde(default)]
    pub subjects: Vec<SubjectConfig>,
}

/// Configuration for a single subject
#[derive(Debug, Deserialize, Clone)]
pub struct SubjectConfig {
    /// Display name
    pub name: String,
    /// Subject code; upper-cased on insert
    pub code: String,
    /// Credit weight for GPA aggregation
    #[serde(default = "default_credits")]
    pub credits: i32,
    /// Grade level the subject is taught at
    pub grade_level: String,
    /// Owning department
    #[serde(default)]
    pub department: Option<String>,
    /// Core subject (true) or elective (false)
    #[serde(default = "default_is_core")]
    pub is_core: bool,
}

const fn default_credits() -> i32 {
    1
}

const fn default_is_core() -> bool {
    true
}

/// Loads school configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the configuration named by `SCHOOL_LEDGER_CONFIG`, falling back to ./config.toml
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("SCHOOL_LEDGER_CONFIG")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}
