/// Database configuration and connection management
pub mod database;

/// School configuration loading from config.toml
pub mod school;
