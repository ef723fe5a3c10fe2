//! Shared types and configuration

pub mod config;

pub use config::{CliArgs, ConfigError, ConfigFile, ConfigValidationError, ReportConfig};
