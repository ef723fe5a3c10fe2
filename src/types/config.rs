//! Configuration for the report pipeline
//!
//! Command-line arguments, the optional JSON configuration file and the
//! merged runtime configuration. Precedence: CLI arguments over environment
//! variables over the configuration file over built-in defaults.

use crate::connector::{Credentials, Endpoint};
use clap::Parser;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "badge-report",
    version,
    about = "Monthly access-control event report: query, spreadsheet, mail delivery",
    long_about = "Queries an access-control server for the events of the reporting month, \
writes them into a spreadsheet artifact and mails the artifact to the given recipient.

EXAMPLES:
    # Generate and deliver the report
    badge-report operator@example.com

    # Use a configuration file
    badge-report --config report.json operator@example.com

    # Validate configuration without touching the network
    badge-report --config report.json --dry-run

    # Generate a configuration template
    badge-report --print-config > report.json

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Environment variables / .env file
    3. Configuration file (--config flag, JSON)
    4. Default values (lowest priority)"
)]
pub struct CliArgs {
    /// Destination email address for the generated report
    pub recipient: Option<String>,

    /// Configuration file path (JSON format)
    #[arg(short, long, help = "Configuration file path (JSON format)")]
    pub config: Option<String>,

    /// Output path for the spreadsheet artifact
    #[arg(long, help = "Output path for the spreadsheet artifact")]
    pub artifact_path: Option<String>,

    /// Identifier of the monitored resource to report on
    #[arg(long, help = "Identifier of the monitored resource to report on")]
    pub resource_id: Option<String>,

    /// Identifier of the event type to report on
    #[arg(long, help = "Identifier of the event type to report on")]
    pub event_type_id: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running the pipeline
    #[arg(long, help = "Validate configuration without running the pipeline")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Access-control server host
    pub access_host: Option<String>,
    /// Access-control server port
    pub access_port: Option<u16>,
    /// Access-control account name
    pub access_username: Option<String>,
    /// Access-control account password
    pub access_password: Option<String>,
    /// SMTP relay host
    pub smtp_host: Option<String>,
    /// SMTP relay port
    pub smtp_port: Option<u16>,
    /// SMTP account name
    pub smtp_username: Option<String>,
    /// SMTP account password
    pub smtp_password: Option<String>,
    /// Sender address for the report mail
    pub send_from: Option<String>,
    /// Subject template, suffixed with the run date
    pub mail_subject: Option<String>,
    /// Body template, suffixed with the run date
    pub mail_text: Option<String>,
    /// Path of the spreadsheet artifact
    pub artifact_path: Option<String>,
    /// Path the verbatim response envelope is dumped to
    pub raw_response_path: Option<String>,
    /// Identifier of the monitored resource
    pub resource_id: Option<String>,
    /// Identifier of the event type
    pub event_type_id: Option<String>,
}

/// Merged runtime configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Access-control server host
    pub access_host: String,
    /// Access-control server port
    pub access_port: u16,
    /// Access-control account name
    pub access_username: String,
    /// Access-control account password
    pub access_password: String,
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port
    pub smtp_port: u16,
    /// SMTP account name
    pub smtp_username: String,
    /// SMTP account password
    pub smtp_password: String,
    /// Sender address for the report mail
    pub send_from: String,
    /// Subject template, suffixed with the run date
    pub mail_subject: String,
    /// Body template, suffixed with the run date
    pub mail_text: String,
    /// Path of the spreadsheet artifact
    pub artifact_path: String,
    /// Path the verbatim response envelope is dumped to
    pub raw_response_path: String,
    /// Identifier of the monitored resource (opaque, not validated)
    pub resource_id: String,
    /// Identifier of the event type (opaque, not validated)
    pub event_type_id: String,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Environment variable carries an unparseable value
    #[error("invalid value for environment variable {name}: {value}")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// The offending value
        value: String,
    },
}

/// Validation errors for the merged configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// A required field is empty
    #[error("configuration field must not be empty: {0}")]
    EmptyField(&'static str),

    /// A port is zero
    #[error("configuration port must be non-zero: {0}")]
    InvalidPort(&'static str),

    /// The sender address is not a well-formed email address
    #[error("sender address is not well-formed: {0}")]
    InvalidSender(String),
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            access_host: "127.0.0.1".to_string(),
            access_port: 2110,
            access_username: String::new(),
            access_password: String::new(),
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            send_from: "reports@example.com".to_string(),
            mail_subject: "Access events report".to_string(),
            mail_text: "Monthly access events report generated on".to_string(),
            artifact_path: "report.xlsx".to_string(),
            raw_response_path: "last_response.json".to_string(),
            resource_id: String::new(),
            event_type_id: String::new(),
        }
    }
}

impl ReportConfig {
    /// Create configuration from parsed CLI arguments, applying the full
    /// precedence chain (defaults, file, environment, CLI).
    pub fn from_cli_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        config.apply_env_overrides()?;
        config.apply_cli_overrides(args);
        Ok(config)
    }

    /// Load configuration from a JSON file, merging with defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let config_file: ConfigFile = serde_json::from_str(&content)?;
        Ok(Self::from_config_file(config_file))
    }

    /// Create configuration from a config file, merging with defaults.
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            access_host: config_file.access_host.unwrap_or(defaults.access_host),
            access_port: config_file.access_port.unwrap_or(defaults.access_port),
            access_username: config_file.access_username.unwrap_or(defaults.access_username),
            access_password: config_file.access_password.unwrap_or(defaults.access_password),
            smtp_host: config_file.smtp_host.unwrap_or(defaults.smtp_host),
            smtp_port: config_file.smtp_port.unwrap_or(defaults.smtp_port),
            smtp_username: config_file.smtp_username.unwrap_or(defaults.smtp_username),
            smtp_password: config_file.smtp_password.unwrap_or(defaults.smtp_password),
            send_from: config_file.send_from.unwrap_or(defaults.send_from),
            mail_subject: config_file.mail_subject.unwrap_or(defaults.mail_subject),
            mail_text: config_file.mail_text.unwrap_or(defaults.mail_text),
            artifact_path: config_file.artifact_path.unwrap_or(defaults.artifact_path),
            raw_response_path: config_file
                .raw_response_path
                .unwrap_or(defaults.raw_response_path),
            resource_id: config_file.resource_id.unwrap_or(defaults.resource_id),
            event_type_id: config_file.event_type_id.unwrap_or(defaults.event_type_id),
        }
    }

    /// Apply overrides from the environment (and an optional `.env` file).
    ///
    /// Credentials and endpoints are typically supplied this way so they
    /// stay out of the on-disk configuration file.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // A missing .env file is fine; the process environment still applies.
        dotenvy::dotenv().ok();
        self.apply_env_from(|name| env::var(name).ok())
    }

    /// Apply overrides from an environment-style lookup. Split out from
    /// [`apply_env_overrides`](Self::apply_env_overrides) so the override
    /// and parse paths can be driven without process-global state.
    fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup("ACCESS_SERVER") {
            self.access_host = value;
        }
        if let Some(value) = lookup("ACCESS_PORT") {
            self.access_port = parse_port("ACCESS_PORT", &value)?;
        }
        if let Some(value) = lookup("ACCESS_USERNAME") {
            self.access_username = value;
        }
        if let Some(value) = lookup("ACCESS_PASSWORD") {
            self.access_password = value;
        }
        if let Some(value) = lookup("SMTP_SERVER") {
            self.smtp_host = value;
        }
        if let Some(value) = lookup("SMTP_PORT") {
            self.smtp_port = parse_port("SMTP_PORT", &value)?;
        }
        if let Some(value) = lookup("SMTP_USERNAME") {
            self.smtp_username = value;
        }
        if let Some(value) = lookup("SMTP_PASSWORD") {
            self.smtp_password = value;
        }
        if let Some(value) = lookup("SEND_FROM") {
            self.send_from = value;
        }
        if let Some(value) = lookup("MAIL_SUBJECT") {
            self.mail_subject = value;
        }
        if let Some(value) = lookup("MAIL_TEXT") {
            self.mail_text = value;
        }
        if let Some(value) = lookup("REPORT_FILENAME") {
            self.artifact_path = value;
        }
        if let Some(value) = lookup("ID_RESOURCE") {
            self.resource_id = value;
        }
        if let Some(value) = lookup("ID_EVENT") {
            self.event_type_id = value;
        }
        Ok(())
    }

    /// Apply CLI argument overrides to configuration.
    fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(value) = &args.artifact_path {
            self.artifact_path = value.clone();
        }
        if let Some(value) = &args.resource_id {
            self.resource_id = value.clone();
        }
        if let Some(value) = &args.event_type_id {
            self.event_type_id = value.clone();
        }
    }

    /// Print configuration as pretty JSON.
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.access_host.is_empty() {
            return Err(ConfigValidationError::EmptyField("access_host"));
        }
        if self.smtp_host.is_empty() {
            return Err(ConfigValidationError::EmptyField("smtp_host"));
        }
        if self.send_from.is_empty() {
            return Err(ConfigValidationError::EmptyField("send_from"));
        }
        if self.artifact_path.is_empty() {
            return Err(ConfigValidationError::EmptyField("artifact_path"));
        }
        if self.raw_response_path.is_empty() {
            return Err(ConfigValidationError::EmptyField("raw_response_path"));
        }
        if self.access_port == 0 {
            return Err(ConfigValidationError::InvalidPort("access_port"));
        }
        if self.smtp_port == 0 {
            return Err(ConfigValidationError::InvalidPort("smtp_port"));
        }
        if !EmailAddress::is_valid(&self.send_from) {
            return Err(ConfigValidationError::InvalidSender(self.send_from.clone()));
        }
        // resource_id/event_type_id are opaque identifiers; their content is
        // the access-control server's business, not ours.
        Ok(())
    }

    /// Endpoint of the access-control server.
    pub fn access_endpoint(&self) -> Endpoint {
        Endpoint { host: self.access_host.clone(), port: self.access_port }
    }

    /// Credentials for the access-control server.
    pub fn access_credentials(&self) -> Credentials {
        Credentials {
            username: self.access_username.clone(),
            password: self.access_password.clone(),
        }
    }
}

fn parse_port(name: &'static str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidEnv { name, value: value.to_string() })
}
