use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(intake_sync::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(intake_sync::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(intake_sync::google_calendar))]
    GoogleCalendar(String),

    #[error("Google Sheets API error: {0}")]
    #[diagnostic(code(intake_sync::sheets))]
    Sheets(String),

    #[error("Google authorization error: {0}")]
    #[diagnostic(
        code(intake_sync::google_auth),
        help("run the get_google_token binary to authorize this service")
    )]
    GoogleAuth(String),

    #[error("Identity lookup error: {0}")]
    #[diagnostic(code(intake_sync::identity))]
    Identity(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(intake_sync::component))]
    Component(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(intake_sync::http))]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(intake_sync::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(intake_sync::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type SyncResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create Google Sheets errors
pub fn sheets_error(message: &str) -> Error {
    Error::Sheets(message.to_string())
}

/// Helper to create OAuth errors
pub fn google_auth_error(message: &str) -> Error {
    Error::GoogleAuth(message.to_string())
}

/// Helper to create identity errors
pub fn identity_error(message: &str) -> Error {
    Error::Identity(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
