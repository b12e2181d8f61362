//! Error types for the dbt Cloud CLI

use thiserror::Error;

/// Result type alias for dbt Cloud operations
pub type DbtCloudResult<T> = Result<T, DbtCloudError>;

/// Main error type for the dbt Cloud CLI
#[derive(Error, Debug, Clone)]
pub enum DbtCloudError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required command field was omitted and has no default or
    /// environment fallback
    #[error("Missing required field `{field}`{}", fallback_hint(.env_fallback))]
    MissingRequiredField {
        field: String,
        env_fallback: Option<String>,
    },

    /// An enum or discriminator field received a value outside its
    /// allowed choices
    #[error("Invalid value `{value}` for `{field}` (expected one of: {expected})")]
    InvalidChoice {
        field: String,
        value: String,
        expected: String,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// Non-2xx API response surfaced after its body has been printed
    #[error("dbt Cloud API responded with status {status}")]
    Api { status: u16, body: String },

    /// A polled run reached a terminal failure state
    #[error("Run failed with {status} status. For more information, see {href}.")]
    RunFailed { status: String, href: String },

    /// The poll deadline elapsed before the run reached a terminal state
    #[error("Run did not reach a terminal state within {seconds} seconds")]
    PollTimeout { seconds: u64 },
}

fn fallback_hint(env_fallback: &Option<String>) -> String {
    match env_fallback {
        Some(var) => format!(" (set it or the {var} environment variable)"),
        None => String::new(),
    }
}

impl DbtCloudError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a missing-required-field error for a field with no
    /// environment fallback
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            env_fallback: None,
        }
    }

    /// Create a missing-required-field error naming the environment
    /// variable that would have supplied it
    pub fn missing_field_with_env(field: impl Into<String>, env: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            env_fallback: Some(env.into()),
        }
    }

    /// Create an invalid-choice error
    pub fn invalid_choice(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidChoice {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

impl From<std::io::Error> for DbtCloudError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for DbtCloudError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<reqwest::Error> for DbtCloudError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}
