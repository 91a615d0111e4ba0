use serde::Deserialize;
use thiserror::Error;

/// The main error type for console operations.
///
/// This enum represents all possible errors that can occur while talking
/// to the goose'd backend, including transport failures, rejected
/// requests, and local validation failures that block a submission.
#[derive(Error, Debug, Clone)]
pub enum ConsoleError {
    /// Represents transport failures (connection refused, timeouts, broken bodies)
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the request
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents a non-2xx response from the backend
    ///
    /// # Fields
    /// * `status` - The HTTP status code
    /// * `message` - The `error` field of the response body, or a status-derived message
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Represents a rejected session (401 / 403)
    ///
    /// # Fields
    /// * `0` - The message reported by the backend
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Represents a successful response whose body cannot be used
    #[error("Payload error: {0}")]
    Payload(String),

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },

    /// Represents configuration loading failures
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ValidationError> for ConsoleError {
    fn from(error: ValidationError) -> Self {
        ConsoleError::Validation { source: error }
    }
}

impl From<config::ConfigError> for ConsoleError {
    fn from(error: config::ConfigError) -> Self {
        ConsoleError::Config(error.to_string())
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Resolves the user-facing message for a failed response.
///
/// Uses the body's `error` field when the body parses and the field is
/// non-blank, otherwise falls back to a status-derived message.
pub(crate) fn failure_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

/// Type alias for Results that may fail with a ConsoleError
pub type ConsoleResult<T> = Result<T, ConsoleError>;
