use serde::Deserialize;
use std::fmt;

/// Diagnostic messages surfaced by the controller alongside a response
pub type Warnings = Vec<String>;

/// One entry of the controller's structured error body
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

/// Error type for controller and UAA operations
#[derive(Debug, Clone, PartialEq)]
pub enum CcError {
    /// No route is registered under the requested name
    RouteNotFound(String),
    /// A placeholder in the route template had no value
    MissingUriParameter { route: String, parameter: String },
    /// Transport-level failure (DNS, TLS, connection reset, timeout)
    Network(String),
    /// The access token was still rejected after a refresh
    InvalidAuthToken(String),
    /// The token service rejected the refresh token or client credentials
    InvalidRefreshToken(String),
    /// The controller returned a structured error body
    Api {
        status: u16,
        errors: Vec<ApiErrorDetail>,
    },
    /// Error status with a body that is not a structured error
    UnexpectedResponse { status: u16, body: String },
    /// Success status but the body could not be decoded
    MalformedResponse(String),
    /// Request body could not be serialized
    Encode(String),
    /// Settings file or environment problem
    Config(String),
    /// A list accumulator asked to stop
    Accumulate(String),
}

impl fmt::Display for CcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CcError::RouteNotFound(name) => write!(f, "No route registered for request '{}'", name),
            CcError::MissingUriParameter { route, parameter } => write!(
                f,
                "Missing URI parameter '{}' for request '{}'",
                parameter, route
            ),
            CcError::Network(msg) => write!(f, "Network error: {}", msg),
            CcError::InvalidAuthToken(msg) => {
                write!(f, "Invalid auth token, log in again: {}", msg)
            }
            CcError::InvalidRefreshToken(msg) => {
                write!(f, "The token could not be refreshed, log in again: {}", msg)
            }
            CcError::Api { status, errors } => {
                let details: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{} ({}): {}", e.title, e.code, e.detail))
                    .collect();
                write!(f, "API error (status {}): {}", status, details.join("; "))
            }
            CcError::UnexpectedResponse { status, body } => {
                write!(f, "Unexpected response (status {}): {}", status, body)
            }
            CcError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            CcError::Encode(msg) => write!(f, "Failed to encode request body: {}", msg),
            CcError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CcError::Accumulate(msg) => write!(f, "List processing stopped: {}", msg),
        }
    }
}

impl std::error::Error for CcError {}

impl CcError {
    /// Whether the caller should force a fresh login
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            CcError::InvalidAuthToken(_) | CcError::InvalidRefreshToken(_)
        )
    }
}

impl From<reqwest::Error> for CcError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's Display hides the underlying cause (DNS, TLS, refused)
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message = format!("{}: {}", message, cause);
            source = cause.source();
        }
        CcError::Network(message)
    }
}

impl From<serde_json::Error> for CcError {
    fn from(err: serde_json::Error) -> Self {
        CcError::MalformedResponse(err.to_string())
    }
}

impl From<std::io::Error> for CcError {
    fn from(err: std::io::Error) -> Self {
        CcError::Config(err.to_string())
    }
}

/// An error paired with the warnings collected before it happened
#[derive(Debug, Clone, PartialEq)]
pub struct WarnedError {
    pub error: CcError,
    pub warnings: Warnings,
}

impl WarnedError {
    pub fn new(error: CcError, warnings: Warnings) -> Self {
        Self { error, warnings }
    }
}

impl fmt::Display for WarnedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for WarnedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<CcError> for WarnedError {
    fn from(error: CcError) -> Self {
        Self::new(error, Warnings::new())
    }
}

/// Result type alias for operations that carry no warnings
pub type Result<T> = std::result::Result<T, CcError>;

/// Result of a controller operation: the value and its warnings, or the
/// error and the warnings gathered up to the failure
pub type ApiResult<T> = std::result::Result<(T, Warnings), WarnedError>;
