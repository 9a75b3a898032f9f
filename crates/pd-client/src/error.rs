//! Error types for prizmdoc-client.

/// Result type alias for prizmdoc-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for prizmdoc-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the transport gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns true if a process status response did not look like a process.
    pub fn is_process_status_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::UnexpectedContentType { .. }
                | ErrorKind::InvalidProcessStatusJson
                | ErrorKind::MissingProcessState
        )
    }

    /// Returns the HTTP status code if this error came from a non-success response.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The server answered with a non-success status.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A required argument was missing or empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A header name or value could not be encoded.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A process status response was not JSON.
    #[error(
        "After sending an HTTP request to GET process status, the response Content-Type was {content_type} rather than application/json. Are you sure you are using the correct URL to get information about a process?"
    )]
    UnexpectedContentType { content_type: String },

    /// A process status response claimed to be JSON but was not a JSON object.
    #[error(
        "After sending an HTTP request to GET process status, the response could not be parsed as JSON. Are you sure you are using the correct URL to get information about a process?"
    )]
    InvalidProcessStatusJson,

    /// A process status response had no string `state` property.
    #[error(
        "After sending an HTTP request to GET process status, the response JSON did not have a \"state\" property. Are you sure you are using the correct URL to get information about a process?"
    )]
    MissingProcessState,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

impl From<reqwest::header::InvalidHeaderName> for Error {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        Error::with_source(ErrorKind::InvalidHeader(err.to_string()), err)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Error::with_source(ErrorKind::InvalidHeader(err.to_string()), err)
    }
}
