//! Client error types with proper error chaining.

use thiserror::Error;

use super::types::ApiError;

/// Errors surfaced by the transport and by every user service operation.
///
/// Nothing in this crate recovers from these locally; they are returned to
/// the caller as-is.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("error creating request: invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("error creating request: invalid header '{name}'")]
    InvalidHeader { name: String },
    #[error("error building http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("error sending request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("request cancelled")]
    Cancelled,
    #[error("not found")]
    NotFound,
    #[error("{error}")]
    Api { status: u16, error: ApiError },
    #[error("request failed with status code {0}")]
    Status(u16),
    #[error("failed to decode status err ({status}): {source}")]
    StatusBodyDecode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error("error decoding response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// HTTP status code of the response that produced this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound => Some(404),
            Self::Api { status, .. }
            | Self::Status(status)
            | Self::StatusBodyDecode { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The decoded server error body, if the service sent one.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Short label for the error kind, used as a metrics dimension.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::InvalidHeader { .. } => "invalid_header",
            Self::Build(_) => "build",
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::NotFound => "not_found",
            Self::Api { .. } => "api",
            Self::Status(_) => "status",
            Self::StatusBodyDecode { .. } => "status_body_decode",
            Self::Decode(_) => "decode",
        }
    }

    /// Renders this error in the service's canonical error shape so host
    /// applications can forward it unchanged.
    #[must_use]
    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::Api { error, .. } => error.clone(),
            Self::NotFound => ApiError::not_found(),
            Self::Status(status) | Self::StatusBodyDecode { status, .. } => {
                ApiError::new(self.to_string(), status.to_string())
            }
            other => ApiError::new(other.to_string(), other.kind().to_uppercase()),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for ConfigError {
    fn from(err: validator::ValidationErrors) -> Self {
        ConfigError::Validation(err.to_string())
    }
}
