use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric identifier the user service assigns to an account.
pub type UserId = i64;

/// Opaque bearer credential forwarded verbatim to the user service.
///
/// The value is kept in a [`SecretString`] so it never shows up in `Debug`
/// output or tracing fields.
#[derive(Clone)]
pub struct Token(SecretString);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<SecretString> for Token {
    fn from(value: SecretString) -> Self {
        Self(value)
    }
}

/// Result of a customer authorization check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthDecision {
    pub allowed: bool,
    #[serde(rename = "userID")]
    pub user_id: UserId,
}

/// Result of an admin permission check.
///
/// Carries the service's trace id when it sends one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionResult {
    #[serde(rename = "traceID", default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    pub allowed: bool,
    #[serde(rename = "userID")]
    pub user_id: UserId,
}

impl From<PermissionResult> for AuthDecision {
    fn from(value: PermissionResult) -> Self {
        Self {
            allowed: value.allowed,
            user_id: value.user_id,
        }
    }
}

/// Profile of the authenticated user as returned by `/user/internal/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub phone: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub kyc_level: i32,
    pub national_code: String,
    pub created_at: DateTime<Utc>,
}

/// Canonical error body of the user service.
#[derive(Error, Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[error("{code}: {message} ({trace_id})")]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub trace_id: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            trace_id: String::new(),
        }
    }

    /// Representation of the 404 sentinel.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new("not found", "NOT_FOUND")
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }
}
