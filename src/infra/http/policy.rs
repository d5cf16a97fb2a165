//! Status-code interpretation for user service responses.

use tracing::warn;

use crate::domain::{ApiError, ClientError};

/// Which response statuses count as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessStatuses {
    /// Any status in `[200, 300)`.
    AnyTwoHundred,
    /// Exactly the listed statuses.
    Only(&'static [u16]),
}

impl SuccessStatuses {
    #[must_use]
    pub fn contains(&self, status: u16) -> bool {
        match self {
            Self::AnyTwoHundred => (200..300).contains(&status),
            Self::Only(list) => list.contains(&status),
        }
    }
}

/// Where the `code` of a decoded error body comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCodeSource {
    /// `code` is overwritten with the numeric status; an undecodable body is a
    /// [`ClientError::StatusBodyDecode`].
    Status,
    /// `code` is kept as the service sent it; an undecodable body falls back
    /// to [`ClientError::Status`].
    Body,
}

/// How a finished response is turned into success or a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    pub success: SuccessStatuses,
    /// Map 404 to [`ClientError::NotFound`] without looking at the body.
    pub not_found_sentinel: bool,
    pub error_code: ErrorCodeSource,
}

impl StatusPolicy {
    /// Any 2xx succeeds; failures carry the numeric status as their code.
    pub const PERMISSIVE: Self = Self {
        success: SuccessStatuses::AnyTwoHundred,
        not_found_sentinel: false,
        error_code: ErrorCodeSource::Status,
    };

    /// Only 200, 202 and 204 succeed; 404 is [`ClientError::NotFound`];
    /// failures keep the service's own code.
    pub const LOOKUP: Self = Self {
        success: SuccessStatuses::Only(&[200, 202, 204]),
        not_found_sentinel: true,
        error_code: ErrorCodeSource::Body,
    };

    #[must_use]
    pub fn is_success(&self, status: u16) -> bool {
        self.success.contains(status)
    }

    /// True when `status` maps to the not-found sentinel, so the body need
    /// not be read.
    #[must_use]
    pub fn is_not_found(&self, status: u16) -> bool {
        self.not_found_sentinel && status == 404
    }

    /// Check `status` and, on failure, build the error from the response body.
    ///
    /// # Errors
    ///
    /// Returns the `ClientError` this policy assigns to a non-success status.
    pub fn check(&self, status: u16, body: &[u8]) -> Result<(), ClientError> {
        if self.is_success(status) {
            return Ok(());
        }
        if self.is_not_found(status) {
            return Err(ClientError::NotFound);
        }

        let decoded = serde_json::from_slice::<ApiError>(body);
        let err = match (self.error_code, decoded) {
            (ErrorCodeSource::Status, Ok(mut error)) => {
                error.code = status.to_string();
                ClientError::Api { status, error }
            }
            (ErrorCodeSource::Status, Err(source)) => {
                ClientError::StatusBodyDecode { status, source }
            }
            (ErrorCodeSource::Body, Ok(error)) => ClientError::Api { status, error },
            (ErrorCodeSource::Body, Err(_)) => ClientError::Status(status),
        };
        warn!(status, error = %err, "User service returned non-success status");
        Err(err)
    }
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self::PERMISSIVE
    }
}
