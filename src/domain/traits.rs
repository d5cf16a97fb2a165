//! Domain traits defining the contract with the user service.

use async_trait::async_trait;

use super::error::ClientError;
use super::types::{AuthDecision, PermissionResult, Token, UserProfile};

/// Authentication and profile operations offered by the user service.
///
/// Implemented by [`crate::app::UserClient`] for the real service and by
/// `MockUserService` in `test_utils` for callers that need a fake.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Check whether `token` identifies an authorized customer
    async fn can_customer(&self, token: &Token) -> Result<AuthDecision, ClientError>;

    /// Check whether `token` may perform `action` within the admin `scope`
    async fn can_admin(
        &self,
        token: &Token,
        scope: &str,
        action: &str,
    ) -> Result<PermissionResult, ClientError>;

    /// Fetch the profile of the user behind `token`
    async fn user(&self, token: &Token) -> Result<UserProfile, ClientError>;
}
