//! User service operations.
//!
//! Each operation formats its URL from the internal base, attaches the
//! caller's token under the header the endpoint expects, and hands the
//! request to [`HttpTransport`]. Errors come back unchanged.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::{
    AuthDecision, ClientError, PermissionResult, Token, UserProfile, UserService,
};
use crate::infra::{CallOptions, CallRequest, ClientConfig, HttpTransport, StatusPolicy};

/// Header carrying the token for authorization checks.
pub const AUTH_TOKEN_HEADER: &str = "token";
/// Header carrying the token for the profile lookup.
pub const AUTH_ID_HEADER: &str = "x-auth-id";

const CUSTOMER_AUTH_PATH: &str = "/user/internal/auth/customer";
const ADMIN_AUTH_PATH: &str = "/user/internal/auth/admin";
const ME_PATH: &str = "/user/internal/me";

/// Client for the internal user service.
///
/// Cheap to clone and safe to share between tasks. Reconfiguration returns a
/// new client; existing clones keep their settings.
///
/// # Example
///
/// ```ignore
/// let client = UserClient::new("http://user.internal", "https://api.example.com")?
///     .with_timeout(Duration::from_secs(5));
///
/// let decision = client.can_customer(&Token::from(raw_token)).await?;
/// if decision.allowed {
///     let profile = client.user(&Token::from(raw_token)).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct UserClient {
    transport: HttpTransport,
    status_policy: StatusPolicy,
}

impl UserClient {
    /// Creates a client with a 30 second timeout and a default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Build` if the HTTP client cannot be initialized.
    pub fn new(
        internal_base_url: impl Into<String>,
        external_base_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Ok(Self::with_transport(HttpTransport::new(
            internal_base_url,
            external_base_url,
        )?))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_transport(HttpTransport::from_config(config)?))
    }

    #[must_use]
    pub fn with_transport(transport: HttpTransport) -> Self {
        Self {
            transport,
            status_policy: StatusPolicy::PERMISSIVE,
        }
    }

    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            transport: self.transport.with_timeout(timeout),
            status_policy: self.status_policy,
        }
    }

    #[must_use]
    pub fn with_http_client(&self, http_client: reqwest::Client) -> Self {
        Self {
            transport: self.transport.with_http_client(http_client),
            status_policy: self.status_policy,
        }
    }

    /// Status policy applied by the plain (option-less) operations.
    #[must_use]
    pub fn with_status_policy(&self, status_policy: StatusPolicy) -> Self {
        Self {
            transport: self.transport.clone(),
            status_policy,
        }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    fn default_options(&self) -> CallOptions {
        CallOptions::new().with_status_policy(self.status_policy)
    }

    /// [`UserService::can_customer`] with explicit call options.
    #[instrument(skip(self, token, options))]
    pub async fn can_customer_with(
        &self,
        token: &Token,
        options: &CallOptions,
    ) -> Result<AuthDecision, ClientError> {
        let request = CallRequest::get(self.transport.internal_url(CUSTOMER_AUTH_PATH))
            .named("can_customer")
            .token_header(AUTH_TOKEN_HEADER, token);
        let decision: AuthDecision = self.transport.call(request, options).await?;
        debug!(user_id = decision.user_id, allowed = decision.allowed, "Customer check done");
        Ok(decision)
    }

    /// [`UserService::can_admin`] with explicit call options.
    #[instrument(skip(self, token, options))]
    pub async fn can_admin_with(
        &self,
        token: &Token,
        scope: &str,
        action: &str,
        options: &CallOptions,
    ) -> Result<PermissionResult, ClientError> {
        let path = format!("{ADMIN_AUTH_PATH}/{scope}/{action}");
        let request = CallRequest::get(self.transport.internal_url(&path))
            .named("can_admin")
            .token_header(AUTH_TOKEN_HEADER, token);
        let result: PermissionResult = self.transport.call(request, options).await?;
        debug!(
            user_id = result.user_id,
            allowed = result.allowed,
            trace_id = result.trace_id.as_deref().unwrap_or_default(),
            "Admin check done"
        );
        Ok(result)
    }

    /// [`UserService::user`] with explicit call options.
    #[instrument(skip(self, token, options))]
    pub async fn user_with(
        &self,
        token: &Token,
        options: &CallOptions,
    ) -> Result<UserProfile, ClientError> {
        let request = CallRequest::get(self.transport.internal_url(ME_PATH))
            .named("user")
            .token_header(AUTH_ID_HEADER, token);
        self.transport.call(request, options).await
    }
}

#[async_trait]
impl UserService for UserClient {
    async fn can_customer(&self, token: &Token) -> Result<AuthDecision, ClientError> {
        self.can_customer_with(token, &self.default_options()).await
    }

    async fn can_admin(
        &self,
        token: &Token,
        scope: &str,
        action: &str,
    ) -> Result<PermissionResult, ClientError> {
        self.can_admin_with(token, scope, action, &self.default_options())
            .await
    }

    async fn user(&self, token: &Token) -> Result<UserProfile, ClientError> {
        self.user_with(token, &self.default_options()).await
    }
}
