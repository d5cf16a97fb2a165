//! Mock implementations for testing.
//!
//! `MockUserService` answers from in-memory tables keyed by token, and can be
//! configured to fail or to respond slowly.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{
    ApiError, AuthDecision, ClientError, PermissionResult, Token, UserProfile, UserService,
};

/// How the mock user service misbehaves.
///
/// The default answers every lookup from the registered tables immediately.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Status the fake service "returns" for every operation; surfaces as
    /// `ClientError::Api` carrying this status as its code.
    pub fail_status: Option<u16>,
    /// `message` of the fake error body.
    pub error_message: Option<String>,
    /// Delay before answering, for exercising caller-side deadlines.
    pub latency_ms: Option<u64>,
}

impl MockConfig {
    /// Healthy service: answers from the registered tables.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Service that rejects every call with a 500 and `message`.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::rejecting(500, message)
    }

    /// Service that rejects every call with `status` and `message`, e.g. 401
    /// for an expired token or 503 while the user service is draining.
    #[must_use]
    pub fn rejecting(status: u16, message: impl Into<String>) -> Self {
        Self {
            fail_status: Some(status),
            error_message: Some(message.into()),
            latency_ms: None,
        }
    }

    /// Slow service: every answer is delayed by `ms` milliseconds.
    #[must_use]
    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }
}

#[derive(Default)]
struct Tables {
    customers: HashMap<String, AuthDecision>,
    admins: HashMap<(String, String, String), PermissionResult>,
    profiles: HashMap<String, UserProfile>,
}

/// Mock user service for testing code that depends on [`UserService`].
///
/// Unknown tokens are answered with `ClientError::NotFound`.
///
/// # Example
///
/// ```
/// use user_service_client::domain::AuthDecision;
/// use user_service_client::test_utils::{MockUserService, mocks::MockConfig};
///
/// let mock = MockUserService::new()
///     .with_customer("tok", AuthDecision { allowed: true, user_id: 1 });
///
/// let failing_mock = MockUserService::with_config(MockConfig::failure("user service down"));
/// ```
pub struct MockUserService {
    tables: Arc<Mutex<Tables>>,
    config: MockConfig,
    call_count: AtomicU64,
}

impl MockUserService {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            config,
            call_count: AtomicU64::new(0),
        }
    }

    /// Creates a mock that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    #[must_use]
    pub fn with_customer(self, token: &str, decision: AuthDecision) -> Self {
        self.tables
            .lock()
            .unwrap()
            .customers
            .insert(token.to_string(), decision);
        self
    }

    #[must_use]
    pub fn with_admin(
        self,
        token: &str,
        scope: &str,
        action: &str,
        result: PermissionResult,
    ) -> Self {
        self.tables.lock().unwrap().admins.insert(
            (token.to_string(), scope.to_string(), action.to_string()),
            result,
        );
        self
    }

    #[must_use]
    pub fn with_profile(self, token: &str, profile: UserProfile) -> Self {
        self.tables
            .lock()
            .unwrap()
            .profiles
            .insert(token.to_string(), profile);
        self
    }

    /// Gets the number of times any method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    async fn enter(&self) -> Result<(), ClientError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(ms) = self.config.latency_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        if let Some(status) = self.config.fail_status {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock user service error".to_string());
            return Err(ClientError::Api {
                status,
                error: ApiError::new(msg, status.to_string()),
            });
        }
        Ok(())
    }
}

impl Default for MockUserService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserService for MockUserService {
    async fn can_customer(&self, token: &Token) -> Result<AuthDecision, ClientError> {
        self.enter().await?;
        let tables = self.tables.lock().unwrap();
        tables
            .customers
            .get(token.expose())
            .copied()
            .ok_or(ClientError::NotFound)
    }

    async fn can_admin(
        &self,
        token: &Token,
        scope: &str,
        action: &str,
    ) -> Result<PermissionResult, ClientError> {
        self.enter().await?;
        let key = (
            token.expose().to_string(),
            scope.to_string(),
            action.to_string(),
        );
        let tables = self.tables.lock().unwrap();
        tables.admins.get(&key).cloned().ok_or(ClientError::NotFound)
    }

    async fn user(&self, token: &Token) -> Result<UserProfile, ClientError> {
        self.enter().await?;
        let tables = self.tables.lock().unwrap();
        tables
            .profiles
            .get(token.expose())
            .cloned()
            .ok_or(ClientError::NotFound)
    }
}
