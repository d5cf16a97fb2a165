//! HTTP transport for the user service.
//!
//! Every request goes through [`HttpTransport::call`] (or
//! [`HttpTransport::call_ignoring_body`]), which forces a JSON content type,
//! applies the caller's cancellation and deadline, interprets the status code
//! through a [`StatusPolicy`], and decodes the body.

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::config::{ClientConfig, DEFAULT_TIMEOUT};
use super::policy::StatusPolicy;
use crate::domain::{ClientError, Token};
use crate::infra::observability;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A single outbound request: method, absolute URL, headers and optional body.
#[derive(Debug)]
pub struct CallRequest {
    operation: &'static str,
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    secret_headers: Vec<(String, Token)>,
    body: Option<Vec<u8>>,
}

impl CallRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            operation: "call",
            method,
            url: url.into(),
            headers: Vec::new(),
            secret_headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Label used for spans and metrics.
    #[must_use]
    pub fn named(mut self, operation: &'static str) -> Self {
        self.operation = operation;
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a header whose value is a credential; it is marked sensitive so it
    /// is never logged.
    #[must_use]
    pub fn token_header(mut self, name: impl Into<String>, token: &Token) -> Self {
        self.secret_headers.push((name.into(), token.clone()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Caller headers in insertion order, then `content-type` forced to JSON.
    fn header_map(&self) -> Result<HeaderMap, ClientError> {
        let invalid = |name: &str| ClientError::InvalidHeader {
            name: name.to_string(),
        };

        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid(name))?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid(name))?;
            map.insert(header, value);
        }
        for (name, token) in &self.secret_headers {
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid(name))?;
            let mut value = HeaderValue::from_str(token.expose()).map_err(|_| invalid(name))?;
            value.set_sensitive(true);
            map.insert(header, value);
        }
        map.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        Ok(map)
    }
}

/// Per-call knobs: cancellation, deadline, and status interpretation.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub cancel: Option<CancellationToken>,
    pub deadline: Option<Duration>,
    pub status_policy: StatusPolicy,
}

impl CallOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the call with [`ClientError::Cancelled`] once `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Abort the call with [`ClientError::Timeout`] after `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }
}

/// Network configuration plus the shared `reqwest` client.
///
/// Immutable once built: the `with_*` methods return a new value and leave
/// the original untouched, so one transport can be shared across tasks.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
    internal_base_url: String,
    external_base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the default 30 second timeout.
    ///
    /// Base URLs are not checked here; a malformed one fails the first request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Build` if the underlying HTTP client cannot be
    /// initialized (e.g. TLS backend failure).
    pub fn new(
        internal_base_url: impl Into<String>,
        external_base_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let http_client = Client::builder().build().map_err(ClientError::Build)?;
        Ok(Self {
            http_client,
            internal_base_url: internal_base_url.into(),
            external_base_url: external_base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(&config.internal_base_url, &config.external_base_url)?
            .with_timeout(config.timeout))
    }

    /// Per-request timeout. `Duration::ZERO` disables it; calls are then
    /// bounded only by `CallOptions::deadline` or cancellation.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Swap the underlying `reqwest` client (proxies, custom TLS, test doubles).
    #[must_use]
    pub fn with_http_client(&self, http_client: Client) -> Self {
        Self {
            http_client,
            ..self.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn internal_base_url(&self) -> &str {
        &self.internal_base_url
    }

    pub fn external_base_url(&self) -> &str {
        &self.external_base_url
    }

    /// `path` appended to the internal base URL.
    pub fn internal_url(&self, path: &str) -> String {
        join_url(&self.internal_base_url, path)
    }

    /// `path` appended to the external base URL.
    pub fn external_url(&self, path: &str) -> String {
        join_url(&self.external_base_url, path)
    }

    /// Send `request` and decode a successful JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Any `ClientError`: invalid URL or header, transport failure, timeout,
    /// cancellation, a non-success status per `options.status_policy`, or a
    /// body that does not decode into `T`.
    #[instrument(
        skip(self, request, options),
        fields(operation = request.operation, method = %request.method, url = %request.url)
    )]
    pub async fn call<T>(&self, request: CallRequest, options: &CallOptions) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let operation = request.operation;
        let started = Instant::now();
        let result: Result<T, ClientError> = match self.execute(request, options).await {
            Ok(body) => serde_json::from_slice(&body).map_err(|e| {
                warn!(error = %e, "Failed to decode user service response");
                ClientError::Decode(e)
            }),
            Err(e) => Err(e),
        };
        observability::record_call(
            operation,
            observability::outcome_label(&result),
            started.elapsed(),
        );
        result
    }

    /// Send `request`; a successful response body is discarded.
    ///
    /// # Errors
    ///
    /// Same as [`HttpTransport::call`], minus body decoding.
    #[instrument(
        skip(self, request, options),
        fields(operation = request.operation, method = %request.method, url = %request.url)
    )]
    pub async fn call_ignoring_body(
        &self,
        request: CallRequest,
        options: &CallOptions,
    ) -> Result<(), ClientError> {
        let operation = request.operation;
        let started = Instant::now();
        let result = self.execute(request, options).await.map(|_| ());
        observability::record_call(
            operation,
            observability::outcome_label(&result),
            started.elapsed(),
        );
        result
    }

    async fn execute(
        &self,
        request: CallRequest,
        options: &CallOptions,
    ) -> Result<Vec<u8>, ClientError> {
        let url = Url::parse(&request.url).map_err(|source| ClientError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;
        let headers = request.header_map()?;

        let mut builder = self
            .http_client
            .request(request.method, url)
            .headers(headers);
        if !self.timeout.is_zero() {
            builder = builder.timeout(self.timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let exchange = self.exchange(builder, options.status_policy);
        let deadline = options.deadline;
        let bounded = async move {
            match deadline {
                Some(limit) => tokio::time::timeout(limit, exchange)
                    .await
                    .unwrap_or_else(|_| Err(ClientError::Timeout)),
                None => exchange.await,
            }
        };

        match &options.cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("Request cancelled by caller");
                        Err(ClientError::Cancelled)
                    }
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }

    async fn exchange(
        &self,
        builder: RequestBuilder,
        policy: StatusPolicy,
    ) -> Result<Vec<u8>, ClientError> {
        debug!("Sending request to user service");
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Request to user service failed");
            ClientError::from_reqwest(e)
        })?;

        let status = response.status().as_u16();
        if policy.is_not_found(status) {
            return Err(ClientError::NotFound);
        }

        let body = response.bytes().await.map_err(ClientError::from_reqwest)?;
        policy.check(status, &body)?;
        debug!(status, bytes = body.len(), "User service responded");
        Ok(body.to_vec())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
