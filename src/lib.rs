//! User Service Client
//!
//! A typed HTTP client for the internal user service: customer
//! authorization checks, scoped admin permission checks, and profile lookup.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Application Layer              │
//! │   UserClient: can_customer, can_admin, user  │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │  UserService trait, wire types, ClientError  │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │  HttpTransport, StatusPolicy, ClientConfig   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Key Features
//!
//! - **One call primitive**: headers, cancellation, deadline and status
//!   interpretation are all parameters of [`infra::HttpTransport::call`]
//! - **Immutable clients**: `with_*` methods return new values, so a client
//!   can be shared across tasks without locking
//! - **Trait seam**: depend on [`domain::UserService`] and swap in
//!   `test_utils::MockUserService` in tests
//! - **Secret tokens**: credentials are held in `secrecy` types and sent as
//!   sensitive headers
//! - **Logging and metrics**: `tracing` spans per call, `metrics` counters
//!   and histograms per operation
//!
//! # Example
//!
//! ```ignore
//! use user_service_client::app::UserClient;
//! use user_service_client::domain::{Token, UserService};
//! use user_service_client::infra::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let client = UserClient::from_config(&config)?;
//!
//!     let token = Token::from(std::env::var("TOKEN")?);
//!     let decision = client.can_customer(&token).await?;
//!     if decision.allowed {
//!         let profile = client.user(&token).await?;
//!         println!("hello {}", profile.first_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod domain;
pub mod infra;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use app::UserClient;
pub use domain::{ClientError, Token, UserService};
