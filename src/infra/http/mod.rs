//! HTTP transport for the user service.

pub mod config;
pub mod policy;
pub mod transport;

pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use policy::{ErrorCodeSource, StatusPolicy, SuccessStatuses};
pub use transport::{CallOptions, CallRequest, HttpTransport, JSON_CONTENT_TYPE};
