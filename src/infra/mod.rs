//! Infrastructure layer implementations.

pub mod http;
pub mod observability;

pub use http::{
    CallOptions, CallRequest, ClientConfig, ErrorCodeSource, HttpTransport, StatusPolicy,
    SuccessStatuses,
};
