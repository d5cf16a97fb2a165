//! Application layer: the user service operations.

pub mod client;

pub use client::{AUTH_ID_HEADER, AUTH_TOKEN_HEADER, UserClient};
