//! Test utilities and mock implementations.
//!
//! This module provides a reusable mock of the `UserService` trait for use
//! in unit and integration tests.

pub mod mocks;

pub use mocks::MockUserService;
