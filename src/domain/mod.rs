//! Domain layer containing wire types, the service contract, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ClientError, ConfigError};
pub use traits::UserService;
pub use types::{ApiError, AuthDecision, PermissionResult, Token, UserId, UserProfile};
