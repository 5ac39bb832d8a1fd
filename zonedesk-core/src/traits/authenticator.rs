//! Password check abstraction

use async_trait::async_trait;

use crate::error::CoreResult;

/// Checks user credentials.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Whether `password` is correct for `username`.
    ///
    /// Unknown users are `Err(CoreError::NoSuchUser)`, not `Ok(false)`.
    async fn user_check_password(&self, username: &str, password: &str) -> CoreResult<bool>;
}
