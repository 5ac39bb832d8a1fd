//! Session abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Tracks who is logged in.
#[async_trait]
pub trait SessionManager: Send + Sync {
    async fn get_user(&self) -> Option<User>;

    async fn notify_login(&self, user: User);

    async fn notify_logout(&self);
}
