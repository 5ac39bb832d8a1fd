//! Session managers

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::traits::{SessionManager, User};

/// Remembers the last logged-in user for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemorySessionManager {
    user: RwLock<Option<User>>,
}

impl InMemorySessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionManager for InMemorySessionManager {
    async fn get_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    async fn notify_login(&self, user: User) {
        log::info!("User {} logged in", user.username);
        *self.user.write().await = Some(user);
    }

    async fn notify_logout(&self) {
        if let Some(user) = self.user.write().await.take() {
            log::info!("User {} logged out", user.username);
        }
    }
}

/// Always reports the same user; login and logout are ignored.
#[derive(Debug, Clone)]
pub struct StaticSessionManager {
    user: User,
}

impl StaticSessionManager {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            user: User::new(username),
        }
    }
}

#[async_trait]
impl SessionManager for StaticSessionManager {
    async fn get_user(&self) -> Option<User> {
        Some(self.user.clone())
    }

    async fn notify_login(&self, _user: User) {}

    async fn notify_logout(&self) {
        log::debug!("Ignoring logout of {}: autologin is static", self.user.username);
    }
}
