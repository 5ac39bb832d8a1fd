//! Authentication against a fixed user table

use std::collections::BTreeMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};
use crate::traits::Authenticator;

/// Hex-encoded SHA-256 of a password, the form stored in
/// `[authentication.users]`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Authenticator backed by a username to password-hash table.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    users: BTreeMap<String, String>,
}

impl StaticAuthenticator {
    #[must_use]
    pub fn new(users: BTreeMap<String, String>) -> Self {
        let users = users
            .into_iter()
            .map(|(name, hash)| (name, hash.to_ascii_lowercase()))
            .collect();
        Self { users }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn user_check_password(&self, username: &str, password: &str) -> CoreResult<bool> {
        let expected = self
            .users
            .get(username)
            .ok_or_else(|| CoreError::NoSuchUser(username.to_string()))?;
        Ok(*expected == hash_password(password))
    }
}
