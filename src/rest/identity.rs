//! The identity-provider seam: account creation, password sign-in, and
//! bearer-token verification. Every authenticated REST call re-verifies
//! its token here; there is no session cache.
//!
//! `MemoryIdentity` is the demo stand-in for an external provider. It
//! keeps accounts and issued tokens in process memory and mints opaque
//! uuid access tokens.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("account already exists")]
    AccountExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
}

#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user_id: String,
    pub access_token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account and returns its user id.
    async fn create_account(&self, email: &str, password: &str) -> Result<String, IdentityError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Authenticated, IdentityError>;
    /// Resolves a bearer token to the user id it was issued for.
    async fn verify(&self, access_token: &str) -> Result<String, IdentityError>;
}

struct Account {
    user_id: String,
    password: String,
}

#[derive(Default)]
struct Accounts {
    by_email: HashMap<String, Account>,
    tokens: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct MemoryIdentity {
    inner: Arc<Mutex<Accounts>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Accounts> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let mut inner = self.lock();
        if inner.by_email.contains_key(email) {
            return Err(IdentityError::AccountExists);
        }
        let user_id = Uuid::new_v4().to_string();
        inner.by_email.insert(
            email.to_owned(),
            Account {
                user_id: user_id.clone(),
                password: password.to_owned(),
            },
        );
        Ok(user_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Authenticated, IdentityError> {
        let mut inner = self.lock();
        let account = inner
            .by_email
            .get(email)
            .filter(|a| a.password == password)
            .ok_or(IdentityError::InvalidCredentials)?;
        let user_id = account.user_id.clone();

        let access_token = Uuid::new_v4().to_string();
        inner.tokens.insert(access_token.clone(), user_id.clone());
        Ok(Authenticated { user_id, access_token })
    }

    async fn verify(&self, access_token: &str) -> Result<String, IdentityError> {
        self.lock()
            .tokens
            .get(access_token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }
}
