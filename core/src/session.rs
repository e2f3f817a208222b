//! Explicit auth session context.
//!
//! # Design
//! The bearer token lives in a `Session` handle that is passed to
//! `ApiClient` at construction instead of being read from ambient storage.
//! Clones share the same slot, so the sign-in flow, the client's 401
//! handler and the host UI all observe the same state.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::User;

/// A bearer token plus the identity it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: Option<User>,
}

/// Shared, cloneable handle to the current auth session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<AuthSession>>>,
}

impl Session {
    /// An empty session: no token is attached to requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session pre-seeded with a token, e.g. restored from host storage.
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().as_ref().and_then(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn set(&self, session: AuthSession) {
        *self.write() = Some(session);
    }

    /// Store a token; an empty string clears the session instead.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            self.clear();
            return;
        }
        self.set(AuthSession { token, user: None });
    }

    pub fn clear(&self) {
        *self.write() = None;
    }

    // A panicking writer cannot leave a half-written Option behind, so a
    // poisoned lock still holds a usable value.
    fn read(&self) -> RwLockReadGuard<'_, Option<AuthSession>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<AuthSession>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
