//! The explicit session object.
//!
//! A `Session` owns the only handle to the persisted bearer token. It is
//! passed to whatever needs it instead of living in ambient global storage.
//! Writers are limited to login (`establish`), logout (`end`) and the 401
//! path (`expire`); everything else only reads.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::gate::{Navigation, Route, SESSION_EXPIRED_REDIRECT_DELAY};

/// Opaque bearer credential.
///
/// Note: Debug is masked so the token never ends up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token string. Blank strings are not tokens.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"***").finish()
    }
}

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O failed: {0}")]
    Io(String),

    #[error("session store is corrupt: {0}")]
    Corrupt(String),
}

/// Persistence for the single session token.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionToken>, StoreError>;
    fn save(&self, token: &SessionToken) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process store, for tests and embedders that keep the token elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(SessionToken::new(token)),
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<SessionToken>, StoreError> {
        Ok(self.token.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), StoreError> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Handle to the current user's session.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// The stored token, if any. An unreadable store counts as logged out.
    pub fn token(&self) -> Option<SessionToken> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!("failed to read session: {e}");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Record a freshly issued token. Only the login flow calls this.
    pub(crate) fn establish(&self, token: &SessionToken) -> Result<(), StoreError> {
        self.store.save(token)
    }

    /// Log out: forget the token and go to the login page.
    pub fn end(&self) -> Result<Navigation, StoreError> {
        self.store.clear()?;
        Ok(Navigation::now(Route::Login))
    }

    /// The backend rejected the token. Forget it and schedule the redirect.
    pub fn expire(&self) -> Navigation {
        if let Err(e) = self.store.clear() {
            warn!("failed to clear expired session: {e}");
        }
        Navigation::after(Route::Login, SESSION_EXPIRED_REDIRECT_DELAY)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
