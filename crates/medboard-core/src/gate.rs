//! Routes, navigation effects, and the session gate.

use std::fmt;
use std::time::Duration;

use crate::session::{Session, SessionToken};

/// How long the session-expired message stays up before redirecting to login.
pub const SESSION_EXPIRED_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Destinations a view can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Sso,
    Chat,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Sso => "/sso",
            Route::Chat => "/chat",
            Route::Dashboard => "/dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A requested client-side redirect, possibly delayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub to: Route,
    pub after: Duration,
}

impl Navigation {
    pub fn now(to: Route) -> Self {
        Self {
            to,
            after: Duration::ZERO,
        }
    }

    pub fn after(to: Route, delay: Duration) -> Self {
        Self { to, after: delay }
    }
}

/// Checks that must pass before an authenticated view issues any request.
pub struct SessionGate;

impl SessionGate {
    /// Return the stored token, or a redirect to login when there is none.
    pub fn require(session: &Session) -> Result<SessionToken, Navigation> {
        session.token().ok_or(Navigation::now(Route::Login))
    }

    /// Like [`SessionGate::require`], but demo-data views may proceed anonymously.
    pub fn require_unless_demo(
        session: &Session,
        demo: bool,
    ) -> Result<Option<SessionToken>, Navigation> {
        match session.token() {
            Some(token) => Ok(Some(token)),
            None if demo => Ok(None),
            None => Err(Navigation::now(Route::Login)),
        }
    }
}
