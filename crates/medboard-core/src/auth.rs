//! Login, signup and institutional SSO flows.
//!
//! Each flow validates its form locally, calls the injected [`AuthApi`], and
//! turns the outcome into what the user should see. Login is the only flow
//! that writes to the [`Session`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::error::{ApiError, ErrorClass};
use crate::gate::{Navigation, Route};
use crate::session::{Session, SessionToken, StoreError};
use crate::traits::AuthApi;

/// Shown when an auth request fails without a server explanation.
pub const AUTH_FALLBACK_MESSAGE: &str = "An error occurred.";

/// Shown after a successful signup. Signup never logs the user in.
pub const SIGNUP_SUCCESS_MESSAGE: &str = "Signup successful! You can now log in.";

/// Password login credentials. Sent form-encoded as `username` / `password`.
#[derive(Clone, Serialize)]
pub struct LoginForm {
    #[serde(rename = "username")]
    pub email: String,
    pub password: String,
}

/// Account creation request.
#[derive(Clone, Serialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Institutional single sign-on initiation request.
#[derive(Debug, Clone, Serialize)]
pub struct SsoRequest {
    pub email: String,
}

/// Body returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Body returned by signup and SSO initiation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Why an auth flow did not succeed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The form was rejected before any request was made.
    #[error("{0}")]
    Invalid(String),

    /// The server refused the request; the message is ready to display.
    #[error("{0}")]
    Rejected(String),

    /// Login succeeded but the token could not be stored.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        validate_email(&self.email)?;
        require(&self.password, "Password is required.")
    }
}

impl SignupForm {
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        require(&self.name, "Name is required.")?;
        validate_email(&self.email)?;
        require(&self.password, "Password is required.")
    }
}

impl SsoRequest {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        validate_email(&self.email)
    }
}

fn require(value: &str, message: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        Err(AuthError::Invalid(message.to_string()))
    } else {
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    require(email, "Email is required.")?;
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::Invalid("Enter a valid email address.".into())),
    }
}

/// Auth endpoints report bad credentials with 401 too; that is not session expiry.
fn rejection(err: &ApiError) -> AuthError {
    match err.class() {
        ErrorClass::ServerDetail(detail) => AuthError::Rejected(detail),
        ErrorClass::Unauthorized | ErrorClass::Unclassified => {
            AuthError::Rejected(AUTH_FALLBACK_MESSAGE.to_string())
        }
    }
}

/// Log in and store the issued token. On success, navigate to the dashboard.
///
/// A failed login leaves the session untouched.
#[instrument(skip_all)]
pub async fn login(
    api: &dyn AuthApi,
    session: &Session,
    form: &LoginForm,
) -> Result<Navigation, AuthError> {
    form.validate()?;

    let response = api.login(form).await.map_err(|e| {
        warn!("login failed: {e}");
        rejection(&e)
    })?;

    let token = SessionToken::new(response.access_token)
        .ok_or_else(|| AuthError::Rejected(AUTH_FALLBACK_MESSAGE.to_string()))?;
    session.establish(&token)?;
    info!("login succeeded");

    Ok(Navigation::now(Route::Dashboard))
}

/// Create an account. Returns the confirmation to display.
#[instrument(skip_all)]
pub async fn signup(api: &dyn AuthApi, form: &SignupForm) -> Result<String, AuthError> {
    form.validate()?;
    api.signup(form).await.map_err(|e| {
        warn!("signup failed: {e}");
        rejection(&e)
    })?;
    Ok(SIGNUP_SUCCESS_MESSAGE.to_string())
}

/// Start institutional SSO. Returns the server's instructions to display.
#[instrument(skip_all)]
pub async fn request_sso(api: &dyn AuthApi, request: &SsoRequest) -> Result<String, AuthError> {
    request.validate()?;
    let response = api.sso_login(request).await.map_err(|e| {
        warn!("SSO request failed: {e}");
        rejection(&e)
    })?;
    Ok(response.message)
}
