//! Trait definitions for the tutor backend.
//!
//! Implemented by `medboard-client` over HTTP (and by its mock for tests).
//! Views receive these as injected trait objects and never build clients
//! themselves.

use async_trait::async_trait;

use crate::auth::{LoginForm, MessageResponse, SignupForm, SsoRequest, TokenResponse};
use crate::error::ApiError;
use crate::model::{
    AnalyticsQuery, AnalyticsSummary, AnswerSubmission, Feedback, Question, QuestionParams,
};

// ---------------------------------------------------------------------------
// Authenticated endpoints
// ---------------------------------------------------------------------------

/// Question/answer and analytics endpoints.
#[async_trait]
pub trait TutorApi: Send + Sync {
    /// `GET /api/v1/chat/question`.
    async fn fetch_question(&self, params: &QuestionParams) -> Result<Question, ApiError>;

    /// `POST /api/v1/chat/answer`.
    async fn submit_answer(&self, answer: &AnswerSubmission) -> Result<Feedback, ApiError>;

    /// `GET /api/v1/analytics/summary`.
    async fn analytics_summary(&self, query: &AnalyticsQuery)
        -> Result<AnalyticsSummary, ApiError>;
}

// ---------------------------------------------------------------------------
// Auth endpoints
// ---------------------------------------------------------------------------

/// Login, signup and SSO endpoints. These never require a session.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /api/v1/auth/login` (form-encoded).
    async fn login(&self, form: &LoginForm) -> Result<TokenResponse, ApiError>;

    /// `POST /api/v1/auth/signup`.
    async fn signup(&self, form: &SignupForm) -> Result<MessageResponse, ApiError>;

    /// `POST /api/v1/auth/sso/login`.
    async fn sso_login(&self, request: &SsoRequest) -> Result<MessageResponse, ApiError>;

    /// Absolute URL of the Google OAuth entry point, for opening in a browser.
    fn google_login_url(&self) -> String;
}
