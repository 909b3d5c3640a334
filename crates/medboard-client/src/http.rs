//! HTTP implementation of the tutor API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use medboard_core::auth::{LoginForm, MessageResponse, SignupForm, SsoRequest, TokenResponse};
use medboard_core::error::{extract_detail, ApiError};
use medboard_core::model::{
    AnalyticsQuery, AnalyticsSummary, AnswerSubmission, Feedback, Question, QuestionParams,
};
use medboard_core::session::SessionToken;
use medboard_core::traits::{AuthApi, TutorApi};

use crate::config::ClientConfig;

const QUESTION_PATH: &str = "/api/v1/chat/question";
const ANSWER_PATH: &str = "/api/v1/chat/answer";
const SUMMARY_PATH: &str = "/api/v1/analytics/summary";
const LOGIN_PATH: &str = "/api/v1/auth/login";
const SIGNUP_PATH: &str = "/api/v1/auth/signup";
const SSO_PATH: &str = "/api/v1/auth/sso/login";
const GOOGLE_LOGIN_PATH: &str = "/api/v1/auth/google/login";

/// Which kind of endpoint a request hits. On auth endpoints a 401 means bad
/// credentials, not an expired session.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    Session,
    Auth,
}

/// Configured client for the tutor backend.
///
/// Built once per session: the bearer token, when present, is installed as
/// a default header so every request carries it.
pub struct HttpClient {
    config: ClientConfig,
    authenticated: bool,
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ClientConfig, token: Option<&SessionToken>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ApiError::Config("session token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            config: config.clone(),
            authenticated: token.is_some(),
            client,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    async fn send(&self, request: RequestBuilder, scope: Scope) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.config.timeout_secs)
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 && scope == Scope::Session {
            warn!("server rejected session token");
            return Err(ApiError::Unauthorized);
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            debug!(status, detail = ?detail, "request failed");
            return Err(ApiError::Server { status, detail });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TutorApi for HttpClient {
    #[instrument(skip(self, params), fields(specialty = %params.specialty, difficulty = %params.difficulty))]
    async fn fetch_question(&self, params: &QuestionParams) -> Result<Question, ApiError> {
        let request = self.client.get(self.url(QUESTION_PATH)).query(&[
            ("specialty", params.specialty.as_str()),
            ("difficulty", params.difficulty.as_str()),
        ]);
        let response = self.send(request, Scope::Session).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, answer), fields(question_id = answer.question_id))]
    async fn submit_answer(&self, answer: &AnswerSubmission) -> Result<Feedback, ApiError> {
        let request = self.client.post(self.url(ANSWER_PATH)).json(answer);
        let response = self.send(request, Scope::Session).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, query), fields(group_by = %query.group_by, test_data = query.use_test_data))]
    async fn analytics_summary(
        &self,
        query: &AnalyticsQuery,
    ) -> Result<AnalyticsSummary, ApiError> {
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(2);
        if query.use_test_data {
            params.push(("useTestData", "true"));
        }
        params.push(("group_by", query.group_by.as_str()));

        let request = self.client.get(self.url(SUMMARY_PATH)).query(&params);
        let response = self.send(request, Scope::Session).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl AuthApi for HttpClient {
    #[instrument(skip_all)]
    async fn login(&self, form: &LoginForm) -> Result<TokenResponse, ApiError> {
        let request = self.client.post(self.url(LOGIN_PATH)).form(form);
        let response = self.send(request, Scope::Auth).await?;
        Self::decode(response).await
    }

    #[instrument(skip_all)]
    async fn signup(&self, form: &SignupForm) -> Result<MessageResponse, ApiError> {
        let request = self.client.post(self.url(SIGNUP_PATH)).json(form);
        let response = self.send(request, Scope::Auth).await?;
        Self::decode(response).await
    }

    #[instrument(skip_all)]
    async fn sso_login(&self, request: &SsoRequest) -> Result<MessageResponse, ApiError> {
        let request = self.client.post(self.url(SSO_PATH)).json(request);
        let response = self.send(request, Scope::Auth).await?;
        Self::decode(response).await
    }

    fn google_login_url(&self) -> String {
        self.url(GOOGLE_LOGIN_PATH)
    }
}
