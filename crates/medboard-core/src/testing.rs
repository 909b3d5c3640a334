//! Scripted `TutorApi` used by the view tests in this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{
    AnalyticsQuery, AnalyticsSummary, AnswerSubmission, Feedback, Question, QuestionParams,
};
use crate::traits::TutorApi;

#[derive(Default)]
pub(crate) struct StubTutor {
    questions: Mutex<VecDeque<Result<Question, ApiError>>>,
    feedback: Mutex<VecDeque<Result<Feedback, ApiError>>>,
    summaries: Mutex<VecDeque<Result<AnalyticsSummary, ApiError>>>,
    pub calls: AtomicU32,
    pub last_params: Mutex<Option<QuestionParams>>,
    pub last_answer: Mutex<Option<AnswerSubmission>>,
    pub queries: Mutex<Vec<AnalyticsQuery>>,
}

impl StubTutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(self, result: Result<Question, ApiError>) -> Self {
        self.questions.lock().unwrap().push_back(result);
        self
    }

    pub fn feedback(self, result: Result<Feedback, ApiError>) -> Self {
        self.feedback.lock().unwrap().push_back(result);
        self
    }

    pub fn summary(self, result: Result<AnalyticsSummary, ApiError>) -> Self {
        self.summaries.lock().unwrap().push_back(result);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

fn exhausted() -> ApiError {
    ApiError::Network("stub has no scripted response".into())
}

#[async_trait]
impl TutorApi for StubTutor {
    async fn fetch_question(&self, params: &QuestionParams) -> Result<Question, ApiError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        *self.last_params.lock().unwrap() = Some(params.clone());
        self.questions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted()))
    }

    async fn submit_answer(&self, answer: &AnswerSubmission) -> Result<Feedback, ApiError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        *self.last_answer.lock().unwrap() = Some(answer.clone());
        self.feedback
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted()))
    }

    async fn analytics_summary(
        &self,
        query: &AnalyticsQuery,
    ) -> Result<AnalyticsSummary, ApiError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.queries.lock().unwrap().push(*query);
        self.summaries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted()))
    }
}

pub(crate) fn sample_question(id: i64) -> Question {
    Question {
        id,
        content: format!("Question {id}"),
        discipline: Some("Cardiology".into()),
        difficulty: None,
        options: None,
    }
}

pub(crate) fn sample_feedback(correct: bool) -> Feedback {
    Feedback {
        is_correct: correct,
        correct_answer: Some("B".into()),
        explanation: Some("Because.".into()),
        personalized_feedback: None,
    }
}
