//! The question/answer cycle behind the practice view.
//!
//! ```text
//! Idle -> Loading -> Question | Error
//! Question -> Submitting -> Feedback | Error
//! ```
//!
//! Each transition is split into `begin_*` (local checks, returns a ticket)
//! and `complete_*` (applies the response if the ticket is still current).
//! The async `fetch` / `submit` drivers run both halves around an injected
//! [`TutorApi`].

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{ApiError, ErrorClass};
use crate::gate::Navigation;
use crate::model::{AnswerSubmission, Feedback, Question, QuestionId, QuestionParams};
use crate::request::RequestSeq;
use crate::session::Session;
use crate::traits::TutorApi;

/// Shown when a question or answer request fails without a server explanation.
pub const QUIZ_FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Idle,
    Loading,
    Question,
    Submitting,
    Feedback,
    Error,
}

/// Why a submission was refused locally. No request is made in any of these cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("no question is loaded")]
    NoQuestion,
    #[error("a request is already in flight")]
    Busy,
    #[error("this question has already been answered; fetch the next one")]
    AlreadyAnswered,
    #[error("enter an answer first")]
    EmptyAnswer,
}

/// Why a multiple-choice selection was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error("the current question is not multiple choice")]
    NotMultipleChoice,
    #[error("no option '{0}'")]
    UnknownOption(String),
}

/// Handle for an in-flight question fetch.
#[derive(Debug)]
pub struct FetchTicket {
    seq: u64,
}

/// Handle for an in-flight answer submission.
#[derive(Debug)]
pub struct SubmitTicket {
    seq: u64,
    submission: AnswerSubmission,
}

impl SubmitTicket {
    pub fn submission(&self) -> &AnswerSubmission {
        &self.submission
    }
}

/// View state for the practice loop.
#[derive(Debug)]
pub struct QuizCycle {
    session: Session,
    phase: QuizPhase,
    question: Option<Question>,
    answer: String,
    feedback: Option<Feedback>,
    error: Option<String>,
    seq: RequestSeq,
}

impl QuizCycle {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            phase: QuizPhase::Idle,
            question: None,
            answer: String::new(),
            feedback: None,
            error: None,
            seq: RequestSeq::new(),
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, QuizPhase::Loading | QuizPhase::Submitting)
    }

    /// Replace the free-text answer.
    pub fn set_answer(&mut self, text: &str) {
        self.answer = text.to_string();
    }

    /// Select a multiple-choice option by key (case-insensitive).
    pub fn choose(&mut self, key: &str) -> Result<(), ChoiceError> {
        let options = self
            .question
            .as_ref()
            .and_then(|q| q.options.as_ref())
            .ok_or(ChoiceError::NotMultipleChoice)?;
        let resolved = options
            .resolve_key(key)
            .ok_or_else(|| ChoiceError::UnknownOption(key.trim().to_string()))?;
        self.answer = resolved.to_string();
        Ok(())
    }

    /// Start fetching a question. Supersedes any request still in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.phase = QuizPhase::Loading;
        FetchTicket {
            seq: self.seq.issue(),
        }
    }

    /// Apply a question response. Returns a redirect if the session expired.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Question, ApiError>,
    ) -> Option<Navigation> {
        if !self.seq.is_current(ticket.seq) {
            warn!(seq = ticket.seq, "dropping stale question response");
            return None;
        }

        match result {
            Ok(question) => {
                debug!(question_id = question.id, "question loaded");
                self.question = Some(question);
                self.answer.clear();
                self.feedback = None;
                self.error = None;
                self.phase = QuizPhase::Question;
                None
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Validate the pending answer and start submitting it.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitRejected> {
        let question_id = self
            .question
            .as_ref()
            .map(|q| q.id)
            .ok_or(SubmitRejected::NoQuestion)?;
        if self.is_loading() {
            return Err(SubmitRejected::Busy);
        }
        if self.feedback.is_some() {
            return Err(SubmitRejected::AlreadyAnswered);
        }
        let answer = self.answer.trim();
        if answer.is_empty() {
            return Err(SubmitRejected::EmptyAnswer);
        }

        let submission = AnswerSubmission {
            question_id,
            user_answer: answer.to_string(),
        };
        self.phase = QuizPhase::Submitting;
        Ok(SubmitTicket {
            seq: self.seq.issue(),
            submission,
        })
    }

    /// Apply an answer response. Returns a redirect if the session expired.
    ///
    /// Responses for a question that is no longer displayed are dropped.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<Feedback, ApiError>,
    ) -> Option<Navigation> {
        if !self.seq.is_current(ticket.seq) || !self.is_current_question(ticket.submission.question_id)
        {
            warn!(
                seq = ticket.seq,
                question_id = ticket.submission.question_id,
                "dropping stale answer response"
            );
            return None;
        }

        match result {
            Ok(feedback) => {
                debug!(correct = feedback.is_correct, "feedback received");
                self.feedback = Some(feedback);
                self.answer.clear();
                self.error = None;
                self.phase = QuizPhase::Feedback;
                None
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Fetch a question through `api`.
    pub async fn fetch(
        &mut self,
        api: &dyn TutorApi,
        params: &QuestionParams,
    ) -> Option<Navigation> {
        let ticket = self.begin_fetch();
        let result = api.fetch_question(params).await;
        self.complete_fetch(ticket, result)
    }

    /// Submit the pending answer through `api`.
    pub async fn submit(
        &mut self,
        api: &dyn TutorApi,
    ) -> Result<Option<Navigation>, SubmitRejected> {
        let ticket = self.begin_submit()?;
        let result = api.submit_answer(ticket.submission()).await;
        Ok(self.complete_submit(ticket, result))
    }

    fn is_current_question(&self, id: QuestionId) -> bool {
        self.question.as_ref().is_some_and(|q| q.id == id)
    }

    fn fail(&mut self, err: &ApiError) -> Option<Navigation> {
        self.error = Some(err.user_message(QUIZ_FALLBACK_MESSAGE));
        self.phase = QuizPhase::Error;
        match err.class() {
            ErrorClass::Unauthorized => {
                warn!("session rejected by server");
                Some(self.session.expire())
            }
            _ => {
                warn!("quiz request failed: {err}");
                None
            }
        }
    }
}
