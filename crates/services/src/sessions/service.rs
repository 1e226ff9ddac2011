use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{FinishReason, QuestionOutcome, QuestionRecord, SessionSummary};

use super::progress::SessionProgress;
use super::timer::{Countdown, CountdownTick};
use crate::error::SessionError;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// A recorded answer to one question of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub question_index: usize,
    pub raw_answer: String,
    pub correct: bool,
}

/// Verdict on a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgement {
    pub correct: bool,
    pub canonical_answer: String,
}

/// Hint lookup for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint<'a> {
    pub text: &'a str,
    /// False when this hint was already revealed for the current question.
    pub newly_revealed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Another question is now current.
    Next,
    /// The last question was passed; the session is complete.
    Exhausted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state of one quiz run.
///
/// Steps through the question set in order. Answering and advancing are separate
/// steps; the session completes when the user advances past the last question or
/// the countdown expires.
pub struct QuizSession {
    questions: Vec<QuestionRecord>,
    current: usize,
    responses: Vec<SessionResponse>,
    hints_shown: Vec<bool>,
    score: usize,
    countdown: Option<Countdown>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    finish_reason: Option<FinishReason>,
}

impl QuizSession {
    /// Start a session over `questions`, counting down from `time_limit_secs` if given.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        questions: Vec<QuestionRecord>,
        started_at: DateTime<Utc>,
        time_limit_secs: Option<u32>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            hints_shown: vec![false; questions.len()],
            questions,
            current: 0,
            responses: Vec::new(),
            score: 0,
            countdown: time_limit_secs.map(Countdown::new),
            started_at,
            completed_at: None,
            finish_reason: None,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// 0-based cursor; equals `total()` once the set is exhausted.
    #[must_use]
    pub fn position(&self) -> usize {
        self.current
    }

    /// Number of questions shown to the user so far.
    #[must_use]
    pub fn presented(&self) -> usize {
        (self.current + 1).min(self.questions.len())
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn responses(&self) -> &[SessionResponse] {
        &self.responses
    }

    #[must_use]
    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.current)
    }

    /// Whether the current question already has a response.
    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.responses
            .last()
            .is_some_and(|r| r.question_index == self.current)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total(),
            presented: self.presented(),
            answered: self.responses.len(),
            score: self.score,
            seconds_remaining: self.countdown.map(|c| c.remaining()),
            is_complete: self.is_complete(),
        }
    }

    /// Judge `raw` against the current question and record the response.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` once complete, `SessionError::BlankAnswer`
    /// for empty input, and `SessionError::AlreadyAnswered` on a second submission.
    pub fn submit_answer(&mut self, raw: &str) -> Result<Judgement, SessionError> {
        if raw.is_empty() {
            return Err(SessionError::BlankAnswer);
        }
        if self.is_current_answered() {
            return Err(SessionError::AlreadyAnswered);
        }
        let question = self.current_question().ok_or(SessionError::NotActive)?;

        let correct = question.is_correct(raw);
        let judgement = Judgement {
            correct,
            canonical_answer: question.canonical_answer().to_owned(),
        };

        if correct {
            self.score += 1;
        }
        self.responses.push(SessionResponse {
            question_index: self.current,
            raw_answer: raw.to_owned(),
            correct,
        });
        Ok(judgement)
    }

    /// Reveal the current question's hint, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` once complete.
    pub fn reveal_hint(&mut self) -> Result<Option<Hint<'_>>, SessionError> {
        if self.is_complete() {
            return Err(SessionError::NotActive);
        }
        let Some(text) = self.questions.get(self.current).and_then(QuestionRecord::hint) else {
            return Ok(None);
        };
        let newly_revealed = !self.hints_shown[self.current];
        self.hints_shown[self.current] = true;
        Ok(Some(Hint {
            text,
            newly_revealed,
        }))
    }

    /// Move past the current question, completing the session after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` once complete.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Result<AdvanceOutcome, SessionError> {
        if self.is_complete() {
            return Err(SessionError::NotActive);
        }
        self.current += 1;
        if self.current >= self.questions.len() {
            self.finish(at, FinishReason::Exhausted);
            return Ok(AdvanceOutcome::Exhausted);
        }
        Ok(AdvanceOutcome::Next)
    }

    /// Count one second off the countdown. Does not complete the session by
    /// itself; the caller finishes it on `CountdownTick::Expired`.
    pub fn tick(&mut self) -> CountdownTick {
        if self.is_complete() {
            return CountdownTick::Cancelled;
        }
        self.countdown
            .as_mut()
            .map_or(CountdownTick::Cancelled, Countdown::tick)
    }

    /// Mark the session complete. Cancels the countdown first.
    ///
    /// Returns false if the session was already complete.
    pub fn finish(&mut self, at: DateTime<Utc>, reason: FinishReason) -> bool {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.cancel();
        }
        if self.is_complete() {
            return false;
        }
        self.completed_at = Some(at.max(self.started_at));
        self.finish_reason = Some(reason);
        true
    }

    /// Per-question breakdown of a completed session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` if the session is still running.
    pub fn build_summary(&self) -> Result<SessionSummary, SessionError> {
        let (Some(completed_at), Some(reason)) = (self.completed_at, self.finish_reason) else {
            return Err(SessionError::NotFinished);
        };

        let outcomes = self
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let response = self.responses.iter().find(|r| r.question_index == index);
                QuestionOutcome {
                    prompt: question.prompt().to_owned(),
                    canonical_answer: question.canonical_answer().to_owned(),
                    given_answer: response.map(|r| r.raw_answer.clone()),
                    correct: response.is_some_and(|r| r.correct),
                    hint_shown: self.hints_shown[index],
                }
            })
            .collect();

        Ok(SessionSummary::new(
            self.started_at,
            completed_at,
            reason,
            outcomes,
        )?)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("responses_len", &self.responses.len())
            .field("countdown", &self.countdown)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
