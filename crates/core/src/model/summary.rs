use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("a session summary needs at least one question")]
    NoQuestions,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinishReason {
    /// Every question in the set was presented and the user advanced past the last.
    Exhausted,
    /// The countdown reached zero first.
    TimeExpired,
}

/// Coarse grading of a final score, used for the results message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Perfect,
    High,
    Fair,
    Low,
}

impl ScoreBand {
    /// Bands: all correct, at least 70%, at least 40%, anything lower.
    #[must_use]
    pub fn from_score(score: usize, total: usize) -> Self {
        if total == 0 {
            return Self::Low;
        }
        if score >= total {
            Self::Perfect
        } else if score * 10 >= total * 7 {
            Self::High
        } else if score * 10 >= total * 4 {
            Self::Fair
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ScoreBand::Perfect => "Outstanding! Every answer was correct!",
            ScoreBand::High => "Congratulations, that's a high score!",
            ScoreBand::Fair => "Nice effort!",
            ScoreBand::Low => "Keep practicing!",
        }
    }
}

/// Result for one question of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOutcome {
    pub prompt: String,
    pub canonical_answer: String,
    /// `None` when the question was skipped or never reached.
    pub given_answer: Option<String>,
    pub correct: bool,
    pub hint_shown: bool,
}

/// Aggregate result of a finished quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    reason: FinishReason,
    outcomes: Vec<QuestionOutcome>,
}

impl SessionSummary {
    /// Builds a summary with one outcome per question of the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `SessionSummaryError::NoQuestions` for an empty outcome list.
    pub fn new(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        reason: FinishReason,
        outcomes: Vec<QuestionOutcome>,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if outcomes.is_empty() {
            return Err(SessionSummaryError::NoQuestions);
        }
        Ok(Self {
            started_at,
            completed_at,
            reason,
            outcomes,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn reason(&self) -> FinishReason {
        self.reason
    }

    #[must_use]
    pub fn outcomes(&self) -> &[QuestionOutcome] {
        &self.outcomes
    }

    /// Number of correct answers.
    #[must_use]
    pub fn score(&self) -> usize {
        self.outcomes.iter().filter(|o| o.correct).count()
    }

    /// Number of questions in the session, answered or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.given_answer.is_some())
            .count()
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score(), self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn outcome(correct: bool, given: Option<&str>) -> QuestionOutcome {
        QuestionOutcome {
            prompt: "Q".into(),
            canonical_answer: "A".into(),
            given_answer: given.map(Into::into),
            correct,
            hint_shown: false,
        }
    }

    #[test]
    fn summary_counts_score_and_answers() {
        let now = fixed_now();
        let outcomes = vec![
            outcome(true, Some("A")),
            outcome(false, Some("B")),
            outcome(false, None),
        ];
        let summary = SessionSummary::new(now, now, FinishReason::TimeExpired, outcomes).unwrap();

        assert_eq!(summary.score(), 1);
        assert_eq!(summary.answered(), 2);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.band(), ScoreBand::Low);
    }

    #[test]
    fn summary_rejects_inverted_time_range() {
        let now = fixed_now();
        let err = SessionSummary::new(
            now,
            now - chrono::Duration::seconds(1),
            FinishReason::Exhausted,
            vec![outcome(true, Some("A"))],
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn score_bands_follow_thresholds() {
        assert_eq!(ScoreBand::from_score(10, 10), ScoreBand::Perfect);
        assert_eq!(ScoreBand::from_score(7, 10), ScoreBand::High);
        assert_eq!(ScoreBand::from_score(6, 10), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(4, 10), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(3, 10), ScoreBand::Low);
        assert_eq!(ScoreBand::from_score(0, 0), ScoreBand::Low);
    }
}
