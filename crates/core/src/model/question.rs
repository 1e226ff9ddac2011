use serde::Serialize;
use thiserror::Error;

use crate::matcher::AcceptedAnswers;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("accepted answer needs at least one non-empty alternative")]
    EmptyAnswer,
}

//
// ─── QUESTION RECORD ──────────────────────────────────────────────────────────
//

/// One row of a question feed.
///
/// The prompt may carry light math markup (`<=`, `>=`, `^2`); see
/// [`crate::markup::format_math`]. Records are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRecord {
    prompt: String,
    accepted: AcceptedAnswers,
    hint: Option<String>,
    answer_format: Option<String>,
    category: Option<String>,
}

impl QuestionRecord {
    /// Builds a record from a prompt and an accepted-answer field.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` for a blank prompt and
    /// `QuestionError::EmptyAnswer` when the accepted field has no usable alternative.
    pub fn new(
        prompt: impl Into<String>,
        accepted_answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let accepted = AcceptedAnswers::parse(accepted_answer)?;

        Ok(Self {
            prompt,
            accepted,
            hint: None,
            answer_format: None,
            category: None,
        })
    }

    #[must_use]
    pub fn with_hint(mut self, hint: Option<&str>) -> Self {
        self.hint = non_blank(hint);
        self
    }

    #[must_use]
    pub fn with_answer_format(mut self, format: Option<&str>) -> Self {
        self.answer_format = non_blank(format);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<&str>) -> Self {
        self.category = non_blank(category);
        self
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn accepted(&self) -> &AcceptedAnswers {
        &self.accepted
    }

    /// Answer displayed after an incorrect response.
    #[must_use]
    pub fn canonical_answer(&self) -> &str {
        self.accepted.canonical()
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    #[must_use]
    pub fn answer_format(&self) -> Option<&str> {
        self.answer_format.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, raw: &str) -> bool {
        self.accepted.matches(raw)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(ToOwned::to_owned)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_requires_prompt_and_answer() {
        assert_eq!(
            QuestionRecord::new("  ", "4").unwrap_err(),
            QuestionError::EmptyPrompt
        );
        assert_eq!(
            QuestionRecord::new("2+2=?", " | ").unwrap_err(),
            QuestionError::EmptyAnswer
        );
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let q = QuestionRecord::new("2+2=?", "4")
            .unwrap()
            .with_hint(Some("  "))
            .with_answer_format(Some("integer"))
            .with_category(None);

        assert_eq!(q.hint(), None);
        assert_eq!(q.answer_format(), Some("integer"));
        assert_eq!(q.category(), None);
    }

    #[test]
    fn record_judges_answers() {
        let q = QuestionRecord::new("x^2=1", "x=1|x=-1").unwrap();
        assert!(q.is_correct("x = -1"));
        assert!(!q.is_correct("x=0"));
        assert_eq!(q.canonical_answer(), "x=1");
    }
}
