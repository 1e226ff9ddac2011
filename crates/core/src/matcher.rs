//! Free-text answer matching.
//!
//! An accepted-answer field holds one or more alternatives separated by `|`.
//! A response is correct when, with all whitespace removed, it equals one of
//! the alternatives with all whitespace removed. Nothing else is forgiven:
//! case differs, `1/2` is not `0.5`, and expressions are never evaluated.

use serde::Serialize;

use crate::model::QuestionError;

/// Separator between alternatives in an accepted-answer field.
pub const ALTERNATIVE_SEPARATOR: char = '|';

/// Strips every whitespace character from `s`.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Returns true when `raw` matches any alternative of `accepted`.
#[must_use]
pub fn matches(raw: &str, accepted: &str) -> bool {
    let candidate = normalize(raw);
    accepted
        .split(ALTERNATIVE_SEPARATOR)
        .any(|alt| normalize(alt) == candidate)
}

/// A validated accepted-answer field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AcceptedAnswers(String);

impl AcceptedAnswers {
    /// Parses an accepted-answer field.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyAnswer` unless at least one alternative is
    /// non-empty after normalization.
    pub fn parse(raw: impl Into<String>) -> Result<Self, QuestionError> {
        let raw = raw.into();
        let has_alternative = raw
            .split(ALTERNATIVE_SEPARATOR)
            .any(|alt| !normalize(alt).is_empty());
        if !has_alternative {
            return Err(QuestionError::EmptyAnswer);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn alternatives(&self) -> impl Iterator<Item = &str> {
        self.0.split(ALTERNATIVE_SEPARATOR)
    }

    /// The first alternative, shown to the user after a wrong answer.
    #[must_use]
    pub fn canonical(&self) -> &str {
        self.alternatives().next().unwrap_or_default().trim()
    }

    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        matches(raw, &self.0)
    }
}
