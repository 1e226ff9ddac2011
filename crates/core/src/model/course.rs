use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CourseKeyError {
    #[error("course key cannot be empty")]
    Empty,
}

/// Name of a course partition in the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseKey(String);

impl CourseKey {
    /// Creates a course key from trimmed input.
    ///
    /// # Errors
    ///
    /// Returns `CourseKeyError::Empty` for blank input.
    pub fn new(key: impl AsRef<str>) -> Result<Self, CourseKeyError> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            return Err(CourseKeyError::Empty);
        }
        Ok(Self(key.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CourseKey {
    type Err = CourseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CourseKey {
    type Error = CourseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CourseKey> for String {
    fn from(key: CourseKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_trimmed() {
        let key: CourseKey = "  algebra ".parse().unwrap();
        assert_eq!(key.as_str(), "algebra");
        assert_eq!(key.to_string(), "algebra");
    }

    #[test]
    fn blank_keys_are_rejected() {
        assert_eq!(CourseKey::new("   ").unwrap_err(), CourseKeyError::Empty);
    }
}
