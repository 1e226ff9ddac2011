use std::collections::BTreeMap;

use quiz_core::model::{CourseKey, QuestionRecord};

use crate::error::SessionError;

/// Load state of one course partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseFeed {
    Loaded(Vec<QuestionRecord>),
    /// Terminal for this load; the user has to reload to recover.
    Failed(String),
}

/// Questions keyed by optional course. `None` is the default, single-feed course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    courses: BTreeMap<Option<CourseKey>, CourseFeed>,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank holding a single default course.
    #[must_use]
    pub fn from_questions(questions: Vec<QuestionRecord>) -> Self {
        let mut bank = Self::new();
        bank.insert_loaded(None, questions);
        bank
    }

    pub fn insert_loaded(&mut self, course: Option<CourseKey>, questions: Vec<QuestionRecord>) {
        self.courses.insert(course, CourseFeed::Loaded(questions));
    }

    pub fn insert_failed(&mut self, course: Option<CourseKey>, message: impl Into<String>) {
        self.courses
            .insert(course, CourseFeed::Failed(message.into()));
    }

    #[must_use]
    pub fn course(&self, course: Option<&CourseKey>) -> Option<&CourseFeed> {
        self.courses.get(&course.cloned())
    }

    /// Questions for a course, ready to start a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownCourse` if the course was never configured,
    /// `SessionError::CourseUnavailable` if its feed failed to load, and
    /// `SessionError::Empty` if it holds no questions.
    pub fn questions(&self, course: Option<&CourseKey>) -> Result<&[QuestionRecord], SessionError> {
        match self.course(course) {
            None => Err(SessionError::UnknownCourse(
                course.map_or_else(|| "(default)".to_owned(), ToString::to_string),
            )),
            Some(CourseFeed::Failed(message)) => Err(SessionError::CourseUnavailable(message.clone())),
            Some(CourseFeed::Loaded(questions)) if questions.is_empty() => Err(SessionError::Empty),
            Some(CourseFeed::Loaded(questions)) => Ok(questions.as_slice()),
        }
    }

    /// Courses whose feed loaded successfully, with their question counts.
    pub fn available(&self) -> impl Iterator<Item = (Option<&CourseKey>, usize)> {
        self.courses.iter().filter_map(|(key, feed)| match feed {
            CourseFeed::Loaded(questions) => Some((key.as_ref(), questions.len())),
            CourseFeed::Failed(_) => None,
        })
    }

    /// Courses whose feed failed, with the failure message.
    pub fn failures(&self) -> impl Iterator<Item = (Option<&CourseKey>, &str)> {
        self.courses.iter().filter_map(|(key, feed)| match feed {
            CourseFeed::Failed(message) => Some((key.as_ref(), message.as_str())),
            CourseFeed::Loaded(_) => None,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available().all(|(_, count)| count == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(prompt: &str) -> QuestionRecord {
        QuestionRecord::new(prompt, "A").unwrap()
    }

    #[test]
    fn default_course_is_addressed_with_none() {
        let bank = QuestionBank::from_questions(vec![question("Q1"), question("Q2")]);
        assert_eq!(bank.questions(None).unwrap().len(), 2);
        assert!(!bank.is_empty());
    }

    #[test]
    fn course_lookup_reports_each_failure_kind() {
        let algebra = CourseKey::new("algebra").unwrap();
        let geometry = CourseKey::new("geometry").unwrap();
        let mut bank = QuestionBank::new();
        bank.insert_loaded(Some(algebra.clone()), vec![question("Q")]);
        bank.insert_failed(Some(geometry.clone()), "feed request failed with status 404");
        bank.insert_loaded(None, Vec::new());

        assert_eq!(bank.questions(Some(&algebra)).unwrap().len(), 1);
        assert!(matches!(
            bank.questions(Some(&geometry)),
            Err(SessionError::CourseUnavailable(_))
        ));
        assert!(matches!(bank.questions(None), Err(SessionError::Empty)));

        let unknown = CourseKey::new("history").unwrap();
        assert_eq!(
            bank.questions(Some(&unknown)).unwrap_err(),
            SessionError::UnknownCourse("history".into())
        );
        assert_eq!(bank.failures().count(), 1);
        assert_eq!(bank.available().count(), 2);
    }

    #[test]
    fn bank_without_loaded_questions_is_empty() {
        let mut bank = QuestionBank::new();
        bank.insert_failed(None, "down");
        assert!(bank.is_empty());
    }
}
