mod course;
mod question;
mod summary;

pub use course::{CourseKey, CourseKeyError};
pub use question::{QuestionError, QuestionRecord};
pub use summary::{FinishReason, QuestionOutcome, ScoreBand, SessionSummary, SessionSummaryError};
