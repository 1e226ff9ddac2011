//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::feed::FeedError;
use quiz_core::model::{CourseKeyError, SessionSummaryError};

/// Errors emitted while fetching and parsing a question feed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedLoadError {
    #[error("feed is unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("feed request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Errors emitted by the session controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no session is active")]
    NotActive,
    #[error("session has not finished")]
    NotFinished,
    #[error("a session is already running")]
    AlreadyStarted,
    #[error("session has finished; restart before starting another")]
    RestartRequired,
    #[error("current question was already answered")]
    AlreadyAnswered,
    #[error("answer cannot be empty")]
    BlankAnswer,
    #[error("no questions available for session")]
    Empty,
    #[error("unknown course: {0}")]
    UnknownCourse(String),
    #[error("course is unavailable: {0}")]
    CourseUnavailable(String),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}

/// Errors emitted while reading or validating configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {raw}")]
    InvalidValue { key: &'static str, raw: String },
    #[error("no feed url configured")]
    MissingFeed,
    #[error("sample size must be > 0")]
    ZeroSampleSize,
    #[error("time limit must be > 0")]
    ZeroTimeLimit,
    #[error(transparent)]
    CourseKey(#[from] CourseKeyError),
}
