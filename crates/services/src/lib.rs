#![forbid(unsafe_code)]

pub mod bank;
pub mod config;
pub mod error;
pub mod feed_service;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use bank::{CourseFeed, QuestionBank};
pub use config::QuizConfig;
pub use error::{ConfigError, FeedLoadError, SessionError};
pub use feed_service::{FeedService, FeedSource, FeedSpec, HttpFeedSource, StaticFeedSource};
pub use sessions::{
    AdvanceOutcome, ControllerState, Countdown, CountdownTick, Judgement, QuizController,
    QuizEvent, QuizIntent, QuizListener, QuizSession, Selection, SessionOptions, SessionProgress,
};
