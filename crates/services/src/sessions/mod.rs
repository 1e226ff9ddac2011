mod controller;
mod events;
mod plan;
mod progress;
mod service;
mod timer;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{ControllerState, QuizController};
pub use events::{QuizEvent, QuizIntent, QuizListener};
pub use plan::{Selection, SessionBuilder, SessionOptions};
pub use progress::SessionProgress;
pub use service::{AdvanceOutcome, Hint, Judgement, QuizSession, SessionResponse};
pub use timer::{Countdown, CountdownTick};
