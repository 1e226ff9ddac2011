use quiz_core::model::{CourseKey, SessionSummary};

/// User intents forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizIntent {
    Start(Option<CourseKey>),
    SubmitAnswer(String),
    RequestHint,
    AdvanceToNext,
    Restart,
}

/// Notifications emitted by the controller for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// `index` is 0-based.
    QuestionPresented {
        index: usize,
        total: usize,
        prompt: String,
        answer_format_hint: Option<String>,
    },
    AnswerJudged {
        correct: bool,
        canonical_answer: String,
    },
    HintRevealed {
        text: String,
    },
    TimerTick {
        seconds_remaining: u32,
    },
    SessionFinished {
        summary: SessionSummary,
    },
    LoadError {
        message: String,
    },
}

/// Receiver of controller notifications.
pub trait QuizListener {
    fn notify(&mut self, event: QuizEvent);
}

impl QuizListener for Vec<QuizEvent> {
    fn notify(&mut self, event: QuizEvent) {
        self.push(event);
    }
}

impl<L: QuizListener + ?Sized> QuizListener for &mut L {
    fn notify(&mut self, event: QuizEvent) {
        (**self).notify(event);
    }
}
