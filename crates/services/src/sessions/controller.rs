use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use quiz_core::Clock;
use quiz_core::model::{CourseKey, FinishReason, SessionSummary};

use super::events::{QuizEvent, QuizIntent, QuizListener};
use super::plan::{SessionBuilder, SessionOptions};
use super::service::{AdvanceOutcome, Judgement, QuizSession};
use super::timer::CountdownTick;
use crate::bank::QuestionBank;
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Active,
    Finished,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Active(QuizSession),
    Finished(SessionSummary),
}

/// Drives the Idle → Active → Finished quiz lifecycle.
///
/// Every state change is reported to the listener. Finalization happens once per
/// session no matter whether the last `advance` or the countdown gets there first.
pub struct QuizController<L> {
    bank: QuestionBank,
    options: SessionOptions,
    clock: Clock,
    rng: StdRng,
    listener: L,
    phase: Phase,
}

impl<L: QuizListener> QuizController<L> {
    #[must_use]
    pub fn new(bank: QuestionBank, options: SessionOptions, listener: L) -> Self {
        Self {
            bank,
            options,
            clock: Clock::default(),
            rng: StdRng::from_os_rng(),
            listener,
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Seed question selection for reproducible sessions.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        match self.phase {
            Phase::Idle => ControllerState::Idle,
            Phase::Active(_) => ControllerState::Active,
            Phase::Finished(_) => ControllerState::Finished,
        }
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.phase {
            Phase::Active(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        match &self.phase {
            Phase::Finished(summary) => Some(summary),
            _ => None,
        }
    }

    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Emit a `LoadError` for every course whose feed failed.
    pub fn report_load_failures(&mut self) {
        let messages: Vec<String> = self
            .bank
            .failures()
            .map(|(course, message)| match course {
                Some(course) => format!("{course}: {message}"),
                None => message.to_owned(),
            })
            .collect();
        for message in messages {
            self.listener.notify(QuizEvent::LoadError { message });
        }
    }

    /// Dispatch an inbound intent.
    ///
    /// # Errors
    ///
    /// Propagates the error of the targeted operation.
    pub fn handle(&mut self, intent: QuizIntent) -> Result<(), SessionError> {
        match intent {
            QuizIntent::Start(course) => self.start(course.as_ref()),
            QuizIntent::SubmitAnswer(raw) => self.submit_answer(&raw).map(|_| ()),
            QuizIntent::RequestHint => self.request_hint().map(|_| ()),
            QuizIntent::AdvanceToNext => self.advance(),
            QuizIntent::Restart => self.restart(),
        }
    }

    /// Draw a question set for `course` and present its first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` while a session runs,
    /// `SessionError::RestartRequired` after one finished, or the bank lookup error.
    pub fn start(&mut self, course: Option<&CourseKey>) -> Result<(), SessionError> {
        match self.phase {
            Phase::Idle => {}
            Phase::Active(_) => return Err(SessionError::AlreadyStarted),
            Phase::Finished(_) => return Err(SessionError::RestartRequired),
        }

        let questions = SessionBuilder::new(self.bank.questions(course)?)
            .with_selection(self.options.selection)
            .build_with_rng(&mut self.rng);
        let session = QuizSession::new(questions, self.clock.now(), self.options.time_limit_secs)?;
        info!(
            course = course.map_or("(default)", CourseKey::as_str),
            total = session.total(),
            time_limit_secs = ?self.options.time_limit_secs,
            "session started"
        );

        self.phase = Phase::Active(session);
        self.present_current();
        if let Some(seconds_remaining) = self.options.time_limit_secs {
            self.listener
                .notify(QuizEvent::TimerTick { seconds_remaining });
        }
        Ok(())
    }

    /// Judge an answer to the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside an active session, plus the
    /// session's own submission errors.
    pub fn submit_answer(&mut self, raw: &str) -> Result<Judgement, SessionError> {
        let Phase::Active(session) = &mut self.phase else {
            return Err(SessionError::NotActive);
        };
        let judgement = session.submit_answer(raw)?;
        debug!(correct = judgement.correct, "answer judged");
        self.listener.notify(QuizEvent::AnswerJudged {
            correct: judgement.correct,
            canonical_answer: judgement.canonical_answer.clone(),
        });
        Ok(judgement)
    }

    /// Current question's hint, if any. Only the first reveal is announced.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside an active session.
    pub fn request_hint(&mut self) -> Result<Option<String>, SessionError> {
        let Phase::Active(session) = &mut self.phase else {
            return Err(SessionError::NotActive);
        };
        let Some(hint) = session.reveal_hint()? else {
            return Ok(None);
        };
        let text = hint.text.to_owned();
        if hint.newly_revealed {
            self.listener
                .notify(QuizEvent::HintRevealed { text: text.clone() });
        }
        Ok(Some(text))
    }

    /// Present the next question, or finish after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside an active session.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        let Phase::Active(session) = &mut self.phase else {
            return Err(SessionError::NotActive);
        };
        match session.advance(self.clock.now())? {
            AdvanceOutcome::Next => {
                self.present_current();
                Ok(())
            }
            AdvanceOutcome::Exhausted => self.finalize(FinishReason::Exhausted),
        }
    }

    /// Drop the finished session and return to idle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` unless a session has finished.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::Finished(_)) {
            return Err(SessionError::NotFinished);
        }
        self.phase = Phase::Idle;
        Ok(())
    }

    /// One elapsed second. Ticks outside an active timed session are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session summary cannot be built on expiry.
    pub fn on_timer_tick(&mut self) -> Result<CountdownTick, SessionError> {
        let Phase::Active(session) = &mut self.phase else {
            return Ok(CountdownTick::Cancelled);
        };
        let tick = session.tick();
        match tick {
            CountdownTick::Remaining(seconds_remaining) => {
                self.listener
                    .notify(QuizEvent::TimerTick { seconds_remaining });
            }
            CountdownTick::Expired => {
                self.listener
                    .notify(QuizEvent::TimerTick { seconds_remaining: 0 });
                self.on_timer_expired()?;
            }
            CountdownTick::Cancelled => {}
        }
        Ok(tick)
    }

    /// Force the active session to finish. Returns false if none was active.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session summary cannot be built.
    pub fn on_timer_expired(&mut self) -> Result<bool, SessionError> {
        if !matches!(self.phase, Phase::Active(_)) {
            return Ok(false);
        }
        debug!("countdown expired");
        self.finalize(FinishReason::TimeExpired)?;
        Ok(true)
    }

    fn present_current(&mut self) {
        let Phase::Active(session) = &self.phase else {
            return;
        };
        let Some(question) = session.current_question() else {
            return;
        };
        self.listener.notify(QuizEvent::QuestionPresented {
            index: session.position(),
            total: session.total(),
            prompt: question.prompt().to_owned(),
            answer_format_hint: question.answer_format().map(ToOwned::to_owned),
        });
    }

    fn finalize(&mut self, reason: FinishReason) -> Result<(), SessionError> {
        let Phase::Active(session) = &mut self.phase else {
            return Ok(());
        };
        session.finish(self.clock.now(), reason);
        let summary = session.build_summary()?;
        info!(
            score = summary.score(),
            total = summary.total(),
            reason = ?summary.reason(),
            "session finished"
        );

        self.listener.notify(QuizEvent::SessionFinished {
            summary: summary.clone(),
        });
        self.phase = Phase::Finished(summary);
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::Selection;
    use quiz_core::model::QuestionRecord;
    use quiz_core::time::fixed_clock;

    fn bank(n: usize) -> QuestionBank {
        QuestionBank::from_questions(
            (1..=n)
                .map(|i| {
                    QuestionRecord::new(format!("{i}+{i}=?"), (i * 2).to_string())
                        .unwrap()
                        .with_hint(Some("double it"))
                        .with_answer_format(Some("integer"))
                })
                .collect(),
        )
    }

    fn controller(n: usize, options: SessionOptions) -> QuizController<Vec<QuizEvent>> {
        QuizController::new(bank(n), options, Vec::new())
            .with_clock(fixed_clock())
            .with_seed(1)
    }

    fn finished_count(events: &[QuizEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, QuizEvent::SessionFinished { .. }))
            .count()
    }

    #[test]
    fn start_presents_first_question() {
        let mut quiz = controller(3, SessionOptions::default());
        quiz.start(None).unwrap();

        assert_eq!(quiz.state(), ControllerState::Active);
        assert_eq!(
            quiz.listener()[0],
            QuizEvent::QuestionPresented {
                index: 0,
                total: 3,
                prompt: "1+1=?".into(),
                answer_format_hint: Some("integer".into()),
            }
        );
        assert_eq!(quiz.start(None).unwrap_err(), SessionError::AlreadyStarted);
    }

    #[test]
    fn intents_outside_active_session_are_rejected() {
        let mut quiz = controller(1, SessionOptions::default());
        assert_eq!(quiz.submit_answer("2").unwrap_err(), SessionError::NotActive);
        assert_eq!(quiz.advance().unwrap_err(), SessionError::NotActive);
        assert_eq!(quiz.request_hint().unwrap_err(), SessionError::NotActive);
        assert_eq!(quiz.restart().unwrap_err(), SessionError::NotFinished);
        assert_eq!(quiz.on_timer_tick().unwrap(), CountdownTick::Cancelled);
        assert!(quiz.listener().is_empty());
    }

    #[test]
    fn full_run_reports_summary_once() {
        let mut quiz = controller(2, SessionOptions::default());
        quiz.handle(QuizIntent::Start(None)).unwrap();
        quiz.handle(QuizIntent::SubmitAnswer(" 2 ".into())).unwrap();
        quiz.handle(QuizIntent::AdvanceToNext).unwrap();
        quiz.handle(QuizIntent::SubmitAnswer("5".into())).unwrap();
        quiz.handle(QuizIntent::AdvanceToNext).unwrap();

        assert_eq!(quiz.state(), ControllerState::Finished);
        let summary = quiz.summary().unwrap();
        assert_eq!(summary.score(), 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.reason(), FinishReason::Exhausted);

        assert_eq!(
            quiz.submit_answer("4").unwrap_err(),
            SessionError::NotActive
        );
        assert_eq!(quiz.on_timer_expired().unwrap(), false);
        assert_eq!(finished_count(quiz.listener()), 1);
        assert!(quiz.listener().contains(&QuizEvent::AnswerJudged {
            correct: false,
            canonical_answer: "4".into(),
        }));
    }

    #[test]
    fn hint_is_announced_once() {
        let mut quiz = controller(1, SessionOptions::default());
        quiz.start(None).unwrap();
        assert_eq!(quiz.request_hint().unwrap().as_deref(), Some("double it"));
        assert_eq!(quiz.request_hint().unwrap().as_deref(), Some("double it"));

        let hints = quiz
            .listener()
            .iter()
            .filter(|e| matches!(e, QuizEvent::HintRevealed { .. }))
            .count();
        assert_eq!(hints, 1);
    }

    #[test]
    fn timer_expiry_finishes_with_zero_score() {
        let options = SessionOptions {
            time_limit_secs: Some(5),
            ..SessionOptions::default()
        };
        let mut quiz = controller(3, options);
        quiz.start(None).unwrap();

        for _ in 0..4 {
            assert!(matches!(
                quiz.on_timer_tick().unwrap(),
                CountdownTick::Remaining(_)
            ));
        }
        assert_eq!(quiz.on_timer_tick().unwrap(), CountdownTick::Expired);
        assert_eq!(quiz.state(), ControllerState::Finished);

        let summary = quiz.summary().unwrap();
        assert_eq!(summary.score(), 0);
        assert_eq!(summary.reason(), FinishReason::TimeExpired);

        assert_eq!(quiz.on_timer_tick().unwrap(), CountdownTick::Cancelled);
        assert_eq!(finished_count(quiz.listener()), 1);
        assert!(quiz.listener().contains(&QuizEvent::TimerTick {
            seconds_remaining: 0
        }));
    }

    #[test]
    fn exhausting_questions_cancels_timer() {
        let options = SessionOptions {
            time_limit_secs: Some(60),
            ..SessionOptions::default()
        };
        let mut quiz = controller(1, options);
        quiz.start(None).unwrap();
        quiz.on_timer_tick().unwrap();
        quiz.advance().unwrap();

        assert_eq!(quiz.on_timer_tick().unwrap(), CountdownTick::Cancelled);
        assert_eq!(finished_count(quiz.listener()), 1);
    }

    fn drawn_prompts(quiz: &QuizController<Vec<QuizEvent>>) -> Vec<String> {
        quiz.session()
            .unwrap()
            .questions()
            .iter()
            .map(|q| q.prompt().to_owned())
            .collect()
    }

    fn play_through(quiz: &mut QuizController<Vec<QuizEvent>>) {
        while quiz.state() == ControllerState::Active {
            quiz.advance().unwrap();
        }
    }

    #[test]
    fn restart_discards_session_and_redraws() {
        let options = SessionOptions {
            selection: Selection::Sample(3),
            ..SessionOptions::default()
        };
        let mut quiz = controller(10, options);
        quiz.start(None).unwrap();
        let first = drawn_prompts(&quiz);
        play_through(&mut quiz);
        assert_eq!(quiz.state(), ControllerState::Finished);

        assert_eq!(quiz.start(None).unwrap_err(), SessionError::RestartRequired);
        assert_eq!(quiz.state(), ControllerState::Finished);

        quiz.restart().unwrap();
        assert_eq!(quiz.state(), ControllerState::Idle);
        assert!(quiz.session().is_none());
        assert!(quiz.summary().is_none());

        quiz.start(None).unwrap();
        let session = quiz.session().unwrap();
        assert_eq!(session.total(), 3);
        assert_eq!(session.position(), 0);
        assert_eq!(session.score(), 0);
        assert!(session.responses().is_empty());

        // The rng is not reseeded between sessions, so later draws diverge.
        let mut redraws = vec![drawn_prompts(&quiz)];
        for _ in 0..4 {
            play_through(&mut quiz);
            quiz.restart().unwrap();
            quiz.start(None).unwrap();
            redraws.push(drawn_prompts(&quiz));
        }
        assert!(redraws.iter().all(|draw| draw.len() == 3));
        assert!(redraws.iter().any(|draw| *draw != first));
    }

    #[test]
    fn failed_courses_are_reported() {
        let mut bank = QuestionBank::new();
        bank.insert_failed(None, "feed contains no usable questions");
        let mut quiz = QuizController::new(bank, SessionOptions::default(), Vec::new());
        quiz.report_load_failures();

        assert_eq!(
            quiz.listener().as_slice(),
            &[QuizEvent::LoadError {
                message: "feed contains no usable questions".into()
            }]
        );
        assert!(matches!(
            quiz.start(None),
            Err(SessionError::CourseUnavailable(_))
        ));
        assert_eq!(quiz.state(), ControllerState::Idle);
    }
}
