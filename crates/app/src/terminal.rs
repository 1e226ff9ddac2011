use quiz_core::markup::{MarkupStyle, format_math};
use quiz_core::model::{CourseKey, SessionSummary};
use services::{QuizEvent, QuizIntent, QuizListener, SessionError, SessionProgress};

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(QuizIntent),
    Help,
    Quit,
    Blank,
}

/// Lines starting with `:` are commands; anything else is an answer.
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Blank;
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return Command::Intent(QuizIntent::SubmitAnswer(line.to_owned()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    match name {
        "s" | "start" => {
            let course = parts.next().and_then(|raw| CourseKey::new(raw).ok());
            Command::Intent(QuizIntent::Start(course))
        }
        "h" | "hint" => Command::Intent(QuizIntent::RequestHint),
        "n" | "next" => Command::Intent(QuizIntent::AdvanceToNext),
        "r" | "restart" => Command::Intent(QuizIntent::Restart),
        "q" | "quit" | "exit" => Command::Quit,
        _ => Command::Help,
    }
}

pub fn print_help() {
    println!("Commands:");
    println!("  :start [course]  begin a quiz (course name when several are loaded)");
    println!("  :hint            show the hint for the current question");
    println!("  :next            go to the next question");
    println!("  :restart         back to the start screen after the results");
    println!("  :quit            leave");
    println!("Anything else is submitted as your answer.");
}

/// Renders controller notifications on stdout.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    auto_advance: bool,
}

impl TerminalPresenter {
    #[must_use]
    pub fn new(auto_advance: bool) -> Self {
        Self { auto_advance }
    }

    pub fn show_error(&self, err: &SessionError) {
        match err {
            SessionError::NotActive => println!("No quiz is running. Type :start to begin."),
            SessionError::AlreadyStarted => println!("A quiz is already running."),
            SessionError::NotFinished => println!("Finish the current quiz first."),
            SessionError::RestartRequired => println!("Type :restart first."),
            SessionError::AlreadyAnswered => println!("Already answered. Type :next to continue."),
            SessionError::BlankAnswer => {}
            other => println!("{other}"),
        }
    }

    pub fn show_progress(&self, progress: &SessionProgress) {
        println!("{}", progress_line(progress));
    }

    pub fn show_no_hint(&self) {
        println!("There is no hint for this question.");
    }

    fn show_summary(summary: &SessionSummary) {
        println!();
        println!("Results: {} / {}", summary.score(), summary.total());
        println!("{}", summary.band().message());
        for (i, outcome) in summary.outcomes().iter().enumerate() {
            let mark = if outcome.correct { "ok" } else { "x " };
            let given = outcome.given_answer.as_deref().unwrap_or("(no answer)");
            println!(
                "  [{mark}] {}. {}  your answer: {}  expected: {}{}",
                i + 1,
                format_math(&outcome.prompt, MarkupStyle::Plain),
                given.trim(),
                outcome.canonical_answer,
                if outcome.hint_shown { "  (hint used)" } else { "" }
            );
        }
        println!("Type :restart to play again or :quit to leave.");
    }
}

/// Running score and position, e.g. `Score 2/3 | question 3 of 10`.
pub fn progress_line(progress: &SessionProgress) -> String {
    let mut line = format!(
        "Score {}/{} | question {} of {}",
        progress.score, progress.answered, progress.presented, progress.total
    );
    if let Some(secs) = progress.seconds_remaining {
        line.push_str(&format!(" | {}:{:02} left", secs / 60, secs % 60));
    }
    line
}

impl QuizListener for TerminalPresenter {
    fn notify(&mut self, event: QuizEvent) {
        match event {
            QuizEvent::QuestionPresented {
                index,
                total,
                prompt,
                answer_format_hint,
            } => {
                println!();
                println!("Question {} / {total}", index + 1);
                println!("{}", format_math(&prompt, MarkupStyle::Plain));
                if let Some(format) = answer_format_hint {
                    println!("Answer format: {}", format_math(&format, MarkupStyle::Plain));
                }
            }
            QuizEvent::AnswerJudged {
                correct,
                canonical_answer,
            } => {
                if correct {
                    println!("Correct!");
                } else {
                    println!("Incorrect... the answer is {canonical_answer}");
                }
                if !self.auto_advance {
                    println!("Type :next to continue.");
                }
            }
            QuizEvent::HintRevealed { text } => println!("Hint: {text}"),
            QuizEvent::TimerTick { seconds_remaining } => {
                if seconds_remaining % 60 == 0 || seconds_remaining == 30 || seconds_remaining <= 10
                {
                    println!(
                        "[time left {}:{:02}]",
                        seconds_remaining / 60,
                        seconds_remaining % 60
                    );
                }
            }
            QuizEvent::SessionFinished { summary } => Self::show_summary(&summary),
            QuizEvent::LoadError { message } => {
                eprintln!("Failed to load questions: {message}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_answers() {
        assert_eq!(
            parse_command("  x = 1 "),
            Command::Intent(QuizIntent::SubmitAnswer("  x = 1 ".into()))
        );
        assert_eq!(parse_command("   "), Command::Blank);
    }

    #[test]
    fn colon_commands_map_to_intents() {
        assert_eq!(parse_command(":next"), Command::Intent(QuizIntent::AdvanceToNext));
        assert_eq!(parse_command(":h"), Command::Intent(QuizIntent::RequestHint));
        assert_eq!(parse_command(":start"), Command::Intent(QuizIntent::Start(None)));
        assert_eq!(
            parse_command(":start algebra"),
            Command::Intent(QuizIntent::Start(Some(CourseKey::new("algebra").unwrap())))
        );
        assert_eq!(parse_command(":q"), Command::Quit);
        assert_eq!(parse_command(":what"), Command::Help);
    }

    #[test]
    fn progress_line_shows_score_and_time() {
        let mut progress = SessionProgress {
            total: 10,
            presented: 3,
            answered: 3,
            score: 2,
            seconds_remaining: None,
            is_complete: false,
        };
        assert_eq!(progress_line(&progress), "Score 2/3 | question 3 of 10");

        progress.seconds_remaining = Some(75);
        assert_eq!(
            progress_line(&progress),
            "Score 2/3 | question 3 of 10 | 1:15 left"
        );
    }
}
