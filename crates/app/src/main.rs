mod terminal;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use services::{
    ControllerState, FeedService, QuizConfig, QuizController, QuizIntent, SessionError,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terminal::{Command as Input, TerminalPresenter, parse_command, print_help};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidFormat { raw: String },
    InvalidCourse { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidFormat { raw } => write!(f, "invalid --format value: {raw}"),
            ArgsError::InvalidCourse { raw } => {
                write!(f, "invalid --course value: {raw} (expected name=url)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn require_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play  [options]   # interactive quiz (default)");
    eprintln!("  cargo run -p app -- check [options]   # load feeds and report question counts");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>         TOML config file");
    eprintln!("  --feed-url <url>        feed for the default course");
    eprintln!("  --format <tsv|csv>      feed format (inferred from output= by default)");
    eprintln!("  --course <name=url>     additional named course, repeatable");
    eprintln!("  --sample-size <n>       questions drawn per session");
    eprintln!("  --time-limit <secs>     countdown per session");
    eprintln!("  --min-questions <n>     reject feeds with fewer questions");
    eprintln!("  --shuffle               shuffle the full bank");
    eprintln!("  --auto-advance <secs>   move on automatically after an answer");
    eprintln!("  --seed <n>              fixed seed for question selection");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_CONFIG, QUIZ_FEED_URL, QUIZ_FEED_FORMAT, QUIZ_SAMPLE_SIZE,");
    eprintln!("  QUIZ_TIME_LIMIT_SECS, QUIZ_MIN_QUESTIONS, QUIZ_SHUFFLE, QUIZ_AUTO_ADVANCE_SECS,");
    eprintln!("  RUST_LOG (default: warn)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Check,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "check" => Some(Self::Check),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    config_path: Option<PathBuf>,
    overrides: QuizConfig,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            config_path: std::env::var_os("QUIZ_CONFIG").map(PathBuf::from),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => parsed.config_path = Some(require_value(args, "--config")?.into()),
                "--feed-url" => {
                    parsed.overrides.feed_url = Some(require_value(args, "--feed-url")?);
                }
                "--format" => {
                    let raw = require_value(args, "--format")?;
                    let format = raw
                        .parse()
                        .map_err(|_| ArgsError::InvalidFormat { raw })?;
                    parsed.overrides.format = Some(format);
                }
                "--course" => {
                    let raw = require_value(args, "--course")?;
                    let (name, url) = raw
                        .split_once('=')
                        .filter(|(name, url)| !name.trim().is_empty() && !url.trim().is_empty())
                        .ok_or_else(|| ArgsError::InvalidCourse { raw: raw.clone() })?;
                    parsed
                        .overrides
                        .courses
                        .insert(name.trim().to_owned(), url.trim().to_owned());
                }
                "--sample-size" => {
                    parsed.overrides.sample_size = Some(require_number(args, "--sample-size")?);
                }
                "--time-limit" => {
                    parsed.overrides.time_limit_secs = Some(require_number(args, "--time-limit")?);
                }
                "--min-questions" => {
                    parsed.overrides.min_questions =
                        Some(require_number(args, "--min-questions")?);
                }
                "--auto-advance" => {
                    parsed.overrides.auto_advance_secs =
                        Some(require_number(args, "--auto-advance")?);
                }
                "--shuffle" => parsed.overrides.shuffle = true,
                "--seed" => parsed.seed = Some(require_number(args, "--seed")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    /// File, then environment, then flags.
    fn resolve_config(self) -> Result<QuizConfig, Box<dyn std::error::Error>> {
        let base = match &self.config_path {
            Some(path) => QuizConfig::from_file(path)?,
            None => QuizConfig::default(),
        };
        let mut config = base.with_env()?;

        let flags = self.overrides;
        config.feed_url = flags.feed_url.or(config.feed_url);
        config.format = flags.format.or(config.format);
        config.courses.extend(flags.courses);
        config.sample_size = flags.sample_size.or(config.sample_size);
        config.time_limit_secs = flags.time_limit_secs.or(config.time_limit_secs);
        config.min_questions = flags.min_questions.or(config.min_questions);
        config.auto_advance_secs = flags.auto_advance_secs.or(config.auto_advance_secs);
        config.shuffle |= flags.shuffle;

        config.validate()?;
        Ok(config)
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let seed = args.seed;
    let config = args.resolve_config()?;

    // Feeds load before any input is read, so a second start cannot race the fetch.
    let feeds = config.feeds()?;
    println!("Loading questions...");
    let bank = FeedService::http().load_bank(&feeds).await;

    match cmd {
        Command::Check => {
            for (course, count) in bank.available() {
                let name = course.map_or("(default)", |c| c.as_str());
                println!("{name}: {count} questions");
            }
            for (course, message) in bank.failures() {
                let name = course.map_or("(default)", |c| c.as_str());
                println!("{name}: FAILED ({message})");
            }
            if bank.is_empty() {
                return Err("no questions could be loaded".into());
            }
            Ok(())
        }
        Command::Play => {
            let options = config.session_options();
            let presenter = TerminalPresenter::new(options.auto_advance.is_some());
            let mut controller = QuizController::new(bank, options, presenter);
            if let Some(seed) = seed {
                controller = controller.with_seed(seed);
            }
            controller.report_load_failures();
            if controller.bank().is_empty() {
                return Err("no questions could be loaded; check the feed URL and reload".into());
            }
            play(controller).await
        }
    }
}

/// Single task: stdin intents, the one-second countdown, and optional auto-advance
/// all funnel into the controller here.
async fn play(
    mut controller: QuizController<TerminalPresenter>,
) -> Result<(), Box<dyn std::error::Error>> {
    let auto_advance_delay = controller.options().auto_advance;
    let timed = controller.options().time_limit_secs.is_some();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let second = Duration::from_secs(1);
    let mut ticker = tokio::time::interval_at(Instant::now() + second, second);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let auto_advance = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(auto_advance);
    let mut auto_advance_armed = false;

    let courses: Vec<String> = controller
        .bank()
        .available()
        .map(|(course, count)| match course {
            Some(course) => format!("{course} ({count})"),
            None => format!("default ({count})"),
        })
        .collect();
    println!("Questions ready: {}", courses.join(", "));
    println!("Type :start to begin, :help for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let intent = match parse_command(&line) {
                    Input::Quit => break,
                    Input::Blank => continue,
                    Input::Help => {
                        print_help();
                        continue;
                    }
                    Input::Intent(intent) => intent,
                };

                let starting = matches!(intent, QuizIntent::Start(_));
                let answering = matches!(intent, QuizIntent::SubmitAnswer(_));
                let step = auto_advance_step(&intent);
                match dispatch(&mut controller, intent) {
                    Ok(()) => {
                        if starting {
                            ticker.reset();
                        }
                        if let (true, Some(session)) = (answering, controller.session()) {
                            controller.listener().show_progress(&session.progress());
                        }
                        match (step, auto_advance_delay) {
                            (AutoAdvance::Arm, Some(delay)) => {
                                auto_advance.as_mut().reset(Instant::now() + delay);
                                auto_advance_armed = true;
                            }
                            (AutoAdvance::Disarm, _) => auto_advance_armed = false,
                            _ => {}
                        }
                    }
                    Err(err) => controller.listener().show_error(&err),
                }
            }
            _ = ticker.tick(), if timed && controller.state() == ControllerState::Active => {
                controller.on_timer_tick()?;
            }
            () = &mut auto_advance, if auto_advance_armed => {
                auto_advance_armed = false;
                if controller.state() == ControllerState::Active {
                    controller.advance()?;
                }
            }
        }
    }

    info!("leaving quiz");
    Ok(())
}

/// Effect of a successfully handled intent on a pending auto-advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutoAdvance {
    Arm,
    Disarm,
    Keep,
}

fn auto_advance_step(intent: &QuizIntent) -> AutoAdvance {
    match intent {
        QuizIntent::SubmitAnswer(_) => AutoAdvance::Arm,
        QuizIntent::AdvanceToNext | QuizIntent::Restart | QuizIntent::Start(_) => {
            AutoAdvance::Disarm
        }
        QuizIntent::RequestHint => AutoAdvance::Keep,
    }
}

fn dispatch(
    controller: &mut QuizController<TerminalPresenter>,
    intent: QuizIntent,
) -> Result<(), SessionError> {
    match intent {
        QuizIntent::RequestHint => {
            if controller.request_hint()?.is_none() {
                controller.listener().show_no_hint();
            }
            Ok(())
        }
        other => controller.handle(other),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        warn!(error = %err, "quiz exited with an error");
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(&mut iter)
    }

    #[test]
    fn flags_fill_overrides() {
        let args = parse(&[
            "--feed-url",
            "https://example.com/pub?output=tsv",
            "--course",
            "algebra=https://example.com/a",
            "--sample-size",
            "10",
            "--time-limit",
            "120",
            "--shuffle",
            "--seed",
            "9",
        ])
        .unwrap();

        assert_eq!(
            args.overrides.feed_url.as_deref(),
            Some("https://example.com/pub?output=tsv")
        );
        assert_eq!(
            args.overrides.courses.get("algebra").map(String::as_str),
            Some("https://example.com/a")
        );
        assert_eq!(args.overrides.sample_size, Some(10));
        assert_eq!(args.overrides.time_limit_secs, Some(120));
        assert!(args.overrides.shuffle);
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn malformed_flags_are_reported() {
        assert!(matches!(
            parse(&["--sample-size", "many"]),
            Err(ArgsError::InvalidNumber { flag: "--sample-size", .. })
        ));
        assert!(matches!(
            parse(&["--course", "algebra"]),
            Err(ArgsError::InvalidCourse { .. })
        ));
        assert!(matches!(
            parse(&["--time-limit"]),
            Err(ArgsError::MissingValue { flag: "--time-limit" })
        ));
        assert!(matches!(parse(&["--bogus"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn hint_keeps_pending_auto_advance() {
        assert_eq!(
            auto_advance_step(&QuizIntent::SubmitAnswer("4".into())),
            AutoAdvance::Arm
        );
        assert_eq!(auto_advance_step(&QuizIntent::RequestHint), AutoAdvance::Keep);
        assert_eq!(auto_advance_step(&QuizIntent::AdvanceToNext), AutoAdvance::Disarm);
        assert_eq!(auto_advance_step(&QuizIntent::Restart), AutoAdvance::Disarm);
        assert_eq!(auto_advance_step(&QuizIntent::Start(None)), AutoAdvance::Disarm);
    }
}
