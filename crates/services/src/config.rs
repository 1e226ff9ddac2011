//! Startup configuration.
//!
//! Sources apply in order, later ones overriding earlier ones: an optional
//! TOML file, `QUIZ_*` environment variables, then whatever the caller sets
//! on the struct (the app maps its CLI flags onto it).

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use quiz_core::feed::FeedFormat;
use quiz_core::model::CourseKey;

use crate::error::ConfigError;
use crate::feed_service::FeedSpec;
use crate::sessions::{Selection, SessionOptions};

pub const ENV_FEED_URL: &str = "QUIZ_FEED_URL";
pub const ENV_FEED_FORMAT: &str = "QUIZ_FEED_FORMAT";
pub const ENV_SAMPLE_SIZE: &str = "QUIZ_SAMPLE_SIZE";
pub const ENV_TIME_LIMIT_SECS: &str = "QUIZ_TIME_LIMIT_SECS";
pub const ENV_MIN_QUESTIONS: &str = "QUIZ_MIN_QUESTIONS";
pub const ENV_SHUFFLE: &str = "QUIZ_SHUFFLE";
pub const ENV_AUTO_ADVANCE_SECS: &str = "QUIZ_AUTO_ADVANCE_SECS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizConfig {
    /// Feed for the default course.
    #[serde(alias = "feedUrl")]
    pub feed_url: Option<String>,
    /// Overrides format inference from the URL.
    pub format: Option<FeedFormat>,
    /// Named course → feed URL.
    pub courses: BTreeMap<String, String>,
    /// Draw this many questions per session instead of the whole bank.
    #[serde(alias = "sampleSize")]
    pub sample_size: Option<usize>,
    #[serde(alias = "timeLimitSeconds")]
    pub time_limit_secs: Option<u32>,
    pub min_questions: Option<usize>,
    /// Shuffle the full bank when no sample size is set.
    pub shuffle: bool,
    pub auto_advance_secs: Option<u64>,
}

impl QuizConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, or `ConfigError::Parse`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Overlay `QUIZ_*` process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable does not parse.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables from an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable does not parse.
    pub fn with_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(ENV_FEED_URL) {
            self.feed_url = Some(url.trim().to_owned());
        }
        if let Some(raw) = lookup(ENV_FEED_FORMAT) {
            self.format = Some(parse_value(ENV_FEED_FORMAT, &raw)?);
        }
        if let Some(raw) = lookup(ENV_SAMPLE_SIZE) {
            self.sample_size = Some(parse_value(ENV_SAMPLE_SIZE, &raw)?);
        }
        if let Some(raw) = lookup(ENV_TIME_LIMIT_SECS) {
            self.time_limit_secs = Some(parse_value(ENV_TIME_LIMIT_SECS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_MIN_QUESTIONS) {
            self.min_questions = Some(parse_value(ENV_MIN_QUESTIONS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_SHUFFLE) {
            self.shuffle = parse_flag(ENV_SHUFFLE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_AUTO_ADVANCE_SECS) {
            self.auto_advance_secs = Some(parse_value(ENV_AUTO_ADVANCE_SECS, &raw)?);
        }
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::MissingFeed` without any feed, and
    /// `ConfigError::ZeroSampleSize` / `ConfigError::ZeroTimeLimit` for zero values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_url.is_none() && self.courses.is_empty() {
            return Err(ConfigError::MissingFeed);
        }
        if self.sample_size == Some(0) {
            return Err(ConfigError::ZeroSampleSize);
        }
        if self.time_limit_secs == Some(0) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(())
    }

    /// One feed spec per configured course, default course first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::CourseKey` for a blank course name.
    pub fn feeds(&self) -> Result<Vec<FeedSpec>, ConfigError> {
        let mut specs = Vec::with_capacity(self.courses.len() + 1);
        if let Some(url) = &self.feed_url {
            specs.push(self.spec_for(None, url));
        }
        for (name, url) in &self.courses {
            let key = CourseKey::new(name)?;
            specs.push(self.spec_for(Some(key), url));
        }
        Ok(specs)
    }

    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        let selection = match (self.sample_size, self.shuffle) {
            (Some(size), _) => Selection::Sample(size),
            (None, true) => Selection::Shuffled,
            (None, false) => Selection::InOrder,
        };
        SessionOptions {
            selection,
            time_limit_secs: self.time_limit_secs,
            auto_advance: self.auto_advance_secs.map(Duration::from_secs),
        }
    }

    fn spec_for(&self, course: Option<CourseKey>, url: &str) -> FeedSpec {
        let spec = FeedSpec::new(url)
            .with_course(course)
            .with_min_questions(self.min_questions);
        match self.format {
            Some(format) => spec.with_format(format),
            None => spec,
        }
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        raw: raw.to_owned(),
    })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            raw: raw.to_owned(),
        }),
    }
}
