//! Parsing of published-spreadsheet feeds into question records.
//!
//! The first non-blank line of a feed is a header and is skipped. Rows with
//! too few fields, a blank prompt, or no usable accepted answer are dropped
//! silently. Trailing empty cells are kept, so a last row with blank hint and
//! format columns still counts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::model::QuestionRecord;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedError {
    #[error("feed contains no usable questions")]
    Empty,

    #[error("feed has {found} questions but at least {required} are required")]
    Insufficient { found: usize, required: usize },

    #[error("unknown feed format: {0}")]
    UnknownFormat(String),
}

//
// ─── FORMAT ───────────────────────────────────────────────────────────────────
//

/// Delimited-text layout of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// Columns: prompt, accepted answer, hint, answer format, optional category.
    #[default]
    Tsv,
    /// Columns: prompt, then the accepted answer (which may itself contain commas).
    Csv,
}

impl FeedFormat {
    #[must_use]
    pub fn delimiter(self) -> char {
        match self {
            FeedFormat::Tsv => '\t',
            FeedFormat::Csv => ',',
        }
    }

    /// Rows with fewer fields than this are dropped.
    #[must_use]
    pub fn min_fields(self) -> usize {
        match self {
            FeedFormat::Tsv => 4,
            FeedFormat::Csv => 2,
        }
    }

    /// Infers the format from a published-sheet URL's `output=` query parameter.
    ///
    /// Falls back to TSV when the URL does not parse or names no format.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let Ok(url) = Url::parse(url) else {
            return Self::default();
        };
        url.query_pairs()
            .find(|(key, _)| key == "output")
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for FeedFormat {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "csv" => Ok(Self::Csv),
            other => Err(FeedError::UnknownFormat(other.to_owned())),
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFormat::Tsv => f.write_str("tsv"),
            FeedFormat::Csv => f.write_str("csv"),
        }
    }
}

//
// ─── PARSER ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedParser {
    format: FeedFormat,
    min_questions: Option<usize>,
}

impl FeedParser {
    #[must_use]
    pub fn new(format: FeedFormat) -> Self {
        Self {
            format,
            min_questions: None,
        }
    }

    /// Require at least `min` usable questions.
    #[must_use]
    pub fn with_min_questions(mut self, min: Option<usize>) -> Self {
        self.min_questions = min;
        self
    }

    #[must_use]
    pub fn format(&self) -> FeedFormat {
        self.format
    }

    /// Parses a feed body into question records, preserving row order.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Empty` when no row yields a question and
    /// `FeedError::Insufficient` when fewer than the configured minimum do.
    pub fn parse(&self, body: &str) -> Result<Vec<QuestionRecord>, FeedError> {
        let questions: Vec<QuestionRecord> = body
            .trim_start_matches('\u{feff}')
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .skip(1)
            .filter_map(|row| self.parse_row(row))
            .collect();

        if questions.is_empty() {
            return Err(FeedError::Empty);
        }
        if let Some(required) = self.min_questions {
            if questions.len() < required {
                return Err(FeedError::Insufficient {
                    found: questions.len(),
                    required,
                });
            }
        }
        Ok(questions)
    }

    fn parse_row(&self, row: &str) -> Option<QuestionRecord> {
        let fields: Vec<&str> = row.split(self.format.delimiter()).collect();
        if fields.len() < self.format.min_fields() {
            return None;
        }

        match self.format {
            FeedFormat::Tsv => QuestionRecord::new(fields[0], fields[1])
                .ok()
                .map(|q| {
                    q.with_hint(Some(fields[2]))
                        .with_answer_format(Some(fields[3]))
                        .with_category(fields.get(4).copied())
                }),
            FeedFormat::Csv => {
                let prompt = trim_cell(fields[0]);
                let answer = fields[1..].join(",");
                QuestionRecord::new(prompt, trim_cell(&answer)).ok()
            }
        }
    }
}

/// Parses `body` with default settings for `format`.
///
/// # Errors
///
/// See [`FeedParser::parse`].
pub fn parse_feed(body: &str, format: FeedFormat) -> Result<Vec<QuestionRecord>, FeedError> {
    FeedParser::new(format).parse(body)
}

fn trim_cell(cell: &str) -> &str {
    cell.trim().trim_matches('"').trim()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
