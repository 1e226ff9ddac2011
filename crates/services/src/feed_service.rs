use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use quiz_core::feed::{FeedFormat, FeedParser};
use quiz_core::model::{CourseKey, QuestionRecord};

use crate::bank::QuestionBank;
use crate::error::FeedLoadError;

/// Where one course's questions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSpec {
    pub course: Option<CourseKey>,
    pub url: String,
    pub format: FeedFormat,
    pub min_questions: Option<usize>,
}

impl FeedSpec {
    /// Spec for the default course, with the format inferred from the URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            course: None,
            format: FeedFormat::from_url(&url),
            url,
            min_questions: None,
        }
    }

    #[must_use]
    pub fn with_course(mut self, course: Option<CourseKey>) -> Self {
        self.course = course;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: FeedFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_min_questions(mut self, min: Option<usize>) -> Self {
        self.min_questions = min;
        self
    }
}

/// Fetches the raw body of a feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the feed body at `url`.
    ///
    /// # Errors
    ///
    /// Returns `FeedLoadError::Unreachable` on transport failure and
    /// `FeedLoadError::HttpStatus` for a non-success response.
    async fn fetch(&self, url: &str) -> Result<String, FeedLoadError>;
}

/// Plain unauthenticated HTTP GET, no retries.
#[derive(Clone, Default)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<String, FeedLoadError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FeedLoadError::HttpStatus(response.status()));
        }
        Ok(response.text().await?)
    }
}

#[derive(Debug, Clone)]
enum StaticResponse {
    Body(String),
    Status(StatusCode),
}

/// In-memory feed source for tests and offline runs.
///
/// Unregistered URLs answer with 404.
#[derive(Debug, Clone, Default)]
pub struct StaticFeedSource {
    responses: HashMap<String, StaticResponse>,
}

impl StaticFeedSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses
            .insert(url.into(), StaticResponse::Body(body.into()));
        self
    }

    #[must_use]
    pub fn with_status(mut self, url: impl Into<String>, status: StatusCode) -> Self {
        self.responses
            .insert(url.into(), StaticResponse::Status(status));
        self
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch(&self, url: &str) -> Result<String, FeedLoadError> {
        match self.responses.get(url) {
            Some(StaticResponse::Body(body)) => Ok(body.clone()),
            Some(StaticResponse::Status(status)) => Err(FeedLoadError::HttpStatus(*status)),
            None => Err(FeedLoadError::HttpStatus(StatusCode::NOT_FOUND)),
        }
    }
}

/// Loads feeds into a `QuestionBank`.
#[derive(Clone)]
pub struct FeedService {
    source: Arc<dyn FeedSource>,
}

impl FeedService {
    #[must_use]
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    #[must_use]
    pub fn http() -> Self {
        Self::new(Arc::new(HttpFeedSource::new()))
    }

    /// Fetch and parse a single feed.
    ///
    /// # Errors
    ///
    /// Returns `FeedLoadError` when the fetch fails or the body yields too few questions.
    pub async fn load(&self, spec: &FeedSpec) -> Result<Vec<QuestionRecord>, FeedLoadError> {
        debug!(url = %spec.url, format = %spec.format, "fetching feed");
        let body = self.source.fetch(&spec.url).await?;
        let questions = FeedParser::new(spec.format)
            .with_min_questions(spec.min_questions)
            .parse(&body)?;
        info!(
            course = spec.course.as_ref().map_or("(default)", CourseKey::as_str),
            count = questions.len(),
            "feed loaded"
        );
        Ok(questions)
    }

    /// Load every feed one after another. Failures are recorded per course
    /// instead of aborting the whole load.
    pub async fn load_bank(&self, specs: &[FeedSpec]) -> QuestionBank {
        let mut bank = QuestionBank::new();
        for spec in specs {
            match self.load(spec).await {
                Ok(questions) => bank.insert_loaded(spec.course.clone(), questions),
                Err(err) => {
                    warn!(url = %spec.url, error = %err, "feed load failed");
                    bank.insert_failed(spec.course.clone(), err.to_string());
                }
            }
        }
        bank
    }
}
