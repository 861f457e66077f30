use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A configured feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A normalized news item produced by the feed parser.
///
/// `title` and `link` are never empty; the parser drops records that would
/// violate this. The `link` is the de-facto identity of an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub source: String,
    pub published: DateTime<Utc>,
    pub summary: String,
}

impl Article {
    /// Copy of this article carrying a different summary (used for translations).
    pub fn with_summary(&self, summary: String) -> Self {
        Self {
            summary,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (AI-Dashboard)".to_string(),
            timeout_seconds: 20,
            max_retries: 1,
            retry_delay_seconds: 2,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

/// Failure to retrieve one source. Never aborts the run on its own.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to fetch {source_name}: {cause}")]
pub struct FetchError {
    pub source_name: String,
    pub cause: String,
}

impl FetchError {
    pub fn new(source_name: impl Into<String>, cause: impl ToString) -> Self {
        Self {
            source_name: source_name.into(),
            cause: cause.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Feed parse error ({source_name}): {message}")]
    Parse { source_name: String, message: String },

    #[error("Translation error: {0}")]
    Translate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigFormat(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
