//! Run configuration: workspace layout, fetch limits, aggregation windows and
//! the static source list. Loaded from TOML, every field has a default.

use crate::types::{DashboardError, FetchConfig, Result, Source};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Config file picked up from the current directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ai-dashboard.toml";

/// Longest accepted lookback window (one year).
pub const MAX_LOOKBACK_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory receiving every generated artifact
    pub workspace: PathBuf,
    pub fetch: FetchConfig,
    pub aggregation: AggregationConfig,
    pub timeline: TimelineConfig,
    pub translation: TranslationConfig,
    pub sources: Vec<Source>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("dashboard"),
            fetch: FetchConfig::default(),
            aggregation: AggregationConfig::default(),
            timeline: TimelineConfig::default(),
            translation: TranslationConfig::default(),
            sources: default_sources(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Articles older than `now - lookback_hours` are not "recent"
    pub lookback_hours: i64,
    /// Newest items kept from a source whose items are all outside the window
    pub fallback_per_source: usize,
    /// Below this total a shortage warning is logged
    pub min_articles: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            lookback_hours: 36,
            fallback_per_source: 2,
            min_articles: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Entries kept in the timeline index
    pub retention: usize,
    /// Entries handed to the renderer
    pub recent: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            retention: 90,
            recent: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub target_language: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
    /// Longest text sent in a single request
    pub max_chars: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_language: "zh-TW".to_string(),
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            timeout_seconds: 10,
            max_chars: crate::parser::SUMMARY_MAX_CHARS,
        }
    }
}

pub fn default_sources() -> Vec<Source> {
    vec![
        Source::new(
            "The Verge · AI",
            "https://www.theverge.com/rss/ai-artificial-intelligence/index.xml",
        ),
        Source::new(
            "TechCrunch · Artificial Intelligence",
            "https://techcrunch.com/category/artificial-intelligence/feed/",
        ),
    ]
}

impl DashboardConfig {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, `ai-dashboard.toml` in the
    /// current directory is used if present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match Self::file_to_load(path) {
            Some(path) => Self::from_file(&path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// The file [`DashboardConfig::load`] reads for `path`, if any.
    pub fn file_to_load(path: Option<&Path>) -> Option<PathBuf> {
        match path {
            Some(path) => Some(path.to_path_buf()),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Some(PathBuf::from(DEFAULT_CONFIG_FILE)),
            None => None,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(DashboardError::Config(format!(
                    "source with url {} has no name",
                    source.url
                )));
            }
            let url = Url::parse(&source.url)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(DashboardError::Config(format!(
                    "source {} must use http(s), got {}",
                    source.name,
                    url.scheme()
                )));
            }
        }

        if !(1..=MAX_LOOKBACK_HOURS).contains(&self.aggregation.lookback_hours) {
            return Err(DashboardError::Config(format!(
                "aggregation.lookback_hours must be between 1 and {}, got {}",
                MAX_LOOKBACK_HOURS, self.aggregation.lookback_hours
            )));
        }
        if self.timeline.retention == 0 {
            return Err(DashboardError::Config(
                "timeline.retention must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Create the workspace and history directories. Failure here is fatal.
    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.workspace.clone(), self.history_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| DashboardError::Write { path: dir, source })?;
        }
        Ok(())
    }

    pub fn dashboard_markdown(&self) -> PathBuf {
        self.workspace.join("DASHBOARD.md")
    }

    pub fn dashboard_html(&self) -> PathBuf {
        self.workspace.join("index.html")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.workspace.join("history")
    }

    pub fn timeline_document(&self) -> PathBuf {
        self.workspace.join("TIMELINE.md")
    }

    pub fn timeline_index(&self) -> PathBuf {
        self.workspace.join("timeline.json")
    }

    pub fn rag_data(&self) -> PathBuf {
        self.workspace.join("rag_data").join("rag_data.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.workspace.join("update.log")
    }
}
