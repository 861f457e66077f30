use crate::config::AggregationConfig;
use crate::types::{Article, DashboardError};
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

/// Outcome of fetching and parsing a single source.
#[derive(Debug)]
pub struct SourceBatch {
    pub source: String,
    pub outcome: Result<Vec<Article>, DashboardError>,
}

impl SourceBatch {
    pub fn ok(source: impl Into<String>, articles: Vec<Article>) -> Self {
        Self {
            source: source.into(),
            outcome: Ok(articles),
        }
    }

    pub fn failed(source: impl Into<String>, error: DashboardError) -> Self {
        Self {
            source: source.into(),
            outcome: Err(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    /// Articles inside the lookback window were found
    Recent,
    /// Nothing recent; the newest articles were substituted
    Fallback,
    /// The feed had no usable records at all
    Empty,
    /// Fetch or parse failed; the message is kept for the run log
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub source: String,
    pub status: SourceStatus,
    pub parsed: usize,
    pub kept: usize,
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Every retained article, newest first
    pub articles: Vec<Article>,
    pub sources: Vec<SourceSummary>,
    pub cutoff: DateTime<Utc>,
    /// Fewer articles than the configured minimum were collected
    pub below_minimum: bool,
}

/// Merges per-source results under a lookback window.
pub struct RecencyAggregator {
    lookback: Duration,
    fallback_per_source: usize,
    min_articles: usize,
}

impl RecencyAggregator {
    pub fn new(lookback_hours: i64) -> Self {
        Self {
            lookback: Duration::try_hours(lookback_hours).unwrap_or(Duration::MAX),
            fallback_per_source: 2,
            min_articles: 6,
        }
    }

    pub fn from_config(config: &AggregationConfig) -> Self {
        Self::new(config.lookback_hours)
            .with_fallback(config.fallback_per_source)
            .with_min_articles(config.min_articles)
    }

    pub fn with_fallback(mut self, fallback_per_source: usize) -> Self {
        self.fallback_per_source = fallback_per_source;
        self
    }

    pub fn with_min_articles(mut self, min_articles: usize) -> Self {
        self.min_articles = min_articles;
        self
    }

    /// Start of the lookback window, clamped to the earliest representable
    /// time for windows reaching past it.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Keep the articles published at or after `cutoff`. When none qualify,
    /// return the newest `fallback_per_source` articles instead; the flag
    /// reports whether the fallback was used.
    pub fn filter_source(&self, articles: Vec<Article>, cutoff: DateTime<Utc>) -> (Vec<Article>, bool) {
        if articles.is_empty() {
            return (articles, false);
        }

        let recent: Vec<Article> = articles
            .iter()
            .filter(|a| a.published >= cutoff)
            .cloned()
            .collect();

        if !recent.is_empty() {
            return (recent, false);
        }

        let mut newest = articles;
        sort_newest_first(&mut newest);
        newest.truncate(self.fallback_per_source);
        (newest, true)
    }

    /// Merge all batches into one newest-first list.
    ///
    /// Failed batches are logged and contribute nothing; they never stop the
    /// remaining sources from being merged.
    pub fn aggregate(&self, batches: Vec<SourceBatch>, now: DateTime<Utc>) -> Aggregation {
        let cutoff = self.cutoff(now);
        let mut collected = Vec::new();
        let mut sources = Vec::with_capacity(batches.len());

        for batch in batches {
            match batch.outcome {
                Ok(articles) => {
                    let parsed = articles.len();
                    let (kept, used_fallback) = self.filter_source(articles, cutoff);

                    let status = if parsed == 0 {
                        warn!("⚠️ {} returned no usable articles", batch.source);
                        SourceStatus::Empty
                    } else if used_fallback {
                        warn!(
                            "⚠️ {} has nothing newer than {}, using {} latest",
                            batch.source,
                            cutoff.format("%Y-%m-%d %H:%M UTC"),
                            kept.len()
                        );
                        SourceStatus::Fallback
                    } else {
                        SourceStatus::Recent
                    };

                    info!("✅ {} contributed {} articles", batch.source, kept.len());
                    sources.push(SourceSummary {
                        source: batch.source,
                        status,
                        parsed,
                        kept: kept.len(),
                    });
                    collected.extend(kept);
                }
                Err(e) => {
                    error!("❌ Could not collect {}: {}", batch.source, e);
                    sources.push(SourceSummary {
                        source: batch.source,
                        status: SourceStatus::Failed(e.to_string()),
                        parsed: 0,
                        kept: 0,
                    });
                }
            }
        }

        sort_newest_first(&mut collected);

        let below_minimum = collected.len() < self.min_articles;
        if below_minimum {
            warn!(
                "⚠️ Only {} articles collected (minimum {}), generating with what is available",
                collected.len(),
                self.min_articles
            );
        }

        Aggregation {
            articles: collected,
            sources,
            cutoff,
            below_minimum,
        }
    }
}

/// Stable sort by publish time, newest first. Equal timestamps keep their
/// input order.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published.cmp(&a.published));
}
