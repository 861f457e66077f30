use crate::aggregator::{Aggregation, RecencyAggregator, SourceBatch, SourceSummary};
use crate::config::DashboardConfig;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::rag::RagDataset;
use crate::render::{render_html, render_markdown, DashboardView};
use crate::sections::Sections;
use crate::timeline::{HistoryArchive, TimelineEntry, TimelineStore};
use crate::traits::FeedFetcher;
use crate::translate::{translate_sections, GoogleTranslator, PassthroughTranslator, Translator};
use crate::types::{Result, Source};
use crate::utils::fs::write_artifact;
use chrono::{DateTime, Local, Utc};
use std::path::PathBuf;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Articles retained after recency filtering, across all sources
    pub articles_collected: usize,
    pub below_minimum: bool,
    pub sources: Vec<SourceSummary>,
    pub sections: Sections,
    pub dashboard_path: PathBuf,
    pub html_path: PathBuf,
    pub history_path: PathBuf,
    pub recent_timeline: Vec<TimelineEntry>,
}

/// One dashboard generation: fetch, parse, aggregate, split, translate,
/// render and archive.
pub struct DashboardPipeline {
    config: DashboardConfig,
    fetcher: Box<dyn FeedFetcher>,
    translator: Box<dyn Translator>,
    parser: FeedParser,
    aggregator: RecencyAggregator,
    history: HistoryArchive,
    timeline: TimelineStore,
}

impl DashboardPipeline {
    /// Pipeline with the HTTP fetcher and, when enabled, the Google translator.
    pub fn from_config(config: DashboardConfig) -> Result<Self> {
        PipelineBuilder::new(config).build()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.run_at(Utc::now()).await
    }

    /// Run with `now` as the reference time for the lookback window, the
    /// calendar day key and every timestamp written.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        self.execute(run_id, now).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid, now: DateTime<Utc>) -> Result<RunReport> {
        info!("▶️ Starting dashboard generation");
        self.config.ensure_dirs().await?;

        let aggregation = self.collect(now).await;
        let sections = Sections::split(&aggregation.articles);
        let sections = translate_sections(self.translator.as_ref(), &sections).await;
        let rag = RagDataset::load(&self.config.rag_data()).await;

        let local_now = now.with_timezone(&Local);
        let date = local_now.date_naive();

        let markdown = render_markdown(&DashboardView {
            generated_at: local_now,
            sections: &sections,
            rag: &rag,
            timeline: &[],
        });
        let dashboard_path = self.config.dashboard_markdown();
        write_artifact(&dashboard_path, &markdown).await?;
        info!("📝 Wrote {}", dashboard_path.display());

        let history_path = self.history.save_history(&markdown, date).await?;
        let recent_timeline = self
            .timeline
            .update_timeline(date, now, &sections, self.history.link_for(date))
            .await?;

        let html = render_html(&DashboardView {
            generated_at: local_now,
            sections: &sections,
            rag: &rag,
            timeline: &recent_timeline,
        });
        let html_path = self.config.dashboard_html();
        write_artifact(&html_path, &html).await?;
        info!("🕸️ Wrote {}", html_path.display());

        info!(
            "✅ Dashboard updated with {} articles ({} rendered)",
            aggregation.articles.len(),
            sections.len()
        );

        Ok(RunReport {
            run_id,
            generated_at: now,
            articles_collected: aggregation.articles.len(),
            below_minimum: aggregation.below_minimum,
            sources: aggregation.sources,
            sections,
            dashboard_path,
            html_path,
            history_path,
            recent_timeline,
        })
    }

    /// Fetch and parse every source in order and merge the results.
    pub async fn collect(&self, now: DateTime<Utc>) -> Aggregation {
        let mut batches = Vec::with_capacity(self.config.sources.len());
        for source in &self.config.sources {
            batches.push(self.collect_source(source, now).await);
        }
        self.aggregator.aggregate(batches, now)
    }

    async fn collect_source(&self, source: &Source, now: DateTime<Utc>) -> SourceBatch {
        let raw = match self.fetcher.fetch(source).await {
            Ok(raw) => raw,
            Err(e) => return SourceBatch::failed(&source.name, e.into()),
        };

        match self.parser.parse_at(&raw, &source.name, now) {
            Ok(articles) => SourceBatch::ok(&source.name, articles),
            Err(e) => SourceBatch::failed(&source.name, e),
        }
    }
}

/// Pipeline builder for swapping the network-facing parts
pub struct PipelineBuilder {
    config: DashboardConfig,
    fetcher: Option<Box<dyn FeedFetcher>>,
    translator: Option<Box<dyn Translator>>,
}

impl PipelineBuilder {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            fetcher: None,
            translator: None,
        }
    }

    pub fn fetcher(mut self, fetcher: Box<dyn FeedFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn build(self) -> Result<DashboardPipeline> {
        let config = self.config;

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Box::new(Fetcher::new(config.fetch.clone())?),
        };

        let translator: Box<dyn Translator> = match self.translator {
            Some(translator) => translator,
            None if config.translation.enabled => {
                Box::new(GoogleTranslator::new(&config.translation, &config.fetch.user_agent)?)
            }
            None => {
                warn!("Translation disabled, summaries stay in their original language");
                Box::new(PassthroughTranslator)
            }
        };

        Ok(DashboardPipeline {
            parser: FeedParser::new(),
            aggregator: RecencyAggregator::from_config(&config.aggregation),
            history: HistoryArchive::from_config(&config),
            timeline: TimelineStore::from_config(&config),
            fetcher,
            translator,
            config,
        })
    }
}
