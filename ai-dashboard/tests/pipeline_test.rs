mod common;

use ai_dashboard::render::MARKDOWN_PLACEHOLDER;
use ai_dashboard::timeline::NO_DATA;
use ai_dashboard::{
    DashboardConfig, DashboardError, FeedFetcher, FetchError, PassthroughTranslator,
    PipelineBuilder, Result, Source, SourceStatus,
};
use chrono::{Duration, Local};
use common::{init_tracing, reference_now, rss_feed, StaticFetcher, TaggingTranslator};
use std::sync::atomic::Ordering;
use tempfile::TempDir;

const VERGE: &str = "https://feeds.example.com/verge.xml";
const CRUNCH: &str = "https://feeds.example.com/techcrunch.xml";

fn test_config(dir: &TempDir) -> DashboardConfig {
    DashboardConfig {
        workspace: dir.path().to_path_buf(),
        sources: vec![
            Source::new("The Verge · AI", VERGE),
            Source::new("TechCrunch · AI", CRUNCH),
        ],
        ..DashboardConfig::default()
    }
}

fn local_date_key() -> String {
    reference_now()
        .with_timezone(&Local)
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn test_run_with_no_articles_writes_placeholders() -> Result<()> {
    init_tracing();
    let dir = TempDir::new()?;
    let config = test_config(&dir);

    let pipeline = PipelineBuilder::new(config.clone())
        .fetcher(Box::new(StaticFetcher::new()))
        .translator(Box::new(PassthroughTranslator))
        .build()?;
    let report = pipeline.run_at(reference_now()).await?;

    assert_eq!(report.articles_collected, 0);
    assert!(report.below_minimum);
    assert!(report
        .sources
        .iter()
        .all(|s| matches!(s.status, SourceStatus::Failed(_))));

    let markdown = tokio::fs::read_to_string(config.dashboard_markdown()).await?;
    assert_eq!(markdown.matches(MARKDOWN_PLACEHOLDER).count(), 3);

    let html = tokio::fs::read_to_string(config.dashboard_html()).await?;
    assert!(html.contains(NO_DATA));

    assert!(config.timeline_document().exists());
    assert!(config.timeline_index().exists());
    assert!(config
        .history_dir()
        .join(format!("{}.md", local_date_key()))
        .exists());
    assert_eq!(report.recent_timeline.len(), 1);
    assert_eq!(report.recent_timeline[0].headlines.len(), 0);
    Ok(())
}

#[tokio::test]
async fn test_full_run_renders_sections_and_timeline() -> Result<()> {
    let dir = TempDir::new()?;
    let config = test_config(&dir);
    let fetcher = StaticFetcher::new()
        .with_body(VERGE, rss_feed(&[("Verge 1", 1), ("Verge 2", 3), ("Verge 3", 5)]))
        .with_body(CRUNCH, rss_feed(&[("Crunch 1", 2), ("Crunch 2", 60), ("Crunch 3", 70)]));

    let pipeline = PipelineBuilder::new(config.clone())
        .fetcher(Box::new(fetcher))
        .translator(Box::new(TaggingTranslator))
        .build()?;
    let report = pipeline.run_at(reference_now()).await?;

    assert_eq!(report.articles_collected, 4);
    let headlines: Vec<&str> = report.sections.headlines.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(headlines, vec!["Verge 1", "Crunch 1"]);
    assert_eq!(report.sections.industry.len(), 2);
    assert!(report.sections.highlights.is_empty());
    assert!(report.sections.iter().all(|a| a.summary.starts_with("[zh] ")));

    let markdown = tokio::fs::read_to_string(&report.dashboard_path).await?;
    assert!(markdown.contains("[Verge 1](https://example.com/verge-1)"));
    assert!(markdown.contains("[zh] About Verge 1"));
    assert_eq!(markdown.matches(MARKDOWN_PLACEHOLDER).count(), 1);

    let history = tokio::fs::read_to_string(&report.history_path).await?;
    assert_eq!(history, markdown);

    let timeline = tokio::fs::read_to_string(config.timeline_document()).await?;
    assert!(timeline.contains(&format!("## {}", local_date_key())));
    assert!(timeline.contains("Verge 1 · Crunch 1"));
    Ok(())
}

#[tokio::test]
async fn test_failed_source_is_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    let fetcher = StaticFetcher::new()
        .with_failure(VERGE, "HTTP 503: Service Unavailable")
        .with_body(CRUNCH, rss_feed(&[("Crunch 1", 2)]));

    let pipeline = PipelineBuilder::new(test_config(&dir))
        .fetcher(Box::new(fetcher))
        .translator(Box::new(PassthroughTranslator))
        .build()?;
    let report = pipeline.run_at(reference_now()).await?;

    assert_eq!(report.articles_collected, 1);
    assert!(matches!(report.sources[0].status, SourceStatus::Failed(_)));
    assert_eq!(report.sources[1].status, SourceStatus::Recent);
    Ok(())
}

#[tokio::test]
async fn test_malformed_feed_does_not_stop_other_sources() -> Result<()> {
    let dir = TempDir::new()?;
    let fetcher = StaticFetcher::new()
        .with_body(VERGE, b"<?xml version=\"1.0\"?><rs".to_vec())
        .with_body(CRUNCH, rss_feed(&[("Crunch 1", 2), ("Crunch 2", 4)]));

    let pipeline = PipelineBuilder::new(test_config(&dir))
        .fetcher(Box::new(fetcher))
        .translator(Box::new(PassthroughTranslator))
        .build()?;
    let report = pipeline.run_at(reference_now()).await?;

    assert!(matches!(report.sources[0].status, SourceStatus::Failed(_)));
    assert_eq!(report.sources[1].status, SourceStatus::Recent);
    assert_eq!(report.articles_collected, 2);
    let headlines: Vec<&str> = report.sections.headlines.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(headlines, vec!["Crunch 1", "Crunch 2"]);
    Ok(())
}

#[tokio::test]
async fn test_rerun_same_day_keeps_one_timeline_entry() -> Result<()> {
    let dir = TempDir::new()?;
    let config = test_config(&dir);

    let first = PipelineBuilder::new(config.clone())
        .fetcher(Box::new(StaticFetcher::new().with_body(VERGE, rss_feed(&[("Morning", 1)]))))
        .translator(Box::new(PassthroughTranslator))
        .build()?;
    first.run_at(reference_now()).await?;

    let fetcher = StaticFetcher::new().with_body(VERGE, rss_feed(&[("Evening", 0)]));
    let second = PipelineBuilder::new(config.clone())
        .fetcher(Box::new(fetcher))
        .translator(Box::new(PassthroughTranslator))
        .build()?;
    let report = second.run_at(reference_now() + Duration::minutes(5)).await?;

    assert_eq!(report.recent_timeline.len(), 1);
    assert_eq!(report.recent_timeline[0].headlines, vec!["Evening"]);

    let timeline = tokio::fs::read_to_string(config.timeline_document()).await?;
    assert_eq!(timeline.matches(&format!("## {}", local_date_key())).count(), 1);
    assert!(!timeline.contains("Morning"));

    let history = tokio::fs::read_to_string(&report.history_path).await?;
    assert!(history.contains("Evening"));
    assert!(!history.contains("Morning"));
    Ok(())
}

#[tokio::test]
async fn test_rag_block_is_rendered_when_present() -> Result<()> {
    let dir = TempDir::new()?;
    let config = test_config(&dir);
    tokio::fs::create_dir_all(config.rag_data().parent().unwrap()).await?;
    tokio::fs::write(
        config.rag_data(),
        r#"{
            "papers": [
                {"title": "Agents at scale", "url": "https://arxiv.org/abs/1", "abstract": "Study of agents"},
                {"title": "P2", "url": "https://arxiv.org/abs/2"},
                {"title": "P3", "url": "https://arxiv.org/abs/3"},
                {"title": "P4 hidden", "url": "https://arxiv.org/abs/4"}
            ],
            "projects": [{"name": "agent-kit", "url": "https://github.com/x/agent-kit", "description": "Toolkit", "stars": 120}],
            "models": [],
            "last_updated": "2026-10-18"
        }"#,
    )
    .await?;

    let pipeline = PipelineBuilder::new(config.clone())
        .fetcher(Box::new(StaticFetcher::new()))
        .translator(Box::new(PassthroughTranslator))
        .build()?;
    pipeline.run_at(reference_now()).await?;

    let markdown = tokio::fs::read_to_string(config.dashboard_markdown()).await?;
    assert!(markdown.contains("[Agents at scale](https://arxiv.org/abs/1)"));
    assert!(markdown.contains("agent-kit"));
    assert!(!markdown.contains("P4 hidden"));

    let html = tokio::fs::read_to_string(config.dashboard_html()).await?;
    assert!(html.contains("Agents at scale"));
    Ok(())
}

#[tokio::test]
async fn test_corrupt_rag_data_is_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    let config = test_config(&dir);
    tokio::fs::create_dir_all(config.rag_data().parent().unwrap()).await?;
    tokio::fs::write(config.rag_data(), "{ not json").await?;

    let pipeline = PipelineBuilder::new(config.clone())
        .fetcher(Box::new(StaticFetcher::new().with_body(VERGE, rss_feed(&[("Verge 1", 1)]))))
        .translator(Box::new(PassthroughTranslator))
        .build()?;
    let report = pipeline.run_at(reference_now()).await?;

    assert_eq!(report.articles_collected, 1);
    let markdown = tokio::fs::read_to_string(config.dashboard_markdown()).await?;
    assert!(!markdown.contains("Research & RAG"));
    let html = tokio::fs::read_to_string(config.dashboard_html()).await?;
    assert!(!html.contains("AI Agent Research"));
    Ok(())
}

#[tokio::test]
async fn test_sources_are_fetched_once_each() -> Result<()> {
    let dir = TempDir::new()?;
    let fetcher = std::sync::Arc::new(StaticFetcher::new());

    struct Shared(std::sync::Arc<StaticFetcher>);

    #[async_trait::async_trait]
    impl FeedFetcher for Shared {
        async fn fetch(&self, source: &Source) -> std::result::Result<Vec<u8>, FetchError> {
            self.0.fetch(source).await
        }
    }

    let pipeline = PipelineBuilder::new(test_config(&dir))
        .fetcher(Box::new(Shared(fetcher.clone())))
        .translator(Box::new(PassthroughTranslator))
        .build()?;
    pipeline.run_at(reference_now()).await?;

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_config_from_toml() -> Result<()> {
    let config = DashboardConfig::from_toml(
        r#"
workspace = "out"

[aggregation]
lookback_hours = 24

[translation]
enabled = false

[[sources]]
name = "Example"
url = "https://example.com/feed.xml"
"#,
    )?;

    assert_eq!(config.workspace, std::path::PathBuf::from("out"));
    assert_eq!(config.aggregation.lookback_hours, 24);
    assert_eq!(config.aggregation.fallback_per_source, 2);
    assert!(!config.translation.enabled);
    assert_eq!(config.timeline.retention, 90);
    assert_eq!(config.sources.len(), 1);
    assert_eq!(config.dashboard_markdown(), std::path::PathBuf::from("out/DASHBOARD.md"));
    Ok(())
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let bad_scheme = DashboardConfig::from_toml(
        r#"
[[sources]]
name = "Local file"
url = "file:///tmp/feed.xml"
"#,
    );
    assert!(matches!(bad_scheme, Err(DashboardError::Config(_))));

    let bad_url = DashboardConfig::from_toml(
        r#"
[[sources]]
name = "Broken"
url = "not a url"
"#,
    );
    assert!(matches!(bad_url, Err(DashboardError::InvalidUrl(_))));

    let bad_toml = DashboardConfig::from_toml("workspace = [");
    assert!(matches!(bad_toml, Err(DashboardError::ConfigFormat(_))));

    let huge_lookback = DashboardConfig::from_toml(
        r#"
[aggregation]
lookback_hours = 2562047788015
"#,
    );
    assert!(matches!(huge_lookback, Err(DashboardError::Config(_))));

    assert!(DashboardConfig::default().validate().is_ok());
}

#[tokio::test]
async fn test_load_reads_explicit_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("dashboard.toml");
    tokio::fs::write(&path, "[timeline]\nrecent = 3\n").await?;

    assert_eq!(DashboardConfig::file_to_load(Some(&path)), Some(path.clone()));
    let config = DashboardConfig::load(Some(&path))?;
    assert_eq!(config.timeline.recent, 3);
    assert_eq!(config.timeline.retention, 90);
    Ok(())
}

#[tokio::test]
async fn test_missing_explicit_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let result = DashboardConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(DashboardError::Config(_))));
}
