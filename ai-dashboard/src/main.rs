use ai_dashboard::aggregator::SourceStatus;
use ai_dashboard::logging::init_logging;
use ai_dashboard::{DashboardConfig, DashboardPipeline};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Generate the AI daily dashboard from the configured feeds.
#[derive(Debug, Parser)]
#[command(name = "ai-dashboard", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ./ai-dashboard.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the output workspace directory
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Keep summaries in their original language
    #[arg(long)]
    no_translate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(workspace) = cli.workspace {
        config.workspace = workspace;
    }
    if cli.no_translate {
        config.translation.enabled = false;
    }

    config
        .ensure_dirs()
        .await
        .context("failed to create output directories")?;
    init_logging(Some(&config.log_file()))?;

    match DashboardConfig::file_to_load(cli.config.as_deref()) {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    info!(
        "Starting AI dashboard: {} sources, workspace {}",
        config.sources.len(),
        config.workspace.display()
    );

    let pipeline = DashboardPipeline::from_config(config)?;
    let report = match pipeline.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("Dashboard generation failed: {}", e);
            return Err(e).context("dashboard generation failed");
        }
    };

    for source in &report.sources {
        if let SourceStatus::Failed(reason) = &source.status {
            warn!("{} was skipped this run: {}", source.source, reason);
        }
    }

    info!(
        "Run {} finished: {} articles, dashboard at {}",
        report.run_id,
        report.articles_collected,
        report.dashboard_path.display()
    );
    println!("Dashboard updated successfully.");
    Ok(())
}
