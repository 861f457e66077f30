pub mod types;
pub mod config;
pub mod traits;
pub mod utils;
pub mod fetcher;
pub mod parser;
pub mod aggregator;
pub mod sections;
pub mod translate;
pub mod timeline;
pub mod rag;
pub mod render;
pub mod logging;
pub mod pipeline;

pub use types::*;
pub use config::DashboardConfig;
pub use traits::FeedFetcher;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use aggregator::{Aggregation, RecencyAggregator, SourceBatch, SourceStatus};
pub use sections::{SectionKind, Sections};
pub use translate::{GoogleTranslator, PassthroughTranslator, Translator};
pub use timeline::{HistoryArchive, TimelineEntry, TimelineStore};
pub use rag::RagDataset;
pub use pipeline::{DashboardPipeline, PipelineBuilder, RunReport};
