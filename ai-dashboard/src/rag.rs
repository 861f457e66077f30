use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Externally produced papers / projects / models merged into the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagDataset {
    #[serde(default)]
    pub papers: Vec<RagRecord>,
    #[serde(default)]
    pub projects: Vec<RagRecord>,
    #[serde(default)]
    pub models: Vec<RagRecord>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// One dataset record. Papers carry `title`/`abstract`, projects and models
/// `name`/`description`; anything else is kept untouched in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RagRecord {
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
            .trim()
    }

    pub fn blurb(&self) -> &str {
        self.description
            .as_deref()
            .or(self.abstract_text.as_deref())
            .unwrap_or_default()
            .trim()
    }
}

pub const PAPERS_SHOWN: usize = 3;
pub const PROJECTS_SHOWN: usize = 4;
pub const MODELS_SHOWN: usize = 2;

impl RagDataset {
    /// Load the dataset at `path`. A missing or corrupt file yields an
    /// empty dataset.
    pub async fn load(path: &Path) -> Self {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("⚠️ No RAG data at {}, skipping that block", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("⚠️ Cannot read RAG data {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(dataset) => {
                info!(
                    "Loaded RAG data: {} papers, {} projects, {} models",
                    dataset.papers.len(),
                    dataset.projects.len(),
                    dataset.models.len()
                );
                dataset
            }
            Err(e) => {
                warn!("⚠️ RAG data {} is not valid, skipping that block: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty() && self.projects.is_empty() && self.models.is_empty()
    }

    /// The blocks shown on the dashboard, each with its display limit applied.
    pub fn shown(&self) -> [(&'static str, &[RagRecord]); 3] {
        [
            ("📚 Latest AI Agent Papers", head(&self.papers, PAPERS_SHOWN)),
            ("💻 Trending Open-Source Projects", head(&self.projects, PROJECTS_SHOWN)),
            ("🤗 Hugging Face Trends", head(&self.models, MODELS_SHOWN)),
        ]
    }
}

fn head(records: &[RagRecord], n: usize) -> &[RagRecord] {
    &records[..records.len().min(n)]
}
