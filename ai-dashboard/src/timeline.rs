//! Per-day history archive and the rolling timeline.
//!
//! Every run writes the full dashboard to `history/YYYY-MM-DD.md` and
//! upserts a compact entry for the day into two documents:
//!
//! - `timeline.json`: newest-first list, one entry per date, capped at the
//!   retention count;
//! - `TIMELINE.md`: one `## YYYY-MM-DD` block per date, newest on top.
//!
//! Re-running on the same day replaces that day everywhere and leaves
//! every other date untouched.

use crate::config::DashboardConfig;
use crate::sections::{SectionKind, Sections};
use crate::types::Result;
use crate::utils::fs::write_artifact;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Sentinel shown for a section without articles.
pub const NO_DATA: &str = "No data";
pub const TITLE_SEPARATOR: &str = " · ";
pub const TITLES_PER_SECTION: usize = 2;

const TIMELINE_HEADER: &str = "# 🗓️ AI Dashboard Timeline\n\n";
const HISTORY_DIR_NAME: &str = "history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub updated: DateTime<Utc>,
    pub headlines: Vec<String>,
    pub industry: Vec<String>,
    pub highlights: Vec<String>,
    /// Path of the day's archive, relative to the workspace
    pub link: String,
}

impl TimelineEntry {
    pub fn from_sections(date: NaiveDate, updated: DateTime<Utc>, sections: &Sections, link: String) -> Self {
        let titles = |kind: SectionKind| -> Vec<String> {
            sections
                .get(kind)
                .iter()
                .take(TITLES_PER_SECTION)
                .map(|a| a.title.clone())
                .collect()
        };

        Self {
            date,
            updated,
            headlines: titles(SectionKind::Headlines),
            industry: titles(SectionKind::Industry),
            highlights: titles(SectionKind::Highlights),
            link,
        }
    }

    pub fn titles(&self, kind: SectionKind) -> &[String] {
        match kind {
            SectionKind::Headlines => &self.headlines,
            SectionKind::Industry => &self.industry,
            SectionKind::Highlights => &self.highlights,
        }
    }

    /// Titles of one section joined for display, or [`NO_DATA`].
    pub fn summary_line(&self, kind: SectionKind) -> String {
        join_titles(self.titles(kind))
    }

    pub fn heading(&self) -> String {
        block_heading(self.date)
    }

    /// The Markdown block this entry owns in `TIMELINE.md`.
    pub fn to_markdown_block(&self) -> String {
        let mut block = format!(
            "{}\n\n_Updated {}_\n\n",
            self.heading(),
            self.updated.format("%Y-%m-%d %H:%M UTC")
        );
        for kind in SectionKind::ALL {
            block.push_str(&format!("- **{}**: {}\n", kind.heading(), self.summary_line(kind)));
        }
        block.push_str(&format!("- [Full report]({})\n\n", self.link));
        block
    }
}

pub fn join_titles(titles: &[String]) -> String {
    if titles.is_empty() {
        NO_DATA.to_string()
    } else {
        titles.join(TITLE_SEPARATOR)
    }
}

fn block_heading(date: NaiveDate) -> String {
    format!("## {}", date.format("%Y-%m-%d"))
}

/// Insert `entry` at the front, dropping any older entry for the same date,
/// then cap the list at `retention`.
pub fn upsert_entry(entries: &mut Vec<TimelineEntry>, entry: TimelineEntry, retention: usize) {
    entries.retain(|e| e.date != entry.date);
    entries.insert(0, entry);
    entries.truncate(retention);
}

/// Replace the block owned by `date` in a timeline document.
///
/// The old block (heading `## YYYY-MM-DD` up to the next `## ` heading) is
/// removed and `block` is placed above all remaining blocks. Text before the
/// first block and every other block is kept byte for byte.
pub fn upsert_block(document: &str, date: NaiveDate, block: &str) -> String {
    let heading = block_heading(date);

    let mut preamble = String::new();
    let mut blocks: Vec<String> = Vec::new();
    for line in document.split_inclusive('\n') {
        if line.starts_with("## ") {
            blocks.push(String::new());
        }
        match blocks.last_mut() {
            Some(current) => current.push_str(line),
            None => preamble.push_str(line),
        }
    }

    if preamble.trim().is_empty() {
        preamble = TIMELINE_HEADER.to_string();
    } else if !preamble.ends_with("\n\n") {
        preamble.push_str(if preamble.ends_with('\n') { "\n" } else { "\n\n" });
    }

    let mut output = preamble;
    output.push_str(block);
    for existing in blocks {
        let existing_heading = existing.lines().next().unwrap_or_default().trim_end();
        if existing_heading == heading {
            debug!("Replacing timeline block for {}", heading);
            continue;
        }
        output.push_str(&existing);
    }
    output
}

/// Full dashboards, one document per calendar day.
pub struct HistoryArchive {
    dir: PathBuf,
}

impl HistoryArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.history_dir())
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.md", date.format("%Y-%m-%d")))
    }

    /// Link to the day's archive as written into the timeline.
    pub fn link_for(&self, date: NaiveDate) -> String {
        format!("{}/{}.md", HISTORY_DIR_NAME, date.format("%Y-%m-%d"))
    }

    /// Write `document` as the archive for `date`, replacing any earlier one.
    pub async fn save_history(&self, document: &str, date: NaiveDate) -> Result<PathBuf> {
        let path = self.path_for(date);
        write_artifact(&path, document).await?;
        info!("📚 Archived dashboard to {}", path.display());
        Ok(path)
    }
}

/// Date-keyed timeline persisted as JSON plus a Markdown rendering.
pub struct TimelineStore {
    document_path: PathBuf,
    index_path: PathBuf,
    retention: usize,
    recent: usize,
}

impl TimelineStore {
    pub fn new(document_path: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
            index_path: index_path.into(),
            retention: 90,
            recent: 7,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.timeline_document(), config.timeline_index())
            .with_retention(config.timeline.retention)
            .with_recent(config.timeline.recent)
    }

    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention.max(1);
        self
    }

    pub fn with_recent(mut self, recent: usize) -> Self {
        self.recent = recent;
        self
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Read the stored index. A missing, unreadable or corrupt index is
    /// treated as empty.
    pub async fn load_index(&self) -> Vec<TimelineEntry> {
        let content = match tokio::fs::read_to_string(&self.index_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("⚠️ Cannot read {}, starting a fresh timeline: {}", self.index_path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<TimelineEntry>>(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("⚠️ Timeline index {} is corrupt, starting fresh: {}", self.index_path.display(), e);
                Vec::new()
            }
        }
    }

    /// Build the day's entry from `sections` and upsert it.
    pub async fn update_timeline(
        &self,
        date: NaiveDate,
        updated: DateTime<Utc>,
        sections: &Sections,
        link: String,
    ) -> Result<Vec<TimelineEntry>> {
        let entry = TimelineEntry::from_sections(date, updated, sections, link);
        self.upsert(entry).await
    }

    /// Upsert `entry` into both timeline documents and return the most
    /// recent entries for rendering.
    pub async fn upsert(&self, entry: TimelineEntry) -> Result<Vec<TimelineEntry>> {
        let document = match tokio::fs::read_to_string(&self.document_path).await {
            Ok(document) => document,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                warn!("⚠️ Cannot read {}, rewriting it: {}", self.document_path.display(), e);
                String::new()
            }
        };
        let document = upsert_block(&document, entry.date, &entry.to_markdown_block());
        write_artifact(&self.document_path, &document).await?;

        let mut entries = self.load_index().await;
        let date = entry.date;
        upsert_entry(&mut entries, entry, self.retention);
        let json = serde_json::to_string_pretty(&entries)?;
        write_artifact(&self.index_path, &json).await?;

        info!("🗓️ Timeline updated for {} ({} entries kept)", date, entries.len());

        entries.truncate(self.recent);
        Ok(entries)
    }
}
