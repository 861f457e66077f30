use crate::types::{Article, DashboardError, Result};
use crate::utils::text::{collapse_whitespace, strip_html, truncate_chars};
use chrono::{DateTime, Utc};
use feed_rs::parser;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info, warn};

/// Summaries are cut to this many characters before translation or rendering.
pub const SUMMARY_MAX_CHARS: usize = 320;

/// Turns raw RSS / Atom documents into normalized [`Article`]s.
pub struct FeedParser {
    summary_max_chars: usize,
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            summary_max_chars: SUMMARY_MAX_CHARS,
        }
    }

    pub fn with_summary_limit(mut self, max_chars: usize) -> Self {
        self.summary_max_chars = max_chars;
        self
    }

    /// Parse a feed document, labelling every article with `source`.
    ///
    /// RSS `item`s and Atom `entry`s are both accepted. A document that is
    /// not a feed at all fails as a whole; individual records missing a title
    /// or link are skipped.
    pub fn parse(&self, content: &[u8], source: &str) -> Result<Vec<Article>> {
        self.parse_at(content, source, Utc::now())
    }

    /// Like [`FeedParser::parse`], with `now` used for undated records.
    pub fn parse_at(&self, content: &[u8], source: &str, now: DateTime<Utc>) -> Result<Vec<Article>> {
        debug!("Parsing feed content from {} ({} bytes)", source, content.len());

        let feed = parser::parse(content).map_err(|e| DashboardError::Parse {
            source_name: source.to_string(),
            message: e.to_string(),
        })?;

        let total = feed.entries.len();

        // feed-rs only reads `href` attributes on Atom links and text on RSS
        // links; anything else needs a second look at the raw document.
        let raw_records = if feed.entries.iter().any(|e| primary_link(&e.links).is_none()) {
            scan_records(content)
        } else {
            Vec::new()
        };

        let articles: Vec<Article> = feed
            .entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let fallback = fallback_link(&raw_records, total, index, &entry);
                self.parse_entry(entry, fallback, source, now)
            })
            .collect();

        let skipped = total - articles.len();
        if skipped > 0 {
            warn!("⚠️ Skipped {} records without title or link from {}", skipped, source);
        }
        info!("Parsed {} articles from {}", articles.len(), source);

        Ok(articles)
    }

    fn parse_entry(
        &self,
        entry: feed_rs::model::Entry,
        fallback_link: Option<String>,
        source: &str,
        now: DateTime<Utc>,
    ) -> Option<Article> {
        let title = entry
            .title
            .map(|t| collapse_whitespace(&t.content))
            .unwrap_or_default();
        let link = primary_link(&entry.links)
            .or(fallback_link)
            .unwrap_or_default();

        if title.is_empty() || link.is_empty() {
            return None;
        }

        // feed-rs hands back UTC already; undated or unparsable records are
        // stamped with the ingestion time instead of being rejected.
        let published = entry.published.or(entry.updated).unwrap_or(now);

        let raw_summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();
        let summary = truncate_chars(&strip_html(&raw_summary), self.summary_max_chars);

        Some(Article {
            title,
            link,
            source: source.to_string(),
            published,
            summary,
        })
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the article link: an `alternate` (or untyped) link first, then any
/// link with a non-empty target.
fn primary_link(links: &[feed_rs::model::Link]) -> Option<String> {
    let usable = |href: &str| !href.trim().is_empty();

    links
        .iter()
        .find(|l| usable(&l.href) && matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.iter().find(|l| usable(&l.href)))
        .map(|l| l.href.trim().to_string())
}

/// Title and link of one `item` / `entry` element as written in the XML.
#[derive(Debug, Default)]
struct RawRecord {
    title: String,
    link_text: String,
    link_href: String,
}

impl RawRecord {
    /// Inline link text wins over a link element's `href`.
    fn link(&self) -> Option<String> {
        [&self.link_text, &self.link_href]
            .into_iter()
            .find(|l| !l.is_empty())
            .cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawField {
    Title,
    Link,
}

impl RawField {
    fn tag(&self) -> &'static [u8] {
        match self {
            RawField::Title => b"title",
            RawField::Link => b"link",
        }
    }
}

fn fallback_link(
    records: &[RawRecord],
    total: usize,
    index: usize,
    entry: &feed_rs::model::Entry,
) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    if records.len() == total {
        return records.get(index).and_then(RawRecord::link);
    }

    let title = entry
        .title
        .as_ref()
        .map(|t| collapse_whitespace(&t.content))?;
    records
        .iter()
        .find(|r| r.title == title)
        .and_then(RawRecord::link)
}

fn href_of(element: &BytesStart<'_>) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"href")
        .map(|attr| decode_entities(&String::from_utf8_lossy(&attr.value)))
        .filter(|href| !href.is_empty())
}

fn decode_entities(raw: &str) -> String {
    collapse_whitespace(&html_escape::decode_html_entities(raw))
}

/// Walk the document and collect every `item` / `entry` with its title and
/// link candidates, namespace prefixes ignored. A broken document yields
/// whatever was read before the error.
fn scan_records(content: &[u8]) -> Vec<RawRecord> {
    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::new();
    let mut records = Vec::new();
    let mut current: Option<RawRecord> = None;
    let mut field: Option<RawField> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    current = Some(RawRecord::default());
                    field = None;
                }
                b"title" if current.is_some() && field.is_none() => {
                    field = Some(RawField::Title);
                    text.clear();
                }
                b"link" if current.is_some() && field.is_none() => {
                    if let (Some(record), Some(href)) = (current.as_mut(), href_of(&e)) {
                        if record.link_href.is_empty() {
                            record.link_href = href;
                        }
                    }
                    field = Some(RawField::Link);
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"link" {
                    if let (Some(record), Some(href)) = (current.as_mut(), href_of(&e)) {
                        if record.link_href.is_empty() {
                            record.link_href = href;
                        }
                    }
                }
            }
            Ok(Event::Text(e)) if field.is_some() => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::CData(e)) if field.is_some() => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::GeneralRef(e)) if field.is_some() => {
                text.push('&');
                text.push_str(&String::from_utf8_lossy(&e));
                text.push(';');
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                match (field, current.as_mut()) {
                    (Some(f), Some(record)) if name.as_ref() == f.tag() => {
                        let value = decode_entities(&text);
                        match f {
                            RawField::Title if record.title.is_empty() => record.title = value,
                            RawField::Link if record.link_text.is_empty() => record.link_text = value,
                            _ => {}
                        }
                        field = None;
                    }
                    _ if matches!(name.as_ref(), b"item" | b"entry") => {
                        if let Some(record) = current.take() {
                            records.push(record);
                        }
                        field = None;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!("Stopped scanning raw feed at byte {}: {}", reader.buffer_position(), e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    records
}
