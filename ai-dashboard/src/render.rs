//! Markdown and HTML renderings of a run.

use crate::rag::{RagDataset, RagRecord};
use crate::sections::{SectionKind, Sections};
use crate::timeline::{TimelineEntry, NO_DATA};
use crate::types::Article;
use chrono::{DateTime, Duration, Local};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Placeholder written in place of an empty Markdown section.
pub const MARKDOWN_PLACEHOLDER: &str = "_(No data)_";

const TITLE: &str = "🤖 AI Daily Dashboard";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Everything a renderer needs for one run.
pub struct DashboardView<'a> {
    pub generated_at: DateTime<Local>,
    pub sections: &'a Sections,
    pub rag: &'a RagDataset,
    /// Most recent timeline entries, newest first
    pub timeline: &'a [TimelineEntry],
}

fn article_markdown(article: &Article) -> String {
    let mut line = format!(
        "- **[{}]({})**  _{} · {}_  ",
        article.title,
        article.link,
        article.source,
        article.published.format(TIMESTAMP_FORMAT)
    );
    if !article.summary.is_empty() {
        line.push_str(&format!("\n  {}", article.summary));
    }
    line
}

fn rag_markdown(rag: &RagDataset) -> Option<String> {
    if rag.is_empty() {
        return None;
    }

    let mut lines = vec!["## 🤖 Research & RAG".to_string(), String::new()];
    for (heading, records) in rag.shown() {
        lines.push(format!("### {}", heading));
        lines.push(String::new());
        for record in records {
            lines.push(format!("- **[{}]({})**  ", record.display_name(), record.url));
            if !record.blurb().is_empty() {
                lines.push(format!("  {}", record.blurb()));
            }
            lines.push(String::new());
        }
    }

    Some(lines.join("\n").trim_end().to_string())
}

pub fn render_markdown(view: &DashboardView<'_>) -> String {
    let today = view.generated_at.format("%Y-%m-%d");
    let yesterday = (view.generated_at - Duration::days(1)).format("%Y-%m-%d");
    let updated = view.generated_at.format("%Y-%m-%d %H:%M");

    let mut lines = vec![
        format!("# {}", TITLE),
        String::new(),
        format!("## 📅 {}", today),
        String::new(),
        format!("### 📰 Yesterday in AI ({})", yesterday),
        String::new(),
        format!("_Last updated: {}_", updated),
        String::new(),
        "---".to_string(),
        String::new(),
    ];

    for kind in SectionKind::ALL {
        lines.push(format!("## {}", kind.heading()));
        lines.push(String::new());
        let articles = view.sections.get(kind);
        if articles.is_empty() {
            lines.push(MARKDOWN_PLACEHOLDER.to_string());
        } else {
            lines.extend(articles.iter().map(article_markdown));
        }
        lines.push(String::new());
    }

    if let Some(block) = rag_markdown(view.rag) {
        lines.push(block);
        lines.push(String::new());
    }

    lines.extend([
        "---".to_string(),
        String::new(),
        "- Sources: RSS feeds + RAG dataset".to_string(),
        "- Coverage: the previous 24–36 hours of AI news".to_string(),
        String::new(),
        "*Generated automatically by ai-dashboard*".to_string(),
    ]);

    lines.join("\n")
}

fn article_html(article: &Article) -> String {
    format!(
        "<li><strong><a href=\"{}\" target=\"_blank\">{}</a></strong><br><span class=\"source\">{} · {}</span><p>{}</p></li>",
        encode_double_quoted_attribute(&article.link),
        encode_text(&article.title),
        encode_text(&article.source),
        article.published.format(TIMESTAMP_FORMAT),
        encode_text(&article.summary)
    )
}

fn article_list_html(articles: &[Article]) -> String {
    if articles.is_empty() {
        return format!("<p class=\"empty\">{}</p>", NO_DATA);
    }
    let items: String = articles.iter().map(article_html).collect();
    format!("<ul>{}</ul>", items)
}

fn rag_record_html(record: &RagRecord) -> String {
    format!(
        "<li><strong><a href=\"{}\" target=\"_blank\">{}</a></strong><p>{}</p></li>",
        encode_double_quoted_attribute(&record.url),
        encode_text(record.display_name()),
        encode_text(record.blurb())
    )
}

fn rag_html(rag: &RagDataset, today: &str) -> String {
    if rag.is_empty() {
        return String::new();
    }

    let mut cards = String::new();
    for (heading, records) in rag.shown() {
        let items: String = records.iter().map(rag_record_html).collect();
        cards.push_str(&format!(
            "\n                <div class=\"news-card\">\n                    <h3>{}</h3>\n                    <ul>{}</ul>\n                </div>",
            heading, items
        ));
    }

    format!(
        "\n            <section class=\"dashboard-section\">\n                <h2>📚 AI Agent Research & RAG</h2>\n                <p class=\"date-subtitle\">Updated {}</p>{}\n            </section>",
        today, cards
    )
}

fn timeline_html(entries: &[TimelineEntry]) -> String {
    let body = if entries.is_empty() {
        format!("<p class=\"empty\">{}</p>", NO_DATA)
    } else {
        let items: String = entries
            .iter()
            .map(|entry| {
                let lines: String = SectionKind::ALL
                    .iter()
                    .map(|kind| {
                        format!(
                            "<p><span class=\"label\">{}</span> {}</p>",
                            kind.heading(),
                            encode_text(&entry.summary_line(*kind))
                        )
                    })
                    .collect();
                format!(
                    "<li><strong><a href=\"{}\">{}</a></strong>{}</li>",
                    encode_double_quoted_attribute(&entry.link),
                    entry.date.format("%Y-%m-%d"),
                    lines
                )
            })
            .collect();
        format!("<ul class=\"timeline\">{}</ul>", items)
    };

    format!(
        "\n            <section class=\"dashboard-section\">\n                <h2>🗓️ Timeline</h2>\n                <div class=\"news-card\">{}</div>\n            </section>",
        body
    )
}

pub fn render_html(view: &DashboardView<'_>) -> String {
    let today = view.generated_at.format("%Y-%m-%d").to_string();
    let updated = view.generated_at.format("%Y-%m-%d %H:%M");

    let cards: String = SectionKind::ALL
        .iter()
        .map(|kind| {
            format!(
                "\n                <div class=\"news-card\">\n                    <h3>{}</h3>\n                    {}\n                </div>",
                kind.heading(),
                article_list_html(view.sections.get(*kind))
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI Daily Dashboard</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <div class="container">
        <header>
            <h1>{title}</h1>
            <p class="subtitle">Tracking the latest in AI · updated daily</p>
            <div class="last-updated">Last updated: {updated}</div>
        </header>
        <main>
            <section class="dashboard-section">
                <h2>📅 {today}</h2>
                <p class="date-subtitle">Yesterday in AI</p>{cards}
            </section>{rag}{timeline}
        </main>
        <footer>
            <p>Generated automatically by ai-dashboard</p>
        </footer>
    </div>
</body>
</html>
"#,
        title = TITLE,
        updated = updated,
        today = today,
        cards = cards,
        rag = rag_html(view.rag, &today),
        timeline = timeline_html(view.timeline),
    )
}
