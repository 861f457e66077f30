/// Text processing utilities
pub mod text {
    use scraper::Html;

    /// Collapse every run of whitespace into a single space and trim the ends.
    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Extract the visible text of an HTML fragment.
    ///
    /// Tags become word breaks, entities are decoded and whitespace collapsed.
    pub fn strip_html(html: &str) -> String {
        if !html.contains('<') && !html.contains('&') {
            return collapse_whitespace(html);
        }

        let fragment = Html::parse_fragment(html);
        let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
        collapse_whitespace(&text)
    }

    /// Keep at most `max_chars` characters, never splitting a code point.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_index, _)) => text[..byte_index].trim_end().to_string(),
            None => text.to_string(),
        }
    }
}

/// Writing artifacts to disk
pub mod fs {
    use crate::types::{DashboardError, Result};
    use std::path::Path;

    /// Overwrite `path` with `contents`, creating the parent directory first.
    pub async fn write_artifact(path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| DashboardError::Write {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        tokio::fs::write(path, contents)
            .await
            .map_err(|source| DashboardError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}
