use crate::config::TranslationConfig;
use crate::sections::{SectionKind, Sections};
use crate::types::{DashboardError, Result};
use crate::utils::text::truncate_chars;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Trait for services that translate article text
#[async_trait]
pub trait Translator: Send + Sync {
    /// Name used in logs
    fn translator_name(&self) -> String;

    /// Translate `text` into the configured target language.
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Translate `text`, handing back the original on any failure.
pub async fn translate_or_original(translator: &dyn Translator, text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    match translator.translate(text).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!(
                "⚠️ {} failed, keeping original text: {}",
                translator.translator_name(),
                e
            );
            text.to_string()
        }
    }
}

/// Translate the summary of every rendered article, one attempt each.
pub async fn translate_sections(translator: &dyn Translator, sections: &Sections) -> Sections {
    let mut translated = Sections::default();

    for kind in SectionKind::ALL {
        for article in sections.get(kind) {
            let summary = translate_or_original(translator, &article.summary).await;
            translated.get_mut(kind).push(article.with_summary(summary));
        }
    }

    info!(
        "Translated {} summaries with {}",
        translated.len(),
        translator.translator_name()
    );
    translated
}

/// Client for the public Google Translate endpoint.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    target_language: String,
    max_chars: usize,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &TranslationConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            target_language: config.target_language.clone(),
            max_chars: config.max_chars,
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn translator_name(&self) -> String {
        format!("Google Translate ({})", self.target_language)
    }

    async fn translate(&self, text: &str) -> Result<String> {
        let query = truncate_chars(text, self.max_chars);
        debug!("Translating {} chars to {}", query.chars().count(), self.target_language);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target_language.as_str()),
                ("dt", "t"),
                ("q", query.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Translate(format!("HTTP {}", status.as_u16())));
        }

        let body: serde_json::Value = response.json().await?;
        extract_translation(&body)
            .ok_or_else(|| DashboardError::Translate("response carried no translated text".to_string()))
    }
}

/// The endpoint answers with `[[["translated", "original", ...], ...], ...]`;
/// the translated segments are concatenated.
pub fn extract_translation(body: &serde_json::Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|v| v.as_str()))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Returns text unchanged; used when translation is disabled.
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    fn translator_name(&self) -> String {
        "Passthrough".to_string()
    }

    async fn translate(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}
