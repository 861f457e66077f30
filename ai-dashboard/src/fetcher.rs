use crate::traits::FeedFetcher;
use crate::types::{FetchConfig, FetchError, Result, Source};
use async_trait::async_trait;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP feed fetcher with a per-request timeout and a short retry budget.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Use a preconfigured client. The client is expected to carry the
    /// timeout and user agent; the config still drives retries and limits.
    pub fn with_client(client: Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    pub async fn fetch_source(&self, source: &Source) -> std::result::Result<Vec<u8>, FetchError> {
        let start_time = Instant::now();
        debug!("Fetching feed: {} ({})", source.name, source.url);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 8),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(
                self.config.timeout_seconds * (u64::from(self.config.max_retries) + 1),
            )),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.fetch_once(source).await {
                Ok(body) => {
                    info!(
                        "Fetched {} ({} bytes in {}ms)",
                        source.name,
                        body.len(),
                        start_time.elapsed().as_millis()
                    );
                    return Ok(body);
                }
                Err(e) => {
                    last_error = Some(e);

                    if attempt < self.config.max_retries {
                        if let Some(delay) = backoff.next_backoff() {
                            warn!(
                                "Attempt {} failed for {}, retrying in {:?}",
                                attempt + 1,
                                source.name,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                    break;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::new(&source.name, "no attempt was made")))
    }

    async fn fetch_once(&self, source: &Source) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| FetchError::new(&source.name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                &source.name,
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        let max_bytes = self.config.max_feed_size_mb * 1024 * 1024;
        if let Some(content_length) = response.content_length() {
            if content_length as usize > max_bytes {
                return Err(FetchError::new(
                    &source.name,
                    format!("feed too large: {} bytes", content_length),
                ));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::new(&source.name, e))?;

        if body.len() > max_bytes {
            return Err(FetchError::new(
                &source.name,
                format!("feed too large: {} bytes", body.len()),
            ));
        }

        Ok(body.to_vec())
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl FeedFetcher for Fetcher {
    async fn fetch(&self, source: &Source) -> std::result::Result<Vec<u8>, FetchError> {
        self.fetch_source(source).await
    }
}
