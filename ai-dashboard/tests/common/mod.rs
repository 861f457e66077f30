#![allow(dead_code)]

use ai_dashboard::traits::FeedFetcher;
use ai_dashboard::translate::Translator;
use ai_dashboard::{Article, DashboardError, FetchError, Source};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

/// Fixed reference time used across tests.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap()
}

pub fn article(source: &str, title: &str, hours_ago: i64) -> Article {
    Article {
        title: title.to_string(),
        link: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
        source: source.to_string(),
        published: reference_now() - Duration::hours(hours_ago),
        summary: format!("Summary of {}", title),
    }
}

/// RSS 2.0 document with one item per `(title, hours_ago)`.
pub fn rss_feed(items: &[(&str, i64)]) -> Vec<u8> {
    let items: String = items
        .iter()
        .map(|(title, hours_ago)| {
            let published = reference_now() - Duration::hours(*hours_ago);
            format!(
                "<item><title>{}</title><link>https://example.com/{}</link><pubDate>{}</pubDate><description>&lt;p&gt;About {}&lt;/p&gt;</description></item>",
                title,
                title.to_lowercase().replace(' ', "-"),
                published.to_rfc2822(),
                title
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Test feed</title><link>https://example.com</link><description>Test</description>{}</channel></rss>"#,
        items
    )
    .into_bytes()
}

/// Serves canned bodies per source URL; unknown URLs fail.
pub struct StaticFetcher {
    responses: HashMap<String, Result<Vec<u8>, String>>,
    pub calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_body(mut self, url: &str, body: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), Ok(body));
        self
    }

    pub fn with_failure(mut self, url: &str, cause: &str) -> Self {
        self.responses.insert(url.to_string(), Err(cause.to_string()));
        self
    }
}

#[async_trait]
impl FeedFetcher for StaticFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(&source.url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(cause)) => Err(FetchError::new(&source.name, cause)),
            None => Err(FetchError::new(&source.name, "connection refused")),
        }
    }
}

/// Always fails, like an unreachable translation endpoint.
pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    fn translator_name(&self) -> String {
        "Failing".to_string()
    }

    async fn translate(&self, _text: &str) -> ai_dashboard::Result<String> {
        Err(DashboardError::Translate("quota exceeded".to_string()))
    }
}

/// Tags text so tests can tell translated output apart.
pub struct TaggingTranslator;

#[async_trait]
impl Translator for TaggingTranslator {
    fn translator_name(&self) -> String {
        "Tagging".to_string()
    }

    async fn translate(&self, text: &str) -> ai_dashboard::Result<String> {
        Ok(format!("[zh] {}", text))
    }
}

/// Accept one HTTP request on a local port and answer it with `status` and
/// `body`. Resolves the receiver with the raw request head.
pub async fn serve_once(status: &'static str, content_type: &'static str, body: Vec<u8>) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        request.extend_from_slice(&buf[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&body).await;
            let _ = socket.shutdown().await;
            let _ = tx.send(String::from_utf8_lossy(&request).to_string());
        }
    });

    (format!("http://{}", addr), rx)
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/feed.xml", addr)
}
