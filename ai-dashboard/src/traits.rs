use crate::types::{FetchError, Source};
use async_trait::async_trait;

/// Retrieves the raw feed document of a configured source.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the raw bytes for `source`.
    ///
    /// Implementations must bound the time spent on a single source and
    /// report every failure as a [`FetchError`] naming the source.
    async fn fetch(&self, source: &Source) -> Result<Vec<u8>, FetchError>;
}
