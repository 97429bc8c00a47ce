use crate::model::FeedError;

/// Where supplier feeds come from. Returns the raw XML body, undecoded:
/// the document's own declaration says which encoding it is in.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError>;
}
