use crate::model::SourceError;

/// Where a feed document comes from.
#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetches the raw feed document.
    async fn fetch(&self) -> Result<String, SourceError>;

    /// Path or URL, for logs.
    fn location(&self) -> &str;
}
