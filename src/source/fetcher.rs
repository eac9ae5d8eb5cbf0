use crate::config::FeedConfig;
use crate::model::SourceError;
use crate::source::ListingSource;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) LaptopSniper/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A feed stored as a JSON file on disk.
pub struct FileSource {
    path: String,
}

impl FileSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ListingSource for FileSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        debug!("Reading feed file {}", self.path);
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn location(&self) -> &str {
        &self.path
    }
}

/// A feed served over HTTP.
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ListingSource for HttpSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        debug!("GET {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::InvalidResponse {
                status: response.status().as_u16(),
                url: self.url.clone(),
            });
        }

        Ok(response.text().await?)
    }

    fn location(&self) -> &str {
        &self.url
    }
}

/// Builds the source a feed config points at; a local path wins over a URL.
pub fn source_for(feed: &FeedConfig) -> Result<Box<dyn ListingSource>, SourceError> {
    match (&feed.path, &feed.url) {
        (Some(path), _) => Ok(Box::new(FileSource::new(path.clone()))),
        (None, Some(url)) => Ok(Box::new(HttpSource::new(url.clone())?)),
        (None, None) => Err(SourceError::MissingLocation),
    }
}
