use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tracing::info;

use crate::error::PipelineError;
use crate::models::feed::FeedDocument;

/// Source of the raw GeoJSON feed document.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self) -> Result<FeedDocument, PipelineError>;
}

/// Fetches the feed over HTTP. A stuck request is cut off by the client timeout.
pub struct HttpFeedClient {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, PipelineError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/geo+json, application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("quake-alerts/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            url: url.to_owned(),
            client,
        })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self) -> Result<FeedDocument, PipelineError> {
        info!("Fetching earthquake feed from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::FeedStatus(status));
        }

        Ok(response.json::<FeedDocument>().await?)
    }
}
