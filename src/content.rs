use async_trait::async_trait;

use crate::error::AssetError;

/// An opaque byte payload plus its MIME type, immutable once acquired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl Content {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }
}

/// Source of content to be packaged into an asset
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the content at `url`
    async fn fetch(&self, url: &str) -> Result<Content, AssetError>;
}

/// Plain HTTP content source
///
/// Fetches the URL body as-is and records the response content type. A
/// rendering fetcher (headless browser) can stand in behind the same trait
/// when scripted pages matter.
pub struct HttpContentSource {
    client: reqwest::Client,
}

impl HttpContentSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, url: &str) -> Result<Content, AssetError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AssetError::Fetch(e.to_string()))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "text/html".to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AssetError::Fetch(e.to_string()))?;

        Ok(Content::new(bytes.to_vec(), content_type))
    }
}
