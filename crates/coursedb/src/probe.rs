use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Reachability check for submitted image links. Format validation happens
/// before this runs; the probe only answers "does this URL serve anything".
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn verify(&self, url: &str) -> Result<(), ProbeError>;
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
}

/// Probe backed by a real HTTP client.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpProbe { client })
    }
}

#[async_trait]
impl ImageProbe for HttpProbe {
    async fn verify(&self, url: &str) -> Result<(), ProbeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeError::Status(status))
        }
    }
}
