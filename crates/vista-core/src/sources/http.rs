//! Remote backend over HTTP.
//!
//! Posts the image as multipart field `image` to `{endpoint}/api/analyze` and
//! validates the JSON reply with `backend::parse_response`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};

use super::backend::parse_response;
use super::RemoteBackend;
use crate::config::BackendConfig;
use crate::error::{SourceError, SourceResult};
use crate::input::ImageHandle;
use crate::types::{BackendAnalysis, Source};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the remote vision backend.
pub struct HttpBackend {
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.endpoint, Duration::from_millis(config.timeout_ms))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout {
                predictor: Source::RemoteBackend,
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            SourceError::unavailable(Source::RemoteBackend, format!("request failed: {e}"))
        }
    }
}

#[async_trait]
impl RemoteBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/health", self.endpoint);
        match self.client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!("Health check against {url} failed: {e}");
                false
            }
        }
    }

    async fn analyze(&self, image: &ImageHandle) -> SourceResult<BackendAnalysis> {
        let url = format!("{}/api/analyze", self.endpoint);
        let start = Instant::now();

        let part = Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(image.media_type())
            .map_err(|e| SourceError::unavailable(Source::RemoteBackend, e.to_string()))?;
        let form = Form::new().part("image", part);

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                predictor: Source::RemoteBackend,
                status_code: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        let body = resp.text().await.map_err(|e| self.request_error(e))?;
        tracing::trace!(
            "Backend answered for {:?} in {:?} ({} bytes)",
            image.file_name,
            start.elapsed(),
            body.len()
        );

        parse_response(&body)
    }
}
