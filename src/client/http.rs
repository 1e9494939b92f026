use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use crate::config::BackendConfig;
use crate::error::{Result, StreamError};
use crate::transport::{ByteStream, StreamFuture, Transport};

pub struct HttpTransport {
    client: Client,
    backend: BackendConfig,
}

impl HttpTransport {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                StreamError::InternalError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            backend: config.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn post_stream(&self, path: &str, body: Bytes) -> StreamFuture<'_> {
        let url = self.backend.url(path);
        Box::pin(async move { self.post_stream_impl(url, body).await })
    }

    fn name(&self) -> &str {
        "http"
    }
}

impl HttpTransport {
    async fn post_stream_impl(&self, url: String, body: Bytes) -> Result<ByteStream> {
        info!(bytes = body.len(), url = %url, "sending generation request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| StreamError::UpstreamError(format!("Request failed: {}", e)))?;

        let status = response.status();
        info!(%status, "backend responded");

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StreamError::UpstreamError(format!(
                "Backend error {}: {}",
                status, error_body
            )));
        }

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| StreamError::UpstreamError(format!("Stream interrupted: {}", e)))
        });

        Ok(Box::pin(stream))
    }
}
