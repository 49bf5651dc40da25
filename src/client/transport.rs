use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::{
    config::EndpointConfig,
    error::{Result, SeedreamError},
    models::GenerationRequest,
};

/// Outbound side of an edit call: one authenticated JSON POST.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the decoded JSON body of a 2xx answer. Any other status is an
    /// [`SeedreamError::Http`] carrying the status, its text and the body.
    async fn post_json(&self, url: &str, api_key: &str, body: &GenerationRequest) -> Result<Value>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(endpoints: &EndpointConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = endpoints.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SeedreamError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn build_headers(&self, api_key: &str) -> Result<reqwest::header::HeaderMap> {
        let mut headers = reqwest::header::HeaderMap::new();
        let bearer = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| {
                SeedreamError::Config("API key contains invalid header characters".into())
            })?;
        headers.insert(reqwest::header::AUTHORIZATION, bearer);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, api_key: &str, body: &GenerationRequest) -> Result<Value> {
        log::debug!(
            "POST {} ({} reference image(s), size {})",
            url,
            body.images.len(),
            body.size
        );

        let response = self
            .client
            .post(url)
            .headers(self.build_headers(api_key)?)
            .json(body)
            .send()
            .await
            .map_err(|e| SeedreamError::Transport(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SeedreamError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SeedreamError::Response(e.to_string()))
    }
}
