//! reqwest-backed production transport.

use super::{ApiResponse, ApiTransport, Method, RequestOptions, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Transport that performs real HTTPS calls.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn request(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, TransportError> {
        let method = match options.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        debug!("{} {}", options.method.as_str(), url);

        let mut builder = self.client.request(method, url);
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.json {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::new(err.to_string()))?;

        let status_code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::new(err.to_string()))?;

        debug!("{} {} -> {}", options.method.as_str(), url, status_code);

        Ok(ApiResponse { status_code, body })
    }
}
