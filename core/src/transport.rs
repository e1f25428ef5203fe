//! Executes `HttpRequest` values against the network.
//!
//! `LoanService` is generic over `Transport` so tests can replay canned
//! responses. `HttpTransport` is the production implementation on top of
//! `reqwest`; it keeps the client's default timeouts and never retries.

use std::future::Future;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform one round trip. Non-2xx statuses are returned as data; only
    /// failures to obtain a response are errors here.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    inner: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured `reqwest::Client`, e.g. one with a proxy.
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.inner.request(method, &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
