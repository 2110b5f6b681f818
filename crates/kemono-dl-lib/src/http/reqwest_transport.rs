use super::{HttpResponse, HttpTransport, HttpUrl, TransportError};
use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

const MAX_REDIRECTS: usize = 10;

/// [`HttpTransport`] backed by a single shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_redirect() || err.is_decode() || err.is_builder() {
        TransportError::InvalidResponse {
            reason: err.to_string(),
        }
    } else {
        TransportError::Connection {
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &HttpUrl) -> Result<HttpResponse, TransportError> {
        trace!(url = %url, "GET");

        let response = self
            .client
            .get(url.as_url().clone())
            .send()
            .await
            .map_err(classify)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify)?;

        trace!(url = %url, status = status.as_u16(), bytes = body.len(), "Response received");
        Ok(HttpResponse { status, body })
    }
}
