use super::HttpUrl;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection error: {reason}")]
    Connection { reason: String },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },
}

/// A fully buffered response. Non-success statuses are not errors at this level.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs a single GET request. Retrying is the caller's business.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &HttpUrl) -> Result<HttpResponse, TransportError>;
}
