use crate::http::TransportError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection error: {reason}")]
    Connection { reason: String },

    #[error("HTTP error {status}")]
    Http { status: StatusCode },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("gave up after {attempts} attempts, last error: {last}")]
    ExhaustedRetries {
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Timeouts, connection failures, 5xx and 429 are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection { .. } => true,
            Self::Http { status } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::MalformedResponse { .. } | Self::ExhaustedRetries { .. } => false,
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::Timeout,
            TransportError::Connection { reason } => Self::Connection { reason },
            TransportError::InvalidResponse { reason } => Self::MalformedResponse { reason },
        }
    }
}
