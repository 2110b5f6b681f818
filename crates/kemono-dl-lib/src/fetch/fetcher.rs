use super::{FetchError, RetryPolicy};
use crate::http::{HttpTransport, HttpUrl};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

/// Issues GET requests through the shared transport and retries transient failures.
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn fetch(&self, url: &HttpUrl) -> Result<Bytes, FetchError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match self.fetch_once(url).await {
                Ok(body) => {
                    if attempt > 1 {
                        debug!(url = %url, attempt, "Request succeeded after retry");
                    }
                    return Ok(body);
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(err);
            }

            if attempt >= self.policy.max_attempts {
                warn!(url = %url, attempt, error = %err, "Request failed, no attempts left");
                return Err(FetchError::ExhaustedRetries {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.policy.delay_for(attempt);
            warn!(url = %url, attempt, delay_ms = delay.as_millis() as u64, error = %err, "Request failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }

    async fn fetch_once(&self, url: &HttpUrl) -> Result<Bytes, FetchError> {
        let response = self.transport.get(url).await?;

        if response.status.is_success() {
            Ok(response.body)
        } else {
            Err(FetchError::Http {
                status: response.status,
            })
        }
    }
}
