//! Provider retry — bounded exponential backoff for transient failures.
//!
//! Rate limits, timeouts, network errors and 5xx responses are retried
//! against the same provider. Authentication, quota and other permanent
//! failures are returned on the first occurrence.

use async_trait::async_trait;
use filechat_config::RetryConfig;
use filechat_core::error::ProviderError;
use filechat_core::provider::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How many times, how long, and how patiently to retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each following retry
    pub base_delay: Duration,
    /// Per-attempt timeout
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        }
    }

    /// Backoff before retry number `retry` (0-based).
    ///
    /// A server-provided `retry_after_secs` wins when it is longer.
    pub fn backoff(&self, retry: u32, error: &ProviderError) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry))
            .min(MAX_BACKOFF);
        match error {
            ProviderError::RateLimited { retry_after_secs } => {
                exponential.max(Duration::from_secs(*retry_after_secs).min(MAX_BACKOFF))
            }
            _ => exponential,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// A provider that retries its inner provider on transient failures.
pub struct RetryProvider {
    inner: Arc<dyn Provider>,
    policy: RetryPolicy,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn Provider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Run `attempt` until it succeeds, fails permanently, or retries run out.
    async fn run<T, F, Fut>(&self, op: &str, mut attempt: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let provider = self.inner.name().to_string();
        let mut retry = 0;

        loop {
            let error = match tokio::time::timeout(self.policy.timeout, attempt()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e,
                Err(_) => ProviderError::Timeout(format!(
                    "Provider '{}' timed out after {}s",
                    provider,
                    self.policy.timeout.as_secs()
                )),
            };

            if !error.is_retryable() || retry >= self.policy.max_retries {
                debug!(provider = %provider, op, attempts = retry + 1, "Giving up");
                return Err(error);
            }

            let delay = self.policy.backoff(retry, &error);
            warn!(
                provider = %provider,
                op,
                error = %error,
                retry = retry + 1,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                "Transient provider failure, retrying"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}

#[async_trait]
impl filechat_core::Provider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        self.run("complete", || self.inner.complete(request.clone()))
            .await
    }

    /// Retries establishing the stream only; errors after the first chunk
    /// are delivered through the channel.
    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        self.run("stream", || self.inner.stream(request.clone())).await
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        self.inner.list_models().await
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        self.inner.health_check().await
    }
}
