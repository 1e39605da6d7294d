use std::{sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    config::Settings,
    discogs::{
        rate_limit::RateLimiter,
        transport::{HttpRequest, HttpTransport, ReqwestTransport},
    },
    error::{ApiError, TransportError},
    types::Credentials,
    utils,
};

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after the failed attempt with zero-based index `attempt`:
    /// base, 2 x base, 4 x base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

/// Discogs API client: every request goes through the shared rate limiter
/// and is retried on transient failures.
pub struct DiscogsClient {
    transport: Arc<dyn HttpTransport>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    base_url: String,
    user_agent: String,
    concurrency: usize,
    per_page: u32,
}

impl DiscogsClient {
    /// Builds a client backed by `reqwest`. Spawns the rate limiter, so this
    /// must run inside a tokio runtime.
    pub fn new(settings: &Settings) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(settings.request_timeout)?;
        Ok(Self::with_transport(Arc::new(transport), settings))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>, settings: &Settings) -> Self {
        Self {
            transport,
            limiter: RateLimiter::new(settings.rate_limit, settings.rate_window),
            retry: RetryPolicy {
                max_attempts: settings.max_attempts.max(1),
                base_delay: settings.backoff_base,
            },
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            user_agent: settings.user_agent.clone(),
            concurrency: settings.concurrency.max(1),
            per_page: settings.per_page.max(1),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub(crate) fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub(crate) fn per_page(&self) -> u32 {
        self.per_page
    }

    /// GETs `url` and decodes the JSON body.
    ///
    /// # Retry behaviour
    ///
    /// - Every attempt first waits for the rate limiter, retries included.
    /// - Network failures and 5xx responses are retried with exponential
    ///   backoff until `max_attempts` is reached.
    /// - Any other non-2xx status fails at once with [`ApiError::Remote`].
    /// - A 2xx body that does not decode fails at once with [`ApiError::Decode`].
    ///
    /// The token is sent in the `Authorization` header and never appears in
    /// logs or errors; URLs are passed through [`utils::redact_token`].
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> Result<T, ApiError> {
        let safe_url = utils::redact_token(url);
        let max_attempts = self.retry.max_attempts;
        let mut last_failure = String::new();

        for attempt in 0..max_attempts {
            self.limiter.acquire().await?;

            let request = HttpRequest::get(url)
                .header("User-Agent", self.user_agent.as_str())
                .header("Authorization", format!("Discogs token={}", credentials.token));

            match self.transport.execute(request).await {
                Ok(response) if response.is_success() => {
                    return response.json::<T>().map_err(|source| ApiError::Decode {
                        url: safe_url.clone(),
                        source,
                    });
                }
                Ok(response) if response.is_server_error() => {
                    last_failure = format!(
                        "server error {} {}",
                        response.status, response.status_text
                    );
                    tracing::warn!(
                        "[Discogs API] attempt {}/{} on {} failed with server error {}",
                        attempt + 1,
                        max_attempts,
                        safe_url,
                        response.status
                    );
                }
                Ok(response) => {
                    return Err(ApiError::Remote {
                        status: response.status,
                        status_text: response.status_text,
                        url: safe_url,
                    });
                }
                Err(e) => {
                    last_failure = e.to_string();
                    tracing::warn!(
                        "[Discogs API] attempt {}/{} on {} failed: {}",
                        attempt + 1,
                        max_attempts,
                        safe_url,
                        e
                    );
                }
            }

            if attempt + 1 < max_attempts {
                let delay = self.retry.delay_for(attempt);
                tracing::debug!("retrying {} in {}ms", safe_url, delay.as_millis());
                sleep(delay).await;
            }
        }

        Err(ApiError::ExhaustedRetries {
            attempts: max_attempts,
            url: safe_url,
            last: last_failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
    }
}
