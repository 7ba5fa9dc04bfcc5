//! Gateway to the remote text-generation service.
//!
//! Strategies talk to a [`ChatGateway`]; the production implementation is a
//! [`ProviderGateway`] that wraps the OpenRouter adapter with retries.

pub mod error;
pub mod openrouter;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use openrouter::{ChatProvider, OpenRouterAdapter, OpenRouterSettings};

pub use error::{ErrorContext, ProviderError};
pub use types::*;

#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// Retrying gateway over a single [`ChatProvider`].
pub struct ProviderGateway {
    provider: Arc<dyn ChatProvider>,
    config: GatewayConfig,
}

#[async_trait::async_trait]
impl ChatGateway for ProviderGateway {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ProviderError> {
        ProviderGateway::chat(self, req).await
    }
}

impl ProviderGateway {
    pub fn openrouter(
        settings: OpenRouterSettings,
        config: GatewayConfig,
    ) -> Result<Self, ProviderError> {
        let adapter = OpenRouterAdapter::new(settings)?;
        Ok(Self::with_provider(Arc::new(adapter), config))
    }

    pub fn with_provider(provider: Arc<dyn ChatProvider>, config: GatewayConfig) -> Self {
        Self { provider, config }
    }

    pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.provider.chat(&req).await {
                Ok(resp) => {
                    debug!(
                        caller = req.attribution.caller,
                        session = ?req.attribution.session_id,
                        model = req.model.model_id(),
                        attempt,
                        input_tokens = resp.input_tokens,
                        output_tokens = resp.output_tokens,
                        latency_ms = resp.latency.as_millis() as u64,
                        "chat completion succeeded"
                    );
                    return Ok(resp);
                }
                Err(err) => {
                    if !err.is_retryable() || attempt >= self.config.max_retries {
                        warn!(
                            caller = req.attribution.caller,
                            session = ?req.attribution.session_id,
                            model = req.model.model_id(),
                            attempt,
                            code = err.code(),
                            error = %err,
                            "chat completion failed"
                        );
                        return Err(err);
                    }

                    let delay = backoff_delay(self.config.retry_base_delay, attempt, &err);
                    debug!(
                        caller = req.attribution.caller,
                        attempt,
                        code = err.code(),
                        delay_ms = delay.as_millis() as u64,
                        "retrying chat completion"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Exponential backoff; a provider-supplied retry hint wins when it is longer.
fn backoff_delay(base: Duration, attempt: u32, err: &ProviderError) -> Duration {
    let exponential = base * 2u32.pow(attempt.min(5));
    match err {
        ProviderError::RateLimited { retry_after, .. } if !base.is_zero() => {
            exponential.max(*retry_after)
        }
        _ => exponential,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(100);
        let err = ProviderError::provider("openrouter", "HTTP 500", true);
        assert_eq!(backoff_delay(base, 0, &err), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 2, &err), Duration::from_millis(400));
        assert_eq!(backoff_delay(base, 9, &err), Duration::from_millis(3_200));
    }

    #[test]
    fn rate_limit_hint_is_ignored_with_zero_base() {
        let err = ProviderError::RateLimited {
            retry_after: Duration::from_secs(30),
            context: ErrorContext::new(),
        };
        assert_eq!(backoff_delay(Duration::ZERO, 0, &err), Duration::ZERO);
        assert_eq!(
            backoff_delay(Duration::from_millis(10), 0, &err),
            Duration::from_secs(30)
        );
    }
}
