//! Retrying wrapper around a single model call.

use std::sync::Arc;
use std::time::Duration;

use super::client::{AiClient, AiError};
use super::config::AiConfig;
use super::types::ChatRequest;
use crate::error::PipelineError;
use crate::types::PipelineOutcome;

/// Sends a request to the model, retrying transport failures with
/// exponential backoff.
///
/// A response that arrives intact is returned as-is, even if its content is
/// useless; judging the content belongs to the validator.
#[derive(Clone)]
pub struct ModelGateway {
    client: Arc<dyn AiClient>,
    max_retries: u32,
    request_timeout: Duration,
    backoff_unit: Duration,
}

impl ModelGateway {
    pub fn new(client: Arc<dyn AiClient>, config: &AiConfig) -> Self {
        Self {
            client,
            max_retries: config.max_retries.max(1),
            request_timeout: config.request_timeout,
            backoff_unit: config.backoff_unit,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay slept after the 0-indexed `attempt` fails, when another attempt follows.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Call the model. Success carries the completion text as both value and
    /// raw response.
    pub async fn call(&self, prompt_name: &str, request: ChatRequest) -> PipelineOutcome<String> {
        for attempt in 0..self.max_retries {
            tracing::debug!(
                prompt_name,
                attempt = attempt + 1,
                max_retries = self.max_retries,
                "Sending model request"
            );

            match self.attempt(prompt_name, request.clone()).await {
                Ok(content) => return PipelineOutcome::success(content.clone(), content),
                Err(e) => {
                    tracing::warn!(
                        prompt_name,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "Model request failed"
                    );
                }
            }

            if attempt + 1 < self.max_retries {
                tokio::time::sleep(self.backoff_delay(attempt)).await;
            }
        }

        tracing::error!(
            prompt_name,
            max_retries = self.max_retries,
            "Model request retries exhausted"
        );
        PipelineOutcome::failure(PipelineError::TransportExhausted, None)
    }

    async fn attempt(&self, prompt_name: &str, request: ChatRequest) -> Result<String, AiError> {
        let response = tokio::time::timeout(
            self.request_timeout,
            self.client.complete(prompt_name, request),
        )
        .await
        .map_err(|_| AiError::Timeout(self.request_timeout))??;

        Ok(response.content)
    }
}
