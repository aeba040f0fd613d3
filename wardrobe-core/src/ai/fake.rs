//! Fake AI client for testing.
//!
//! Returns scripted results in order so pipelines can run without network
//! access or API costs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use super::client::{AiClient, AiError};
use super::types::{ChatRequest, ChatResponse, Usage};

#[derive(Default)]
struct FakeState {
    script: VecDeque<Result<String, AiError>>,
    requests: Vec<ChatRequest>,
    attempt_times: Vec<Instant>,
}

/// A scripted AI client.
///
/// Each call pops the next scripted result. When the script runs out, the
/// default response is returned, or a request failure if none is set.
#[derive(Default)]
pub struct FakeAiClient {
    state: Mutex<FakeState>,
    default_response: Option<String>,
    delay: Option<Duration>,
}

impl FakeAiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client that answers every call with `content`.
    pub fn always(content: impl Into<String>) -> Self {
        Self::new().with_default_response(content)
    }

    /// Client whose every call fails at the transport level.
    pub fn failing() -> Self {
        Self::new()
    }

    pub fn with_default_response(mut self, content: impl Into<String>) -> Self {
        self.default_response = Some(content.into());
        self
    }

    /// Sleep this long inside every call before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful completion.
    pub fn push_response(self, content: impl Into<String>) -> Self {
        self.lock().script.push_back(Ok(content.into()));
        self
    }

    /// Queue a failed attempt.
    pub fn push_error(self, error: AiError) -> Self {
        self.lock().script.push_back(Err(error));
        self
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.lock().requests.len()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.lock().requests.clone()
    }

    /// Clock reading at the start of each call.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.lock().attempt_times.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let next = {
            let mut state = self.lock();
            state.requests.push(request);
            state.attempt_times.push(Instant::now());
            state.script.pop_front()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let content = match next {
            Some(result) => result?,
            None => self.default_response.clone().ok_or_else(|| {
                AiError::RequestFailed(format!(
                    "FakeAiClient: no response configured for {}",
                    prompt_name
                ))
            })?,
        };

        Ok(ChatResponse {
            content,
            usage: Usage::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::ChatMessage;

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::user("hello")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_script_then_default() {
        let client = FakeAiClient::new()
            .with_default_response("default")
            .push_error(AiError::RequestFailed("boom".to_string()))
            .push_response("first");

        assert!(client.complete("t", request()).await.is_err());
        assert_eq!(
            client.complete("t", request()).await.unwrap().content,
            "first"
        );
        assert_eq!(
            client.complete("t", request()).await.unwrap().content,
            "default"
        );
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_failing_client() {
        let client = FakeAiClient::failing();
        assert!(matches!(
            client.complete("t", request()).await,
            Err(AiError::RequestFailed(_))
        ));
    }
}
