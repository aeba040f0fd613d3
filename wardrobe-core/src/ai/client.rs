//! AI client implementation for OpenAI-compatible chat completion endpoints.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ImageUrlArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use super::config::AiConfig;
use super::types::{
    ChatMessage, ChatRequest, ChatResponse, ContentPart, MessageContent, Role, Usage,
};

/// Failure of a single attempt against the model endpoint.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

/// Trait for AI clients.
///
/// One call is one network round trip. Retrying is the gateway's job.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Complete a chat request.
    ///
    /// The `prompt_name` only labels logs.
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError>;
}

/// Client for any endpoint speaking the OpenAI chat completion protocol.
pub struct OpenAiCompatibleClient {
    client: Client<OpenAIConfig>,
    config: AiConfig,
}

impl OpenAiCompatibleClient {
    /// Create a new client from environment configuration.
    pub fn from_env() -> Result<Self, AiError> {
        let config = AiConfig::from_env()?;
        Self::new(config)
    }

    /// Create a new client with the given configuration.
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        config.validate()?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(config.api_base());
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        // Rate-limit retries belong to the gateway, so the client gives up after one attempt.
        let no_retry = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(no_retry);

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn map_error(&self, error: OpenAIError) -> AiError {
        map_openai_error(error, self.config.request_timeout)
    }
}

fn map_openai_error(error: OpenAIError, timeout: Duration) -> AiError {
    match error {
        OpenAIError::Reqwest(e) if e.is_timeout() => AiError::Timeout(timeout),
        OpenAIError::Reqwest(e) => AiError::RequestFailed(e.to_string()),
        OpenAIError::ApiError(api_error) => AiError::Api(api_error.to_string()),
        OpenAIError::JSONDeserialize(e, _) => AiError::MalformedEnvelope(e.to_string()),
        other => AiError::Api(other.to_string()),
    }
}

fn build_error(role: &str, error: OpenAIError) -> AiError {
    AiError::Api(format!("Failed to build {} message: {}", role, error))
}

/// Convert our ChatMessage to async-openai's format.
fn to_openai_message(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, AiError> {
    match msg.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(msg.content.text())
            .build()
            .map(Into::into)
            .map_err(|e| build_error("system", e)),
        Role::User => {
            let mut builder = ChatCompletionRequestUserMessageArgs::default();
            match &msg.content {
                MessageContent::Text(text) => {
                    builder.content(text.clone());
                }
                MessageContent::Parts(parts) => {
                    let parts = parts
                        .iter()
                        .map(to_openai_part)
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| build_error("user", e))?;
                    builder.content(parts);
                }
            }
            builder
                .build()
                .map(Into::into)
                .map_err(|e| build_error("user", e))
        }
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(msg.content.text())
            .build()
            .map(Into::into)
            .map_err(|e| build_error("assistant", e)),
    }
}

fn to_openai_part(
    part: &ContentPart,
) -> Result<ChatCompletionRequestUserMessageContentPart, OpenAIError> {
    match part {
        ContentPart::Text { text } => ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(text.clone())
            .build()
            .map(Into::into),
        ContentPart::ImageUrl { image_url } => {
            let image_url = ImageUrlArgs::default().url(image_url.url.clone()).build()?;
            ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(image_url)
                .build()
                .map(Into::into)
        }
    }
}

fn build_request(
    model: &str,
    request: &ChatRequest,
) -> Result<CreateChatCompletionRequest, AiError> {
    let messages = request
        .messages
        .iter()
        .map(to_openai_message)
        .collect::<Result<Vec<_>, _>>()?;

    let mut req_builder = CreateChatCompletionRequestArgs::default();
    req_builder.model(model).messages(messages);

    if let Some(max_tokens) = request.max_tokens {
        req_builder.max_completion_tokens(max_tokens);
    }
    if let Some(temperature) = request.temperature {
        req_builder.temperature(temperature);
    }
    if let Some(top_p) = request.top_p {
        req_builder.top_p(top_p);
    }
    if let Some(frequency_penalty) = request.frequency_penalty {
        req_builder.frequency_penalty(frequency_penalty);
    }
    if request.json_response {
        req_builder.response_format(ResponseFormat::JsonObject);
    }

    let openai_request = req_builder
        .build()
        .map_err(|e| AiError::Api(e.to_string()))?;
    Ok(openai_request)
}

#[async_trait]
impl AiClient for OpenAiCompatibleClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let openai_request = build_request(&self.config.model, &request)?;

        tracing::debug!(
            prompt_name = prompt_name,
            model = %self.config.model,
            "Calling AI API"
        );

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| self.map_error(e))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::MalformedEnvelope("No completion content".to_string()))?;

        let usage = response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(ChatResponse { content, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    #[test]
    fn test_request_carries_generation_options() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            max_tokens: Some(2048),
            temperature: Some(0.7),
            top_p: Some(1.0),
            frequency_penalty: None,
            json_response: true,
        };
        let json = serde_json::to_value(build_request("m", &request).unwrap()).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["max_completion_tokens"], 2048);
        assert_eq!(json["top_p"], 1.0);
        assert_eq!(json["response_format"]["type"], "json_object");
        assert!(json.get("frequency_penalty").is_none());
    }

    #[test]
    fn test_request_without_json_mode() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            ..Default::default()
        };
        let json = serde_json::to_value(build_request("m", &request).unwrap()).unwrap();
        assert!(json.get("response_format").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_image_message_keeps_parts() {
        let msg = ChatMessage::user_with_image("describe", "https://example.com/a.jpg");
        let json = serde_json::to_value(to_openai_message(&msg).unwrap()).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "describe");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "https://example.com/a.jpg"
        );
    }

    #[test]
    fn test_error_mapping() {
        let api_error = OpenAIError::ApiError(ApiError {
            message: "overloaded".to_string(),
            r#type: Some("server_error".to_string()),
            param: None,
            code: None,
        });
        assert!(matches!(
            map_openai_error(api_error, Duration::from_secs(60)),
            AiError::Api(message) if message.contains("overloaded")
        ));

        let parse_error = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let envelope = OpenAIError::JSONDeserialize(parse_error, "<html>".to_string());
        assert!(matches!(
            map_openai_error(envelope, Duration::from_secs(60)),
            AiError::MalformedEnvelope(_)
        ));
    }
}
