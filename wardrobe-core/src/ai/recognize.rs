//! Garment recognition from photos using vision AI.

use serde::Serialize;

use super::defaults::DefaultAttributeGenerator;
use super::gateway::ModelGateway;
use super::prompts::vision::{render_vision_prompts, VISION_PROMPT_NAME};
use super::types::{ChatMessage, ChatRequest};
use super::validate::{parse_vision_response, VisionFields};
use crate::types::{GarmentAttributes, PipelineOutcome};

/// A recognised upload.
#[derive(Debug, Clone, Serialize)]
pub struct RecognizedGarment {
    pub image_url: String,
    pub attributes: GarmentAttributes,
}

/// Result of recognising several uploads.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRecognition {
    pub items: Vec<RecognizedGarment>,
    /// Items classified by the model.
    pub ai_count: usize,
    /// Items that fell back to synthetic attributes.
    pub fallback_count: usize,
}

/// Classifies garment photos. Never fails: when the model cannot produce a
/// usable answer, synthetic attributes are returned instead.
pub struct RecognitionPipeline {
    gateway: ModelGateway,
    defaults: DefaultAttributeGenerator,
}

impl RecognitionPipeline {
    pub fn new(gateway: ModelGateway, defaults: DefaultAttributeGenerator) -> Self {
        Self { gateway, defaults }
    }

    /// Classify the garment at `image_url`.
    pub async fn recognize(&self, image_url: &str) -> GarmentAttributes {
        match self.classify(image_url).await {
            PipelineOutcome::Success { value, .. } => {
                tracing::info!(
                    image_url,
                    category = %value.category,
                    confidence = ?value.confidence,
                    "Garment recognised"
                );
                value
            }
            PipelineOutcome::Failure {
                error,
                raw_response,
            } => {
                tracing::warn!(
                    image_url,
                    error = %error,
                    raw_response = raw_response.as_deref().unwrap_or(""),
                    "Recognition failed, using default attributes"
                );
                self.defaults.generate()
            }
        }
    }

    /// Re-classify an already stored garment's image.
    ///
    /// Behaves exactly like [`recognize`](Self::recognize); whether the
    /// attributes came from the model shows only in `confidence`.
    pub async fn reanalyze(&self, image_url: &str) -> GarmentAttributes {
        self.recognize(image_url).await
    }

    /// Recognise each upload in turn.
    pub async fn recognize_batch<S: AsRef<str>>(&self, image_urls: &[S]) -> BatchRecognition {
        let mut items = Vec::with_capacity(image_urls.len());

        for url in image_urls {
            let url = url.as_ref();
            let attributes = self.recognize(url).await;
            items.push(RecognizedGarment {
                image_url: url.to_string(),
                attributes,
            });
        }

        let ai_count = items
            .iter()
            .filter(|item| item.attributes.is_ai_derived())
            .count();

        BatchRecognition {
            fallback_count: items.len() - ai_count,
            ai_count,
            items,
        }
    }

    /// One model round trip and validation, without the fallback.
    pub async fn classify(&self, image_url: &str) -> PipelineOutcome<GarmentAttributes> {
        let (system_prompt, user_prompt) = render_vision_prompts();
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user_with_image(user_prompt, image_url),
            ],
            max_tokens: Some(4096),
            temperature: Some(1.0),
            top_p: Some(0.7),
            frequency_penalty: Some(0.0),
            json_response: true,
        };

        self.gateway
            .call(VISION_PROMPT_NAME, request)
            .await
            .and_then(|content, _| parse_vision_response(&content))
            .map(into_attributes)
    }
}

fn into_attributes(fields: VisionFields) -> GarmentAttributes {
    GarmentAttributes {
        category: fields.category,
        color: fields.color,
        seasons: fields.seasons,
        style: fields.style,
        confidence: fields.confidence.filter(|c| (0.0..=1.0).contains(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::config::AiConfig;
    use crate::ai::fake::FakeAiClient;
    use crate::types::GarmentCategory;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;
    use std::time::Duration;

    fn pipeline(client: Arc<FakeAiClient>) -> RecognitionPipeline {
        let config = AiConfig::new("test-key").with_backoff_unit(Duration::from_millis(1));
        RecognitionPipeline::new(
            ModelGateway::new(client, &config),
            DefaultAttributeGenerator::new(ChaCha8Rng::seed_from_u64(1)),
        )
    }

    #[tokio::test]
    async fn test_request_carries_image_and_vision_options() {
        let raw = r#"{"category":"dress","color":"green","season":"summer","style":"boho",
            "confidence":"64"}"#;
        let client = Arc::new(FakeAiClient::always(raw));
        let pipeline = pipeline(client.clone());

        let attrs = pipeline.recognize("https://cdn.example.com/g/1.jpg").await;

        assert_eq!(attrs.category, GarmentCategory::Dress);
        assert_eq!(attrs.confidence, Some(0.64));

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.max_tokens, Some(4096));
        assert_eq!(request.top_p, Some(0.7));
        assert!(request.json_response);
        assert_eq!(
            request.messages[1].content.image_urls(),
            vec!["https://cdn.example.com/g/1.jpg"]
        );
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_dropped() {
        let raw = r#"{"category":"top","color":"red","season":"spring","style":"casual",
            "confidence":250}"#;
        let client = Arc::new(FakeAiClient::always(raw));
        let attrs = pipeline(client)
            .recognize("https://example.com/x.jpg")
            .await;

        assert_eq!(attrs.category, GarmentCategory::Top);
        assert_eq!(attrs.color, "red");
        assert_eq!(attrs.confidence, None);
    }

    #[tokio::test]
    async fn test_classify_reports_failure() {
        let client = Arc::new(FakeAiClient::always("not json"));
        let outcome = pipeline(client).classify("https://example.com/x.jpg").await;

        assert_eq!(outcome.raw_response(), Some("not json"));
        assert!(!outcome.is_success());
    }
}
