//! AI client module for garment recognition and outfit recommendation.
//!
//! This module provides:
//! - `AiClient` trait for abstracting chat-completion providers
//! - `OpenAiCompatibleClient`, talking to any OpenAI-compatible endpoint
//! - `ModelGateway`, which retries transport failures with exponential backoff
//! - Prompt templates and response validation for both tasks
//! - `RecognitionPipeline` and `RecommendationPipeline`
//!
//! # Configuration
//!
//! Set these environment variables:
//!
//! - `OPENAI_API_KEY` (required): API key for the endpoint
//! - `WARDROBE_AI_MODEL` (optional): Model name, e.g., "gpt-4o-mini"
//! - `WARDROBE_AI_BASE_URL` (optional): API base URL
//! - `WARDROBE_AI_MAX_RETRIES` (optional): Attempts per call
//! - `WARDROBE_AI_TIMEOUT_SECS` (optional): Per-attempt timeout
//! - `WARDROBE_AI_BACKOFF_MS` (optional): Backoff unit in ms
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wardrobe_core::ai::{
//!     AiConfig, DefaultAttributeGenerator, ModelGateway, OpenAiCompatibleClient,
//!     RecognitionPipeline,
//! };
//!
//! let config = AiConfig::from_env()?;
//! let client = Arc::new(OpenAiCompatibleClient::new(config.clone())?);
//! let gateway = ModelGateway::new(client, &config);
//! let pipeline = RecognitionPipeline::new(gateway, DefaultAttributeGenerator::from_os_rng());
//!
//! let attributes = pipeline.recognize("https://cdn.example.com/shirt.jpg").await;
//! println!("{} ({:?})", attributes.display_name(), attributes.confidence);
//! ```

mod client;
mod config;
mod defaults;
mod fake;
mod gateway;
pub mod image_check;
pub mod prompts;
mod recognize;
mod recommend;
mod types;
pub mod validate;

pub use client::{AiClient, AiError, OpenAiCompatibleClient};
pub use config::{AiConfig, ConfigError};
pub use defaults::{DefaultAttributeGenerator, DEFAULT_CATEGORIES, DEFAULT_COLORS, DEFAULT_STYLES};
pub use fake::FakeAiClient;
pub use gateway::ModelGateway;
pub use recognize::{BatchRecognition, RecognitionPipeline, RecognizedGarment};
pub use recommend::{RecommendationPipeline, DEFAULT_OUTFIT_NAME, DEFAULT_REASONING};
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, ContentPart, ImageUrl, MessageContent, Role, Usage,
};
