//! Shape of a coroutine-style generative model SDK.

use async_trait::async_trait;
use futures::stream::BoxStream;
use ondevice_error::NativeError;
use serde::{Deserialize, Serialize};

/// Author of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum ContentRole {
    /// The end user
    #[display("user")]
    User,
    /// The model, including system context
    #[display("model")]
    Model,
}

/// One block of conversation content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Content {
    role: ContentRole,
    text: String,
}

impl Content {
    /// Creates a content block.
    pub fn new(role: ContentRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Generation configuration in the SDK's vocabulary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_builder::Builder)]
#[builder(default, setter(strip_option))]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Top-k cut-off
    pub top_k: Option<u32>,
    /// Maximum number of tokens to produce
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    /// Returns a builder for constructing a GenerationConfig.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder::default()
    }
}

/// A generative model whose calls are suspending functions.
///
/// The SDK never spawns work itself; the adapter decides where each call
/// runs and cancels it by aborting the task.
#[async_trait]
pub trait CoroutineGenerativeModel: Send + Sync {
    /// Download and load the inference engine.
    async fn prepare_inference_engine(&self) -> Result<(), NativeError>;

    /// Generate a complete response.
    async fn generate_content(
        &self,
        config: &GenerationConfig,
        contents: Vec<Content>,
    ) -> Result<String, NativeError>;

    /// Generate a response as a stream of text deltas.
    fn generate_content_stream(
        &self,
        config: &GenerationConfig,
        contents: Vec<Content>,
    ) -> BoxStream<'static, Result<String, NativeError>>;
}
