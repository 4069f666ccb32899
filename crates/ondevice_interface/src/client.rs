//! The uniform client contract used by application code.

use async_trait::async_trait;
use futures::stream::BoxStream;
use ondevice_core::{GenerationRequest, GenerationResponse, ResponseChunk};
use ondevice_error::BridgeResult;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Pull-based sequence of response chunks.
pub type ResponseStream = BoxStream<'static, BridgeResult<ResponseChunk>>;

/// Describes the backend behind a client.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct ClientMetadata {
    /// Backend name
    provider_name: String,
    /// Model identifier
    model_id: String,
}

impl ClientMetadata {
    /// Creates new client metadata.
    pub fn new(provider_name: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            model_id: model_id.into(),
        }
    }
}

/// A generation client: one request/response contract for every backend.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Backend description.
    fn metadata(&self) -> &ClientMetadata;

    /// Make the engine ready. Idempotent.
    async fn prepare(&self) -> BridgeResult<()>;

    /// One-shot generation.
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> BridgeResult<GenerationResponse>;

    /// Streaming generation. Nothing happens until the stream is polled.
    fn generate_stream(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> ResponseStream;

    /// Release the engine. Calling it again is a no-op.
    fn close(&self);
}
