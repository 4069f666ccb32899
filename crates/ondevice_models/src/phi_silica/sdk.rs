//! Shape of a promise-returning language model SDK.

use futures::future::BoxFuture;
use ondevice_error::NativeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options in the SDK's vocabulary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LanguageModelOptions {
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Top-k cut-off
    pub top_k: Option<u32>,
    /// Nucleus sampling cut-off
    pub top_p: Option<f32>,
    /// Maximum number of tokens to produce
    pub max_length: Option<u32>,
}

/// Receives text deltas while a response is being produced.
pub type ProgressSink = Arc<dyn Fn(String) + Send + Sync>;

/// A language model SDK whose calls return promises.
///
/// The promises do nothing until polled; the adapter drives them and
/// cancels them through an abort handle.
pub trait PromiseLanguageModel: Send + Sync {
    /// Make the model ready, downloading it if needed.
    fn make_available(&self) -> BoxFuture<'static, Result<(), NativeError>>;

    /// Produce a complete response to a rendered prompt.
    fn generate_response(
        &self,
        prompt: String,
        options: LanguageModelOptions,
    ) -> BoxFuture<'static, Result<String, NativeError>>;

    /// Produce a response, reporting deltas to `progress` as they appear.
    fn generate_response_with_progress(
        &self,
        prompt: String,
        options: LanguageModelOptions,
        progress: ProgressSink,
    ) -> BoxFuture<'static, Result<String, NativeError>>;
}
