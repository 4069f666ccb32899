//! Shape of a completion-callback language model SDK.
//!
//! The SDK answers through boxed callbacks invoked on its own threads and
//! observes cancellation by polling a shared [`CancelSignal`].

use ondevice_core::SamplingMode;
use ondevice_error::NativeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Availability of the system language model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum SystemModelAvailability {
    /// Ready for use
    #[display("available")]
    Available,
    /// The user has not switched the feature on
    #[display("Apple Intelligence not enabled")]
    AppleIntelligenceNotEnabled,
    /// The hardware cannot run the model
    #[display("device not eligible")]
    DeviceNotEligible,
    /// Assets are still downloading
    #[display("model not ready")]
    ModelNotReady,
    /// Any other reason
    #[display("unavailable")]
    Unavailable,
}

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranscriptRole {
    /// Session instructions
    Instructions,
    /// A user prompt
    Prompt,
    /// A model response
    Response,
}

/// One entry of a session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TranscriptEntry {
    role: TranscriptRole,
    text: String,
}

impl TranscriptEntry {
    /// Creates a transcript entry.
    pub fn new(role: TranscriptRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Generation options in the SDK's vocabulary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FoundationOptions {
    /// Sampling temperature
    pub temperature: Option<f64>,
    /// Upper bound on response length
    pub maximum_response_tokens: Option<u32>,
    /// Token selection strategy
    pub sampling: Option<SamplingMode>,
}

/// Cooperative cancellation flag shared with the SDK.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    /// Request cancellation.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once cancellation was requested.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives a one-shot response.
pub type RespondCallback = Box<dyn FnOnce(Result<String, NativeError>) + Send>;
/// Receives a cumulative snapshot of the response so far.
pub type SnapshotCallback = Box<dyn FnMut(String) + Send>;
/// Receives the end of a streamed response.
pub type StreamEndCallback = Box<dyn FnOnce(Option<NativeError>) + Send>;

/// A language model SDK driven by completion callbacks.
pub trait CallbackLanguageModel: Send + Sync {
    /// Current availability of the model.
    fn availability(&self) -> SystemModelAvailability;

    /// Respond to `prompt` in the context of `transcript`.
    fn respond(
        &self,
        transcript: Vec<TranscriptEntry>,
        prompt: String,
        options: FoundationOptions,
        cancel: CancelSignal,
        on_complete: RespondCallback,
    );

    /// Stream a response as cumulative snapshots.
    fn stream_response(
        &self,
        transcript: Vec<TranscriptEntry>,
        prompt: String,
        options: FoundationOptions,
        cancel: CancelSignal,
        on_snapshot: SnapshotCallback,
        on_complete: StreamEndCallback,
    );
}
