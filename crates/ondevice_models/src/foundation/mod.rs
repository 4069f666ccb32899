//! Adapter for completion-callback SDKs with signal-based cancellation.

mod conversions;
mod engine;
mod sdk;

pub use conversions::{AVAILABILITY_DOMAIN, availability_error, to_options, to_transcript};
pub use engine::{FOUNDATION_MODEL_ID, FOUNDATION_PROVIDER, FoundationEngine};
pub use sdk::{
    CallbackLanguageModel, CancelSignal, FoundationOptions, RespondCallback, SnapshotCallback,
    StreamEndCallback, SystemModelAvailability, TranscriptEntry, TranscriptRole,
};
