//! Adapter for promise-returning SDKs with abort-handle cancellation.

mod conversions;
mod engine;
mod sdk;

pub use conversions::{to_model_options, to_phi3_prompt};
pub use engine::{PHI_SILICA_MODEL_ID, PHI_SILICA_PROVIDER, PhiSilicaEngine};
pub use sdk::{LanguageModelOptions, ProgressSink, PromiseLanguageModel};
