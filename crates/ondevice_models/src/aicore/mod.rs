//! Adapter for coroutine-style SDKs with job-based cancellation.

mod conversions;
mod engine;
mod sdk;

pub use conversions::{to_config, to_content_role, to_contents};
pub use engine::{AICORE_MODEL_ID, AICORE_PROVIDER, AiCoreEngine};
pub use sdk::{
    Content, ContentRole, CoroutineGenerativeModel, GenerationConfig, GenerationConfigBuilder,
};
