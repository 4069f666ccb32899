//! Core data types for the ondevice generation bridge.
//!
//! This crate provides the request/response contract shared by every
//! native backend: turns, options, chunks and responses.

mod content;
mod logging;
mod options;
mod request;
mod response;
mod role;
mod turn;

pub use content::ContentPart;
pub use logging::init_logging;
pub use options::{GenerationOptions, SamplingMode};
pub use request::{GenerationRequest, GenerationRequestBuilder};
pub use response::{FinishReason, GenerationResponse, ResponseChunk};
pub use role::Role;
pub use turn::{Turn, TurnBuilder};
