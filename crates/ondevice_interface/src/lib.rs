//! Trait definitions for the ondevice generation bridge.
//!
//! Two seams live here: [`NativeEngine`] faces the platform SDKs and
//! [`GenerationClient`] faces application code.

mod client;
mod native;

pub use client::{ClientMetadata, GenerationClient, ResponseStream};
pub use native::{
    CompletedOperation, CompletionListener, NativeEngine, NativeOperation, NativePartial,
    PartialKind, StreamListener,
};
