//! Asynchronous bridge between native on-device engines and the uniform
//! generation contract.
//!
//! Native SDKs report through listeners, callbacks and handles. This crate
//! converts those into futures and pull streams:
//!
//! - [`one_shot`] resolves a future from a [`CompletionListener`](ondevice_interface::CompletionListener)
//! - [`stream_channel`] adapts a [`StreamListener`](ondevice_interface::StreamListener) into a [`Stream`](futures::Stream)
//! - [`CancellationBridge`] forwards a [`CancellationToken`] to a native handle
//! - [`EnginePreparation`] runs single-flight engine warm-up
//! - [`GenerationSession`] ties them together behind [`GenerationClient`](ondevice_interface::GenerationClient)

mod cancellation;
mod channel;
mod completion;
mod guard;
mod metrics;
mod preparation;
mod session;

pub use cancellation::CancellationBridge;
pub use channel::{ChannelReader, ChannelWriter, stream_channel};
pub use completion::{Completion, OneShotListener, one_shot};
pub use metrics::BridgeMetrics;
pub use preparation::{EnginePreparation, PreparationState};
pub use session::{EngineHandle, GenerationSession, collect_stream};

pub use tokio_util::sync::CancellationToken;
