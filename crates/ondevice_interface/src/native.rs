//! The boundary with native inference SDKs.
//!
//! Every platform adapter, whatever its concurrency model, exposes the same
//! listener-based contract:
//! - [`NativeEngine::prepare`] reports through a [`CompletionListener<()>`]
//! - [`NativeEngine::generate`] reports through a [`CompletionListener<String>`]
//! - [`NativeEngine::generate_stream`] reports through a [`StreamListener`]
//!
//! Each call returns a [`NativeOperation`] the bridge can cancel. Listeners
//! may be invoked from any thread, more than once, or out of order; the
//! bridge latches the first terminal signal.

use ondevice_core::{GenerationOptions, Turn};
use ondevice_error::NativeError;
use std::sync::Arc;

/// Receiver of a one-shot native result.
///
/// Exactly one of `on_success` or `on_failure` is meaningful; implementations
/// drop every call after the first.
pub trait CompletionListener<T>: Send + Sync {
    /// The operation produced a result.
    fn on_success(&self, value: T);

    /// The operation failed.
    fn on_failure(&self, error: NativeError);
}

/// Receiver of a native streaming result.
///
/// Zero or more `on_item` calls followed by one `on_complete`. Calls after
/// completion are ignored by implementations.
pub trait StreamListener<T>: Send + Sync {
    /// A partial result arrived.
    fn on_item(&self, item: T);

    /// The stream ended, with an error if it failed.
    fn on_complete(&self, error: Option<NativeError>);
}

/// Handle to an in-flight native operation.
pub trait NativeOperation: Send + Sync {
    /// Ask the native layer to stop. Best effort; may be called at any time.
    fn cancel(&self);
}

/// An operation that cannot be cancelled, e.g. one that finished synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletedOperation;

impl NativeOperation for CompletedOperation {
    fn cancel(&self) {}
}

/// How an engine's streaming partials relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PartialKind {
    /// Each partial holds only the newly generated text.
    #[default]
    Delta,
    /// Each partial holds the full text generated so far.
    Cumulative,
}

/// One partial result from a native stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, derive_getters::Getters)]
pub struct NativePartial {
    /// Text carried by this partial
    text: String,
    /// The engine marked this partial as the last one
    is_final: bool,
}

impl NativePartial {
    /// A partial that is not the last one.
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    /// A partial the engine marks as the end of the stream.
    pub fn last(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// A native on-device inference engine.
///
/// Implementations must not block the caller: each method starts the native
/// work and returns a cancellable handle immediately.
pub trait NativeEngine: Send + Sync {
    /// Name of the backend, e.g. "Apple Intelligence".
    fn provider_name(&self) -> &'static str;

    /// Identifier of the model behind this engine.
    fn model_name(&self) -> &str;

    /// Shape of streaming partials.
    fn partial_kind(&self) -> PartialKind {
        PartialKind::Delta
    }

    /// Start warming up the engine.
    fn prepare(&self, listener: Arc<dyn CompletionListener<()>>) -> Box<dyn NativeOperation>;

    /// Start a one-shot generation.
    fn generate(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn CompletionListener<String>>,
    ) -> Box<dyn NativeOperation>;

    /// Start a streaming generation.
    fn generate_stream(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn StreamListener<NativePartial>>,
    ) -> Box<dyn NativeOperation>;
}
