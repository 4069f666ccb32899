//! Native engine over a completion-callback SDK.

use super::conversions::{availability_error, to_options, to_transcript};
use super::sdk::{
    CallbackLanguageModel, CancelSignal, RespondCallback, SnapshotCallback, StreamEndCallback,
};
use crate::guard::guard_sdk;
use ondevice_core::{GenerationOptions, Turn};
use ondevice_interface::{
    CompletedOperation, CompletionListener, NativeEngine, NativeOperation, NativePartial,
    PartialKind, StreamListener,
};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Provider name reported in client metadata.
pub const FOUNDATION_PROVIDER: &str = "Apple Intelligence";
/// Default model identifier.
pub const FOUNDATION_MODEL_ID: &str = "Apple-Intelligence";

/// Cancels an SDK call by raising its signal.
struct SignalOperation(CancelSignal);

impl NativeOperation for SignalOperation {
    fn cancel(&self) {
        self.0.raise();
    }
}

/// [`NativeEngine`] for SDKs that answer through completion callbacks.
///
/// Streamed partials are cumulative snapshots. Callbacks arriving after the
/// cancel signal was raised are dropped.
pub struct FoundationEngine {
    model: Arc<dyn CallbackLanguageModel>,
    model_id: String,
}

impl FoundationEngine {
    /// Wrap an SDK model with the default model identifier.
    pub fn new(model: Arc<dyn CallbackLanguageModel>) -> Self {
        Self::with_model_id(model, FOUNDATION_MODEL_ID)
    }

    /// Wrap an SDK model reporting `model_id`.
    pub fn with_model_id(model: Arc<dyn CallbackLanguageModel>, model_id: impl Into<String>) -> Self {
        Self {
            model,
            model_id: model_id.into(),
        }
    }
}

impl NativeEngine for FoundationEngine {
    fn provider_name(&self) -> &'static str {
        FOUNDATION_PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }

    fn partial_kind(&self) -> PartialKind {
        PartialKind::Cumulative
    }

    #[instrument(skip_all)]
    fn prepare(&self, listener: Arc<dyn CompletionListener<()>>) -> Box<dyn NativeOperation> {
        match guard_sdk("availability", || self.model.availability()) {
            Ok(availability) => match availability_error(availability) {
                None => listener.on_success(()),
                Some(err) => {
                    debug!(%availability, "Model not available");
                    listener.on_failure(err)
                }
            },
            Err(fault) => listener.on_failure(fault),
        }
        Box::new(CompletedOperation)
    }

    #[instrument(skip_all, fields(turns = turns.len()))]
    fn generate(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn CompletionListener<String>>,
    ) -> Box<dyn NativeOperation> {
        let (transcript, prompt) = to_transcript(turns);
        let signal = CancelSignal::default();

        let observed = signal.clone();
        let reporter = Arc::clone(&listener);
        let on_complete: RespondCallback = Box::new(move |result| {
            if observed.is_raised() {
                trace!("Dropping response delivered after cancellation");
                return;
            }
            match result {
                Ok(text) => reporter.on_success(text),
                Err(err) => reporter.on_failure(err),
            }
        });

        let call = guard_sdk("respond", || {
            self.model.respond(
                transcript,
                prompt,
                to_options(options),
                signal.clone(),
                on_complete,
            )
        });
        if let Err(fault) = call {
            listener.on_failure(fault);
        }
        Box::new(SignalOperation(signal))
    }

    #[instrument(skip_all, fields(turns = turns.len()))]
    fn generate_stream(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn StreamListener<NativePartial>>,
    ) -> Box<dyn NativeOperation> {
        let (transcript, prompt) = to_transcript(turns);
        let signal = CancelSignal::default();

        let observed = signal.clone();
        let sink = Arc::clone(&listener);
        let on_snapshot: SnapshotCallback = Box::new(move |snapshot| {
            if !observed.is_raised() {
                sink.on_item(NativePartial::partial(snapshot));
            }
        });
        let observed = signal.clone();
        let sink = Arc::clone(&listener);
        let on_complete: StreamEndCallback = Box::new(move |error| {
            if !observed.is_raised() {
                sink.on_complete(error);
            }
        });

        let call = guard_sdk("stream_response", || {
            self.model.stream_response(
                transcript,
                prompt,
                to_options(options),
                signal.clone(),
                on_snapshot,
                on_complete,
            )
        });
        if let Err(fault) = call {
            listener.on_complete(Some(fault));
        }
        Box::new(SignalOperation(signal))
    }
}
