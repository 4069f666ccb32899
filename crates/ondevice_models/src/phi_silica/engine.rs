//! Native engine over a promise-returning SDK.

use super::conversions::{to_model_options, to_phi3_prompt};
use super::sdk::{ProgressSink, PromiseLanguageModel};
use crate::guard::{guard_sdk, guard_sdk_async};
use futures::future::{AbortHandle, Abortable, BoxFuture};
use ondevice_core::{GenerationOptions, Turn};
use ondevice_error::{NativeError, NativeErrorKind};
use ondevice_interface::{
    CompletedOperation, CompletionListener, NativeEngine, NativeOperation, NativePartial,
    StreamListener,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, instrument};

/// Provider name reported in client metadata.
pub const PHI_SILICA_PROVIDER: &str = "Microsoft Phi Silica";
/// Default model identifier.
pub const PHI_SILICA_MODEL_ID: &str = "Phi-3.5-mini-instruct";

/// Cancels a promise through its abort handle.
struct PromiseOperation(AbortHandle);

impl NativeOperation for PromiseOperation {
    fn cancel(&self) {
        self.0.abort();
    }
}

fn aborted() -> NativeError {
    NativeError::new(NativeErrorKind::Cancelled, "the async operation was cancelled")
}

/// [`NativeEngine`] for SDKs whose calls return promises.
///
/// The history is rendered as one Phi-3 prompt. Promises are driven on the
/// runtime handle given at construction.
pub struct PhiSilicaEngine {
    model: Arc<dyn PromiseLanguageModel>,
    runtime: Handle,
    model_id: String,
}

impl PhiSilicaEngine {
    /// Wrap an SDK model, driving its promises on `runtime`.
    pub fn new(model: Arc<dyn PromiseLanguageModel>, runtime: Handle) -> Self {
        Self {
            model,
            runtime,
            model_id: PHI_SILICA_MODEL_ID.to_string(),
        }
    }

    /// Report `model_id` instead of the default.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Drive `promise` to completion, handing its outcome to `settle`.
    fn drive<T, F>(
        &self,
        call: &'static str,
        promise: BoxFuture<'static, Result<T, NativeError>>,
        settle: F,
    ) -> Box<dyn NativeOperation>
    where
        T: Send + 'static,
        F: FnOnce(Result<T, NativeError>) + Send + 'static,
    {
        let (abort, registration) = AbortHandle::new_pair();
        let abortable = Abortable::new(guard_sdk_async(call, promise), registration);
        self.runtime.spawn(async move {
            let outcome = match abortable.await {
                Ok(result) => result,
                Err(_) => {
                    debug!(call, "Promise aborted");
                    Err(aborted())
                }
            };
            settle(outcome);
        });
        Box::new(PromiseOperation(abort))
    }
}

impl NativeEngine for PhiSilicaEngine {
    fn provider_name(&self) -> &'static str {
        PHI_SILICA_PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }

    #[instrument(skip_all)]
    fn prepare(&self, listener: Arc<dyn CompletionListener<()>>) -> Box<dyn NativeOperation> {
        match guard_sdk("make_available", || self.model.make_available()) {
            Ok(promise) => self.drive("make_available", promise, move |result| match result {
                Ok(()) => listener.on_success(()),
                Err(err) => listener.on_failure(err),
            }),
            Err(fault) => {
                listener.on_failure(fault);
                Box::new(CompletedOperation)
            }
        }
    }

    #[instrument(skip_all, fields(turns = turns.len()))]
    fn generate(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn CompletionListener<String>>,
    ) -> Box<dyn NativeOperation> {
        let prompt = to_phi3_prompt(turns);
        let options = to_model_options(options);
        match guard_sdk("generate_response", || {
            self.model.generate_response(prompt, options)
        }) {
            Ok(promise) => self.drive("generate_response", promise, move |result| match result {
                Ok(text) => listener.on_success(text),
                Err(err) => listener.on_failure(err),
            }),
            Err(fault) => {
                listener.on_failure(fault);
                Box::new(CompletedOperation)
            }
        }
    }

    #[instrument(skip_all, fields(turns = turns.len()))]
    fn generate_stream(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn StreamListener<NativePartial>>,
    ) -> Box<dyn NativeOperation> {
        let prompt = to_phi3_prompt(turns);
        let options = to_model_options(options);
        let sink = Arc::clone(&listener);
        let progress: ProgressSink = Arc::new(move |delta: String| {
            sink.on_item(NativePartial::partial(delta));
        });
        match guard_sdk("generate_response_with_progress", || {
            self.model
                .generate_response_with_progress(prompt, options, progress)
        }) {
            Ok(promise) => self.drive(
                "generate_response_with_progress",
                promise,
                move |result| listener.on_complete(result.err()),
            ),
            Err(fault) => {
                listener.on_complete(Some(fault));
                Box::new(CompletedOperation)
            }
        }
    }
}
