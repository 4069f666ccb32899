//! Native engine over a coroutine-style SDK.

use super::conversions::{to_config, to_contents};
use super::sdk::CoroutineGenerativeModel;
use crate::guard::{guard_sdk, guard_sdk_async};
use futures::StreamExt;
use ondevice_core::{GenerationOptions, Turn};
use ondevice_interface::{
    CompletionListener, NativeEngine, NativeOperation, NativePartial, StreamListener,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, instrument};

/// Provider name reported in client metadata.
pub const AICORE_PROVIDER: &str = "Google AI Edge AICore";
/// Default model identifier.
pub const AICORE_MODEL_ID: &str = "Gemini-Nano";

/// Cancels a launched job by aborting its task.
struct JobOperation(AbortHandle);

impl NativeOperation for JobOperation {
    fn cancel(&self) {
        debug!("Aborting generation job");
        self.0.abort();
    }
}

/// [`NativeEngine`] for SDKs whose calls are suspending functions.
///
/// Every call is launched as a task on the runtime handle given at
/// construction.
pub struct AiCoreEngine {
    model: Arc<dyn CoroutineGenerativeModel>,
    runtime: Handle,
    model_id: String,
}

impl AiCoreEngine {
    /// Wrap an SDK model, launching calls on `runtime`.
    pub fn new(model: Arc<dyn CoroutineGenerativeModel>, runtime: Handle) -> Self {
        Self {
            model,
            runtime,
            model_id: AICORE_MODEL_ID.to_string(),
        }
    }

    /// Report `model_id` instead of the default.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    fn launch<F>(&self, job: F) -> Box<dyn NativeOperation>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let task = self.runtime.spawn(job);
        Box::new(JobOperation(task.abort_handle()))
    }
}

impl NativeEngine for AiCoreEngine {
    fn provider_name(&self) -> &'static str {
        AICORE_PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }

    #[instrument(skip_all)]
    fn prepare(&self, listener: Arc<dyn CompletionListener<()>>) -> Box<dyn NativeOperation> {
        let model = Arc::clone(&self.model);
        self.launch(async move {
            let prepared =
                guard_sdk_async("prepare_inference_engine", model.prepare_inference_engine()).await;
            match prepared {
                Ok(()) => listener.on_success(()),
                Err(err) => listener.on_failure(err),
            }
        })
    }

    #[instrument(skip_all, fields(turns = turns.len()))]
    fn generate(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn CompletionListener<String>>,
    ) -> Box<dyn NativeOperation> {
        let model = Arc::clone(&self.model);
        let config = to_config(options);
        let contents = to_contents(turns);
        self.launch(async move {
            let generated =
                guard_sdk_async("generate_content", model.generate_content(&config, contents)).await;
            match generated {
                Ok(text) => listener.on_success(text),
                Err(err) => listener.on_failure(err),
            }
        })
    }

    #[instrument(skip_all, fields(turns = turns.len()))]
    fn generate_stream(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn StreamListener<NativePartial>>,
    ) -> Box<dyn NativeOperation> {
        let config = to_config(options);
        let contents = to_contents(turns);
        let mut stream =
            match guard_sdk("generate_content_stream", || {
                self.model.generate_content_stream(&config, contents)
            }) {
                Ok(stream) => stream,
                Err(fault) => {
                    listener.on_complete(Some(fault));
                    return Box::new(ondevice_interface::CompletedOperation);
                }
            };
        self.launch(async move {
            loop {
                match guard_sdk_async("generate_content_stream", async {
                    Ok(stream.next().await)
                })
                .await
                {
                    Ok(Some(Ok(delta))) => listener.on_item(NativePartial::partial(delta)),
                    Ok(Some(Err(err))) | Err(err) => {
                        listener.on_complete(Some(err));
                        return;
                    }
                    Ok(None) => break,
                }
            }
            listener.on_complete(None);
        })
    }
}
