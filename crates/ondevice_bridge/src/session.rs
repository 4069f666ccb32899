//! Unified generation facade over one native engine.

use crate::guard::guard_native;
use crate::{
    BridgeMetrics, CancellationBridge, EnginePreparation, PreparationState, one_shot,
    stream_channel,
};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use ondevice_core::{
    GenerationOptions, GenerationRequest, GenerationResponse, ResponseChunk, Turn,
};
use ondevice_error::{
    BridgeError, BridgeErrorKind, BridgeResult, CancelledError, DisposedError, GenerationError,
    NativeError, NativeErrorKind,
};
use ondevice_interface::{
    ClientMetadata, GenerationClient, NativeEngine, NativePartial, PartialKind, ResponseStream,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Owner of one native engine.
///
/// Disposing the handle cancels every in-flight operation started through
/// it and rejects new ones. Dropping the handle disposes it.
pub struct EngineHandle {
    engine: Arc<dyn NativeEngine>,
    preparation: EnginePreparation,
    scope: CancellationToken,
    disposed: AtomicBool,
    metadata: ClientMetadata,
    metrics: BridgeMetrics,
}

impl EngineHandle {
    /// Take ownership of a native engine.
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        let metadata = ClientMetadata::new(engine.provider_name(), engine.model_name());
        let metrics = BridgeMetrics::new(engine.provider_name());
        let scope = CancellationToken::new();
        let preparation =
            EnginePreparation::new(Arc::clone(&engine), scope.clone(), metrics.clone());
        Self {
            engine,
            preparation,
            scope,
            disposed: AtomicBool::new(false),
            metadata,
            metrics,
        }
    }

    /// Backend description.
    pub fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    /// Preparation state of the engine.
    pub fn state(&self) -> PreparationState {
        self.preparation.state()
    }

    /// Preparation tracker.
    pub fn preparation(&self) -> &EnginePreparation {
        &self.preparation
    }

    /// True once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Release the engine. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(
            provider = self.metadata.provider_name().as_str(),
            "Disposing engine handle"
        );
        self.scope.cancel();
        self.preparation.dispose();
    }

    fn ensure_open(&self) -> BridgeResult<()> {
        if self.is_disposed() {
            return Err(DisposedError::new("engine handle already disposed").into());
        }
        Ok(())
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("metadata", &self.metadata)
            .field("state", &self.state())
            .finish()
    }
}

/// Map a native fault to the error a caller sees.
fn native_to_bridge(err: NativeError) -> BridgeError {
    if err.kind == NativeErrorKind::Cancelled {
        debug!(error = %err, "Native layer reported cancellation");
        return CancelledError::new().into();
    }
    warn!(error = %err, "Native generation failed");
    GenerationError::new(err).into()
}

/// Cancels the native operation if the consumer goes away first.
struct CancelOnDrop(CancellationBridge);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Converts native partials into deltas.
struct DeltaAssembler {
    kind: PartialKind,
    emitted: String,
}

impl DeltaAssembler {
    fn new(kind: PartialKind) -> Self {
        Self {
            kind,
            emitted: String::new(),
        }
    }

    fn delta(&mut self, text: &str) -> String {
        match self.kind {
            PartialKind::Delta => text.to_string(),
            PartialKind::Cumulative => {
                let delta = match text.strip_prefix(self.emitted.as_str()) {
                    Some(rest) => rest.to_string(),
                    None => {
                        debug!("Cumulative partial diverged from emitted text");
                        text.to_string()
                    }
                };
                self.emitted = text.to_string();
                delta
            }
        }
    }
}

enum Pull {
    Partial(NativePartial),
    Finished,
    Failed(NativeError),
    Cancelled,
    Disposed,
}

/// A client bound to one engine handle.
///
/// Clones share the handle. The engine is disposed by [`close`](Self::close)
/// or when the last clone is dropped.
///
/// # Examples
///
/// ```no_run
/// use ondevice_bridge::{CancellationToken, GenerationSession};
/// use ondevice_core::GenerationRequest;
/// use ondevice_interface::NativeEngine;
/// use std::sync::Arc;
///
/// async fn ask(engine: Arc<dyn NativeEngine>) -> ondevice_error::BridgeResult<String> {
///     let session = GenerationSession::new(engine);
///     let response = session
///         .generate(GenerationRequest::prompt("Hello"), CancellationToken::new())
///         .await?;
///     Ok(response.text())
/// }
/// ```
#[derive(Clone)]
pub struct GenerationSession {
    handle: Arc<EngineHandle>,
    defaults: GenerationOptions,
}

impl GenerationSession {
    /// Open a session that owns `engine`.
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        Self {
            handle: Arc::new(EngineHandle::new(engine)),
            defaults: GenerationOptions::default(),
        }
    }

    /// Options applied to every request where the request leaves them unset.
    pub fn with_defaults(mut self, defaults: GenerationOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Default options of this session.
    pub fn defaults(&self) -> &GenerationOptions {
        &self.defaults
    }

    /// Backend description.
    pub fn metadata(&self) -> &ClientMetadata {
        self.handle.metadata()
    }

    /// Preparation state of the engine.
    pub fn state(&self) -> PreparationState {
        self.handle.state()
    }

    /// The shared engine handle.
    pub fn handle(&self) -> &Arc<EngineHandle> {
        &self.handle
    }

    /// Make the engine ready. Idempotent.
    pub async fn prepare(&self) -> BridgeResult<()> {
        self.handle.ensure_open()?;
        self.handle.preparation.prepare().await
    }

    /// Dispose the engine for every clone of this session. Idempotent.
    pub fn close(&self) {
        self.handle.dispose();
    }

    async fn ensure_ready(&self, cancel: &CancellationToken) -> BridgeResult<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CancelledError::new().into()),
            result = self.handle.preparation.prepare() => result,
        }
    }

    fn record_outcome<T>(&self, mode: &'static str, outcome: &BridgeResult<T>) {
        if let Err(err) = outcome {
            match err.kind() {
                BridgeErrorKind::Cancelled(_) | BridgeErrorKind::Disposed(_) => {
                    self.handle.metrics.record_cancellation(mode)
                }
                _ => self.handle.metrics.record_failure(mode),
            }
        }
    }

    /// One-shot generation.
    ///
    /// The request is validated before any native call. The engine is
    /// prepared on demand. Cancelling `cancel` at any point ends the call
    /// with a [`CancelledError`].
    ///
    /// # Errors
    ///
    /// Validation, preparation, generation, cancellation or disposal errors.
    #[instrument(skip_all, fields(provider = self.handle.engine.provider_name()))]
    pub async fn generate(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> BridgeResult<GenerationResponse> {
        let request = request.with_defaults(&self.defaults);
        let turns = request.validated_history()?;

        self.handle.metrics.record_request("generate");
        let started = Instant::now();
        let outcome = self.run_generate(&turns, request.options(), &cancel).await;
        match &outcome {
            Ok(response) => {
                self.handle
                    .metrics
                    .record_duration(started.elapsed().as_secs_f64());
                debug!(chars = response.text().len(), "Generation finished");
            }
            Err(_) => self.record_outcome("generate", &outcome),
        }
        outcome
    }

    async fn run_generate(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> BridgeResult<GenerationResponse> {
        self.handle.ensure_open()?;
        if cancel.is_cancelled() {
            return Err(CancelledError::new().into());
        }
        self.ensure_ready(cancel).await?;

        let (listener, completion) = one_shot::<String>("generate");
        let engine = &self.handle.engine;
        let operation = guard_native("generate", || engine.generate(turns, options, listener))
            .map_err(native_to_bridge)?;
        let bridge = CancellationBridge::new("generate", operation);
        let _abandon = CancelOnDrop(bridge.clone());
        let _watch = bridge.bind(cancel);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                bridge.cancel();
                Err(CancelledError::new().into())
            }
            _ = self.handle.scope.cancelled() => {
                bridge.cancel();
                Err(DisposedError::new("engine disposed during generation").into())
            }
            result = completion => {
                bridge.complete();
                let model_id = self.metadata().model_id().clone();
                result
                    .map(|text| GenerationResponse::assistant(text, model_id))
                    .map_err(native_to_bridge)
            }
        }
    }

    /// Streaming generation.
    ///
    /// Nothing happens until the stream is first polled. A successful stream
    /// yields content chunks and ends with exactly one final chunk. A failed
    /// or cancelled stream ends with one error and no final chunk. Dropping
    /// the stream cancels the native operation.
    pub fn generate_stream(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> ResponseStream {
        let session = self.clone();
        Box::pin(async_stream::stream! {
            let request = request.with_defaults(&session.defaults);
            let turns = match request.validated_history() {
                Ok(turns) => turns,
                Err(err) => {
                    yield Err(err.into());
                    return;
                }
            };

            let handle = Arc::clone(&session.handle);
            handle.metrics.record_request("stream");
            let started: BridgeResult<()> = match handle.ensure_open() {
                Ok(()) if cancel.is_cancelled() => Err(CancelledError::new().into()),
                Ok(()) => session.ensure_ready(&cancel).await,
                Err(err) => Err(err),
            };
            if let Err(err) = started {
                session.record_outcome("stream", &Err::<(), _>(err.clone()));
                yield Err(err);
                return;
            }

            let (writer, mut reader) = stream_channel::<NativePartial>("generate_stream");
            let options = request.options();
            let operation = match guard_native("generate_stream", || {
                handle.engine.generate_stream(&turns, options, writer)
            }) {
                Ok(operation) => operation,
                Err(native) => {
                    let err = native_to_bridge(native);
                    session.record_outcome("stream", &Err::<(), _>(err.clone()));
                    yield Err(err);
                    return;
                }
            };
            let bridge = CancellationBridge::new("generate_stream", operation);
            let _abandon = CancelOnDrop(bridge.clone());
            let _watch = bridge.bind(&cancel);
            let mut assembler = DeltaAssembler::new(handle.engine.partial_kind());
            debug!(provider = handle.engine.provider_name(), "Native stream started");

            loop {
                let pull = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Pull::Cancelled,
                    _ = handle.scope.cancelled() => Pull::Disposed,
                    item = reader.next() => match item {
                        Some(Ok(partial)) => Pull::Partial(partial),
                        Some(Err(native)) => Pull::Failed(native),
                        None => Pull::Finished,
                    },
                };

                match pull {
                    Pull::Partial(partial) => {
                        let delta = assembler.delta(partial.text());
                        if *partial.is_final() {
                            bridge.complete();
                            reader.close();
                            handle.metrics.record_chunk();
                            yield Ok(ResponseChunk::final_stop(delta));
                            return;
                        }
                        if delta.is_empty() {
                            continue;
                        }
                        handle.metrics.record_chunk();
                        yield Ok(ResponseChunk::content(delta));
                    }
                    Pull::Finished => {
                        bridge.complete();
                        handle.metrics.record_chunk();
                        yield Ok(ResponseChunk::final_stop(""));
                        return;
                    }
                    Pull::Failed(native) => {
                        bridge.complete();
                        let err = native_to_bridge(native);
                        session.record_outcome("stream", &Err::<(), _>(err.clone()));
                        yield Err(err);
                        return;
                    }
                    Pull::Cancelled => {
                        bridge.cancel();
                        reader.close();
                        handle.metrics.record_cancellation("stream");
                        yield Err(CancelledError::new().into());
                        return;
                    }
                    Pull::Disposed => {
                        bridge.cancel();
                        reader.close();
                        handle.metrics.record_cancellation("stream");
                        yield Err(DisposedError::new("engine disposed during streaming").into());
                        return;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl GenerationClient for GenerationSession {
    fn metadata(&self) -> &ClientMetadata {
        GenerationSession::metadata(self)
    }

    async fn prepare(&self) -> BridgeResult<()> {
        GenerationSession::prepare(self).await
    }

    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> BridgeResult<GenerationResponse> {
        GenerationSession::generate(self, request, cancel).await
    }

    fn generate_stream(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> ResponseStream {
        GenerationSession::generate_stream(self, request, cancel)
    }

    fn close(&self) {
        GenerationSession::close(self)
    }
}

/// Drain a chunk stream into one response.
///
/// # Errors
///
/// The first error the stream yields.
///
/// # Examples
///
/// ```
/// use futures::stream;
/// use ondevice_bridge::collect_stream;
/// use ondevice_core::ResponseChunk;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let chunks = stream::iter(vec![
///     Ok(ResponseChunk::content("Hello")),
///     Ok(ResponseChunk::content(" world")),
///     Ok(ResponseChunk::final_stop("")),
/// ]);
/// let response = collect_stream(chunks, "echo").await.unwrap();
/// assert_eq!(response.text(), "Hello world");
/// # });
/// ```
pub async fn collect_stream<S>(stream: S, model_id: impl Into<String>) -> BridgeResult<GenerationResponse>
where
    S: Stream<Item = BridgeResult<ResponseChunk>>,
{
    futures::pin_mut!(stream);
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        text.push_str(chunk.text_delta());
        if *chunk.is_final() {
            break;
        }
    }
    Ok(GenerationResponse::assistant(text, model_id))
}
