//! Test utilities for bridge tests.
//!
//! [`MockEngine`] is a scriptable native engine that reports through the
//! listener contract from spawned tasks, like a real platform SDK would.

#![allow(dead_code)]

use ondevice_core::{GenerationOptions, Turn};
use ondevice_error::{NativeError, NativeErrorKind};
use ondevice_interface::{
    CompletionListener, NativeEngine, NativeOperation, NativePartial, PartialKind,
    StreamListener,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How the mock answers `prepare`.
#[derive(Debug, Clone)]
pub enum PrepareBehavior {
    Succeed,
    Fail(NativeError),
    FailOnce(NativeError),
    Hang,
    Panic,
}

/// How the mock answers `generate`.
#[derive(Debug, Clone)]
pub enum GenerateBehavior {
    Reply(String),
    ReplyTwice(String, String),
    Fail(NativeError),
    Hang,
    DropListener,
    Panic,
}

/// What the mock pushes through a stream listener.
#[derive(Debug, Clone, Default)]
pub struct StreamScript {
    pub partials: Vec<NativePartial>,
    pub completion: Option<NativeError>,
    pub hang_after_partials: bool,
    pub items_after_completion: Vec<NativePartial>,
}

impl StreamScript {
    pub fn deltas(parts: &[&str]) -> Self {
        Self {
            partials: parts.iter().map(|p| NativePartial::partial(*p)).collect(),
            ..Self::default()
        }
    }
}

/// Invocation counters shared with the test.
#[derive(Debug, Default)]
pub struct Calls {
    pub prepare: AtomicUsize,
    pub generate: AtomicUsize,
    pub stream: AtomicUsize,
    pub cancel: AtomicUsize,
}

impl Calls {
    pub fn prepare(&self) -> usize {
        self.prepare.load(Ordering::SeqCst)
    }
    pub fn generate(&self) -> usize {
        self.generate.load(Ordering::SeqCst)
    }
    pub fn stream(&self) -> usize {
        self.stream.load(Ordering::SeqCst)
    }
    pub fn cancel(&self) -> usize {
        self.cancel.load(Ordering::SeqCst)
    }
    pub fn native_total(&self) -> usize {
        self.prepare() + self.generate() + self.stream()
    }
}

/// Scriptable native engine.
pub struct MockEngine {
    pub prepare: Mutex<PrepareBehavior>,
    pub generate: Mutex<GenerateBehavior>,
    pub stream: Mutex<StreamScript>,
    pub partial_kind: PartialKind,
    pub delay: Duration,
    pub report_cancellation: bool,
    pub calls: Arc<Calls>,
    pub last_turns: Mutex<Vec<Turn>>,
    pub last_options: Mutex<Option<GenerationOptions>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            prepare: Mutex::new(PrepareBehavior::Succeed),
            generate: Mutex::new(GenerateBehavior::Reply("Hello from mock".to_string())),
            stream: Mutex::new(StreamScript::deltas(&["Hello", " ", "world"])),
            partial_kind: PartialKind::Delta,
            delay: Duration::from_millis(10),
            report_cancellation: false,
            calls: Arc::new(Calls::default()),
            last_turns: Mutex::new(Vec::new()),
            last_options: Mutex::new(None),
        }
    }

    pub fn with_prepare(self, behavior: PrepareBehavior) -> Self {
        *self.prepare.lock() = behavior;
        self
    }

    pub fn with_generate(self, behavior: GenerateBehavior) -> Self {
        *self.generate.lock() = behavior;
        self
    }

    pub fn with_stream(self, script: StreamScript) -> Self {
        *self.stream.lock() = script;
        self
    }

    pub fn with_partial_kind(mut self, kind: PartialKind) -> Self {
        self.partial_kind = kind;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn reporting_cancellation(mut self) -> Self {
        self.report_cancellation = true;
        self
    }

    pub fn into_shared(self) -> (Arc<dyn NativeEngine>, Arc<Calls>) {
        let calls = Arc::clone(&self.calls);
        (Arc::new(self), calls)
    }

    fn operation(&self) -> (Box<dyn NativeOperation>, CancellationToken) {
        let token = CancellationToken::new();
        let op = MockOperation {
            token: token.clone(),
            calls: Arc::clone(&self.calls),
        };
        (Box::new(op), token)
    }

    fn cancelled_error() -> NativeError {
        NativeError::new(NativeErrorKind::Cancelled, "operation was cancelled")
    }
}

struct MockOperation {
    token: CancellationToken,
    calls: Arc<Calls>,
}

impl NativeOperation for MockOperation {
    fn cancel(&self) {
        self.calls.cancel.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
    }
}

impl NativeEngine for MockEngine {
    fn provider_name(&self) -> &'static str {
        "Mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }

    fn partial_kind(&self) -> PartialKind {
        self.partial_kind
    }

    fn prepare(&self, listener: Arc<dyn CompletionListener<()>>) -> Box<dyn NativeOperation> {
        let attempt = self.calls.prepare.fetch_add(1, Ordering::SeqCst);
        let behavior = self.prepare.lock().clone();
        if matches!(behavior, PrepareBehavior::Panic) {
            panic!("mock prepare exploded");
        }
        let (op, token) = self.operation();
        let delay = self.delay;
        tokio::spawn(async move {
            if matches!(behavior, PrepareBehavior::Hang) {
                token.cancelled().await;
                return;
            }
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => match behavior {
                    PrepareBehavior::Fail(err) => listener.on_failure(err),
                    PrepareBehavior::FailOnce(err) if attempt == 0 => listener.on_failure(err),
                    _ => listener.on_success(()),
                },
            }
        });
        op
    }

    fn generate(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn CompletionListener<String>>,
    ) -> Box<dyn NativeOperation> {
        self.calls.generate.fetch_add(1, Ordering::SeqCst);
        *self.last_turns.lock() = turns.to_vec();
        *self.last_options.lock() = Some(options.clone());
        let behavior = self.generate.lock().clone();
        if matches!(behavior, GenerateBehavior::Panic) {
            panic!("mock generate exploded");
        }
        let (op, token) = self.operation();
        let delay = self.delay;
        let report_cancellation = self.report_cancellation;
        tokio::spawn(async move {
            let cancelled = match behavior {
                GenerateBehavior::Hang => {
                    token.cancelled().await;
                    true
                }
                GenerateBehavior::DropListener => {
                    tokio::time::sleep(delay).await;
                    drop(listener);
                    return;
                }
                behavior => tokio::select! {
                    _ = token.cancelled() => true,
                    _ = tokio::time::sleep(delay) => {
                        match behavior {
                            GenerateBehavior::Reply(text) => listener.on_success(text),
                            GenerateBehavior::ReplyTwice(first, second) => {
                                listener.on_success(first);
                                listener.on_success(second);
                                listener.on_failure(NativeError::failed("late failure"));
                            }
                            GenerateBehavior::Fail(err) => listener.on_failure(err),
                            _ => {}
                        }
                        false
                    }
                },
            };
            if cancelled && report_cancellation {
                listener.on_failure(MockEngine::cancelled_error());
            }
        });
        op
    }

    fn generate_stream(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
        listener: Arc<dyn StreamListener<NativePartial>>,
    ) -> Box<dyn NativeOperation> {
        self.calls.stream.fetch_add(1, Ordering::SeqCst);
        *self.last_turns.lock() = turns.to_vec();
        *self.last_options.lock() = Some(options.clone());
        let script = self.stream.lock().clone();
        let (op, token) = self.operation();
        let delay = self.delay;
        let report_cancellation = self.report_cancellation;
        tokio::spawn(async move {
            for partial in script.partials {
                tokio::select! {
                    _ = token.cancelled() => {
                        if report_cancellation {
                            listener.on_complete(Some(MockEngine::cancelled_error()));
                        }
                        return;
                    }
                    _ = tokio::time::sleep(delay) => listener.on_item(partial),
                }
            }
            if script.hang_after_partials {
                token.cancelled().await;
                if report_cancellation {
                    listener.on_complete(Some(MockEngine::cancelled_error()));
                }
                return;
            }
            listener.on_complete(script.completion);
            for late in script.items_after_completion {
                listener.on_item(late);
            }
            listener.on_complete(None);
        });
        op
    }
}

/// Collect every item of a response stream.
pub async fn drain(
    stream: ondevice_interface::ResponseStream,
) -> Vec<ondevice_error::BridgeResult<ondevice_core::ResponseChunk>> {
    use futures::StreamExt;
    stream.collect().await
}
