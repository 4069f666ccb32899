//! Fake platform SDKs for adapter tests.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use ondevice_error::NativeError;
use ondevice_models::aicore::{Content, CoroutineGenerativeModel, GenerationConfig};
use ondevice_models::foundation::{
    CallbackLanguageModel, CancelSignal, FoundationOptions, RespondCallback, SnapshotCallback,
    StreamEndCallback, SystemModelAvailability, TranscriptEntry,
};
use ondevice_models::phi_silica::{LanguageModelOptions, ProgressSink, PromiseLanguageModel};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Words the fake models answer with.
pub const ANSWER: [&str; 3] = ["Hello", " from", " device"];

pub fn answer() -> String {
    ANSWER.concat()
}

/// Callback SDK that answers from its own thread.
pub struct FakeCallbackModel {
    pub availability: SystemModelAvailability,
    pub delay: Duration,
    pub hang: bool,
    pub panic_on_respond: bool,
    pub late_callbacks: Arc<AtomicUsize>,
    pub last_call: Mutex<Option<(Vec<TranscriptEntry>, String, FoundationOptions)>>,
}

impl FakeCallbackModel {
    pub fn new(availability: SystemModelAvailability) -> Self {
        Self {
            availability,
            delay: Duration::from_millis(5),
            hang: false,
            panic_on_respond: false,
            late_callbacks: Arc::new(AtomicUsize::new(0)),
            last_call: Mutex::new(None),
        }
    }

    /// Wait until cancelled, then report anyway like a careless SDK would.
    fn wait_for_cancel(signal: &CancelSignal) {
        while !signal.is_raised() {
            std::thread::sleep(Duration::from_millis(2));
        }
    }
}

impl CallbackLanguageModel for FakeCallbackModel {
    fn availability(&self) -> SystemModelAvailability {
        self.availability
    }

    fn respond(
        &self,
        transcript: Vec<TranscriptEntry>,
        prompt: String,
        options: FoundationOptions,
        cancel: CancelSignal,
        on_complete: RespondCallback,
    ) {
        if self.panic_on_respond {
            panic!("respond exploded");
        }
        *self.last_call.lock() = Some((transcript, prompt, options));
        let delay = self.delay;
        let hang = self.hang;
        let late = Arc::clone(&self.late_callbacks);
        std::thread::spawn(move || {
            if hang {
                Self::wait_for_cancel(&cancel);
                late.fetch_add(1, Ordering::SeqCst);
            } else {
                std::thread::sleep(delay);
            }
            on_complete(Ok(answer()));
        });
    }

    fn stream_response(
        &self,
        transcript: Vec<TranscriptEntry>,
        prompt: String,
        options: FoundationOptions,
        cancel: CancelSignal,
        mut on_snapshot: SnapshotCallback,
        on_complete: StreamEndCallback,
    ) {
        *self.last_call.lock() = Some((transcript, prompt, options));
        let delay = self.delay;
        let hang = self.hang;
        std::thread::spawn(move || {
            let mut snapshot = String::new();
            for word in ANSWER {
                std::thread::sleep(delay);
                snapshot.push_str(word);
                on_snapshot(snapshot.clone());
                if hang {
                    Self::wait_for_cancel(&cancel);
                    on_snapshot(format!("{} (late)", snapshot));
                    break;
                }
            }
            on_complete(None);
        });
    }
}

/// Coroutine SDK backed by tokio timers.
pub struct FakeCoroutineModel {
    pub prepare_result: Result<(), NativeError>,
    pub delay: Duration,
    pub hang: bool,
    pub finished: Arc<AtomicBool>,
    pub last_contents: Mutex<Vec<Content>>,
    pub last_config: Mutex<Option<GenerationConfig>>,
}

impl FakeCoroutineModel {
    pub fn new() -> Self {
        Self {
            prepare_result: Ok(()),
            delay: Duration::from_millis(5),
            hang: false,
            finished: Arc::new(AtomicBool::new(false)),
            last_contents: Mutex::new(Vec::new()),
            last_config: Mutex::new(None),
        }
    }
}

#[async_trait]
impl CoroutineGenerativeModel for FakeCoroutineModel {
    async fn prepare_inference_engine(&self) -> Result<(), NativeError> {
        tokio::time::sleep(self.delay).await;
        self.prepare_result.clone()
    }

    async fn generate_content(
        &self,
        config: &GenerationConfig,
        contents: Vec<Content>,
    ) -> Result<String, NativeError> {
        *self.last_contents.lock() = contents;
        *self.last_config.lock() = Some(config.clone());
        if self.hang {
            futures::future::pending::<()>().await;
        }
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(answer())
    }

    fn generate_content_stream(
        &self,
        config: &GenerationConfig,
        contents: Vec<Content>,
    ) -> BoxStream<'static, Result<String, NativeError>> {
        *self.last_contents.lock() = contents;
        *self.last_config.lock() = Some(config.clone());
        let delay = self.delay;
        let hang = self.hang;
        let finished = Arc::clone(&self.finished);
        futures::stream::iter(ANSWER)
            .then(move |word| {
                let finished = Arc::clone(&finished);
                async move {
                    tokio::time::sleep(delay).await;
                    if hang && word != ANSWER[0] {
                        futures::future::pending::<()>().await;
                    }
                    if word == ANSWER[ANSWER.len() - 1] {
                        finished.store(true, Ordering::SeqCst);
                    }
                    Ok(word.to_string())
                }
            })
            .boxed()
    }
}

/// Promise SDK whose futures sleep before resolving.
pub struct FakePromiseModel {
    pub delay: Duration,
    pub hang: bool,
    pub failure: Option<NativeError>,
    pub last_prompt: Arc<Mutex<Option<String>>>,
}

impl FakePromiseModel {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(5),
            hang: false,
            failure: None,
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }
}

impl PromiseLanguageModel for FakePromiseModel {
    fn make_available(&self) -> BoxFuture<'static, Result<(), NativeError>> {
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(())
        })
    }

    fn generate_response(
        &self,
        prompt: String,
        _options: LanguageModelOptions,
    ) -> BoxFuture<'static, Result<String, NativeError>> {
        *self.last_prompt.lock() = Some(prompt);
        let delay = self.delay;
        let hang = self.hang;
        let failure = self.failure.clone();
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            if hang {
                futures::future::pending::<()>().await;
            }
            match failure {
                Some(err) => Err(err),
                None => Ok(answer()),
            }
        })
    }

    fn generate_response_with_progress(
        &self,
        prompt: String,
        _options: LanguageModelOptions,
        progress: ProgressSink,
    ) -> BoxFuture<'static, Result<String, NativeError>> {
        *self.last_prompt.lock() = Some(prompt);
        let delay = self.delay;
        let hang = self.hang;
        let failure = self.failure.clone();
        Box::pin(async move {
            for word in ANSWER {
                tokio::time::sleep(delay).await;
                progress(word.to_string());
                if hang {
                    futures::future::pending::<()>().await;
                }
            }
            match failure {
                Some(err) => Err(err),
                None => Ok(answer()),
            }
        })
    }
}
