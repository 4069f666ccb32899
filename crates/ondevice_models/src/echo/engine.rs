//! Engine that echoes the last user message.

use super::EchoSettings;
use ondevice_core::{GenerationOptions, Role, Turn};
use ondevice_error::NativeError;
use ondevice_interface::{
    CompletedOperation, CompletionListener, NativeEngine, NativeOperation, NativePartial,
    StreamListener,
};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Provider name reported in client metadata.
pub const ECHO_PROVIDER: &str = "Echo";

const NOT_UNDERSTOOD: &str = "I didn't understand your message.";

/// Stop flag a callback thread can sleep on.
#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }

    /// Sleep for `delay` unless stopped first. Returns true when stopped.
    fn sleep(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let mut stopped = self.stopped.lock();
        while !*stopped {
            if self.wake.wait_until(&mut stopped, deadline).timed_out() {
                break;
            }
        }
        *stopped
    }
}

struct ThreadOperation(Arc<StopSignal>);

impl NativeOperation for ThreadOperation {
    fn cancel(&self) {
        self.0.stop();
    }
}

/// Reply text for a history.
fn echo_reply(turns: &[Turn]) -> String {
    let last_user = turns.iter().rev().find(|turn| *turn.role() == Role::User);
    match last_user.map(Turn::text) {
        Some(text) if !text.is_empty() => format!("You said: {}", text),
        _ => NOT_UNDERSTOOD.to_string(),
    }
}

/// Split a reply into words, each but the first carrying its leading space.
fn words(reply: &str) -> Vec<String> {
    reply
        .split(' ')
        .enumerate()
        .map(|(i, word)| {
            if i == 0 {
                word.to_string()
            } else {
                format!(" {}", word)
            }
        })
        .collect()
}

/// [`NativeEngine`] that answers "You said: ..." from a dedicated thread.
///
/// Used as the default backend and as the fallback when a platform engine
/// cannot be built.
///
/// # Examples
///
/// ```
/// use ondevice_models::echo::{EchoEngine, EchoSettings};
/// use ondevice_interface::NativeEngine;
///
/// let engine = EchoEngine::new(EchoSettings::instant());
/// assert_eq!(engine.provider_name(), "Echo");
/// assert_eq!(engine.model_name(), "Echo");
/// ```
#[derive(Debug, Clone)]
pub struct EchoEngine {
    settings: EchoSettings,
}

impl EchoEngine {
    /// Creates an echo engine.
    pub fn new(settings: EchoSettings) -> Self {
        Self { settings }
    }

    /// Engine settings.
    pub fn settings(&self) -> &EchoSettings {
        &self.settings
    }

    fn spawn_worker<F, E>(&self, name: &str, work: F, on_spawn_failure: E) -> Box<dyn NativeOperation>
    where
        F: FnOnce(&StopSignal) + Send + 'static,
        E: FnOnce(NativeError),
    {
        let signal = Arc::new(StopSignal::default());
        let worker_signal = Arc::clone(&signal);
        let spawned = std::thread::Builder::new()
            .name(format!("echo-{}", name))
            .spawn(move || work(&worker_signal));
        if let Err(err) = spawned {
            warn!(error = %err, "Failed to spawn echo callback thread");
            on_spawn_failure(NativeError::failed(format!(
                "could not start callback thread: {}",
                err
            )));
        }
        Box::new(ThreadOperation(signal))
    }
}

impl NativeEngine for EchoEngine {
    fn provider_name(&self) -> &'static str {
        ECHO_PROVIDER
    }

    fn model_name(&self) -> &str {
        self.settings.model_name()
    }

    fn prepare(&self, listener: Arc<dyn CompletionListener<()>>) -> Box<dyn NativeOperation> {
        listener.on_success(());
        Box::new(CompletedOperation)
    }

    #[instrument(skip_all, fields(turns = turns.len()))]
    fn generate(
        &self,
        turns: &[Turn],
        _options: &GenerationOptions,
        listener: Arc<dyn CompletionListener<String>>,
    ) -> Box<dyn NativeOperation> {
        let reply = echo_reply(turns);
        let delay = self.settings.response_delay();
        let on_failure = Arc::clone(&listener);
        self.spawn_worker(
            "generate",
            move |signal| {
                if signal.sleep(delay) {
                    debug!("Echo generation cancelled");
                    return;
                }
                listener.on_success(reply);
            },
            move |err| on_failure.on_failure(err),
        )
    }

    #[instrument(skip_all, fields(turns = turns.len()))]
    fn generate_stream(
        &self,
        turns: &[Turn],
        _options: &GenerationOptions,
        listener: Arc<dyn StreamListener<NativePartial>>,
    ) -> Box<dyn NativeOperation> {
        let words = words(&echo_reply(turns));
        let response_delay = self.settings.response_delay();
        let word_delay = self.settings.word_delay();
        let on_failure = Arc::clone(&listener);
        self.spawn_worker(
            "stream",
            move |signal| {
                if signal.sleep(response_delay) {
                    debug!("Echo stream cancelled before first word");
                    return;
                }
                let count = words.len();
                for (i, word) in words.into_iter().enumerate() {
                    listener.on_item(NativePartial::partial(word));
                    if i + 1 < count && signal.sleep(word_delay) {
                        debug!(delivered = i + 1, "Echo stream cancelled");
                        return;
                    }
                }
                listener.on_complete(None);
            },
            move |err| on_failure.on_complete(Some(err)),
        )
    }
}
