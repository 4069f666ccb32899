//! Single-result completion slot.
//!
//! [`one_shot`] returns a listener the native layer reports into and a
//! future the consumer awaits. The listener latches the first terminal
//! signal; duplicates are logged and dropped.

use ondevice_error::NativeError;
use ondevice_interface::CompletionListener;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, warn};

type Outcome<T> = Result<T, NativeError>;

/// Create a connected listener/completion pair.
///
/// `label` names the operation in log events.
///
/// # Examples
///
/// ```
/// use ondevice_bridge::one_shot;
/// use ondevice_interface::CompletionListener;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let (listener, completion) = one_shot::<String>("example");
/// listener.on_success("first".to_string());
/// listener.on_success("second".to_string());
/// assert_eq!(completion.await.unwrap(), "first");
/// # });
/// ```
pub fn one_shot<T: Send>(label: &'static str) -> (Arc<OneShotListener<T>>, Completion<T>) {
    let (sender, receiver) = oneshot::channel();
    let listener = OneShotListener {
        sender: Mutex::new(Some(sender)),
        label,
    };
    (Arc::new(listener), Completion { receiver, label })
}

/// Producer half: implements [`CompletionListener`] for native callbacks.
pub struct OneShotListener<T> {
    sender: Mutex<Option<oneshot::Sender<Outcome<T>>>>,
    label: &'static str,
}

impl<T> OneShotListener<T> {
    /// True once a terminal signal has been latched.
    pub fn is_settled(&self) -> bool {
        self.sender.lock().is_none()
    }

    fn settle(&self, outcome: Outcome<T>) {
        let Some(sender) = self.sender.lock().take() else {
            warn!(
                operation = self.label,
                "Dropping duplicate terminal signal from native layer"
            );
            return;
        };
        if sender.send(outcome).is_err() {
            debug!(
                operation = self.label,
                "Completion abandoned by consumer, discarding native result"
            );
        }
    }
}

impl<T: Send> CompletionListener<T> for OneShotListener<T> {
    fn on_success(&self, value: T) {
        self.settle(Ok(value));
    }

    fn on_failure(&self, error: NativeError) {
        self.settle(Err(error));
    }
}

/// Consumer half: resolves with the latched native outcome.
///
/// If the native layer releases the listener without reporting, resolves to
/// a [`NativeErrorKind::Failed`](ondevice_error::NativeErrorKind::Failed)
/// error instead of hanging.
pub struct Completion<T> {
    receiver: oneshot::Receiver<Outcome<T>>,
    label: &'static str,
}

impl<T> Future for Completion<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let label = self.label;
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => {
                warn!(operation = label, "Native layer released listener without a result");
                Poll::Ready(Err(NativeError::failed(format!(
                    "native {} operation ended without reporting a result",
                    label
                ))))
            }
        }
    }
}
