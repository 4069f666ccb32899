//! Stream channel adapter.
//!
//! Turns a push-style native [`StreamListener`] into a pull-style
//! [`Stream`]. The writer may be called from any thread; completion is
//! latched once and every item written after it is dropped.

use futures::stream::{FusedStream, Stream};
use ondevice_error::NativeError;
use ondevice_interface::StreamListener;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

type Item<T> = Result<T, NativeError>;

/// Create a connected writer/reader pair for one native stream.
///
/// # Examples
///
/// ```
/// use futures::StreamExt;
/// use ondevice_bridge::stream_channel;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let (writer, reader) = stream_channel::<&str>("example");
/// writer.write("a");
/// writer.write("b");
/// writer.complete(None);
/// writer.write("ignored");
///
/// let items: Vec<_> = reader.map(Result::unwrap).collect().await;
/// assert_eq!(items, vec!["a", "b"]);
/// # });
/// ```
pub fn stream_channel<T: Send>(label: &'static str) -> (Arc<ChannelWriter<T>>, ChannelReader<T>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let writer = ChannelWriter {
        sender: Mutex::new(Some(sender)),
        label,
    };
    let reader = ChannelReader {
        receiver,
        finished: false,
    };
    (Arc::new(writer), reader)
}

/// Producer half, handed to the native layer.
pub struct ChannelWriter<T> {
    sender: Mutex<Option<mpsc::UnboundedSender<Item<T>>>>,
    label: &'static str,
}

impl<T> ChannelWriter<T> {
    /// Enqueue one item. A no-op once the channel is completed.
    pub fn write(&self, item: T) {
        let guard = self.sender.lock();
        match guard.as_ref() {
            Some(sender) => {
                if sender.send(Ok(item)).is_err() {
                    trace!(operation = self.label, "Reader gone, dropping item");
                }
            }
            None => debug!(
                operation = self.label,
                "Dropping item written after completion"
            ),
        }
    }

    /// Latch completion, with an error if the native stream failed.
    pub fn complete(&self, error: Option<NativeError>) {
        let Some(sender) = self.sender.lock().take() else {
            warn!(
                operation = self.label,
                "Dropping duplicate stream completion from native layer"
            );
            return;
        };
        if let Some(error) = error {
            let _ = sender.send(Err(error));
        }
    }

    /// True once completion has been latched.
    pub fn is_completed(&self) -> bool {
        self.sender.lock().is_none()
    }
}

impl<T> Drop for ChannelWriter<T> {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.get_mut().take() {
            warn!(
                operation = self.label,
                "Native layer released stream listener without completing"
            );
            let _ = sender.send(Err(NativeError::failed(format!(
                "native {} stream ended without completion",
                self.label
            ))));
        }
    }
}

impl<T: Send> StreamListener<T> for ChannelWriter<T> {
    fn on_item(&self, item: T) {
        self.write(item);
    }

    fn on_complete(&self, error: Option<NativeError>) {
        self.complete(error);
    }
}

/// Consumer half: yields items in write order, then at most one error.
///
/// The stream ends after the first error or after normal completion.
pub struct ChannelReader<T> {
    receiver: mpsc::UnboundedReceiver<Item<T>>,
    finished: bool,
}

impl<T> ChannelReader<T> {
    /// Stop accepting items; anything still queued is discarded.
    pub fn close(&mut self) {
        self.receiver.close();
        self.finished = true;
    }
}

impl<T> Stream for ChannelReader<T> {
    type Item = Item<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match self.receiver.poll_recv(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(error))) => {
                self.finished = true;
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(Some(Ok(item))) => Poll::Ready(Some(Ok(item))),
        }
    }
}

impl<T> FusedStream for ChannelReader<T> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}
