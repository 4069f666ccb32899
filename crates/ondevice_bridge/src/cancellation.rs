//! Cancellation bridge.
//!
//! Links a caller-side [`CancellationToken`] to the native handle of one
//! in-flight operation. The native `cancel` runs at most once, and never
//! after the operation has completed.

use ondevice_interface::NativeOperation;
use parking_lot::Mutex;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error};

struct Inner {
    label: &'static str,
    operation: Mutex<Option<Box<dyn NativeOperation>>>,
    cancel_requested: AtomicBool,
    done: CancellationToken,
}

/// Cancellation link for one native operation.
///
/// Cloning shares the same link.
#[derive(Clone)]
pub struct CancellationBridge {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CancellationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationBridge")
            .field("label", &self.inner.label)
            .field("armed", &self.is_armed())
            .field("cancel_requested", &self.is_cancel_requested())
            .finish()
    }
}

impl CancellationBridge {
    /// Arm a bridge around a native operation handle.
    pub fn new(label: &'static str, operation: Box<dyn NativeOperation>) -> Self {
        Self {
            inner: Arc::new(Inner {
                label,
                operation: Mutex::new(Some(operation)),
                cancel_requested: AtomicBool::new(false),
                done: CancellationToken::new(),
            }),
        }
    }

    /// Forward a cancellation request to the native operation.
    ///
    /// Idempotent. A no-op once the operation has completed. A panic inside
    /// the native `cancel` is logged and swallowed.
    pub fn cancel(&self) {
        self.inner.cancel_requested.store(true, Ordering::SeqCst);
        let operation = self.inner.operation.lock().take();
        self.inner.done.cancel();
        let Some(operation) = operation else {
            return;
        };
        debug!(operation = self.inner.label, "Cancelling native operation");
        if catch_unwind(AssertUnwindSafe(|| operation.cancel())).is_err() {
            error!(
                operation = self.inner.label,
                "Native cancel panicked; ignoring"
            );
        }
    }

    /// Mark the operation finished. Later cancels do not reach native code.
    pub fn complete(&self) {
        let released = self.inner.operation.lock().take();
        self.inner.done.cancel();
        drop(released);
    }

    /// True once [`cancel`](Self::cancel) has been requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel_requested.load(Ordering::SeqCst)
    }

    /// True while the native handle is still held.
    pub fn is_armed(&self) -> bool {
        self.inner.operation.lock().is_some()
    }

    /// Forward cancellation of `token` to this bridge.
    ///
    /// The watcher lives until the token fires, the bridge completes, or the
    /// returned guard is dropped. Without a tokio runtime an already
    /// cancelled token is still honored immediately.
    pub fn bind(&self, token: &CancellationToken) -> DropGuard {
        let stop = CancellationToken::new();
        if token.is_cancelled() {
            self.cancel();
        } else if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let bridge = self.clone();
            let token = token.clone();
            let stop_watch = stop.clone();
            let done = self.inner.done.clone();
            runtime.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => bridge.cancel(),
                    _ = done.cancelled() => {}
                    _ = stop_watch.cancelled() => {}
                }
            });
        } else {
            debug!(
                operation = self.inner.label,
                "No runtime available, cancellation token not watched"
            );
        }
        stop.drop_guard()
    }
}
