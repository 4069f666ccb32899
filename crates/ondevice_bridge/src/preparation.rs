//! Engine preparation state machine.
//!
//! Preparation is single-flight: concurrent callers share one native
//! warm-up. A failed warm-up is not cached, so the next call retries.
//!
//! ```text
//! NotPrepared -> Preparing -> Ready
//!                    |
//!                    +-----> Failed -> Preparing (retry)
//! any state -> Disposed
//! ```

use crate::guard::guard_native;
use crate::{BridgeMetrics, CancellationBridge, one_shot};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use ondevice_error::{
    BridgeError, BridgeErrorKind, BridgeResult, DisposedError, PreparationError,
    PreparationErrorKind,
};
use ondevice_interface::NativeEngine;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Observable preparation state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PreparationState {
    /// No warm-up has been attempted, or the last one was abandoned
    NotPrepared,
    /// A warm-up is in flight
    Preparing,
    /// The engine is warm
    Ready,
    /// The last warm-up failed; the next call retries
    Failed,
    /// The engine handle was disposed
    Disposed,
}

type SharedPreparation = Shared<BoxFuture<'static, BridgeResult<()>>>;

enum Slot {
    NotPrepared,
    Preparing {
        attempt: u64,
        shared: SharedPreparation,
        bridge: CancellationBridge,
    },
    Ready,
    Failed(PreparationError),
    Disposed,
}

impl Slot {
    fn state(&self) -> PreparationState {
        match self {
            Slot::NotPrepared => PreparationState::NotPrepared,
            Slot::Preparing { .. } => PreparationState::Preparing,
            Slot::Ready => PreparationState::Ready,
            Slot::Failed(_) => PreparationState::Failed,
            Slot::Disposed => PreparationState::Disposed,
        }
    }
}

/// Single-flight preparation of one native engine.
pub struct EnginePreparation {
    engine: Arc<dyn NativeEngine>,
    slot: Arc<Mutex<Slot>>,
    attempts: AtomicU64,
    disposed: CancellationToken,
    metrics: BridgeMetrics,
}

impl EnginePreparation {
    /// Track preparation of `engine`. Cancelling `disposed` aborts any
    /// in-flight warm-up.
    pub fn new(
        engine: Arc<dyn NativeEngine>,
        disposed: CancellationToken,
        metrics: BridgeMetrics,
    ) -> Self {
        Self {
            engine,
            slot: Arc::new(Mutex::new(Slot::NotPrepared)),
            attempts: AtomicU64::new(0),
            disposed,
            metrics,
        }
    }

    /// Current state.
    pub fn state(&self) -> PreparationState {
        self.slot.lock().state()
    }

    /// Number of native warm-up calls made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// The error of the last failed warm-up, if the engine is in `Failed`.
    pub fn last_error(&self) -> Option<PreparationError> {
        match &*self.slot.lock() {
            Slot::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// Make the engine ready.
    ///
    /// Returns immediately when already ready, joins an in-flight warm-up,
    /// or starts a new one.
    ///
    /// # Errors
    ///
    /// A [`PreparationError`] carrying the native sub-reason, or a
    /// [`DisposedError`] if the handle was disposed before or during
    /// warm-up.
    #[instrument(skip(self), fields(provider = self.engine.provider_name()))]
    pub async fn prepare(&self) -> BridgeResult<()> {
        let shared = {
            let mut slot = self.slot.lock();
            let joined = match &*slot {
                Slot::Ready => return Ok(()),
                Slot::Disposed => {
                    return Err(DisposedError::new("engine disposed before preparation").into());
                }
                Slot::Preparing { shared, .. } => Some(shared.clone()),
                Slot::NotPrepared | Slot::Failed(_) => None,
            };
            match joined {
                Some(shared) => {
                    debug!("Joining in-flight preparation");
                    shared
                }
                None => self.start(&mut slot)?,
            }
        };
        shared.await
    }

    fn start(&self, slot: &mut Slot) -> BridgeResult<SharedPreparation> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.metrics.record_preparation_attempt();
        info!(attempt, "Starting engine preparation");

        let (listener, completion) = one_shot::<()>("prepare");
        let operation = match guard_native("prepare", || self.engine.prepare(listener)) {
            Ok(operation) => operation,
            Err(native) => {
                let err = PreparationError::new(PreparationErrorKind::from(&native));
                *slot = Slot::Failed(err.clone());
                return Err(err.into());
            }
        };
        let bridge = CancellationBridge::new("prepare", operation);

        let slot_handle = Arc::clone(&self.slot);
        let disposed = self.disposed.clone();
        let watched = bridge.clone();
        let shared = async move {
            let outcome: BridgeResult<()> = tokio::select! {
                biased;
                _ = disposed.cancelled() => {
                    watched.cancel();
                    Err(DisposedError::new("engine disposed during preparation").into())
                }
                result = completion => {
                    watched.complete();
                    result.map_err(|native| {
                        warn!(attempt, error = %native, "Engine preparation failed");
                        BridgeError::from(PreparationError::new(PreparationErrorKind::from(&native)))
                    })
                }
            };

            let mut slot = slot_handle.lock();
            let current = matches!(&*slot, Slot::Preparing { attempt: a, .. } if *a == attempt);
            if current {
                *slot = match &outcome {
                    Ok(()) => {
                        info!(attempt, "Engine ready");
                        Slot::Ready
                    }
                    Err(err) => match err.kind() {
                        BridgeErrorKind::Preparation(prep) => Slot::Failed(prep.clone()),
                        _ => Slot::Disposed,
                    },
                };
            }
            outcome
        }
        .boxed()
        .shared();

        *slot = Slot::Preparing {
            attempt,
            shared: shared.clone(),
            bridge,
        };

        // Drive the warm-up even if every waiter goes away.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(shared.clone().map(|_| ()));
        }
        Ok(shared)
    }

    /// Move to `Disposed`, cancelling any in-flight warm-up.
    pub fn dispose(&self) {
        let previous = std::mem::replace(&mut *self.slot.lock(), Slot::Disposed);
        if let Slot::Preparing { bridge, .. } = previous {
            debug!("Cancelling in-flight preparation on dispose");
            bridge.cancel();
        }
    }
}
