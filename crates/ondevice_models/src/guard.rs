//! Panic containment for SDK calls.

use ondevice_error::NativeError;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::error;

/// Run a synchronous SDK call, converting a panic into a fault.
pub(crate) fn guard_sdk<R>(call: &'static str, f: impl FnOnce() -> R) -> Result<R, NativeError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let err = NativeError::from_panic(payload.as_ref());
        error!(call, error = %err, "SDK call panicked");
        err
    })
}

/// Await an SDK future, converting a panic into a fault.
#[cfg(any(feature = "aicore", feature = "phi-silica"))]
pub(crate) async fn guard_sdk_async<T, F>(call: &'static str, future: F) -> Result<T, NativeError>
where
    F: std::future::Future<Output = Result<T, NativeError>>,
{
    use futures::FutureExt;

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let err = NativeError::from_panic(payload.as_ref());
            error!(call, error = %err, "SDK future panicked");
            Err(err)
        }
    }
}
