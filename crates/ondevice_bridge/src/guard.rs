//! Panic containment at the native boundary.

use ondevice_error::NativeError;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::error;

/// Run a native entry point, turning a panic into a
/// [`NativeErrorKind::Fault`](ondevice_error::NativeErrorKind::Fault).
pub(crate) fn guard_native<R>(
    operation: &'static str,
    call: impl FnOnce() -> R,
) -> Result<R, NativeError> {
    catch_unwind(AssertUnwindSafe(call)).map_err(|payload| {
        let err = NativeError::from_panic(payload.as_ref());
        error!(operation, error = %err, "Native call panicked");
        err
    })
}
