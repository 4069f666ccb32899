//! Generation-time error types.

use crate::NativeError;

/// A native one-shot or streaming call failed after preparation succeeded.
///
/// # Examples
///
/// ```
/// use ondevice_error::{GenerationError, NativeError};
///
/// let err = GenerationError::new(NativeError::failed("context window exceeded"));
/// assert!(err.to_string().contains("context window exceeded"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", source, line, file)]
pub struct GenerationError {
    source: NativeError,
    line: u32,
    file: &'static str,
}

impl GenerationError {
    /// Wrap a native fault with automatic location tracking.
    #[track_caller]
    pub fn new(source: NativeError) -> Self {
        let location = std::panic::Location::caller();
        Self {
            source,
            line: location.line(),
            file: location.file(),
        }
    }

    /// The native fault behind this error.
    pub fn native(&self) -> &NativeError {
        &self.source
    }
}
