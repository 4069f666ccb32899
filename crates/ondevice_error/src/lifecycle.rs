//! Cancellation and disposal outcomes.

/// The caller asked for the operation to stop.
///
/// Kept apart from generation failures so intentional cancellation is not
/// reported as an error to the user.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Operation cancelled at line {} in {}", line, file)]
pub struct CancelledError {
    line: u32,
    file: &'static str,
}

impl CancelledError {
    /// Create a new cancellation outcome at the current location.
    #[track_caller]
    pub fn new() -> Self {
        let location = std::panic::Location::caller();
        Self {
            line: location.line(),
            file: location.file(),
        }
    }
}

impl Default for CancelledError {
    #[track_caller]
    fn default() -> Self {
        Self::new()
    }
}

/// The engine handle was disposed before or during the operation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Engine disposed: {} at line {} in {}", message, line, file)]
pub struct DisposedError {
    message: String,
    line: u32,
    file: &'static str,
}

impl DisposedError {
    /// Create a new disposal error at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
