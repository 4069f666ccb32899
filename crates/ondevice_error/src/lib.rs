//! Error types for the ondevice generation bridge.
//!
//! Every error that crosses the bridge is one of the kinds in
//! [`BridgeErrorKind`]. Raw native faults ([`NativeError`]) never reach
//! callers directly; they are converted at the listener boundary.

mod config;
mod generation;
mod lifecycle;
mod native;
mod preparation;
mod validation;

pub use config::ConfigError;
pub use generation::GenerationError;
pub use lifecycle::{CancelledError, DisposedError};
pub use native::{NativeError, NativeErrorKind};
pub use preparation::{PreparationError, PreparationErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};

/// Crate-level error variants.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From, derive_more::Display)]
pub enum BridgeErrorKind {
    /// Malformed request, detected before any native call
    #[display("{_0}")]
    Validation(ValidationError),
    /// Engine warm-up failed or the engine is unavailable
    #[display("{_0}")]
    Preparation(PreparationError),
    /// Native generation failed after preparation succeeded
    #[display("{_0}")]
    Generation(GenerationError),
    /// Caller-requested cancellation
    #[display("{_0}")]
    Cancelled(CancelledError),
    /// The engine handle was disposed
    #[display("{_0}")]
    Disposed(DisposedError),
    /// Invalid configuration
    #[display("{_0}")]
    Config(ConfigError),
}

/// Bridge error with kind discrimination.
///
/// # Examples
///
/// ```
/// use ondevice_error::{BridgeError, BridgeErrorKind, CancelledError};
///
/// let err = BridgeError::from(CancelledError::new());
/// assert!(err.is_cancelled());
/// assert!(matches!(err.kind(), BridgeErrorKind::Cancelled(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeError(Box<BridgeErrorKind>);

impl BridgeError {
    /// Create a new error from a kind.
    pub fn new(kind: BridgeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BridgeErrorKind {
        &self.0
    }

    /// True for caller-requested cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(*self.0, BridgeErrorKind::Cancelled(_))
    }

    /// True when a later call may succeed by re-attempting preparation.
    ///
    /// No error is retried internally; this only informs caller policy.
    pub fn is_retryable(&self) -> bool {
        matches!(*self.0, BridgeErrorKind::Preparation(_))
    }
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bridge Error: {}", self.0)
    }
}

impl std::error::Error for BridgeError {}

impl<T> From<T> for BridgeError
where
    T: Into<BridgeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
