//! Engine preparation error types.

use crate::{NativeError, NativeErrorKind};

/// Why an inference engine could not be made ready.
///
/// Sub-reasons are kept apart so callers can show actionable messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PreparationErrorKind {
    /// The on-device AI feature is not enabled.
    #[display("On-device AI is not enabled on this device")]
    FeatureDisabled,
    /// The device cannot run the model.
    #[display("This device is not eligible for on-device AI")]
    DeviceIneligible,
    /// The model is not downloaded or installed yet.
    #[display("The on-device model is not ready")]
    ModelNotReady,
    /// Unavailable for another reason.
    #[display("The on-device model is unavailable: {_0}")]
    Unavailable(String),
    /// The warm-up call itself failed.
    #[display("Engine warm-up failed: {_0}")]
    Failed(String),
}

impl From<&NativeError> for PreparationErrorKind {
    fn from(err: &NativeError) -> Self {
        match err.kind {
            NativeErrorKind::FeatureDisabled => PreparationErrorKind::FeatureDisabled,
            NativeErrorKind::DeviceIneligible => PreparationErrorKind::DeviceIneligible,
            NativeErrorKind::ModelNotReady => PreparationErrorKind::ModelNotReady,
            NativeErrorKind::Unavailable => PreparationErrorKind::Unavailable(err.message.clone()),
            _ => PreparationErrorKind::Failed(err.to_string()),
        }
    }
}

/// Preparation error with location tracking.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Preparation Error: {} at line {} in {}", kind, line, file)]
pub struct PreparationError {
    kind: PreparationErrorKind,
    line: u32,
    file: &'static str,
}

impl PreparationError {
    /// Create a new preparation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PreparationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PreparationErrorKind {
        &self.kind
    }
}

impl From<PreparationErrorKind> for PreparationError {
    #[track_caller]
    fn from(kind: PreparationErrorKind) -> Self {
        Self::new(kind)
    }
}
