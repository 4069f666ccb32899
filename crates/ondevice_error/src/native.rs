//! Faults reported by native inference SDKs.

/// Classification of a native fault.
///
/// The first four variants are availability conditions reported while an
/// engine warms up; they are preserved as distinct preparation sub-reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum NativeErrorKind {
    /// The on-device AI feature is switched off by the user.
    #[display("feature disabled")]
    FeatureDisabled,
    /// The hardware cannot run the model.
    #[display("device ineligible")]
    DeviceIneligible,
    /// The model exists but is still downloading or installing.
    #[display("model not ready")]
    ModelNotReady,
    /// The engine is unavailable for an unspecified reason.
    #[display("unavailable")]
    Unavailable,
    /// The native operation observed a cancellation.
    #[display("cancelled")]
    Cancelled,
    /// The native code panicked and the panic was caught at the boundary.
    #[display("fault")]
    Fault,
    /// Any other failure.
    #[display("failed")]
    Failed,
}

/// A fault delivered by a native SDK through a completion listener.
///
/// Mirrors the record native SDKs attach to their errors: a domain, a code,
/// a description and optional failure reason and recovery suggestion.
///
/// # Examples
///
/// ```
/// use ondevice_error::{NativeError, NativeErrorKind};
///
/// let err = NativeError::new(NativeErrorKind::DeviceIneligible, "device ineligible")
///     .with_domain("SystemLanguageModel")
///     .with_recovery_suggestion("Use a supported device");
///
/// assert_eq!(err.kind, NativeErrorKind::DeviceIneligible);
/// assert!(err.to_string().contains("device ineligible"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{domain} ({code}): {message}")]
pub struct NativeError {
    /// Classification of the fault
    pub kind: NativeErrorKind,
    /// Error domain reported by the SDK
    pub domain: String,
    /// Numeric code within the domain
    pub code: i64,
    /// Human readable description
    pub message: String,
    /// Why the operation failed, if the SDK said
    pub failure_reason: Option<String>,
    /// What the user could do about it, if the SDK said
    pub recovery_suggestion: Option<String>,
}

impl NativeError {
    /// Create a native error in the generic "UnknownErrorDomain" with code 0.
    pub fn new(kind: NativeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            domain: "UnknownErrorDomain".to_string(),
            code: 0,
            message: message.into(),
            failure_reason: None,
            recovery_suggestion: None,
        }
    }

    /// Shorthand for a [`NativeErrorKind::Failed`] error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(NativeErrorKind::Failed, message)
    }

    /// Convert a caught panic payload into a [`NativeErrorKind::Fault`].
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self::new(NativeErrorKind::Fault, format!("native code panicked: {}", detail))
    }

    /// Set the error domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Set the failure reason.
    pub fn with_failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    /// Set the recovery suggestion.
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.recovery_suggestion = Some(suggestion.into());
        self
    }
}
