//! Request validation error types.

/// Ways a generation request can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationErrorKind {
    /// The request history has no turns.
    #[display("Request history is empty")]
    EmptyHistory,
    /// Every text part in the history is empty or whitespace.
    #[display("Request contains no non-whitespace content")]
    BlankContent,
    /// A content part the native engines cannot consume.
    #[display("Unsupported content part: {_0}")]
    UnsupportedContent(String),
    /// A system turn appears after the first position.
    #[display("System turn must be the first turn (found at index {_0})")]
    SystemTurnNotFirst(usize),
    /// More than one system turn in the history.
    #[display("Request history contains more than one system turn")]
    MultipleSystemTurns,
    /// The last turn is not a non-blank user prompt.
    #[display("Last turn must be a user prompt")]
    NoPrompt,
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use ondevice_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::EmptyHistory);
/// assert_eq!(err.kind(), &ValidationErrorKind::EmptyHistory);
/// assert!(err.to_string().contains("empty"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    line: u32,
    file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}

impl From<ValidationErrorKind> for ValidationError {
    #[track_caller]
    fn from(kind: ValidationErrorKind) -> Self {
        Self::new(kind)
    }
}
