//! Generation requests and their validation.

use crate::{ContentPart, GenerationOptions, Role, Turn};
use ondevice_error::{ValidationError, ValidationErrorKind};
use serde::{Deserialize, Serialize};

/// A normalized generation request.
///
/// Immutable once submitted; owns no native resources.
///
/// # Examples
///
/// ```
/// use ondevice_core::{GenerationOptions, GenerationRequest, Turn};
///
/// let request = GenerationRequest::builder()
///     .history(vec![Turn::user("Hello")])
///     .options(GenerationOptions::default().with_instructions("Be brief."))
///     .build()
///     .unwrap();
///
/// let history = request.validated_history().unwrap();
/// assert_eq!(history.len(), 2);
/// assert_eq!(history[0], Turn::system("Be brief."));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct GenerationRequest {
    /// Ordered conversation turns
    history: Vec<Turn>,
    /// Generation options
    #[builder(default)]
    #[serde(default)]
    options: GenerationOptions,
}

impl GenerationRequest {
    /// Creates a request from history and options.
    pub fn new(history: Vec<Turn>, options: GenerationOptions) -> Self {
        Self { history, options }
    }

    /// Returns a builder for constructing a GenerationRequest.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// A request holding a single user prompt with default options.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(vec![Turn::user(text)], GenerationOptions::default())
    }

    /// The same request with options resolved over `defaults`.
    ///
    /// Default instructions only apply to a history without its own system
    /// turn; instructions set on the request itself are always kept.
    pub fn with_defaults(&self, defaults: &GenerationOptions) -> Self {
        let mut options = self.options.merged_over(defaults);
        let has_system_turn = self
            .history
            .first()
            .is_some_and(|turn| *turn.role() == Role::System);
        if has_system_turn && self.options.instructions.is_none() {
            options.instructions = None;
        }
        Self {
            history: self.history.clone(),
            options,
        }
    }

    /// Validate the request and return the history native engines receive.
    ///
    /// Instructions from the options are folded into the single leading
    /// system turn.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty or blank history, non-text
    /// content, a misplaced or repeated system turn, or a history that does
    /// not end in a non-blank user prompt.
    pub fn validated_history(&self) -> Result<Vec<Turn>, ValidationError> {
        if self.history.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::EmptyHistory));
        }

        if let Some(part) = self
            .history
            .iter()
            .flat_map(|turn| turn.content().iter())
            .find(|part| part.as_text().is_none())
        {
            return Err(ValidationError::new(
                ValidationErrorKind::UnsupportedContent(part.kind_name().to_string()),
            ));
        }

        let system_positions: Vec<usize> = self
            .history
            .iter()
            .enumerate()
            .filter(|(_, turn)| *turn.role() == Role::System)
            .map(|(index, _)| index)
            .collect();
        if system_positions.len() > 1 {
            return Err(ValidationError::new(
                ValidationErrorKind::MultipleSystemTurns,
            ));
        }
        if let Some(&index) = system_positions.first().filter(|&&index| index != 0) {
            return Err(ValidationError::new(
                ValidationErrorKind::SystemTurnNotFirst(index),
            ));
        }

        if self.history.iter().all(Turn::is_blank) {
            return Err(ValidationError::new(ValidationErrorKind::BlankContent));
        }

        match self.history.last() {
            Some(last) if *last.role() == Role::User && !last.is_blank() => {}
            _ => return Err(ValidationError::new(ValidationErrorKind::NoPrompt)),
        }

        let mut history = self.history.clone();
        if let Some(instructions) = self
            .options
            .instructions
            .as_deref()
            .filter(|text| !text.trim().is_empty())
        {
            match history.first() {
                Some(first) if *first.role() == Role::System => {
                    let merged = format!("{}\n\n{}", instructions, first.text());
                    history[0] = Turn::new(Role::System, vec![ContentPart::Text(merged)]);
                }
                _ => history.insert(0, Turn::system(instructions)),
            }
        }

        Ok(history)
    }
}
