//! Turns of a conversation history.

use crate::{ContentPart, Role};
use serde::{Deserialize, Serialize};

/// One message in a conversation history.
///
/// # Examples
///
/// ```
/// use ondevice_core::{ContentPart, Role, Turn};
///
/// let turn = Turn::builder()
///     .role(Role::User)
///     .content(vec![ContentPart::text("Hello!")])
///     .build()
///     .unwrap();
///
/// assert_eq!(*turn.role(), Role::User);
/// assert_eq!(turn, Turn::user("Hello!"));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
pub struct Turn {
    /// The role of the turn author
    role: Role,
    /// Ordered content parts
    content: Vec<ContentPart>,
}

impl Turn {
    /// Creates a new turn with the given role and content.
    pub fn new(role: Role, content: Vec<ContentPart>) -> Self {
        Self { role, content }
    }

    /// Returns a builder for constructing a Turn.
    pub fn builder() -> TurnBuilder {
        TurnBuilder::default()
    }

    /// A system turn with a single text part.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![ContentPart::Text(text.into())])
    }

    /// A user turn with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentPart::Text(text.into())])
    }

    /// An assistant turn with a single text part.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentPart::Text(text.into())])
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .concat()
    }

    /// True if no text part has non-whitespace characters.
    pub fn is_blank(&self) -> bool {
        self.content
            .iter()
            .filter_map(ContentPart::as_text)
            .all(|text| text.trim().is_empty())
    }
}
