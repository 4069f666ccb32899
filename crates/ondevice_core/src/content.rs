//! Content parts carried by a turn.

use serde::{Deserialize, Serialize};

/// One piece of turn content.
///
/// Only text is consumed by the native engines. Other media are part of the
/// model so that requests carrying them fail validation instead of being
/// silently dropped.
///
/// # Examples
///
/// ```
/// use ondevice_core::ContentPart;
///
/// let part = ContentPart::text("Hello");
/// assert_eq!(part.as_text(), Some("Hello"));
/// assert_eq!(part.kind_name(), "text");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ContentPart {
    /// Plain text.
    Text(String),

    /// Image bytes.
    Image {
        /// MIME type, e.g. "image/png"
        mime: Option<String>,
        /// Raw image data
        data: Vec<u8>,
    },
}

impl ContentPart {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    /// The text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Short name of the part type, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContentPart::Text(_) => "text",
            ContentPart::Image { .. } => "image",
        }
    }
}

impl From<&str> for ContentPart {
    fn from(text: &str) -> Self {
        ContentPart::Text(text.to_string())
    }
}

impl From<String> for ContentPart {
    fn from(text: String) -> Self {
        ContentPart::Text(text)
    }
}
