//! Responses and streaming chunks.

use crate::Turn;
use serde::{Deserialize, Serialize};

/// Why generation stopped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FinishReason {
    /// The model finished normally.
    Stop,
    /// Generation ended because of an error.
    Error,
}

/// One incremental piece of a streaming result.
///
/// In a successful stream exactly one chunk has `is_final` set, and it is
/// the last one.
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct ResponseChunk {
    /// Text added by this chunk
    text_delta: String,
    /// True only for the terminating chunk
    is_final: bool,
    /// Set on the terminating chunk
    finish_reason: Option<FinishReason>,
}

impl ResponseChunk {
    /// A content chunk carrying a text delta.
    pub fn content(text_delta: impl Into<String>) -> Self {
        Self {
            text_delta: text_delta.into(),
            is_final: false,
            finish_reason: None,
        }
    }

    /// The terminating chunk of a stream that finished normally.
    pub fn final_stop(text_delta: impl Into<String>) -> Self {
        Self {
            text_delta: text_delta.into(),
            is_final: true,
            finish_reason: Some(FinishReason::Stop),
        }
    }
}

/// The assembled result of a one-shot generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct GenerationResponse {
    /// The assistant turn produced by the engine
    turn: Turn,
    /// Why generation stopped
    finish_reason: FinishReason,
    /// Model that produced the response
    model_id: String,
}

impl GenerationResponse {
    /// Creates a response from its parts.
    pub fn new(turn: Turn, finish_reason: FinishReason, model_id: impl Into<String>) -> Self {
        Self {
            turn,
            finish_reason,
            model_id: model_id.into(),
        }
    }

    /// An assistant response holding `text` that finished normally.
    pub fn assistant(text: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            turn: Turn::assistant(text),
            finish_reason: FinishReason::Stop,
            model_id: model_id.into(),
        }
    }

    /// The response text.
    pub fn text(&self) -> String {
        self.turn.text()
    }
}
