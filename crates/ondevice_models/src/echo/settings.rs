//! Echo engine settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_model_name() -> String {
    "Echo".to_string()
}

fn default_response_delay_ms() -> u64 {
    500
}

fn default_word_delay_ms() -> u64 {
    50
}

/// Settings for [`EchoEngine`](super::EchoEngine).
///
/// # Examples
///
/// ```
/// use ondevice_models::echo::EchoSettings;
///
/// let settings = EchoSettings::builder()
///     .response_delay_ms(0u64)
///     .build()
///     .unwrap();
/// assert_eq!(settings.model_name(), "Echo");
/// assert_eq!(*settings.word_delay_ms(), 50);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
#[serde(default)]
pub struct EchoSettings {
    /// Model identifier reported in responses
    #[builder(default = "default_model_name()")]
    #[serde(default = "default_model_name")]
    model_name: String,
    /// Delay before the response starts
    #[builder(default = "default_response_delay_ms()")]
    #[serde(default = "default_response_delay_ms")]
    response_delay_ms: u64,
    /// Delay between streamed words
    #[builder(default = "default_word_delay_ms()")]
    #[serde(default = "default_word_delay_ms")]
    word_delay_ms: u64,
}

impl EchoSettings {
    /// Returns a builder for constructing EchoSettings.
    pub fn builder() -> EchoSettingsBuilder {
        EchoSettingsBuilder::default()
    }

    /// Settings with no artificial delays.
    pub fn instant() -> Self {
        Self {
            response_delay_ms: 0,
            word_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Delay before the response starts.
    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }

    /// Delay between streamed words.
    pub fn word_delay(&self) -> Duration {
        Duration::from_millis(self.word_delay_ms)
    }
}

impl Default for EchoSettings {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            response_delay_ms: default_response_delay_ms(),
            word_delay_ms: default_word_delay_ms(),
        }
    }
}
