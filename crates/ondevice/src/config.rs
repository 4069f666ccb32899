//! Application configuration.

use derive_getters::Getters;
use ondevice_core::GenerationOptions;
use ondevice_error::{BridgeError, BridgeResult, ConfigError};
use ondevice_models::EchoSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default system message used when a request carries no instructions.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful AI assistant.";

/// Which native engine to run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Backend {
    /// The built-in echo engine
    #[default]
    #[serde(rename = "echo")]
    #[strum(serialize = "echo")]
    Echo,
    /// Completion-callback SDKs (Apple Intelligence)
    #[serde(rename = "foundation")]
    #[strum(serialize = "foundation")]
    Foundation,
    /// Coroutine SDKs (Gemini Nano through AICore)
    #[serde(rename = "aicore")]
    #[strum(serialize = "aicore")]
    AiCore,
    /// Promise SDKs (Phi Silica)
    #[serde(rename = "phi-silica")]
    #[strum(serialize = "phi-silica")]
    PhiSilica,
}

fn default_generation_options() -> GenerationOptions {
    GenerationOptions::default()
        .with_temperature(0.2)
        .with_top_k(16)
        .with_max_output_tokens(256)
}

/// Configuration for opening generation sessions.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # Examples
///
/// ```
/// use ondevice::{AiConfig, Backend};
///
/// let config = AiConfig::from_toml_str(
///     r#"
///     backend = "phi-silica"
///     use_streaming = false
///
///     [defaults]
///     temperature = 0.7
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(*config.backend(), Backend::PhiSilica);
/// assert!(*config.fallback_to_echo());
/// assert_eq!(config.defaults().temperature, Some(0.7));
/// assert_eq!(config.system_message(), "You are a helpful AI assistant.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct AiConfig {
    /// Engine to open sessions on
    backend: Backend,
    /// Use the echo engine when the selected backend cannot be built
    fallback_to_echo: bool,
    /// Echo engine settings
    echo: EchoSettings,
    /// Options applied under every request
    defaults: GenerationOptions,
    /// Instructions used when the request has no system turn or instructions of its own
    system_message: String,
    /// Whether the CLI streams by default
    use_streaming: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Echo,
            fallback_to_echo: true,
            echo: EchoSettings::default(),
            defaults: default_generation_options(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
            use_streaming: true,
        }
    }
}

impl AiConfig {
    /// Load configuration from a TOML file.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BridgeError::from(ConfigError::new(format!(
                "Failed to read config file: {}",
                e
            )))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> BridgeResult<Self> {
        toml::from_str(content).map_err(|e| {
            BridgeError::from(ConfigError::new(format!("Failed to parse config: {}", e)))
        })
    }

    /// Select a different backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Enable or disable the echo fallback.
    pub fn with_fallback_to_echo(mut self, fallback: bool) -> Self {
        self.fallback_to_echo = fallback;
        self
    }

    /// Replace the echo engine settings.
    pub fn with_echo(mut self, echo: EchoSettings) -> Self {
        self.echo = echo;
        self
    }

    /// Options a session applies under every request.
    ///
    /// The system message fills in `instructions` when the configured
    /// defaults leave them unset. A blank system message is ignored.
    pub fn session_defaults(&self) -> GenerationOptions {
        let mut defaults = self.defaults.clone();
        if defaults.instructions.is_none() && !self.system_message.trim().is_empty() {
            defaults.instructions = Some(self.system_message.clone());
        }
        defaults
    }
}
