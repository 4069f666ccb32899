//! Generation options passed through to native engines.

use serde::{Deserialize, Serialize};

/// How the next token is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SamplingMode {
    /// Always pick the most likely token.
    Greedy,
    /// Sample among the `k` most likely tokens.
    RandomTopK {
        /// Number of candidate tokens
        k: u32,
        /// Optional seed for reproducible sampling
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Sample among the tokens whose cumulative probability reaches `threshold`.
    RandomProbability {
        /// Cumulative probability cut-off
        threshold: f64,
        /// Optional seed for reproducible sampling
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// Options for one generation call.
///
/// Every field is optional; `None` means "use the native default". Values
/// are passed through to the engine, never reinterpreted.
///
/// # Examples
///
/// ```
/// use ondevice_core::GenerationOptions;
///
/// let defaults = GenerationOptions::default()
///     .with_temperature(0.2)
///     .with_top_k(16)
///     .with_max_output_tokens(256);
/// let request = GenerationOptions::default().with_temperature(0.9);
///
/// let resolved = request.merged_over(&defaults);
/// assert_eq!(resolved.temperature, Some(0.9));
/// assert_eq!(resolved.top_k, Some(16));
/// assert_eq!(resolved.max_output_tokens, Some(256));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_setters::Setters)]
#[setters(strip_option, prefix = "with_")]
#[serde(default)]
pub struct GenerationOptions {
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Top-k cut-off
    pub top_k: Option<u32>,
    /// Nucleus sampling cut-off
    pub top_p: Option<f32>,
    /// Maximum number of tokens to produce
    pub max_output_tokens: Option<u32>,
    /// Explicit sampling strategy
    pub sampling_mode: Option<SamplingMode>,
    /// System instructions for the model
    #[setters(into)]
    pub instructions: Option<String>,
}

impl GenerationOptions {
    /// Fill every absent field from `defaults`; present fields win.
    pub fn merged_over(&self, defaults: &GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature.or(defaults.temperature),
            top_k: self.top_k.or(defaults.top_k),
            top_p: self.top_p.or(defaults.top_p),
            max_output_tokens: self.max_output_tokens.or(defaults.max_output_tokens),
            sampling_mode: self.sampling_mode.or(defaults.sampling_mode),
            instructions: self
                .instructions
                .clone()
                .or_else(|| defaults.instructions.clone()),
        }
    }

    /// The sampling strategy implied by these options.
    ///
    /// An explicit `sampling_mode` wins; otherwise `top_k` selects top-k
    /// sampling and `top_p` selects probability sampling.
    pub fn effective_sampling(&self) -> Option<SamplingMode> {
        if let Some(mode) = self.sampling_mode {
            return Some(mode);
        }
        if let Some(k) = self.top_k {
            return Some(SamplingMode::RandomTopK { k, seed: None });
        }
        self.top_p.map(|p| SamplingMode::RandomProbability {
            threshold: f64::from(p),
            seed: None,
        })
    }
}
