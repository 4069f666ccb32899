//! Prompt rendering for Phi-3 family models.

use super::sdk::LanguageModelOptions;
use ondevice_core::{GenerationOptions, Role, Turn};

/// Render a validated history in the Phi-3 chat format.
///
/// # Examples
///
/// ```
/// use ondevice_core::Turn;
/// use ondevice_models::phi_silica::to_phi3_prompt;
///
/// let prompt = to_phi3_prompt(&[Turn::system("Be brief."), Turn::user("Hi")]);
/// assert_eq!(
///     prompt,
///     "<|system|>\nBe brief.<|end|>\n<|user|>\nHi<|end|>\n<|assistant|>\n"
/// );
/// ```
pub fn to_phi3_prompt(turns: &[Turn]) -> String {
    let mut prompt = String::new();
    for turn in turns {
        let role = match turn.role() {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        prompt.push_str(&format!("<|{}|>\n{}<|end|>\n", role, turn.text()));
    }
    prompt.push_str("<|assistant|>\n");
    prompt
}

/// Options in the SDK's vocabulary.
pub fn to_model_options(options: &GenerationOptions) -> LanguageModelOptions {
    LanguageModelOptions {
        temperature: options.temperature,
        top_k: options.top_k,
        top_p: options.top_p,
        max_length: options.max_output_tokens,
    }
}
