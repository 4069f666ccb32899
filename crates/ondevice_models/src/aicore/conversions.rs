//! Conversions between bridge types and the coroutine SDK.

use super::sdk::{Content, ContentRole, GenerationConfig};
use ondevice_core::{GenerationOptions, Role, Turn};

/// Map a bridge role onto the SDK's two-role vocabulary.
pub fn to_content_role(role: Role) -> ContentRole {
    match role {
        Role::User => ContentRole::User,
        Role::System | Role::Assistant => ContentRole::Model,
    }
}

/// Convert a validated history into SDK content blocks.
pub fn to_contents(turns: &[Turn]) -> Vec<Content> {
    turns
        .iter()
        .map(|turn| Content::new(to_content_role(*turn.role()), turn.text()))
        .collect()
}

/// Options in the SDK's vocabulary.
pub fn to_config(options: &GenerationOptions) -> GenerationConfig {
    GenerationConfig {
        temperature: options.temperature,
        top_k: options.top_k,
        max_output_tokens: options.max_output_tokens,
    }
}
