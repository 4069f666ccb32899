//! Conversions between bridge types and the callback SDK.

use super::sdk::{FoundationOptions, SystemModelAvailability, TranscriptEntry, TranscriptRole};
use ondevice_core::{GenerationOptions, Role, Turn};
use ondevice_error::{NativeError, NativeErrorKind};

/// Error domain the SDK reports availability faults under.
pub const AVAILABILITY_DOMAIN: &str = "SystemLanguageModel";

/// Split a validated history into transcript and trailing prompt.
pub fn to_transcript(turns: &[Turn]) -> (Vec<TranscriptEntry>, String) {
    let (prompt, context) = match turns.split_last() {
        Some((last, context)) => (last.text(), context),
        None => (String::new(), turns),
    };
    let transcript = context
        .iter()
        .map(|turn| {
            let role = match turn.role() {
                Role::System => TranscriptRole::Instructions,
                Role::User => TranscriptRole::Prompt,
                Role::Assistant => TranscriptRole::Response,
            };
            TranscriptEntry::new(role, turn.text())
        })
        .collect();
    (transcript, prompt)
}

/// Options in the SDK's vocabulary.
pub fn to_options(options: &GenerationOptions) -> FoundationOptions {
    FoundationOptions {
        temperature: options.temperature.map(f64::from),
        maximum_response_tokens: options.max_output_tokens,
        sampling: options.effective_sampling(),
    }
}

/// The fault a non-available model reports, or `None` when available.
pub fn availability_error(availability: SystemModelAvailability) -> Option<NativeError> {
    let (kind, code, suggestion) = match availability {
        SystemModelAvailability::Available => return None,
        SystemModelAvailability::AppleIntelligenceNotEnabled => (
            NativeErrorKind::FeatureDisabled,
            1,
            "Turn on Apple Intelligence in Settings",
        ),
        SystemModelAvailability::DeviceNotEligible => (
            NativeErrorKind::DeviceIneligible,
            2,
            "Use a device that supports Apple Intelligence",
        ),
        SystemModelAvailability::ModelNotReady => (
            NativeErrorKind::ModelNotReady,
            3,
            "Wait for the model download to finish",
        ),
        SystemModelAvailability::Unavailable => (
            NativeErrorKind::Unavailable,
            4,
            "Try again later",
        ),
    };
    Some(
        NativeError::new(kind, availability.to_string())
            .with_domain(AVAILABILITY_DOMAIN)
            .with_code(code)
            .with_recovery_suggestion(suggestion),
    )
}
