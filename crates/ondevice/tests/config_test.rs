//! Tests for configuration loading.

use ondevice::{AiConfig, Backend, BridgeErrorKind, DEFAULT_SYSTEM_MESSAGE};
use std::io::Write;
use std::str::FromStr;

#[test]
fn test_empty_config_uses_defaults() {
    let config = AiConfig::from_toml_str("").expect("Empty config is valid");

    assert_eq!(config, AiConfig::default());
    assert_eq!(*config.backend(), Backend::Echo);
    assert!(*config.fallback_to_echo());
    assert!(*config.use_streaming());
    assert_eq!(config.system_message(), DEFAULT_SYSTEM_MESSAGE);
    assert_eq!(config.defaults().temperature, Some(0.2));
    assert_eq!(config.defaults().top_k, Some(16));
    assert_eq!(config.defaults().max_output_tokens, Some(256));
}

#[test]
fn test_full_config_parses() {
    let config = AiConfig::from_toml_str(
        r#"
        backend = "aicore"
        fallback_to_echo = false
        system_message = "Answer in one sentence."
        use_streaming = false

        [echo]
        model_name = "Parrot"
        response_delay_ms = 0

        [defaults]
        temperature = 0.9
        top_k = 40
        "#,
    )
    .expect("Valid config");

    assert_eq!(*config.backend(), Backend::AiCore);
    assert!(!*config.fallback_to_echo());
    assert!(!*config.use_streaming());
    assert_eq!(config.echo().model_name(), "Parrot");
    assert_eq!(*config.echo().response_delay_ms(), 0);
    assert_eq!(*config.echo().word_delay_ms(), 50);
    assert_eq!(config.defaults().temperature, Some(0.9));
    assert_eq!(config.defaults().top_k, Some(40));
    // A partial [defaults] table replaces the built-in defaults
    assert_eq!(config.defaults().max_output_tokens, None);
}

#[test]
fn test_unknown_backend_is_a_config_error() {
    let err = AiConfig::from_toml_str(r#"backend = "mainframe""#)
        .expect_err("Unknown backend should be rejected");

    match err.kind() {
        BridgeErrorKind::Config(config) => {
            assert!(config.message.starts_with("Failed to parse config"));
        }
        other => panic!("Expected config error, got {:?}", other),
    }
}

#[test]
fn test_backend_names_parse_from_cli_text() {
    assert_eq!(Backend::from_str("phi-silica").ok(), Some(Backend::PhiSilica));
    assert_eq!(Backend::from_str("foundation").ok(), Some(Backend::Foundation));
    assert!(Backend::from_str("PhiSilica").is_err());
    assert_eq!(Backend::AiCore.to_string(), "aicore");
}

#[test]
fn test_from_file_reads_toml() {
    let mut file = tempfile::NamedTempFile::new().expect("Temp file");
    writeln!(file, "backend = \"foundation\"\nuse_streaming = false").expect("Write config");

    let config = AiConfig::from_file(file.path()).expect("Valid config file");
    assert_eq!(*config.backend(), Backend::Foundation);
    assert!(!*config.use_streaming());
}

#[test]
fn test_missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().expect("Temp dir");
    let err = AiConfig::from_file(dir.path().join("missing.toml"))
        .expect_err("Missing file should be rejected");

    match err.kind() {
        BridgeErrorKind::Config(config) => {
            assert!(config.message.starts_with("Failed to read config file"));
        }
        other => panic!("Expected config error, got {:?}", other),
    }
}

#[test]
fn test_system_message_fills_missing_instructions() {
    let config = AiConfig::default();
    assert_eq!(
        config.session_defaults().instructions.as_deref(),
        Some(DEFAULT_SYSTEM_MESSAGE)
    );

    let explicit = AiConfig::from_toml_str(
        r#"
        [defaults]
        instructions = "Speak like a pirate."
        "#,
    )
    .expect("Valid config");
    assert_eq!(
        explicit.session_defaults().instructions.as_deref(),
        Some("Speak like a pirate.")
    );

    let blank = AiConfig::from_toml_str(r#"system_message = "  ""#).expect("Valid config");
    assert_eq!(blank.session_defaults().instructions, None);
}
