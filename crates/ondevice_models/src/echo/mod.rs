//! Echo engine for demos, tests and fallback.

mod engine;
mod settings;

pub use engine::{ECHO_PROVIDER, EchoEngine};
pub use settings::{EchoSettings, EchoSettingsBuilder};
