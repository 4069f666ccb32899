//! Run on-device language models through one request/response contract.
//!
//! This crate ties the workspace together. It loads an [`AiConfig`], picks a
//! native engine and opens a [`GenerationSession`] with the configured
//! defaults.
//!
//! # Examples
//!
//! ```
//! use ondevice::{AiConfig, CancellationToken, GenerationRequest, open_session};
//! use ondevice_models::EchoSettings;
//!
//! # tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap().block_on(async {
//! let config = AiConfig::default().with_echo(EchoSettings::instant());
//! let session = open_session(&config).unwrap();
//!
//! let response = session
//!     .generate(GenerationRequest::prompt("ping"), CancellationToken::new())
//!     .await
//!     .unwrap();
//! assert_eq!(response.text(), "You said: ping");
//! # });
//! ```

mod config;
mod engine;

pub use config::{AiConfig, Backend, DEFAULT_SYSTEM_MESSAGE};
pub use engine::{build_engine, open_session, open_session_with};

pub use ondevice_bridge::{CancellationToken, GenerationSession, collect_stream};
pub use ondevice_core::{
    FinishReason, GenerationOptions, GenerationRequest, GenerationResponse, ResponseChunk, Role,
    Turn,
};
pub use ondevice_error::{BridgeError, BridgeErrorKind, BridgeResult};
pub use ondevice_interface::{GenerationClient, NativeEngine, ResponseStream};
