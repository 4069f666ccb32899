//! Engine selection and session construction.

use crate::{AiConfig, Backend};
use ondevice_bridge::GenerationSession;
use ondevice_error::{BridgeResult, ConfigError};
use ondevice_interface::NativeEngine;
use ondevice_models::EchoEngine;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Whether this build carries the adapter for `backend`.
fn adapter_compiled(backend: Backend) -> bool {
    match backend {
        Backend::Echo => true,
        Backend::Foundation => cfg!(feature = "foundation"),
        Backend::AiCore => cfg!(feature = "aicore"),
        Backend::PhiSilica => cfg!(feature = "phi-silica"),
    }
}

/// Build the native engine the configuration selects.
///
/// Platform backends wrap an SDK object the host application owns, so they
/// cannot be built from configuration alone. Construct the adapter from
/// [`ondevice_models`] and pass it to [`open_session_with`] instead. Without
/// one, the echo engine stands in when `fallback_to_echo` is set.
///
/// # Errors
///
/// A [`ConfigError`] when a platform backend is selected and the echo
/// fallback is disabled.
#[instrument(skip(config), fields(backend = %config.backend()))]
pub fn build_engine(config: &AiConfig) -> BridgeResult<Arc<dyn NativeEngine>> {
    let backend = *config.backend();
    if backend == Backend::Echo {
        return Ok(Arc::new(EchoEngine::new(config.echo().clone())));
    }

    let reason = if adapter_compiled(backend) {
        format!("backend `{}` needs a platform model handle", backend)
    } else {
        format!("backend `{}` is not compiled into this build", backend)
    };

    if *config.fallback_to_echo() {
        warn!(%reason, "Falling back to the echo engine");
        Ok(Arc::new(EchoEngine::new(config.echo().clone())))
    } else {
        Err(ConfigError::new(reason).into())
    }
}

/// Open a session on the engine the configuration selects.
///
/// # Errors
///
/// See [`build_engine`].
pub fn open_session(config: &AiConfig) -> BridgeResult<GenerationSession> {
    let engine = build_engine(config)?;
    Ok(open_session_with(engine, config))
}

/// Open a session on `engine` with the configured defaults.
pub fn open_session_with(engine: Arc<dyn NativeEngine>, config: &AiConfig) -> GenerationSession {
    let session = GenerationSession::new(engine).with_defaults(config.session_defaults());
    info!(
        provider = %session.metadata().provider_name(),
        model = %session.metadata().model_id(),
        "Opened generation session"
    );
    session
}
