//! Native engine adapters for the ondevice generation bridge.
//!
//! Each adapter implements [`NativeEngine`](ondevice_interface::NativeEngine)
//! over an SDK trait that captures one platform's concurrency model:
//!
//! - `foundation`: completion callbacks, cancellation by signal
//! - `aicore`: suspending calls launched as tasks, cancellation by abort
//! - `phi_silica`: promises driven to completion, cancellation by abort handle
//!
//! The [`echo`] engine needs no SDK and is always available.

pub mod echo;
#[cfg(any(feature = "foundation", feature = "aicore", feature = "phi-silica"))]
mod guard;

#[cfg(feature = "aicore")]
pub mod aicore;
#[cfg(feature = "foundation")]
pub mod foundation;
#[cfg(feature = "phi-silica")]
pub mod phi_silica;

pub use echo::{EchoEngine, EchoSettings};
