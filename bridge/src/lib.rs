//! BEAM VM Bridge Library
//!
//! Lifecycle control of an embedded, externally built BEAM runtime for mobile
//! hosts. The bridge starts the runtime through its `erl_start` entry point,
//! tracks whether the host may use it, and exposes placeholder call/send
//! operations.
//!
//! # Feature Flags
//!
//! - `erlang`: link the prebuilt runtime (`liberlang.a`) into the library
//! - `jni`: export the JNI entry points of the Android plugin
//! - Default: no runtime linked; `initialize` reports the runtime unavailable

/// Lifecycle controller
pub mod vm;

/// Environment and argument vector for the runtime
pub mod launch;

/// Runtime backends supplying the start entry point
pub mod runtime;

/// Process-wide bridge instance
pub mod global;

/// C ABI entry points
pub mod ffi;

/// JNI entry points for the Android plugin
#[cfg(feature = "jni")]
pub mod android;

/// Method channel dispatcher
pub mod channel;

/// Configuration management module
pub mod config;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Platform-specific utilities module
pub mod platform;

pub use launch::LaunchPlan;
pub use runtime::ErlangRuntime;
pub use vm::{BeamVm, VmState, OTP_VERSION};
