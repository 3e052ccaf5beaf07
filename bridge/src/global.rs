//! Process-wide bridge instance
//!
//! Host plugins reach the bridge through free functions (C ABI, JNI), so one
//! `BeamVm` lives for the whole process. It is created on first use with the
//! build's default runtime; hosts may install another backend before the
//! first successful `initialize`.
//!
//! The mutex serializes host calls. `initialize` holds it for the whole
//! runtime bring-up.

use crate::runtime::ErlangRuntime;
use crate::vm::BeamVm;
use sdk::errors::BridgeError;
use std::sync::{Mutex, MutexGuard, OnceLock};

static BRIDGE: OnceLock<Mutex<BeamVm>> = OnceLock::new();

/// The process-wide bridge
pub fn bridge() -> &'static Mutex<BeamVm> {
    BRIDGE.get_or_init(|| {
        crate::telemetry::init_telemetry();
        Mutex::new(BeamVm::with_default_runtime())
    })
}

/// Lock the process-wide bridge
///
/// Every transition is a single assignment, so a poisoned lock still holds a
/// consistent `BeamVm`.
pub fn lock() -> MutexGuard<'static, BeamVm> {
    bridge().lock().unwrap_or_else(|e| e.into_inner())
}

/// Install the runtime backend used by the process-wide bridge
///
/// # Errors
///
/// Returns `BridgeError::AlreadyInitialized` once a runtime has started.
pub fn install_runtime(runtime: Box<dyn ErlangRuntime>) -> Result<(), BridgeError> {
    lock().replace_runtime(runtime)
}
