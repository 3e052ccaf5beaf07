//! Runtime backends for starting the BEAM VM
//!
//! The bridge never implements the VM; it only hands a launch plan to an
//! entry point with the `erl_start(argc, argv)` contract. This module provides
//! the backends that supply that entry point:
//! - LinkedRuntime: `erl_start` linked statically (feature `erlang`)
//! - DynamicRuntime: `erl_start` resolved from a shared library at run time
//! - UnavailableRuntime: this build carries no runtime support
//! - MockRuntime: records the start sequence for tests

use std::ffi::CString;
use std::os::raw::{c_char, c_int};

pub mod dynamic;
#[cfg(feature = "erlang")]
pub mod linked;
pub mod mock;

pub use dynamic::DynamicRuntime;
#[cfg(feature = "erlang")]
pub use linked::LinkedRuntime;
pub use mock::{MockHandle, MockRuntime};

/// Signature of the runtime's start entry point
pub type ErlStartFn = unsafe extern "C" fn(argc: c_int, argv: *mut *mut c_char) -> c_int;

/// An entry point capable of bringing up the BEAM VM
///
/// `start` may block for the whole runtime bring-up and is only ever invoked
/// once per successful lifecycle.
pub trait ErlangRuntime: Send {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Whether this backend can start anything at all
    fn is_available(&self) -> bool {
        true
    }

    /// Set a process environment variable for the runtime to read
    fn set_env(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    /// Invoke the start entry point; returns its status unchanged
    fn start(&mut self, args: &[CString]) -> i32;
}

/// Backend for builds without runtime support
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRuntime;

impl ErlangRuntime for UnavailableRuntime {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _args: &[CString]) -> i32 {
        sdk::errors::STATUS_RUNTIME_UNAVAILABLE
    }
}

/// The backend this build was compiled with
pub fn default_runtime() -> Box<dyn ErlangRuntime> {
    #[cfg(feature = "erlang")]
    {
        Box::new(LinkedRuntime)
    }

    #[cfg(not(feature = "erlang"))]
    {
        Box::new(UnavailableRuntime)
    }
}

/// Call an `erl_start`-shaped entry point with an owned argument vector
///
/// # Safety
///
/// `entry` must point to a function honouring the `erl_start` contract.
pub(crate) unsafe fn invoke_start(entry: ErlStartFn, args: &[CString]) -> i32 {
    // erl_start takes `char**`; it reads but does not free the strings
    let mut argv: Vec<*mut c_char> = args
        .iter()
        .map(|arg| arg.as_ptr() as *mut c_char)
        .collect();
    let argc = argv.len() as c_int;
    argv.push(std::ptr::null_mut());

    // SAFETY: argv holds `argc` valid NUL-terminated strings followed by a null
    // pointer, and `args` outlives the call.
    unsafe { entry(argc, argv.as_mut_ptr()) }
}
