//! Statically linked runtime
//!
//! Only compiled with the `erlang` feature; `build.rs` links `liberlang.a`.

use super::{invoke_start, ErlangRuntime};
use std::ffi::CString;
use std::os::raw::{c_char, c_int};

extern "C" {
    fn erl_start(argc: c_int, argv: *mut *mut c_char) -> c_int;
}

/// `erl_start` from the runtime archive linked into this library
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedRuntime;

impl ErlangRuntime for LinkedRuntime {
    fn name(&self) -> &str {
        "linked"
    }

    fn start(&mut self, args: &[CString]) -> i32 {
        // SAFETY: erl_start is the runtime's own entry point, resolved at link time.
        unsafe { invoke_start(erl_start, args) }
    }
}
