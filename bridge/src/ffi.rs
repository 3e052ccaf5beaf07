//! C ABI entry points
//!
//! Exported from the `cdylib`/`staticlib` builds for hosts that call the
//! bridge directly (the iOS plugin, or any C/C++ shim). All functions act on
//! the process-wide bridge.
//!
//! # Ownership
//!
//! - `beam_get_otp_version` returns a static string; never free it.
//! - `beam_call` and `beam_channel_invoke` return strings owned by the
//!   caller; release them with `beam_string_free`.
//!
//! # Safety
//!
//! Every `*const c_char` argument must be NULL or point to a NUL-terminated
//! string that stays valid for the duration of the call.

use crate::channel;
use crate::global;
use crate::runtime::DynamicRuntime;
use crate::vm::{CALL_PLACEHOLDER, OTP_VERSION_NUL};
use sdk::errors::{BridgeError, STATUS_OK};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};


/// Borrow a host string, or report why it cannot be read
unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, BridgeError> {
    if ptr.is_null() {
        return Err(BridgeError::InvalidArgument(format!("{} is NULL", what)));
    }
    // SAFETY: the caller guarantees ptr is NUL-terminated and live for the call.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|e| BridgeError::InvalidArgument(format!("{} is not UTF-8: {}", what, e)))
}

fn into_raw_string(value: &str) -> *mut c_char {
    match CString::new(value) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            tracing::error!("Cannot return string containing NUL: {}", e);
            std::ptr::null_mut()
        }
    }
}

/// Initialize the BEAM VM with the given runtime root directory
///
/// Returns 0 on success or if already initialized, -1 if runtime support is
/// missing, -2 if `root` is unreadable, or the start function's own non-zero
/// code.
///
/// # Safety
///
/// `root` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn beam_init(root: *const c_char) -> c_int {
    // The path is only read if a start is attempted.
    // SAFETY: forwarded from the caller's contract.
    let read_root = || unsafe { read_str(root, "root path") };

    match global::lock().initialize_with(read_root) {
        Ok(()) => STATUS_OK,
        Err(e) => e.status_code(),
    }
}

/// Check if the BEAM VM is initialized
#[no_mangle]
pub extern "C" fn beam_is_initialized() -> bool {
    global::lock().is_initialized()
}

/// Stop using the BEAM VM; the runtime keeps running
#[no_mangle]
pub extern "C" fn beam_shutdown() {
    global::lock().shutdown();
}

/// Alias of `beam_shutdown` under the name the iOS plugin links against
#[no_mangle]
pub extern "C" fn beam_cleanup() {
    beam_shutdown();
}

/// Get the OTP version string (static, do not free)
#[no_mangle]
pub extern "C" fn beam_get_otp_version() -> *const c_char {
    OTP_VERSION_NUL.as_ptr().cast()
}

/// Call an Erlang function (placeholder)
///
/// Returns NULL before initialization, otherwise the literal `"null"`.
///
/// # Safety
///
/// Each argument must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn beam_call(
    module: *const c_char,
    function: *const c_char,
    args_json: *const c_char,
) -> *mut c_char {
    let vm = global::lock();
    if !vm.is_initialized() {
        tracing::error!("Cannot call: BEAM VM not initialized");
        return std::ptr::null_mut();
    }

    // SAFETY: forwarded from the caller's contract.
    let strings = unsafe {
        (
            read_str(module, "module"),
            read_str(function, "function"),
            read_str(args_json, "args"),
        )
    };
    let (module, function, args_json) = match strings {
        (Ok(m), Ok(f), Ok(a)) => (m, f, a),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            tracing::error!("beam_call: {}", e);
            return std::ptr::null_mut();
        }
    };

    match vm.call(module, function, args_json) {
        Ok(response) => into_raw_string(&response),
        Err(BridgeError::NotImplemented(_)) => into_raw_string(CALL_PLACEHOLDER),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Send a message to an Erlang process (placeholder, delivers nothing)
///
/// # Safety
///
/// Each argument must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn beam_send(process_name: *const c_char, message_json: *const c_char) {
    // SAFETY: forwarded from the caller's contract.
    let strings = unsafe {
        (
            read_str(process_name, "process name"),
            read_str(message_json, "message"),
        )
    };
    let (process_name, message_json) = match strings {
        (Ok(p), Ok(m)) => (p, m),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("beam_send: {}", e);
            return;
        }
    };

    // Errors are already logged by BeamVm::send
    let _ = global::lock().send(process_name, message_json);
}

/// Release a string returned by `beam_call` or `beam_channel_invoke`
///
/// # Safety
///
/// `ptr` must be NULL or a pointer returned by this library and not yet freed.
#[no_mangle]
pub unsafe extern "C" fn beam_string_free(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: ptr came from CString::into_raw in this library.
    drop(unsafe { CString::from_raw(ptr) });
}

/// Load the runtime from a shared library and use it for `beam_init`
///
/// Returns 0 on success, -1 if the library or `erl_start` cannot be loaded,
/// -2 if `lib_path` is unreadable, -5 if a runtime has already started.
///
/// # Safety
///
/// `lib_path` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn beam_load_runtime(lib_path: *const c_char) -> c_int {
    // SAFETY: forwarded from the caller's contract.
    let result = unsafe { read_str(lib_path, "library path") }
        .and_then(DynamicRuntime::load)
        .and_then(|runtime| global::install_runtime(Box::new(runtime)));

    match result {
        Ok(()) => STATUS_OK,
        Err(e) => {
            tracing::error!("beam_load_runtime failed: {}", e);
            e.status_code()
        }
    }
}

/// Dispatch a JSON method call; returns a JSON result owned by the caller
///
/// # Safety
///
/// `call_json` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn beam_channel_invoke(call_json: *const c_char) -> *mut c_char {
    // SAFETY: forwarded from the caller's contract.
    let response = match unsafe { read_str(call_json, "method call") } {
        Ok(json) => channel::dispatch_json(&mut global::lock(), json),
        Err(e) => sdk::MethodResult::from(sdk::MethodError::invalid_argument(e.to_string())).to_json(),
    };
    into_raw_string(&response)
}
