//! JNI bridge for Android
//!
//! Native methods of `io.beamvm.beam_vm_android.BeamVmNative`. The Kotlin
//! plugin calls them from its IO dispatcher; each one acts on the
//! process-wide bridge.
//!
//! Compiled with the `jni` feature.

use crate::global;
use crate::vm::{CALL_PLACEHOLDER, OTP_VERSION};
use jni::objects::{JObject, JString};
use jni::sys::{jboolean, jint, jstring, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use sdk::errors::{BridgeError, STATUS_OK};
use std::os::raw::c_void;

fn read_jstring(env: &mut JNIEnv, value: &JString, what: &str) -> Result<String, BridgeError> {
    env.get_string(value)
        .map(String::from)
        .map_err(|e| BridgeError::InvalidArgument(format!("failed to read {}: {}", what, e)))
}

fn new_jstring(env: &mut JNIEnv, value: &str) -> jstring {
    match env.new_string(value) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            tracing::error!("Failed to allocate Java string: {}", e);
            std::ptr::null_mut()
        }
    }
}

/// Library load hook: installs logging
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: JavaVM, _reserved: *mut c_void) -> jint {
    crate::telemetry::init_telemetry();
    tracing::info!("BeamVm native library loaded");
    JNI_VERSION_1_6
}

/// Initialize the BEAM VM with the given Erlang root directory
///
/// Returns 0 on success or if already initialized, non-zero on failure. The
/// path is only read if a start is attempted.
#[no_mangle]
pub extern "system" fn Java_io_beamvm_beam_1vm_1android_BeamVmNative_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    erlang_path: JString<'local>,
) -> jint {
    let read_path = || read_jstring(&mut env, &erlang_path, "erlang path");

    match global::lock().initialize_with(read_path) {
        Ok(()) => STATUS_OK,
        Err(e) => e.status_code(),
    }
}

#[no_mangle]
pub extern "system" fn Java_io_beamvm_beam_1vm_1android_BeamVmNative_nativeIsInitialized<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jboolean {
    if global::lock().is_initialized() {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// Detach from the BEAM VM; the runtime keeps running
#[no_mangle]
pub extern "system" fn Java_io_beamvm_beam_1vm_1android_BeamVmNative_nativeShutdown<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    global::lock().shutdown();
}

#[no_mangle]
pub extern "system" fn Java_io_beamvm_beam_1vm_1android_BeamVmNative_nativeGetOtpVersion<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jstring {
    new_jstring(&mut env, OTP_VERSION)
}

/// Call an Erlang function (placeholder)
///
/// Returns Java `null` before initialization, otherwise the string `"null"`.
#[no_mangle]
pub extern "system" fn Java_io_beamvm_beam_1vm_1android_BeamVmNative_nativeCall<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    module: JString<'local>,
    function: JString<'local>,
    args_json: JString<'local>,
) -> jstring {
    let vm = global::lock();
    if !vm.is_initialized() {
        tracing::error!("Cannot call: BEAM VM not initialized");
        return std::ptr::null_mut();
    }

    let strings = (
        read_jstring(&mut env, &module, "module"),
        read_jstring(&mut env, &function, "function"),
        read_jstring(&mut env, &args_json, "args"),
    );
    let (module, function, args_json) = match strings {
        (Ok(m), Ok(f), Ok(a)) => (m, f, a),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            tracing::error!("nativeCall: {}", e);
            return std::ptr::null_mut();
        }
    };

    match vm.call(&module, &function, &args_json) {
        Ok(response) => new_jstring(&mut env, &response),
        Err(BridgeError::NotImplemented(_)) => new_jstring(&mut env, CALL_PLACEHOLDER),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Send a message to an Erlang process (placeholder, delivers nothing)
#[no_mangle]
pub extern "system" fn Java_io_beamvm_beam_1vm_1android_BeamVmNative_nativeSend<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    process_name: JString<'local>,
    message_json: JString<'local>,
) {
    let strings = (
        read_jstring(&mut env, &process_name, "process name"),
        read_jstring(&mut env, &message_json, "message"),
    );
    let (process_name, message_json) = match strings {
        (Ok(p), Ok(m)) => (p, m),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("nativeSend: {}", e);
            return;
        }
    };

    // Errors are already logged by BeamVm::send
    let _ = global::lock().send(&process_name, &message_json);
}
