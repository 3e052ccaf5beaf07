//! Method channel dispatcher
//!
//! Host plugins (Android, iOS) receive platform-channel invocations named
//! `initialize`, `shutdown`, `call`, `send`, `getOtpVersion` and
//! `isInitialized`. They forward each one here as a `MethodCall` and relay the
//! `MethodResult` back to the application.
//!
//! `dispatch_async` runs the blocking operations (`initialize`, `call`) on
//! tokio's blocking pool so the host's main thread is never held by the
//! runtime bring-up.

use crate::vm::BeamVm;
use sdk::errors::BridgeError;
use sdk::types::{MethodCall, MethodError, MethodResult, CODE_CALL_ERROR};
use serde_json::Value;
use std::ops::Deref;
use std::sync::Mutex;

/// Dispatch one method call against a bridge
pub fn dispatch(vm: &mut BeamVm, call: &MethodCall) -> MethodResult {
    tracing::debug!("Dispatching method call: {}", call.method);

    match call.method.as_str() {
        "initialize" => handle_initialize(vm, call),
        "shutdown" => {
            vm.shutdown();
            MethodResult::empty()
        }
        "call" => handle_call(vm, call),
        "send" => handle_send(vm, call),
        "getOtpVersion" => MethodResult::success(vm.version()),
        "isInitialized" => MethodResult::success(vm.is_initialized()),
        other => {
            tracing::debug!("Method not implemented: {}", other);
            MethodResult::NotImplemented
        }
    }
}

/// Dispatch a JSON-encoded method call and return the JSON-encoded result
pub fn dispatch_json(vm: &mut BeamVm, json: &str) -> String {
    match MethodCall::from_json(json) {
        Ok(call) => dispatch(vm, &call).to_json(),
        Err(e) => MethodResult::from(e).to_json(),
    }
}

/// Dispatch on tokio's blocking pool
///
/// Accepts anything that derefs to the bridge mutex: `Arc<Mutex<BeamVm>>` or
/// the `&'static` process-wide instance.
pub async fn dispatch_async<B>(bridge: B, call: MethodCall) -> MethodResult
where
    B: Deref<Target = Mutex<BeamVm>> + Send + 'static,
{
    let method = call.method.clone();
    let task = tokio::task::spawn_blocking(move || {
        let mut vm = bridge.lock().unwrap_or_else(|e| e.into_inner());
        dispatch(&mut vm, &call)
    });

    match task.await {
        Ok(result) => {
            tracing::debug!(method = %method, success = result.is_success(), "Method call completed");
            result
        }
        Err(e) => {
            tracing::error!("Method call '{}' did not complete: {}", method, e);
            MethodError::new(CODE_CALL_ERROR, e.to_string()).into()
        }
    }
}

fn handle_initialize(vm: &mut BeamVm, call: &MethodCall) -> MethodResult {
    let Some(path) = call.arg_str("erlangPath") else {
        return MethodError::invalid_argument("erlangPath is required").into();
    };

    match vm.initialize(path) {
        Ok(()) => MethodResult::success(true),
        Err(e) => MethodError::init_failed(e.status_code()).into(),
    }
}

fn handle_call(vm: &BeamVm, call: &MethodCall) -> MethodResult {
    if !vm.is_initialized() {
        return MethodError::not_initialized().into();
    }

    let (Some(module), Some(function), Some(args)) = (
        call.arg_str("module"),
        call.arg_str("function"),
        call.arg_str("args"),
    ) else {
        return MethodError::invalid_argument("module, function, and args are required").into();
    };

    match vm.call(module, function, args) {
        Ok(response) => {
            MethodResult::success(serde_json::from_str(&response).unwrap_or(Value::String(response)))
        }
        // Placeholder contract: hosts receive null until calls are implemented
        Err(BridgeError::NotImplemented(_)) => MethodResult::empty(),
        Err(BridgeError::NotInitialized) => MethodError::not_initialized().into(),
        Err(e) => MethodError::new(CODE_CALL_ERROR, e.to_string()).into(),
    }
}

fn handle_send(vm: &BeamVm, call: &MethodCall) -> MethodResult {
    if !vm.is_initialized() {
        return MethodError::not_initialized().into();
    }

    let (Some(process_name), Some(message)) =
        (call.arg_str("processName"), call.arg_str("message"))
    else {
        return MethodError::invalid_argument("processName and message are required").into();
    };

    match vm.send(process_name, message) {
        Ok(()) | Err(BridgeError::NotImplemented(_)) => MethodResult::empty(),
        Err(BridgeError::NotInitialized) => MethodError::not_initialized().into(),
        Err(e) => MethodError::new(CODE_CALL_ERROR, e.to_string()).into(),
    }
}
