//! Integration tests for asynchronous method channel dispatch

use beam_vm::channel::dispatch_async;
use beam_vm::runtime::MockRuntime;
use beam_vm::BeamVm;
use sdk::types::{MethodCall, MethodResult, CODE_INIT_FAILED, CODE_INVALID_ARGUMENT};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn shared_vm(runtime: MockRuntime) -> Arc<Mutex<BeamVm>> {
    Arc::new(Mutex::new(BeamVm::new(Box::new(runtime))))
}

fn initialize_call(root: &str) -> MethodCall {
    MethodCall::new("initialize").with_arg("erlangPath", root)
}

#[tokio::test]
async fn test_initialize_then_call() {
    let vm = shared_vm(MockRuntime::new());

    let result = dispatch_async(Arc::clone(&vm), initialize_call("/data/erl")).await;
    assert_eq!(result, MethodResult::success(true));

    let call = MethodCall::new("call")
        .with_arg("module", "any_mod")
        .with_arg("function", "any_fun")
        .with_arg("args", "{}");
    let result = dispatch_async(Arc::clone(&vm), call).await;
    assert_eq!(result, MethodResult::empty());

    let result = dispatch_async(Arc::clone(&vm), MethodCall::new("isInitialized")).await;
    assert_eq!(result, MethodResult::success(true));
}

#[tokio::test]
async fn test_initialize_failure_carries_code() {
    let vm = shared_vm(MockRuntime::new().with_exit_code(7));

    match dispatch_async(Arc::clone(&vm), initialize_call("/data/erl")).await {
        MethodResult::Error(e) => {
            assert_eq!(e.code, CODE_INIT_FAILED);
            assert_eq!(e.details, Some(json!(7)));
        }
        other => panic!("unexpected result {:?}", other),
    }

    assert!(!vm.lock().unwrap().is_initialized());
}

#[tokio::test]
async fn test_initialize_requires_path() {
    let vm = shared_vm(MockRuntime::new());

    match dispatch_async(Arc::clone(&vm), MethodCall::new("initialize")).await {
        MethodResult::Error(e) => assert_eq!(e.code, CODE_INVALID_ARGUMENT),
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_initialize_starts_once() {
    let mock = MockRuntime::new();
    let handle = mock.handle();
    let vm = shared_vm(mock);

    let tasks: Vec<_> = (0..8)
        .map(|_| tokio::spawn(dispatch_async(Arc::clone(&vm), initialize_call("/data/erl"))))
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), MethodResult::success(true));
    }

    assert_eq!(handle.start_count(), 1);
    assert!(vm.lock().unwrap().is_initialized());
}

#[tokio::test]
async fn test_shutdown_then_reinitialize() {
    let mock = MockRuntime::new();
    let handle = mock.handle();
    let vm = shared_vm(mock);

    dispatch_async(Arc::clone(&vm), initialize_call("/data/erl")).await;
    let result = dispatch_async(Arc::clone(&vm), MethodCall::new("shutdown")).await;
    assert_eq!(result, MethodResult::empty());
    assert!(!vm.lock().unwrap().is_initialized());

    let result = dispatch_async(Arc::clone(&vm), initialize_call("/data/erl")).await;
    assert_eq!(result, MethodResult::success(true));
    assert_eq!(handle.start_count(), 1);
}
