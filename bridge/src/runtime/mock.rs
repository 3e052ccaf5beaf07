//! Mock runtime for testing
//!
//! Records every environment variable and argument vector instead of touching
//! the process, and returns a configurable start status. A `MockHandle`
//! observes the mock after it has been boxed into a `BeamVm`.

use super::ErlangRuntime;
use std::collections::HashMap;
use std::ffi::CString;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    start_count: usize,
    env: HashMap<String, String>,
    env_writes: usize,
    last_args: Vec<String>,
}

/// Mock runtime implementation for testing without a BEAM build
#[derive(Debug)]
pub struct MockRuntime {
    state: Arc<Mutex<MockState>>,
    exit_code: i32,
    available: bool,
}

/// Read-only view of a `MockRuntime`
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockRuntime {
    /// Create a mock whose start succeeds
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            exit_code: 0,
            available: true,
        }
    }

    /// Configure the status the start entry point returns
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Configure to behave like a build without runtime support
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHandle {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of times the start entry point ran
    pub fn start_count(&self) -> usize {
        self.lock().start_count
    }

    /// Number of environment writes, counting repeats
    pub fn env_writes(&self) -> usize {
        self.lock().env_writes
    }

    pub fn env(&self, key: &str) -> Option<String> {
        self.lock().env.get(key).cloned()
    }

    /// Argument vector of the most recent start
    pub fn last_args(&self) -> Vec<String> {
        self.lock().last_args.clone()
    }
}

impl ErlangRuntime for MockRuntime {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn set_env(&mut self, key: &str, value: &str) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.env.insert(key.to_string(), value.to_string());
        state.env_writes += 1;
    }

    fn start(&mut self, args: &[CString]) -> i32 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.start_count += 1;
        state.last_args = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.exit_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_start() {
        let mut mock = MockRuntime::new().with_exit_code(5);
        let handle = mock.handle();

        mock.set_env("ROOTDIR", "/data/erl");
        let status = mock.start(&[CString::new("beam").unwrap()]);

        assert_eq!(status, 5);
        assert_eq!(handle.start_count(), 1);
        assert_eq!(handle.env("ROOTDIR").as_deref(), Some("/data/erl"));
        assert_eq!(handle.last_args(), vec!["beam".to_string()]);
    }

    #[test]
    fn test_mock_unavailable() {
        let mock = MockRuntime::new().unavailable();
        assert!(!mock.is_available());
    }
}
