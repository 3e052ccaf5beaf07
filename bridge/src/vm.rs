//! BEAM VM lifecycle
//!
//! `BeamVm` owns the bridge's whole state: which runtime backend to start,
//! where the runtime lives, and whether the host may use it.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized --initialize (start == 0)--> Initialized
//! Initialized   --shutdown-----------------> Detached
//! Detached      --initialize---------------> Initialized   (no second start)
//! ```
//!
//! The runtime cannot be stopped without terminating the host process, so
//! `shutdown` only detaches. A detached runtime keeps running, which is why
//! re-initializing re-attaches instead of calling the start entry point again.

use crate::launch::LaunchPlan;
use crate::runtime::ErlangRuntime;
use sdk::errors::BridgeError;
use std::path::{Path, PathBuf};

macro_rules! otp_release {
    () => {
        "28"
    };
}

/// OTP release the bundled runtime is built from
pub const OTP_VERSION: &str = otp_release!();

/// `OTP_VERSION` with a trailing NUL, for hosts that read C strings
pub(crate) const OTP_VERSION_NUL: &str = concat!(otp_release!(), "\0");

/// What host boundaries return from `call` while calls are unimplemented
pub const CALL_PLACEHOLDER: &str = "null";

/// Lifecycle state of the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    /// Runtime never started
    Uninitialized,
    /// Runtime started and in use by the host
    Initialized,
    /// Runtime still running, host stopped using it
    Detached,
}

impl std::fmt::Display for VmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmState::Uninitialized => write!(f, "uninitialized"),
            VmState::Initialized => write!(f, "initialized"),
            VmState::Detached => write!(f, "detached"),
        }
    }
}

/// Lifecycle controller for one embedded BEAM runtime
///
/// # Thread Safety
///
/// `BeamVm` is `Send` but takes `&mut self` for every transition. Wrap in
/// `Mutex` to share it, as `global` does.
pub struct BeamVm {
    runtime: Box<dyn ErlangRuntime>,
    state: VmState,
    root: Option<PathBuf>,
}

impl BeamVm {
    /// Create a controller that starts the runtime through `runtime`
    pub fn new(runtime: Box<dyn ErlangRuntime>) -> Self {
        tracing::debug!("Creating BeamVm with {} runtime", runtime.name());
        Self {
            runtime,
            state: VmState::Uninitialized,
            root: None,
        }
    }

    /// Create a controller with the backend this build was compiled with
    pub fn with_default_runtime() -> Self {
        Self::new(crate::runtime::default_runtime())
    }

    /// Swap the runtime backend
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::AlreadyInitialized` once a runtime has started;
    /// the running VM belongs to the old backend.
    pub fn replace_runtime(&mut self, runtime: Box<dyn ErlangRuntime>) -> Result<(), BridgeError> {
        if self.state != VmState::Uninitialized {
            tracing::warn!(
                "Refusing to replace {} runtime: VM is {}",
                self.runtime.name(),
                self.state
            );
            return Err(BridgeError::AlreadyInitialized);
        }
        tracing::info!(
            "Replacing {} runtime with {}",
            self.runtime.name(),
            runtime.name()
        );
        self.runtime = runtime;
        Ok(())
    }

    /// Initialize the BEAM VM from the runtime root directory
    ///
    /// The root is expected to contain `lib/` and `releases/`; it is not checked.
    ///
    /// Once the runtime has started, later calls succeed without starting it
    /// again. This includes calls after `shutdown`, which re-attach to the
    /// running runtime: a different root passed then is ignored (a warning is
    /// logged) and the environment is not rewritten.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::RuntimeUnavailable` if this build has no runtime support.
    /// Returns `BridgeError::InvalidArgument` if the root cannot be passed to the runtime.
    /// Returns `BridgeError::StartFailed` with the start function's code if it fails.
    pub fn initialize(&mut self, root: impl AsRef<Path>) -> Result<(), BridgeError> {
        self.initialize_with(|| Ok(root))
    }

    /// Initialize, reading the root only once it is actually needed
    ///
    /// Host entry points pass a reader for their raw path argument. It runs
    /// after the already-initialized and runtime-availability checks, so an
    /// unreadable path is only reported when a start is attempted.
    ///
    /// # Errors
    ///
    /// As `initialize`, plus any error returned by `read_root`.
    pub fn initialize_with<P, F>(&mut self, read_root: F) -> Result<(), BridgeError>
    where
        P: AsRef<Path>,
        F: FnOnce() -> Result<P, BridgeError>,
    {
        match self.state {
            VmState::Initialized | VmState::Detached => {
                if let Ok(root) = read_root() {
                    self.warn_on_root_mismatch(root.as_ref());
                }
                if self.state == VmState::Detached {
                    tracing::info!("Re-attaching to running BEAM VM");
                    self.state = VmState::Initialized;
                } else {
                    tracing::info!("BEAM VM already initialized");
                }
                return Ok(());
            }
            VmState::Uninitialized => {}
        }

        if !self.runtime.is_available() {
            tracing::error!("liberlang not linked - BEAM VM unavailable");
            tracing::error!("Ensure the package has bundled runtime binaries");
            return Err(BridgeError::RuntimeUnavailable);
        }

        let root = read_root().inspect_err(|e| {
            tracing::error!("Failed to get erlang path string: {}", e);
        })?;
        let root = root.as_ref();

        let plan = LaunchPlan::new(root)?;
        let args = plan.c_args()?;

        tracing::info!("Initializing BEAM VM with root: {}", plan.root());

        for (key, value) in plan.env() {
            self.runtime.set_env(key, value);
        }

        tracing::info!("Starting BEAM with {} arguments", args.len());
        for (i, arg) in plan.args().iter().enumerate() {
            tracing::debug!("  arg[{}] = {}", i, arg);
        }

        let code = self.runtime.start(&args);
        if code != 0 {
            tracing::error!("BEAM VM initialization failed with code: {}", code);
            return Err(BridgeError::StartFailed { code });
        }

        self.root = Some(root.to_path_buf());
        self.state = VmState::Initialized;
        tracing::info!("BEAM VM initialized successfully");

        Ok(())
    }

    fn warn_on_root_mismatch(&self, requested: &Path) {
        if let Some(current) = &self.root {
            if current != requested {
                tracing::warn!(
                    "Ignoring root {:?}; runtime already started from {:?}",
                    requested,
                    current
                );
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state == VmState::Initialized
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    /// Root the runtime was started from, once it has started
    pub fn root_path(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn runtime_name(&self) -> &str {
        self.runtime.name()
    }

    /// Stop using the runtime
    ///
    /// The runtime keeps running: its exit routine would terminate the host
    /// process. The state moves to `Detached`.
    pub fn shutdown(&mut self) {
        if self.state == VmState::Initialized {
            tracing::info!("BEAM VM shutdown requested (detaching, runtime keeps running)");
            self.state = VmState::Detached;
        }
    }

    /// OTP version of the bundled runtime
    pub fn version(&self) -> &'static str {
        OTP_VERSION
    }

    /// Call `module:function` with JSON-encoded arguments
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::NotInitialized` before `initialize`.
    /// Returns `BridgeError::NotImplemented` otherwise; calls need a term codec
    /// the bridge does not have.
    pub fn call(&self, module: &str, function: &str, args_json: &str) -> Result<String, BridgeError> {
        if !self.is_initialized() {
            tracing::error!("Cannot call: BEAM VM not initialized");
            return Err(BridgeError::NotInitialized);
        }

        tracing::info!(
            module,
            function,
            args_len = args_json.len(),
            "call placeholder - requires term encoding"
        );
        Err(BridgeError::NotImplemented("call"))
    }

    /// Send a JSON-encoded message to a registered process
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::NotInitialized` before `initialize`.
    /// Returns `BridgeError::NotImplemented` otherwise; nothing is delivered.
    pub fn send(&self, process_name: &str, message_json: &str) -> Result<(), BridgeError> {
        if !self.is_initialized() {
            tracing::error!("Cannot send: BEAM VM not initialized");
            return Err(BridgeError::NotInitialized);
        }

        tracing::info!(
            process_name,
            message_len = message_json.len(),
            "send placeholder - requires term encoding"
        );
        Err(BridgeError::NotImplemented("send"))
    }
}

impl std::fmt::Debug for BeamVm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeamVm")
            .field("runtime", &self.runtime.name())
            .field("state", &self.state)
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    fn mock_vm() -> (BeamVm, crate::runtime::MockHandle) {
        let mock = MockRuntime::new();
        let handle = mock.handle();
        (BeamVm::new(Box::new(mock)), handle)
    }

    #[test]
    fn test_initial_state() {
        let (vm, handle) = mock_vm();
        assert_eq!(vm.state(), VmState::Uninitialized);
        assert!(!vm.is_initialized());
        assert!(vm.root_path().is_none());
        assert_eq!(handle.start_count(), 0);
    }

    #[test]
    fn test_initialize_success() {
        let (mut vm, handle) = mock_vm();

        vm.initialize("/data/erl").unwrap();

        assert!(vm.is_initialized());
        assert_eq!(vm.root_path(), Some(Path::new("/data/erl")));
        assert_eq!(handle.start_count(), 1);
        assert_eq!(handle.env("ROOTDIR").as_deref(), Some("/data/erl"));
        assert_eq!(handle.env("BINDIR").as_deref(), Some("/data/erl/bin"));
        assert_eq!(handle.env("EMU").as_deref(), Some("beam"));
        assert_eq!(
            handle.last_args().last().map(String::as_str),
            Some("/data/erl/releases/start")
        );
    }

    #[test]
    fn test_initialize_twice_starts_once() {
        let (mut vm, handle) = mock_vm();

        vm.initialize("/data/erl").unwrap();
        vm.initialize("/data/erl").unwrap();

        assert!(vm.is_initialized());
        assert_eq!(handle.start_count(), 1);
        assert_eq!(handle.env_writes(), 3);
    }

    #[test]
    fn test_second_root_is_ignored() {
        let (mut vm, handle) = mock_vm();

        vm.initialize("/data/erl").unwrap();
        vm.initialize("/data/other").unwrap();

        assert_eq!(vm.root_path(), Some(Path::new("/data/erl")));
        assert_eq!(handle.env("ROOTDIR").as_deref(), Some("/data/erl"));
    }

    #[test]
    fn test_start_failure_propagates_code() {
        let mock = MockRuntime::new().with_exit_code(3);
        let handle = mock.handle();
        let mut vm = BeamVm::new(Box::new(mock));

        let err = vm.initialize("/data/erl").unwrap_err();

        assert!(matches!(err, BridgeError::StartFailed { code: 3 }));
        assert_eq!(err.status_code(), 3);
        assert!(!vm.is_initialized());
        assert!(vm.root_path().is_none());

        // No retry, but the caller may try again
        let _ = vm.initialize("/data/erl");
        assert_eq!(handle.start_count(), 2);
    }

    #[test]
    fn test_unavailable_runtime_leaves_state() {
        let mock = MockRuntime::new().unavailable();
        let handle = mock.handle();
        let mut vm = BeamVm::new(Box::new(mock));

        let err = vm.initialize("/data/erl").unwrap_err();

        assert_eq!(err.status_code(), -1);
        assert_eq!(vm.state(), VmState::Uninitialized);
        assert_eq!(handle.start_count(), 0);
        assert_eq!(handle.env_writes(), 0);
    }

    #[test]
    fn test_shutdown_detaches() {
        let (mut vm, _handle) = mock_vm();

        vm.initialize("/data/erl").unwrap();
        vm.shutdown();

        assert_eq!(vm.state(), VmState::Detached);
        assert!(!vm.is_initialized());
        // Root is never cleared
        assert_eq!(vm.root_path(), Some(Path::new("/data/erl")));
    }

    #[test]
    fn test_shutdown_before_initialize_is_noop() {
        let (mut vm, _handle) = mock_vm();
        vm.shutdown();
        assert_eq!(vm.state(), VmState::Uninitialized);
    }

    #[test]
    fn test_reinitialize_after_shutdown_reattaches() {
        let (mut vm, handle) = mock_vm();

        vm.initialize("/data/erl").unwrap();
        vm.shutdown();
        vm.initialize("/data/erl").unwrap();

        assert!(vm.is_initialized());
        assert_eq!(handle.start_count(), 1);
    }

    #[test]
    fn test_call_before_initialize() {
        let (vm, _handle) = mock_vm();
        let err = vm.call("any_mod", "any_fun", "{}").unwrap_err();
        assert!(matches!(err, BridgeError::NotInitialized));
    }

    #[test]
    fn test_call_is_placeholder() {
        let (mut vm, _handle) = mock_vm();
        vm.initialize("/data/erl").unwrap();

        let err = vm.call("any_mod", "any_fun", "{}").unwrap_err();
        assert!(matches!(err, BridgeError::NotImplemented("call")));
    }

    #[test]
    fn test_send_states() {
        let (mut vm, _handle) = mock_vm();
        assert!(matches!(
            vm.send("logger", "{}").unwrap_err(),
            BridgeError::NotInitialized
        ));

        vm.initialize("/data/erl").unwrap();
        assert!(matches!(
            vm.send("logger", "{}").unwrap_err(),
            BridgeError::NotImplemented("send")
        ));
    }

    #[test]
    fn test_version_before_initialize() {
        let (vm, _handle) = mock_vm();
        assert_eq!(vm.version(), "28");
    }

    #[test]
    fn test_replace_runtime() {
        let (mut vm, _old) = mock_vm();
        let replacement = MockRuntime::new();
        let handle = replacement.handle();

        vm.replace_runtime(Box::new(replacement)).unwrap();
        vm.initialize("/data/erl").unwrap();
        assert_eq!(handle.start_count(), 1);

        let err = vm.replace_runtime(Box::new(MockRuntime::new())).unwrap_err();
        assert!(matches!(err, BridgeError::AlreadyInitialized));
    }

    fn unreadable() -> Result<&'static str, BridgeError> {
        Err(BridgeError::InvalidArgument("root path is NULL".to_string()))
    }

    #[test]
    fn test_unreadable_root_after_start_succeeds() {
        let (mut vm, handle) = mock_vm();
        vm.initialize("/data/erl").unwrap();

        vm.initialize_with(unreadable).unwrap();
        vm.shutdown();
        vm.initialize_with(unreadable).unwrap();

        assert!(vm.is_initialized());
        assert_eq!(handle.start_count(), 1);
    }

    #[test]
    fn test_unavailable_runtime_reported_before_root() {
        let mut vm = BeamVm::new(Box::new(MockRuntime::new().unavailable()));

        let err = vm.initialize_with(unreadable).unwrap_err();
        assert!(matches!(err, BridgeError::RuntimeUnavailable));
    }

    #[test]
    fn test_unreadable_root_before_start() {
        let (mut vm, handle) = mock_vm();

        let err = vm.initialize_with(unreadable).unwrap_err();

        assert!(matches!(err, BridgeError::InvalidArgument(_)));
        assert_eq!(handle.start_count(), 0);
        assert_eq!(handle.env_writes(), 0);
    }

    #[test]
    fn test_runtime_name() {
        let (vm, _handle) = mock_vm();
        assert_eq!(vm.runtime_name(), "mock");
    }

    #[test]
    fn test_version_nul_terminated() {
        assert_eq!(OTP_VERSION_NUL.strip_suffix('\0'), Some(OTP_VERSION));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(VmState::Uninitialized.to_string(), "uninitialized");
        assert_eq!(VmState::Initialized.to_string(), "initialized");
        assert_eq!(VmState::Detached.to_string(), "detached");
    }
}
