//! Launch plan for the BEAM runtime
//!
//! Everything the start sequence derives from the runtime root lives here:
//! the three environment variables and the fixed argument vector. The plan is
//! pure data so it can be inspected (`beam-vm plan`) and tested without
//! touching the process environment.
//!
//! # Layout
//!
//! The root directory is expected to contain `bin/`, `lib/` and
//! `releases/start.boot`. Nothing here checks that it does.

use sdk::errors::BridgeError;
use serde::Serialize;
use std::ffi::CString;
use std::path::Path;

/// Emulator name, used both as `EMU` and as `argv[0]`
pub const EMULATOR_NAME: &str = "beam";

/// Literal super-carrier size in MB (`-MIscs`)
pub const LITERAL_SUPER_CARRIER_MB: u32 = 10;

/// Boot script relative to the root, without the `.boot` suffix
pub const BOOT_SCRIPT: &str = "releases/start";

pub const ENV_BINDIR: &str = "BINDIR";
pub const ENV_ROOTDIR: &str = "ROOTDIR";
pub const ENV_EMU: &str = "EMU";

/// Environment and argument vector for one start attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    root: String,
    env: Vec<(&'static str, String)>,
    args: Vec<String>,
}

impl LaunchPlan {
    /// Derive the plan for a runtime rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::InvalidArgument` if the root is not valid UTF-8 or
    /// contains a NUL byte, since neither can cross into `setenv`/`argv`.
    pub fn new(root: &Path) -> Result<Self, BridgeError> {
        let root = root.to_str().ok_or_else(|| {
            BridgeError::InvalidArgument(format!("root path is not valid UTF-8: {:?}", root))
        })?;
        if root.contains('\0') {
            return Err(BridgeError::InvalidArgument(
                "root path contains a NUL byte".to_string(),
            ));
        }

        let base = root.trim_end_matches('/');
        let bindir = format!("{}/bin", base);
        let boot_path = format!("{}/{}", base, BOOT_SCRIPT);

        let env = vec![
            (ENV_BINDIR, bindir),
            (ENV_ROOTDIR, root.to_string()),
            (ENV_EMU, EMULATOR_NAME.to_string()),
        ];

        let args = vec![
            EMULATOR_NAME.to_string(),
            // End of emulator flags
            "--".to_string(),
            // Scheduler binding is not permitted on mobile kernels
            "-sbwt".to_string(),
            "none".to_string(),
            "-MIscs".to_string(),
            LITERAL_SUPER_CARRIER_MB.to_string(),
            "-noshell".to_string(),
            "-boot".to_string(),
            boot_path,
        ];

        Ok(Self {
            root: root.to_string(),
            env,
            args,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Environment variables, in the order they are applied
    pub fn env(&self) -> &[(&'static str, String)] {
        &self.env
    }

    /// Argument vector including `argv[0]`
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Get one environment variable of the plan
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The argument vector as C strings for `erl_start`
    pub fn c_args(&self) -> Result<Vec<CString>, BridgeError> {
        self.args
            .iter()
            .map(|arg| {
                CString::new(arg.as_str())
                    .map_err(|e| BridgeError::InvalidArgument(format!("invalid argument: {}", e)))
            })
            .collect()
    }
}
