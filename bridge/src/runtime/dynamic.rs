//! Runtime loaded from a shared library
//!
//! Hosts that ship the runtime as `liberlang.so` / `liberlang.dylib` instead of
//! linking it statically can hand the bridge a library path. The library is
//! opened with `libloading` and `erl_start` resolved from it.
//!
//! # Platform-Specific Loading
//!
//! `libloading` handles the platform loader; use
//! `platform::library_filename("erlang")` to build the conventional filename.

use super::{invoke_start, ErlStartFn, ErlangRuntime};
use sdk::errors::BridgeError;
use std::ffi::CString;
use std::path::{Path, PathBuf};

/// Symbol name of the start entry point
const START_SYMBOL: &[u8] = b"erl_start\0";

/// `erl_start` resolved from a shared library
pub struct DynamicRuntime {
    path: PathBuf,
    entry: ErlStartFn,
    /// Loaded library (kept alive so `entry` stays valid)
    #[allow(dead_code)]
    library: libloading::Library,
}

impl DynamicRuntime {
    /// Open `path` and resolve `erl_start`
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::LibraryLoadFailed` if the shared library cannot be loaded.
    /// Returns `BridgeError::SymbolNotFound` if it does not export `erl_start`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref().to_path_buf();
        tracing::info!("Loading BEAM runtime library: {:?}", path);

        // SAFETY: loading a library runs its initialisers; the runtime library
        // is trusted to be the BEAM build shipped with the host.
        let library = unsafe { libloading::Library::new(&path) }.map_err(|e| {
            tracing::error!("Failed to load runtime library {:?}: {}", path, e);
            BridgeError::LibraryLoadFailed(format!("{}: {}", path.display(), e))
        })?;

        // SAFETY: the symbol is declared with the erl_start signature by the runtime.
        let entry: ErlStartFn = unsafe {
            let symbol = library
                .get::<ErlStartFn>(START_SYMBOL)
                .map_err(|e| {
                    tracing::error!("erl_start not found in {:?}: {}", path, e);
                    BridgeError::SymbolNotFound(format!("erl_start: {}", e))
                })?;
            *symbol
        };

        Ok(Self {
            path,
            entry,
            library,
        })
    }
}

impl std::fmt::Debug for DynamicRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicRuntime")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ErlangRuntime for DynamicRuntime {
    fn name(&self) -> &str {
        "dynamic"
    }

    fn start(&mut self, args: &[CString]) -> i32 {
        // SAFETY: entry was resolved from `library`, which lives as long as self.
        unsafe { invoke_start(self.entry, args) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library() {
        let err = DynamicRuntime::load("/nonexistent/liberlang.so").unwrap_err();
        assert!(matches!(err, BridgeError::LibraryLoadFailed(_)));
        assert_eq!(err.status_code(), -1);
    }

    #[test]
    fn test_not_a_library() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join(crate::platform::library_filename("erlang"));
        std::fs::write(&fake, b"not an object file").unwrap();

        let err = DynamicRuntime::load(&fake).unwrap_err();
        assert!(matches!(err, BridgeError::LibraryLoadFailed(_)));
    }
}
