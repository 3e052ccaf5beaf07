//! Platform-specific utilities
//!
//! Shared library naming for the runtime loaded by `DynamicRuntime`.

/// Platform-specific shared library filename for a library name
///
/// # Examples
///
/// ```
/// use beam_vm::platform::library_filename;
///
/// let filename = library_filename("erlang");
/// #[cfg(target_os = "linux")]
/// assert_eq!(filename, "liberlang.so");
/// #[cfg(target_os = "macos")]
/// assert_eq!(filename, "liberlang.dylib");
/// ```
pub fn library_filename(name: &str) -> String {
    format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        name,
        std::env::consts::DLL_SUFFIX
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn test_library_filename_linux() {
        assert_eq!(library_filename("erlang"), "liberlang.so");
    }

    #[test]
    #[cfg(target_os = "windows")]
    fn test_library_filename_windows() {
        assert_eq!(library_filename("erlang"), "erlang.dll");
    }

    #[test]
    fn test_library_filename_contains_name() {
        assert!(library_filename("erlang").contains("erlang"));
    }
}
