//! Error types and handling
//!
//! This module provides the error type shared by every bridge surface.
//! All errors implement the `BridgeErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable, and map to the integer
//! status codes the host boundaries return.
//!
//! # Status Codes
//!
//! Host plugins only ever see integers. The mapping is fixed:
//!
//! | Code | Meaning |
//! |------|---------|
//! | `0` | success |
//! | `-1` | runtime support not linked or not loadable |
//! | `-2` | host argument could not be read |
//! | other | start function return value, propagated verbatim |

use thiserror::Error;

/// Success status returned by every host-facing operation
pub const STATUS_OK: i32 = 0;

/// Runtime support missing from this build (or failed to load)
pub const STATUS_RUNTIME_UNAVAILABLE: i32 = -1;

/// A host-provided string could not be read
pub const STATUS_INVALID_ARGUMENT: i32 = -2;

/// Operation requires an initialized runtime
pub const STATUS_NOT_INITIALIZED: i32 = -3;

/// Operation exists only as a placeholder
pub const STATUS_NOT_IMPLEMENTED: i32 = -4;

/// Runtime backend cannot be swapped once started
pub const STATUS_ALREADY_INITIALIZED: i32 = -5;

/// Configuration could not be loaded
pub const STATUS_CONFIG: i32 = -6;

/// Trait for bridge error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information.
pub trait BridgeErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors may be retried by the caller, with no guarantee of a
    /// different outcome. Non-recoverable errors are fixed for the lifetime of
    /// this process or this build.
    fn is_recoverable(&self) -> bool;
}

/// Main bridge error type
///
/// # Error Categories
///
/// - **Configuration**: runtime support missing, library not loadable, bad config file
/// - **Argument marshalling**: host string unreadable
/// - **Runtime start**: start function returned non-zero
/// - **Precondition**: call/send before initialize
/// - **Placeholder**: call/send are not implemented
///
/// # Examples
///
/// ```
/// use sdk::errors::{BridgeError, BridgeErrorExt};
///
/// let error = BridgeError::StartFailed { code: 7 };
/// assert_eq!(error.status_code(), 7);
/// assert!(error.is_recoverable());
///
/// let fatal = BridgeError::RuntimeUnavailable;
/// assert_eq!(fatal.status_code(), -1);
/// assert!(!fatal.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum BridgeError {
    // Configuration errors
    #[error("BEAM runtime not linked into this build")]
    RuntimeUnavailable,

    #[error("Library load failed: {0}")]
    LibraryLoadFailed(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // Argument marshalling errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Runtime start errors
    #[error("BEAM VM initialization failed with code: {code}")]
    StartFailed { code: i32 },

    // Lifecycle errors
    #[error("BEAM VM not initialized")]
    NotInitialized,

    #[error("BEAM VM already initialized")]
    AlreadyInitialized,

    // Placeholder operations
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Integer status reported to host plugins
    ///
    /// Start failures propagate the runtime's own code untranslated.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::RuntimeUnavailable | Self::LibraryLoadFailed(_) | Self::SymbolNotFound(_) => {
                STATUS_RUNTIME_UNAVAILABLE
            }
            Self::InvalidArgument(_) => STATUS_INVALID_ARGUMENT,
            Self::StartFailed { code } => *code,
            Self::NotInitialized => STATUS_NOT_INITIALIZED,
            Self::NotImplemented(_) => STATUS_NOT_IMPLEMENTED,
            Self::AlreadyInitialized => STATUS_ALREADY_INITIALIZED,
            Self::Config(_) | Self::Io(_) => STATUS_CONFIG,
        }
    }
}

impl BridgeErrorExt for BridgeError {
    fn user_hint(&self) -> &str {
        match self {
            Self::RuntimeUnavailable => "Ensure the package bundles the prebuilt BEAM runtime",
            Self::LibraryLoadFailed(_) => "Failed to load the BEAM runtime library",
            Self::SymbolNotFound(_) => "BEAM runtime library is incompatible",
            Self::Config(_) => "Check your config.toml file for errors",
            Self::InvalidArgument(_) => "Check the arguments passed from the host",
            Self::StartFailed { .. } => "The BEAM runtime refused to start. Check the release directory",
            Self::NotInitialized => "Initialize the BEAM VM first",
            Self::AlreadyInitialized => "The runtime backend cannot change after start",
            Self::NotImplemented(_) => "This operation is not available yet",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::RuntimeUnavailable
            | Self::LibraryLoadFailed(_)
            | Self::SymbolNotFound(_)
            | Self::NotImplemented(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}
