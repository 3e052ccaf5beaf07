//! BEAM VM Bridge SDK
//!
//! Shared types for the bridge and the host plugins that drive it.

/// Error types and status codes
pub mod errors;

/// Method channel message types
pub mod types;

// Re-export commonly used types
pub use errors::{BridgeError, BridgeErrorExt};
pub use types::{MethodCall, MethodError, MethodResult};
