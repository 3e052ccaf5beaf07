//! CLI interface for the bridge
//!
//! A developer tool for exercising the bridge on a desktop: inspect the
//! launch plan for a release directory or boot a runtime from it.

use clap::{Parser, Subcommand};
use sdk::errors::BridgeError;
use std::path::{Path, PathBuf};

/// BEAM VM bridge developer tool
#[derive(Parser, Debug)]
#[command(name = "beam-vm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the environment and arguments the runtime would be started with
    Plan {
        /// Runtime root directory (contains lib/ and releases/)
        root: PathBuf,
    },

    /// Start the runtime from a release directory
    Boot {
        /// Runtime root directory (contains lib/ and releases/)
        root: PathBuf,

        /// Shared library exporting erl_start, or its directory (overrides config)
        #[arg(long, value_name = "PATH")]
        library: Option<PathBuf>,
    },

    /// Show the OTP version of the bundled runtime
    Version,
}

/// The root directory as the text handed to the runtime
///
/// # Errors
///
/// Returns `BridgeError::InvalidArgument` for a non-UTF-8 path instead of
/// passing on a lossy copy.
pub fn root_arg(root: &Path) -> Result<&str, BridgeError> {
    root.to_str().ok_or_else(|| {
        BridgeError::InvalidArgument(format!("root path is not valid UTF-8: {:?}", root))
    })
}
