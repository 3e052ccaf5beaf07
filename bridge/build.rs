//! Build script for linking the prebuilt BEAM runtime
//!
//! When the `erlang` feature is enabled the runtime archive (`liberlang.a`) is
//! linked statically into the bridge.
//!
//! # Library Location
//!
//! The script looks for the archive in the following locations (in order):
//! 1. Environment variable `BEAM_VM_ERLANG_LIB_DIR`
//! 2. Directory `prebuilt/<target>/` at the workspace root
//!
//! Without the feature nothing is linked and `initialize` reports the
//! runtime as unavailable.

use std::env;
use std::path::PathBuf;

const ERLANG_LIB_NAME: &str = "erlang";

fn main() {
    // Git commit hash for the CLI version banner
    let commit_hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", commit_hash);
    println!("cargo:rerun-if-env-changed=BEAM_VM_ERLANG_LIB_DIR");

    if env::var_os("CARGO_FEATURE_ERLANG").is_none() {
        return;
    }

    match locate_erlang_lib_dir() {
        Some(dir) => {
            println!("cargo:rustc-link-search=native={}", dir.display());
            println!("cargo:rustc-link-lib=static={}", ERLANG_LIB_NAME);
            println!("cargo:rerun-if-changed={}", dir.display());
        }
        None => {
            println!("cargo:warning=feature `erlang` enabled but liberlang.a was not found");
            println!("cargo:warning=Provide it via:");
            println!("cargo:warning=  - BEAM_VM_ERLANG_LIB_DIR environment variable");
            println!("cargo:warning=  - prebuilt/<target>/liberlang.a at the workspace root");
            // Let the linker report the missing archive
            println!("cargo:rustc-link-lib=static={}", ERLANG_LIB_NAME);
        }
    }
}

/// Find the directory holding `liberlang.a`
fn locate_erlang_lib_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os("BEAM_VM_ERLANG_LIB_DIR") {
        return Some(PathBuf::from(dir));
    }

    // build.rs runs from the crate dir (bridge/), prebuilt archives live at workspace root
    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR")?);
    let workspace_root = manifest_dir.parent().unwrap_or(&manifest_dir).to_path_buf();
    let target = env::var("TARGET").ok()?;

    let candidate = workspace_root.join("prebuilt").join(target);
    candidate
        .join(format!("lib{}.a", ERLANG_LIB_NAME))
        .exists()
        .then_some(candidate)
}
