// BEAM VM bridge developer tool
// Main entry point for the beam-vm binary

use beam_vm::channel::dispatch_async;
use beam_vm::cli::{root_arg, Cli, Command};
use beam_vm::config::BridgeConfig;
use beam_vm::platform::library_filename;
use beam_vm::runtime::{default_runtime, DynamicRuntime, ErlangRuntime};
use beam_vm::telemetry::init_telemetry_with_config;
use beam_vm::{BeamVm, LaunchPlan, OTP_VERSION};
use clap::Parser;
use sdk::types::{MethodCall, MethodResult};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let mut config = if let Some(config_path) = &cli.config {
        BridgeConfig::load_from_path(config_path)?
    } else {
        BridgeConfig::load_or_default()?
    };
    if let Some(level) = &cli.log {
        config.logging.level = level.clone();
    }

    init_telemetry_with_config(&config.logging);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    tracing::debug!("beam-vm v{} ({})", version, commit);

    match cli.command {
        Command::Plan { root } => {
            let plan = LaunchPlan::new(&root)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!("Environment:");
                for (key, value) in plan.env() {
                    println!("  {}={}", key, value);
                }
                println!("Arguments:");
                for (i, arg) in plan.args().iter().enumerate() {
                    println!("  [{}] {}", i, arg);
                }
            }
            Ok(())
        }

        Command::Boot { root, library } => {
            let root_str = root_arg(&root)?;
            let runtime: Box<dyn ErlangRuntime> = match library.or(config.runtime.library) {
                // A directory means the conventional library name inside it
                Some(path) if path.is_dir() => {
                    Box::new(DynamicRuntime::load(path.join(library_filename("erlang")))?)
                }
                Some(path) => Box::new(DynamicRuntime::load(path)?),
                None => default_runtime(),
            };

            let vm = BeamVm::new(runtime);
            tracing::info!("Booting BEAM VM with {} runtime", vm.runtime_name());

            let vm = Arc::new(Mutex::new(vm));
            let call = MethodCall::new("initialize").with_arg("erlangPath", root_str);
            let result = dispatch_async(Arc::clone(&vm), call).await;

            if cli.json {
                println!("{}", result.to_json());
            }
            match result {
                MethodResult::Success { .. } => {
                    if !cli.json {
                        println!("BEAM VM started from {}", root.display());
                    }
                    Ok(())
                }
                MethodResult::Error(e) => anyhow::bail!("{}", e.message),
                MethodResult::NotImplemented => anyhow::bail!("initialize not supported"),
            }
        }

        Command::Version => {
            if cli.json {
                println!("{}", serde_json::json!({ "otp": OTP_VERSION, "bridge": version }));
            } else {
                println!("OTP {} (bridge v{}, {})", OTP_VERSION, version, commit);
            }
            Ok(())
        }
    }
}
