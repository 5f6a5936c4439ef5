// src/main.rs

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Log filter when neither `--debug` nor `RUST_LOG` is given
const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --debug wins over RUST_LOG
    let filter = if cli.global.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let global = &cli.global;

    match cli.command {
        None => {
            // A bare run with nothing configured would fetch the built-in list
            let loaded = commands::load(global)?;
            if loaded.path.is_none() {
                bail!(
                    "No cfg file found; use `rpmget dump-config` to start one, then pass --config-file or set {}",
                    rpmget::config::CONFIG_ENV
                );
            }
            info!("Using input file {}", loaded.name());
            commands::cmd_sync(global, None, false)
        }
        Some(Commands::Sync { root, update }) => commands::cmd_sync(global, root.as_deref(), update),
        Some(Commands::Update { root }) => commands::cmd_update(global, root.as_deref()),
        Some(Commands::Validate) => commands::cmd_validate(global),
        Some(Commands::DumpConfig) => commands::cmd_dump_config(global),
        Some(Commands::Show) => commands::cmd_show(global),
        Some(Commands::Verify { root }) => commands::cmd_verify(global, root.as_deref()),
        Some(Commands::SelfTest) => commands::cmd_self_test(global),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "rpmget", &mut std::io::stdout());
            Ok(())
        }
    }
}
