// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: re-root relative directories
fn root_arg() -> Arg {
    Arg::new("root")
        .long("root")
        .value_name("DIR")
        .help("Place relative top_dir/repo_dir under this directory")
}

fn build_cli() -> Command {
    Command::new("rpmget")
        .version(env!("CARGO_PKG_VERSION"))
        .author("rpmget Contributors")
        .about("Download manager for rpm files")
        .subcommand_required(false)
        .arg(
            Arg::new("config_file")
                .short('c')
                .long("config-file")
                .value_name("FILE")
                .global(true)
                .help("Config file (overrides RPMGET_CFG)"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Display more logging info"),
        )
        .arg(
            Arg::new("cache_dir")
                .long("cache-dir")
                .value_name("DIR")
                .global(true)
                .help("Directory for manifests (default: user cache dir)"),
        )
        .subcommand(
            Command::new("sync")
                .about("Download packages and update the manifest (default)")
                .arg(root_arg())
                .arg(
                    Arg::new("update")
                        .short('u')
                        .long("update")
                        .action(ArgAction::SetTrue)
                        .help("Also update the local repository after downloading"),
                ),
        )
        .subcommand(
            Command::new("update")
                .about("Copy packages into repo_dir and run the repository indexer")
                .arg(root_arg()),
        )
        .subcommand(Command::new("validate").about("Validate the config and report every problem found"))
        .subcommand(Command::new("dump-config").about("Print the active config to stdout"))
        .subcommand(Command::new("show").about("Show config, cache, and manifest locations"))
        .subcommand(
            Command::new("verify")
                .about("Check downloaded packages against the manifest digests")
                .arg(root_arg()),
        )
        .subcommand(Command::new("self-test").about("Check the environment for required tools"))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("rpmget.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
