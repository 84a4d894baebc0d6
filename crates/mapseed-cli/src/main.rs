use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use mapseed::{DEFAULT_PROCESS_NAME, FailureReport, TargetConfig};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::hex_utils::{parse_hex_address, parse_u32};

#[derive(Parser)]
#[command(name = "mapseed")]
#[command(about = "Read the map seed of a running Diablo II: Resurrected game", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Executable name of the game process
    #[arg(long, global = true, env = "MAPSEED_PROCESS", default_value = DEFAULT_PROCESS_NAME)]
    process: String,

    /// Module to scan (defaults to the executable itself)
    #[arg(long, global = true, env = "MAPSEED_MODULE")]
    module: Option<String>,

    /// Open this PID instead of searching by name
    #[arg(long, global = true)]
    pid: Option<u32>,

    /// Bytes of the module image to scan, in hex (e.g. 0x1000000)
    #[arg(long, global = true)]
    scan_size: Option<String>,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    /// Also write the derivation report to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Derive the map seed from the running game (default)
    Seed,

    /// Invert an end hash offline, no process needed
    Invert {
        /// End hash, decimal or 0x-prefixed hex
        hash: String,
    },

    /// Print the built-in layout profile as JSON
    Profile,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e, args.json);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let directive = match verbose {
        0 => "mapseed=warn",
        1 => "mapseed=debug",
        _ => "mapseed=trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    match &args.command {
        None | Some(Command::Seed) => {
            let config = target_config(args)?;
            debug!("Target: {:?}", config);
            commands::seed::run(&config, args.json, args.output.as_deref())
        }
        Some(Command::Invert { hash }) => commands::invert::run(parse_u32(hash)?, args.json),
        Some(Command::Profile) => commands::profile::run(),
    }
}

fn target_config(args: &Args) -> Result<TargetConfig> {
    let mut builder = TargetConfig::builder().process_name(&args.process);
    if let Some(module) = &args.module {
        builder = builder.module_name(module);
    }
    if let Some(pid) = args.pid {
        builder = builder.pid(pid);
    }
    if let Some(size) = &args.scan_size {
        builder = builder.scan_size(parse_hex_address(size)?);
    }
    Ok(builder.build())
}

fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let value = match err.downcast_ref::<mapseed::Error>() {
            Some(e) => serde_json::to_value(FailureReport::from(e)),
            None => Ok(serde_json::json!({ "error": format!("{:#}", err) })),
        };
        if let Ok(value) = value {
            println!("{}", value);
            return;
        }
    }
    eprintln!("{} {:#}", "error:".red().bold(), err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_seed_is_default_command() {
        let args = Args::try_parse_from(["mapseed", "--pid", "1234", "-vv"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.pid, Some(1234));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_target_config_from_args() {
        let args = Args::try_parse_from([
            "mapseed",
            "seed",
            "--process",
            "Game.exe",
            "--module",
            "game.dll",
            "--scan-size",
            "0x2000",
        ])
        .unwrap();
        let config = target_config(&args).unwrap();
        assert_eq!(config.process_name, "Game.exe");
        assert_eq!(config.module_name(), "game.dll");
        assert_eq!(config.scan_size, Some(0x2000));
    }

    #[test]
    fn test_invert_takes_hash() {
        let args = Args::try_parse_from(["mapseed", "invert", "0xDEADBEEF", "--json"]).unwrap();
        assert!(
            matches!(args.command, Some(Command::Invert { ref hash }) if hash == "0xDEADBEEF")
        );
        assert!(args.json);
    }
}
