mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::{debug, error};
use modwire_core::kernel::constants::{APP_NAME, APP_VERSION, DEFAULT_CONFIG_FILE};
use modwire_core::{EngineConfig, KernelError, ModuleManager};
use tracing_subscriber::EnvFilter;

use crate::cli::Commands;

/// Modwire: module dependency resolution and install orchestration
#[derive(Parser, Debug)]
#[command(name = APP_NAME, author, version = APP_VERSION, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Configuration file (JSON, YAML or TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level and record debug notices
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {}", e);
        return;
    }
    // Engine code logs through the `log` facade
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<EngineConfig, KernelError> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => EngineConfig::load(Path::new(DEFAULT_CONFIG_FILE))?,
        None => EngineConfig::default(),
    };
    if verbose {
        config.debug = true;
    }
    debug!("Using registry at {}", config.registry_path.display());
    Ok(config)
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    let Some(command) = args.command else {
        // Nothing to do; show usage instead of silently exiting
        if let Err(e) = CliArgs::command().print_help() {
            eprintln!("{}", e);
        }
        return ExitCode::FAILURE;
    };

    let command = match command {
        // Pure version comparison needs no registry
        Commands::Compare { current, operator, required } => {
            return cli::compare(&current, &operator, &required);
        }
        Commands::Registry(command) => command,
    };

    let config = match load_config(args.config.as_deref(), args.verbose) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut manager = match ModuleManager::from_config(&config) {
        Ok(manager) => manager,
        Err(e) => {
            error!("Failed to open module registry: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = cli::run(&mut manager, command);
    let notices_ok = cli::print_notices(&mut manager);

    match outcome {
        Ok(()) if notices_ok => ExitCode::SUCCESS,
        Ok(()) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
