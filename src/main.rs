mod hub;
mod tracker;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::web::config::{Config, ConfigError};

#[derive(Parser)]
#[command(name = "track-relay")]
#[command(about = "Real-time GPS tracker relay server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server
    Serve {
        /// YAML config file; built-in defaults apply when omitted
        #[arg(long)]
        config: Option<String>,
    },
    /// Validate a config file and print the effective settings
    CheckConfig { config: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()),
        Commands::CheckConfig { config } => check_config(&config),
    }
}

fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

fn serve(config_path: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn check_config(path: &str) -> ExitCode {
    match Config::from_file(path) {
        Ok(config) => {
            if let Err(e) = config.server.parse_allowed_origin() {
                eprintln!("Config error: {}", e);
                return ExitCode::FAILURE;
            }
            println!("Config is valid");
            println!("  bind:           {}", config.server.bind);
            println!("  allowed origin: {}", config.server.allowed_origin);
            println!(
                "  tracker:        {} @ {}, {}",
                config.tracker.device_id, config.tracker.latitude, config.tracker.longitude
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Config error: {}", e);
            ExitCode::FAILURE
        }
    }
}
