//! `studentrec` - CLI for the student record system
//!
//! With no command this starts the interactive sign-in loop over the store
//! files in the data directory.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use studentrec::cli::{Cli, Command, ConfigCommand};
use studentrec::{app, init_logging, Config, Registry, Shutdown, TerminalConsole};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => Ok(handle_run(&config)),
        Command::Config(config_cmd) => {
            handle_config(&config, config_cmd)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn handle_run(config: &Config) -> ExitCode {
    let mut console = TerminalConsole::new();
    let result = Registry::open(config).and_then(|registry| app::run(&mut console, &registry, config));

    match result {
        Ok(Shutdown::EndOfInput) => {
            info!("Input closed; exiting");
            ExitCode::SUCCESS
        }
        Ok(Shutdown::UnknownRole(tag)) => {
            info!("Exiting after unknown role '{}'", tag);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data directory:     {}", config.data_dir().display());
                println!("  Credentials file:   {}", config.credentials_path().display());
                println!("  Students file:      {}", config.students_path().display());
                println!();
                println!("[Bootstrap]");
                println!("  Admin username:     {}", config.bootstrap.admin_username);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
