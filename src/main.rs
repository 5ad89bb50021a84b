//! Main application entry point.
//!
//! Thin wrapper around the `ipscope` library that handles:
//! - Environment variable loading (.env file)
//! - Command-line argument parsing
//! - Logger initialization

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use ipscope::initialization::init_logger_with;
use ipscope::{run_server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // .env in the working directory first, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run_server(config).await {
        eprintln!("ipscope error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
