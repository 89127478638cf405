pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Prices,
    History { days: Option<u32> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>, json: bool) -> Result<()> {
    info!("farmdash starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = providers::FunctionsProvider::new(&config.backend)?;

    match command {
        AppCommand::Prices => cli::prices::run(&provider, json).await,
        AppCommand::History { days } => {
            let days = days.unwrap_or_else(|| config.history_days());
            cli::history::run(&provider, days, json).await
        }
    }
}
