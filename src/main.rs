use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use farmdash::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for farmdash::AppCommand {
    fn from(cmd: Commands) -> farmdash::AppCommand {
        match cmd {
            Commands::Prices => farmdash::AppCommand::Prices,
            Commands::History { days } => farmdash::AppCommand::History { days },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display current commodity prices
    Prices,
    /// Display daily price history
    History {
        /// Number of days to show, ending today
        #[arg(short, long)]
        days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => farmdash::cli::setup::setup_at_path(path),
            None => farmdash::cli::setup::setup(),
        },
        Some(cmd) => farmdash::run_command(cmd.into(), cli.config_path.as_deref(), cli.json).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
