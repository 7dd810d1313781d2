use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commodity_tracker::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Print the raw JSON response instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show quotes for all tracked commodities
    Snapshot,
    /// Show daily candles for one commodity
    History {
        /// Tracked commodity symbol, e.g. WTI
        symbol: String,
        /// Chart range: 1D, 5D, 1M, 3M or 1Y
        #[arg(short, long, default_value = "1M")]
        range: String,
    },
    /// Show recent headlines for one commodity
    News {
        /// Tracked commodity symbol
        #[arg(default_value = "WTI")]
        symbol: String,
    },
}

impl From<Commands> for commodity_tracker::AppCommand {
    fn from(cmd: Commands) -> commodity_tracker::AppCommand {
        match cmd {
            Commands::Snapshot => commodity_tracker::AppCommand::Snapshot,
            Commands::History { symbol, range } => {
                commodity_tracker::AppCommand::History { symbol, range }
            }
            Commands::News { symbol } => commodity_tracker::AppCommand::News { symbol },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => commodity_tracker::cli::setup::setup(),
        Some(cmd) => {
            commodity_tracker::run_command(cmd.into(), cli.config_path.as_deref(), cli.json).await
        }
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
