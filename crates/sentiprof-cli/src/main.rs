mod analyze;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sentiprof-cli")]
#[command(about = "Company news sentiment profiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve the ticker, fetch news and extract a sentiment profile
    Analyze {
        /// Company name as a free-text query, e.g. "Microsoft"
        company: String,

        /// Print the record on a single line instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Resolve the ticker symbol only
    Ticker {
        /// Company name as a free-text query
        company: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = sentiprof_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze { company, compact } => {
            analyze::run_analyze(&config, &company, compact).await?;
        }
        Commands::Ticker { company } => analyze::run_ticker(&config, &company).await?,
    }

    Ok(())
}
