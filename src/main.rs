use anyhow::Result;
use babydiary::{cli, config, server};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "babydiary", version, about = "Hour-by-hour care diary with an HTTP API")]
struct Cli {
    /// Config file (defaults to ~/.babydiary/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API server
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show all 24 hours of a day
    Day {
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List the recorded entries of a day
    List {
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Record an hour's observations, updating that hour if it already has an entry
    Record {
        /// When it happened (defaults to now)
        #[arg(long)]
        time: Option<String>,
        #[arg(long, default_value_t = 0)]
        milk: i64,
        #[arg(long)]
        urine: bool,
        #[arg(long)]
        poop: bool,
    },
    /// Check database health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::DiaryConfig::load_from(path)?,
        None => config::DiaryConfig::load()?,
    };

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve_http(config).await?;
        }
        Command::Day { date } => cli::day(&config, date.as_deref())?,
        Command::List { date } => cli::list(&config, date.as_deref())?,
        Command::Record {
            time,
            milk,
            urine,
            poop,
        } => cli::record(&config, time.as_deref(), milk, urine, poop)?,
        Command::Doctor => cli::doctor(&config)?,
    }

    Ok(())
}
