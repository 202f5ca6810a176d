mod chat;
mod ingest;
mod query;

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use fletedb_core::{AppConfig, ConfigError};
use fletedb_store::{AnalysisQuery, MessageQuery};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fletedb")]
#[command(about = "Freight listing ingestion into the hosted data store")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// JSON file holding an array of extracted listings to ingest
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest one chat message together with its listing extraction
    Chat {
        /// JSON file with `message` and `extraction` objects
        file: PathBuf,
    },
    /// List stored chat messages, newest first
    Messages {
        #[arg(long)]
        user_id: Option<i64>,

        #[arg(long)]
        chat_id: Option<i64>,

        /// Earliest timestamp (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_timestamp)]
        from: Option<DateTime<Utc>>,

        /// Latest timestamp (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_timestamp)]
        to: Option<DateTime<Utc>>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },
    /// List stored message analyses, newest first
    Analyses {
        #[arg(long)]
        user_id: Option<i64>,

        /// Filter by sentiment (positive, negative, neutral)
        #[arg(long)]
        sentiment: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long, value_parser = parse_timestamp)]
        from: Option<DateTime<Utc>>,

        #[arg(long, value_parser = parse_timestamp)]
        to: Option<DateTime<Utc>>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },
    /// Aggregate statistics for one user
    Stats {
        #[arg(long)]
        user_id: i64,
    },
    /// Check the connection to the data store
    Ping,
}

/// Accept an RFC 3339 timestamp or a bare date (start of that day, UTC).
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("'{value}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date"))
}

/// Read the batch file, if any, then the configuration. Input problems are
/// reported before configuration problems.
fn load_inputs<F>(cli: &Cli, load_config: F) -> anyhow::Result<(Option<Vec<Value>>, AppConfig)>
where
    F: FnOnce() -> Result<AppConfig, ConfigError>,
{
    let records = match &cli.file {
        Some(path) => Some(ingest::load_records(path)?),
        None => None,
    };
    let config = load_config()?;
    Ok((records, config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.file.is_none() && cli.command.is_none() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let (records, config) = load_inputs(&cli, fletedb_core::load_app_config)?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    if let (Some(path), Some(records)) = (cli.file, records) {
        return ingest::run_ingest_file(&config, &path, records).await;
    }

    match cli.command {
        Some(Commands::Chat { file }) => chat::run_chat_ingest(&config, &file).await?,
        Some(Commands::Messages {
            user_id,
            chat_id,
            from,
            to,
            limit,
            offset,
        }) => {
            let query = MessageQuery {
                user_id,
                chat_id,
                from,
                to,
                limit,
                offset,
            };
            query::run_messages(&config, &query).await?;
        }
        Some(Commands::Analyses {
            user_id,
            sentiment,
            category,
            from,
            to,
            limit,
            offset,
        }) => {
            let query = AnalysisQuery {
                user_id,
                sentiment,
                category,
                from,
                to,
                limit,
                offset,
            };
            query::run_analyses(&config, &query).await?;
        }
        Some(Commands::Stats { user_id }) => query::run_stats(&config, user_id).await?,
        Some(Commands::Ping) => query::run_ping(&config).await?,
        None => {}
    }

    Ok(())
}
