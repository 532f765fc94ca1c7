//! `pgopt` - analyze PostgreSQL EXPLAIN plans from the command line
//!
//! ```text
//! pgopt analyze "SELECT * FROM orders WHERE status = 'open'"
//! pgopt inspect saved_plan.json
//! pgopt compare before.json after.json
//! ```

mod commands;
mod logging;
mod output;

use clap::{Args, Parser, Subcommand};
use logging::{LogFormat, LoggingConfig};
use output::OutputFormat;
use pgopt_core::DB_URL_ENV;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pgopt", version, about = "PostgreSQL query plan analyzer")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    log_format: LogFormat,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run EXPLAIN against a database and analyze the plan
    Analyze(AnalyzeArgs),
    /// Analyze saved EXPLAIN (FORMAT JSON) output
    Inspect(InspectArgs),
    /// Estimate what an alternative plan saves over a baseline
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// SQL query to explain, or `-` to read it from stdin
    query: String,

    /// Config file (default: ./pgopt.toml, then the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Connection URL, overriding the config file
    #[arg(long, env = DB_URL_ENV, hide_env_values = true)]
    database_url: Option<String>,

    /// Plan without executing the query
    #[arg(long)]
    no_analyze: bool,

    /// Request VERBOSE plan output
    #[arg(long)]
    verbose_plan: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Plan file, or `-` for stdin
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct CompareArgs {
    /// Plan file measured as it runs today
    baseline: PathBuf,

    /// Plan file of the candidate rewrite or index
    alternative: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(LoggingConfig {
        format: cli.log_format,
        log_file: cli.log_file.clone(),
        ..LoggingConfig::from_verbosity(cli.verbose)
    })?;

    let rendered = match &cli.command {
        Command::Analyze(args) => commands::analyze(args).await?,
        Command::Inspect(args) => commands::inspect(args)?,
        Command::Compare(args) => commands::compare(args)?,
    };

    print!("{}", rendered);
    Ok(())
}
