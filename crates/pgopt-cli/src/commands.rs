//! Subcommand implementations. Each returns the text to print on stdout.

use crate::output::{render_analysis, render_savings};
use crate::{AnalyzeArgs, CompareArgs, InspectArgs};
use anyhow::{Context, Result};
use pgopt_analyzer::{QueryAnalyzer, QueryPlan, estimate_savings, parse_plan};
use pgopt_core::{ExplainExecutor, ExplainOptions, PgoptConfig};
use pgopt_driver_postgres::PostgresConnector;
use std::io::Read;
use std::path::Path;

const STDIN_MARKER: &str = "-";

pub async fn analyze(args: &AnalyzeArgs) -> Result<String> {
    let query = if args.query == STDIN_MARKER {
        read_stdin().context("Failed to read query from stdin")?
    } else {
        args.query.clone()
    };

    let mut config = PgoptConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = &args.database_url {
        config.db.override_url(url.as_str());
    }
    config.db.validate().context("Invalid database configuration")?;

    let options = ExplainOptions {
        analyze: !args.no_analyze,
        verbose: args.verbose_plan,
        ..ExplainOptions::default()
    };

    let connector = PostgresConnector::connect(&config.db)
        .await
        .context("Failed to connect to database")?;
    let plan_json = connector
        .explain(&query, &options)
        .await
        .context("EXPLAIN failed")?;
    tracing::debug!(bytes = plan_json.len(), "received plan");

    let analysis = QueryAnalyzer::new()
        .analyze_json(&plan_json)
        .context("Failed to parse EXPLAIN output")?;
    tracing::info!(
        nodes = analysis.summary.node_count,
        bottlenecks = analysis.bottlenecks.len(),
        "plan analyzed"
    );

    render_analysis(&analysis, args.format)
}

pub fn inspect(args: &InspectArgs) -> Result<String> {
    let plan_json = read_plan_source(&args.file)?;
    let analysis = QueryAnalyzer::new()
        .analyze_json(&plan_json)
        .with_context(|| format!("Failed to parse plan from {}", args.file.display()))?;

    render_analysis(&analysis, args.format)
}

pub fn compare(args: &CompareArgs) -> Result<String> {
    let baseline = load_plan(&args.baseline)?;
    let alternative = load_plan(&args.alternative)?;

    let savings = estimate_savings(&baseline.root, &alternative.root);
    tracing::info!(
        time_saved_ms = savings.time_saved_ms,
        cost_reduction = savings.cost_reduction,
        "plans compared"
    );

    render_savings(&savings, args.format)
}

fn load_plan(path: &Path) -> Result<QueryPlan> {
    let plan_json = read_plan_source(path)?;
    parse_plan(&plan_json).with_context(|| format!("Failed to parse plan from {}", path.display()))
}

fn read_plan_source(path: &Path) -> Result<String> {
    if path == Path::new(STDIN_MARKER) {
        return read_stdin().context("Failed to read plan from stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_stdin() -> std::io::Result<String> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
