//! Rendering of analysis results for stdout

use clap::ValueEnum;
use pgopt_analyzer::{OptimizationSavings, QueryAnalysis};

/// Output format for `analyze`, `inspect` and `compare`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The plan report followed by the bottleneck list
    #[default]
    Text,
    /// One pretty-printed JSON document
    Json,
}

pub fn render_analysis(analysis: &QueryAnalysis, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(analysis_text(analysis)),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(analysis)?)),
    }
}

pub fn render_savings(savings: &OptimizationSavings, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(savings_text(savings)),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(savings)?)),
    }
}

fn analysis_text(analysis: &QueryAnalysis) -> String {
    let mut out = analysis.report.clone();

    if analysis.has_bottlenecks() {
        out.push_str("Potential bottlenecks:\n");
        for message in analysis.bottleneck_messages() {
            out.push_str(&format!("- {}\n", message));
        }
    } else {
        out.push_str("No potential bottlenecks found.\n");
    }

    out
}

fn savings_text(savings: &OptimizationSavings) -> String {
    let mut out = String::new();
    out.push_str(&format!("Time saved: {:.2} ms\n", savings.time_saved_ms));
    out.push_str(&format!("Cost reduction: {:.2}\n", savings.cost_reduction));
    out.push_str(&format!("Rows processed: {}\n", savings.rows_processed));
    if savings.is_regression() {
        out.push_str("The alternative is slower than the baseline.\n");
    }
    out
}
