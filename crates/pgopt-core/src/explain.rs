//! EXPLAIN statement options and the executor seam

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Options for the generated `EXPLAIN` statement.
///
/// `COSTS` and `FORMAT JSON` are always requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainOptions {
    /// Execute the statement and collect actual timings
    pub analyze: bool,
    /// Report buffer usage (requires `analyze`)
    pub buffers: bool,
    /// Include output columns and schema-qualified names
    pub verbose: bool,
}

impl Default for ExplainOptions {
    fn default() -> Self {
        Self {
            analyze: true,
            buffers: true,
            verbose: false,
        }
    }
}

impl ExplainOptions {
    /// Options for a plan-only EXPLAIN that doesn't run the statement
    pub fn plan_only() -> Self {
        Self {
            analyze: false,
            buffers: false,
            verbose: false,
        }
    }

    /// Renders the option list, e.g. `(ANALYZE, COSTS, BUFFERS, FORMAT JSON)`
    pub fn option_list(&self) -> String {
        let mut options = Vec::with_capacity(5);
        if self.analyze {
            options.push("ANALYZE");
        }
        options.push("COSTS");
        if self.verbose {
            options.push("VERBOSE");
        }
        if self.buffers && self.analyze {
            options.push("BUFFERS");
        }
        options.push("FORMAT JSON");
        format!("({})", options.join(", "))
    }

    /// Builds the full EXPLAIN statement for a query
    pub fn statement(&self, query: &str) -> String {
        format!("EXPLAIN {} {}", self.option_list(), query.trim())
    }
}

/// Something that can run EXPLAIN and hand back the raw JSON document
#[async_trait]
pub trait ExplainExecutor: Send + Sync {
    /// Runs EXPLAIN for `query` and returns the plan JSON text
    async fn explain(&self, query: &str, options: &ExplainOptions) -> Result<String>;
}
