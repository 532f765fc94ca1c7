//! pgopt Analyzer - PostgreSQL EXPLAIN plan parsing and analysis
//!
//! This crate provides functionality for:
//! - Parsing `EXPLAIN (ANALYZE, FORMAT JSON)` output into a plan tree
//! - Rendering the tree as an indented text report
//! - Flagging likely bottlenecks with a fixed rule set
//! - What-if savings estimates between two plan nodes
//!
//! Everything here is synchronous and pure; fetching the plan from a server
//! is the caller's job.

pub mod analyzer;
pub mod bottlenecks;
pub mod parser;
pub mod plan;
pub mod report;
pub mod savings;

pub use analyzer::{QueryAnalysis, QueryAnalyzer};
pub use bottlenecks::{
    Bottleneck, BottleneckDetector, BottleneckThresholds, filter_column, find_bottlenecks,
    identify_bottlenecks,
};
pub use parser::{ParseError, parse_plan};
pub use plan::{PlanNode, PlanNodeIterator, QueryPlan};
pub use report::{PlanSummary, format_report};
pub use savings::{OptimizationSavings, estimate_savings, processing_rate};
