//! Query Analyzer - one entry point over parsing, reporting and bottleneck detection

use crate::bottlenecks::{Bottleneck, BottleneckDetector, BottleneckThresholds};
use crate::parser::{self, ParseError};
use crate::plan::{PlanNode, QueryPlan};
use crate::report::{self, PlanSummary};
use crate::savings::{self, OptimizationSavings};
use serde::Serialize;

/// Everything derived from one plan
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnalysis {
    /// The analyzed plan
    pub plan: QueryPlan,
    /// Indented text report
    pub report: String,
    /// Findings, in traversal order
    pub bottlenecks: Vec<Bottleneck>,
    /// Aggregate statistics
    pub summary: PlanSummary,
}

impl QueryAnalysis {
    /// Returns the findings as display strings
    pub fn bottleneck_messages(&self) -> Vec<String> {
        self.bottlenecks.iter().map(ToString::to_string).collect()
    }

    /// Returns true if any rule matched
    pub fn has_bottlenecks(&self) -> bool {
        !self.bottlenecks.is_empty()
    }
}

/// Query analyzer that applies the bottleneck rules with configurable thresholds
#[derive(Debug, Clone, Default)]
pub struct QueryAnalyzer {
    detector: BottleneckDetector,
}

impl QueryAnalyzer {
    /// Creates a new analyzer with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new analyzer with custom thresholds
    pub fn with_thresholds(thresholds: BottleneckThresholds) -> Self {
        Self {
            detector: BottleneckDetector::new(thresholds),
        }
    }

    /// Returns the thresholds in use
    pub fn thresholds(&self) -> &BottleneckThresholds {
        self.detector.thresholds()
    }

    /// Parses raw EXPLAIN JSON and analyzes it
    pub fn analyze_json(&self, json: &str) -> Result<QueryAnalysis, ParseError> {
        parser::parse_plan(json).map(|plan| self.analyze(plan))
    }

    /// Analyzes an already parsed plan
    pub fn analyze(&self, plan: QueryPlan) -> QueryAnalysis {
        QueryAnalysis {
            report: report::format_report(&plan),
            bottlenecks: self.detector.detect(&plan),
            summary: PlanSummary::from_plan(&plan),
            plan,
        }
    }

    /// Returns the findings for a plan as display strings
    pub fn identify_bottlenecks(&self, plan: &QueryPlan) -> Vec<String> {
        self.detector
            .detect(plan)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// What-if comparison of a measured node against an alternative
    pub fn estimate_savings(
        &self,
        baseline: &PlanNode,
        alternative: &PlanNode,
    ) -> OptimizationSavings {
        savings::estimate_savings(baseline, alternative)
    }
}
