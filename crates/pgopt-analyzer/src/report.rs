//! Plain-text plan report

use crate::plan::{PlanNode, QueryPlan};
use crate::savings::processing_rate;
use serde::Serialize;

/// Renders the plan as an indented text report.
///
/// A header with the statement timings is followed by one block per node in
/// pre-order, each line indented by one space per level of depth and each
/// block terminated by a blank line.
pub fn format_report(plan: &QueryPlan) -> String {
    let mut out = String::new();

    out.push_str(&format!("Execution Time: {:.2} ms\n", plan.execution_time_ms));
    out.push_str(&format!("Planning Time: {:.2} ms\n", plan.planning_time_ms));

    plan.walk(|node, depth| write_node(&mut out, node, depth));

    out
}

fn write_node(out: &mut String, node: &PlanNode, depth: usize) {
    let indent = " ".repeat(depth);

    out.push_str(&format!("{indent}Node Type: {}\n", node.node_type));

    if let Some(relation) = &node.relation {
        out.push_str(&format!("{indent}Relation Name: {relation}"));
        if let Some(alias) = &node.alias {
            out.push_str(&format!(" (alias: {alias})"));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{indent}Cost: {:.2}..{:.2}\n",
        node.startup_cost, node.total_cost
    ));
    out.push_str(&format!(
        "{indent}Actual Time: {:.2} ms, Rows: {}, Loops: {}\n",
        node.actual_time_ms, node.actual_rows, node.loops
    ));
    out.push('\n');
}

/// Aggregate statistics about a plan tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummary {
    /// Total number of nodes in the tree
    pub node_count: usize,
    /// Number of levels in the tree (a lone root is 1)
    pub depth: usize,
    /// Number of sequential scan nodes
    pub seq_scan_count: usize,
    /// Estimated total cost of the root node
    pub total_cost: f64,
    /// Rows per millisecond produced by the root, counting every loop
    pub rows_per_ms: f64,
}

impl PlanSummary {
    /// Computes the summary for a plan
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let root = &plan.root;
        Self {
            node_count: root.node_count(),
            depth: root.depth(),
            seq_scan_count: plan.iter_nodes().filter(|n| n.is_seq_scan()).count(),
            total_cost: root.total_cost,
            rows_per_ms: processing_rate(root.actual_rows, root.actual_time_ms, root.loops),
        }
    }
}
