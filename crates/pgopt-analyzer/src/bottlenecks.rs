//! Bottleneck heuristics
//!
//! A fixed rule set evaluated on every node of a plan, in the same pre-order
//! the report formatter uses:
//!
//! 1. any node slower than [`BottleneckThresholds::slow_operation_ms`];
//! 2. sequential scans that are slow per row or read many rows;
//! 3. sequential scans carrying a filter that an index could serve.
//!
//! Evaluation is pure and never fails: degenerate nodes (zero time, empty
//! node type) just don't match the rules.

use crate::plan::{PlanNode, QueryPlan};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single finding produced by the heuristics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bottleneck {
    /// A node whose actual time exceeds the slow-operation threshold
    SlowOperation { node_type: String, actual_time_ms: f64 },
    /// A sequential scan that processes too few rows per millisecond or too many rows
    InefficientSeqScan {
        relation: Option<String>,
        actual_time_ms: f64,
        actual_rows: u64,
    },
    /// A filtered sequential scan whose leading filter column could use an index
    FilterCouldUseIndex { column: String },
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlowOperation {
                node_type,
                actual_time_ms,
            } => write!(f, "Slow operation: {node_type} ({actual_time_ms:.2} ms)"),
            Self::InefficientSeqScan {
                relation,
                actual_time_ms,
                actual_rows,
            } => {
                write!(f, "Inefficient operation: Seq Scan")?;
                if let Some(relation) = relation {
                    write!(f, " on {relation}")?;
                }
                write!(f, " ({actual_time_ms:.2} ms for {actual_rows} rows)")
            }
            Self::FilterCouldUseIndex { column } => {
                write!(f, "Potential optimization: Filter on {column} could use index")
            }
        }
    }
}

/// Thresholds for the bottleneck rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BottleneckThresholds {
    /// Nodes with an actual time above this are reported as slow
    pub slow_operation_ms: f64,
    /// Seq scans processing fewer rows per millisecond than this are inefficient
    pub min_rows_per_ms: f64,
    /// Seq scans returning more rows than this are inefficient
    pub large_scan_rows: u64,
}

impl Default for BottleneckThresholds {
    fn default() -> Self {
        Self {
            slow_operation_ms: 100.0,
            min_rows_per_ms: 50.0,
            large_scan_rows: 1_000,
        }
    }
}

/// Evaluates the bottleneck rules with the given thresholds
#[derive(Debug, Clone, Default)]
pub struct BottleneckDetector {
    thresholds: BottleneckThresholds,
}

impl BottleneckDetector {
    /// Creates a detector with custom thresholds
    pub fn new(thresholds: BottleneckThresholds) -> Self {
        Self { thresholds }
    }

    /// Returns the thresholds in use
    pub fn thresholds(&self) -> &BottleneckThresholds {
        &self.thresholds
    }

    /// Runs every rule over the plan, in pre-order
    pub fn detect(&self, plan: &QueryPlan) -> Vec<Bottleneck> {
        let mut findings = Vec::new();
        plan.walk(|node, _| self.check_node(node, &mut findings));
        findings
    }

    fn check_node(&self, node: &PlanNode, findings: &mut Vec<Bottleneck>) {
        if node.actual_time_ms > self.thresholds.slow_operation_ms {
            findings.push(Bottleneck::SlowOperation {
                node_type: node.node_type.clone(),
                actual_time_ms: node.actual_time_ms,
            });
        }

        if !node.is_seq_scan() {
            return;
        }

        // A zero-time scan has an unbounded rate, so only the row count can flag it
        let rows_per_ms = if node.actual_time_ms > 0.0 {
            node.actual_rows as f64 / node.actual_time_ms
        } else {
            f64::INFINITY
        };

        if rows_per_ms < self.thresholds.min_rows_per_ms
            || node.actual_rows > self.thresholds.large_scan_rows
        {
            findings.push(Bottleneck::InefficientSeqScan {
                relation: node.relation.clone(),
                actual_time_ms: node.actual_time_ms,
                actual_rows: node.actual_rows,
            });
        }

        if let Some(filter) = node.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            let column = filter_column(filter).unwrap_or_else(|| filter.trim());
            findings.push(Bottleneck::FilterCouldUseIndex {
                column: column.to_string(),
            });
        }
    }
}

/// Returns the typed findings for a plan using the default thresholds
pub fn find_bottlenecks(plan: &QueryPlan) -> Vec<Bottleneck> {
    BottleneckDetector::default().detect(plan)
}

/// Returns the findings for a plan as display strings, using the default thresholds
pub fn identify_bottlenecks(plan: &QueryPlan) -> Vec<String> {
    find_bottlenecks(plan)
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Extracts the leading column of a filter expression (best effort).
///
/// Skips leading parentheses, whitespace, punctuation, numbers and quoted
/// string literals, then reads the first identifier. A qualified name such
/// as `users.status` yields its last segment and a double-quoted identifier
/// yields its contents. This is a token heuristic, not an expression parser:
/// for `lower(email) = 'x'` it returns `lower`, and for `(NOT deleted)` it
/// returns `NOT`. Returns `None` when the expression holds no identifier.
pub fn filter_column(filter: &str) -> Option<&str> {
    let mut rest = filter;

    while let Some(c) = rest.chars().next() {
        if c == '\'' {
            let literal = &rest[1..];
            rest = literal.find('\'').map_or("", |end| &literal[end + 1..]);
            continue;
        }

        if c.is_ascii_digit() {
            let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
            rest = &rest[end..];
            continue;
        }

        if c == '"' || is_ident_start(c) {
            let (mut column, mut tail) = read_identifier(rest)?;

            // Follow a qualified chain like schema.table.column
            while let Some(next) = tail.strip_prefix('.') {
                match read_identifier(next) {
                    Some((segment, after)) => {
                        column = segment;
                        tail = after;
                    }
                    None => break,
                }
            }

            if !column.is_empty() {
                return Some(column);
            }
            rest = tail;
            continue;
        }

        rest = &rest[c.len_utf8()..];
    }

    None
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Reads one identifier (bare or double-quoted) at the start of `s`
fn read_identifier(s: &str) -> Option<(&str, &str)> {
    if let Some(quoted) = s.strip_prefix('"') {
        let end = quoted.find('"')?;
        return Some((&quoted[..end], &quoted[end + 1..]));
    }

    let first = s.chars().next()?;
    if !is_ident_start(first) {
        return None;
    }
    let end = s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}
