//! PostgreSQL EXPLAIN (FORMAT JSON) parser
//!
//! # Examples
//!
//! ```
//! use pgopt_analyzer::parse_plan;
//!
//! let json_output = r#"[
//!   {
//!     "Plan": {
//!       "Node Type": "Seq Scan",
//!       "Relation Name": "users",
//!       "Startup Cost": 0.0,
//!       "Total Cost": 10.0,
//!       "Plan Rows": 100,
//!       "Plan Width": 36
//!     },
//!     "Planning Time": 0.1,
//!     "Execution Time": 0.4
//!   }
//! ]"#;
//!
//! let plan = parse_plan(json_output).unwrap();
//! assert!(plan.has_sequential_scans());
//! assert_eq!(plan.execution_time_ms, 0.4);
//! ```
//!
//! Type mismatches on known fields fail fast with [`ParseError::TypeMismatch`];
//! nothing is coerced except integer-valued counters, which accept any
//! non-negative number and round it.

use crate::plan::{PlanNode, QueryPlan};
use serde_json::{Map, Value};
use thiserror::Error;

/// Wire field names, top level
const PLAN: &str = "Plan";
const PLANNING: &str = "Planning";
const PLANNING_TIME: &str = "Planning Time";
const PLANNING_TIME_COMPACT: &str = "PlanningTime";
const EXECUTION_TIME: &str = "Execution Time";

/// Wire field names, per node
const NODE_TYPE: &str = "Node Type";
const RELATION_NAME: &str = "Relation Name";
const ALIAS: &str = "Alias";
const PARENT_RELATIONSHIP: &str = "Parent Relationship";
const STARTUP_COST: &str = "Startup Cost";
const TOTAL_COST: &str = "Total Cost";
const PLAN_ROWS: &str = "Plan Rows";
const PLAN_WIDTH: &str = "Plan Width";
const ACTUAL_STARTUP_TIME: &str = "Actual Startup Time";
const ACTUAL_TOTAL_TIME: &str = "Actual Total Time";
const ACTUAL_ROWS: &str = "Actual Rows";
const ACTUAL_LOOPS: &str = "Actual Loops";
const FILTER: &str = "Filter";
const PLANS: &str = "Plans";

/// Errors that can occur when parsing PostgreSQL EXPLAIN output
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Empty query plan")]
    Empty,

    #[error("Field '{field}' has the wrong type: expected {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Missing Plan object in EXPLAIN output")]
    MissingPlan,
}

/// Result type for plan parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parses PostgreSQL `EXPLAIN (ANALYZE, FORMAT JSON)` output.
///
/// The server wraps the plan in a one-element array; only the first element
/// is read. A bare plan object is accepted as well.
pub fn parse_plan(json: &str) -> Result<QueryPlan> {
    let value: Value = serde_json::from_str(json)?;

    let element = match &value {
        Value::Array(items) => items.first().ok_or(ParseError::Empty)?,
        Value::Object(obj) if obj.is_empty() => return Err(ParseError::Empty),
        Value::Object(_) => &value,
        _ => {
            return Err(ParseError::TypeMismatch {
                field: "<root>",
                expected: "array",
            });
        }
    };

    let element = element.as_object().ok_or(ParseError::TypeMismatch {
        field: "<root>",
        expected: "object",
    })?;

    let plan_obj = match element.get(PLAN) {
        None | Some(Value::Null) => return Err(ParseError::MissingPlan),
        Some(Value::Object(obj)) => obj,
        Some(_) => {
            return Err(ParseError::TypeMismatch {
                field: PLAN,
                expected: "object",
            });
        }
    };

    let root = parse_plan_node(plan_obj)?;

    Ok(QueryPlan::new(root)
        .with_planning_time(planning_time(element)?)
        .with_execution_time(get_f64(element, EXECUTION_TIME)?.unwrap_or(0.0)))
}

/// Planning time arrives either flat or nested under a "Planning" object;
/// the flat field wins when both are present. Inside "Planning" the
/// compact "PlanningTime" spelling is read when "Planning Time" is absent.
fn planning_time(element: &Map<String, Value>) -> Result<f64> {
    if let Some(ms) = get_f64(element, PLANNING_TIME)? {
        return Ok(ms);
    }

    match element.get(PLANNING) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Object(planning)) => {
            let ms = match get_f64(planning, PLANNING_TIME)? {
                Some(ms) => Some(ms),
                None => get_f64(planning, PLANNING_TIME_COMPACT)?,
            };
            Ok(ms.unwrap_or(0.0))
        }
        Some(_) => Err(ParseError::TypeMismatch {
            field: PLANNING,
            expected: "object",
        }),
    }
}

/// Parses a single plan node, recursing into "Plans"
fn parse_plan_node(obj: &Map<String, Value>) -> Result<PlanNode> {
    let mut node = PlanNode::new(get_str(obj, NODE_TYPE)?.unwrap_or_default());

    node.relation = get_str(obj, RELATION_NAME)?;
    node.alias = get_str(obj, ALIAS)?;
    node.parent_relationship = get_str(obj, PARENT_RELATIONSHIP)?;
    node.filter = get_str(obj, FILTER)?;

    node.startup_cost = get_f64(obj, STARTUP_COST)?.unwrap_or(0.0);
    node.total_cost = get_f64(obj, TOTAL_COST)?.unwrap_or(0.0);
    node.plan_rows = get_count(obj, PLAN_ROWS)?.unwrap_or(0);
    node.plan_width = get_count(obj, PLAN_WIDTH)?.unwrap_or(0);

    node.actual_startup_time_ms = get_f64(obj, ACTUAL_STARTUP_TIME)?.unwrap_or(0.0);
    node.actual_time_ms = get_f64(obj, ACTUAL_TOTAL_TIME)?.unwrap_or(0.0);
    node.actual_rows = get_count(obj, ACTUAL_ROWS)?.unwrap_or(0);
    node.loops = get_count(obj, ACTUAL_LOOPS)?.unwrap_or(0);

    match obj.get(PLANS) {
        None | Some(Value::Null) => {}
        Some(Value::Array(plans)) => {
            node.children.reserve(plans.len());
            for child in plans {
                let child = child.as_object().ok_or(ParseError::TypeMismatch {
                    field: PLANS,
                    expected: "array of objects",
                })?;
                node.children.push(parse_plan_node(child)?);
            }
        }
        Some(_) => {
            return Err(ParseError::TypeMismatch {
                field: PLANS,
                expected: "array",
            });
        }
    }

    Ok(node)
}

/// Reads an optional string field; empty strings count as absent
fn get_str(obj: &Map<String, Value>, field: &'static str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParseError::TypeMismatch {
            field,
            expected: "string",
        }),
    }
}

/// Reads an optional numeric field as f64, integer literals included
fn get_f64(obj: &Map<String, Value>, field: &'static str) -> Result<Option<f64>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or(ParseError::TypeMismatch {
            field,
            expected: "number",
        }),
        Some(_) => Err(ParseError::TypeMismatch {
            field,
            expected: "number",
        }),
    }
}

/// Reads an optional non-negative counter, rounding fractional values
fn get_count(obj: &Map<String, Value>, field: &'static str) -> Result<Option<u64>> {
    let mismatch = ParseError::TypeMismatch {
        field,
        expected: "non-negative number",
    };

    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(count) = n.as_u64() {
                return Ok(Some(count));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f >= 0.0 => Ok(Some(f.round() as u64)),
                _ => Err(mismatch),
            }
        }
        Some(_) => Err(mismatch),
    }
}
