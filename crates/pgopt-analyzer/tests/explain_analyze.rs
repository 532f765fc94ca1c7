//! End-to-end analysis of captured `EXPLAIN (ANALYZE, FORMAT JSON)` output

use pgopt_analyzer::{
    ParseError, PlanNode, PlanSummary, QueryAnalyzer, estimate_savings, format_report,
    identify_bottlenecks, parse_plan,
};
use pretty_assertions::assert_eq;

const NESTED_PLAN: &str = include_str!("fixtures/nested_plan.json");

/// Output of a PostgreSQL 16 server with BUFFERS, where planning time sits
/// next to the nested "Planning" buffer counters
const BUFFERS_PLAN: &str = r#"[
  {
    "Plan": {
      "Node Type": "Aggregate",
      "Strategy": "Plain",
      "Partial Mode": "Simple",
      "Parallel Aware": false,
      "Async Capable": false,
      "Startup Cost": 20.88,
      "Total Cost": 20.89,
      "Plan Rows": 1,
      "Plan Width": 8,
      "Actual Startup Time": 0.412,
      "Actual Total Time": 0.413,
      "Actual Rows": 1,
      "Actual Loops": 1,
      "Shared Hit Blocks": 8,
      "Plans": [
        {
          "Node Type": "Seq Scan",
          "Parent Relationship": "Outer",
          "Parallel Aware": false,
          "Async Capable": false,
          "Relation Name": "accounts",
          "Alias": "accounts",
          "Startup Cost": 0.00,
          "Total Cost": 18.50,
          "Plan Rows": 950,
          "Plan Width": 0,
          "Actual Startup Time": 0.009,
          "Actual Total Time": 0.301,
          "Actual Rows": 20,
          "Actual Loops": 1,
          "Filter": "(balance < 0)",
          "Rows Removed by Filter": 980,
          "Shared Hit Blocks": 8
        }
      ]
    },
    "Planning": {
      "Shared Hit Blocks": 0,
      "Planning Time": 0.088
    },
    "Triggers": [],
    "Execution Time": 0.441
  }
]"#;

#[test]
fn nested_plan_end_to_end() {
    let analysis = QueryAnalyzer::new()
        .analyze_json(NESTED_PLAN)
        .expect("analysis failed");

    assert_eq!(
        analysis.bottleneck_messages(),
        vec![
            "Slow operation: Sort (1255.12 ms)",
            "Slow operation: Hash Join (123.45 ms)",
            "Inefficient operation: Seq Scan on users (25.45 ms for 10000 rows)",
            "Potential optimization: Filter on status could use index",
            "Potential optimization: Filter on created_at could use index",
        ]
    );
    assert!(analysis.report.contains("Execution Time: 1268.12 ms"));
    assert!(analysis.report.contains("Planning Time: 12.34 ms"));
    assert!(analysis.report.contains("Cost: 1024.58..1026.12"));
    assert!(analysis.report.contains("Cost: 25.88..924.58"));
}

#[test]
fn buffers_output_with_nested_planning_time() {
    let plan = parse_plan(BUFFERS_PLAN).expect("parse failed");

    assert_eq!(plan.planning_time_ms, 0.088);
    assert_eq!(plan.execution_time_ms, 0.441);
    assert_eq!(plan.root.node_count(), 2);

    // 20 rows in 0.301 ms is about 66 rows/ms, so only the filter rule fires
    assert_eq!(
        identify_bottlenecks(&plan),
        vec!["Potential optimization: Filter on balance could use index"]
    );

    let report = format_report(&plan);
    assert!(report.starts_with("Execution Time: 0.44 ms\nPlanning Time: 0.09 ms\n"));
    assert!(report.contains(" Relation Name: accounts (alias: accounts)\n"));

    let summary = PlanSummary::from_plan(&plan);
    assert_eq!(summary.seq_scan_count, 1);
    assert_eq!(summary.depth, 2);
}

#[test]
fn empty_explain_output_is_rejected() {
    assert!(matches!(parse_plan("[]"), Err(ParseError::Empty)));
    assert!(matches!(parse_plan("]["), Err(ParseError::InvalidJson(_))));
}

#[test]
fn what_if_index_scan_regression() {
    let index_scan = PlanNode::new("Index Scan")
        .with_cost(5.0, 50.0)
        .with_actual(2.5, 1, 1);
    let plan = parse_plan(NESTED_PLAN).expect("parse failed");
    let users_scan = plan
        .iter_nodes()
        .find(|n| n.relation_name() == "users")
        .expect("users scan");

    let savings = estimate_savings(&index_scan, users_scan);

    assert!((savings.time_saved_ms - -22.95).abs() < 1e-9);
    assert!((savings.cost_reduction - -75.88).abs() < 1e-9);
    assert!(savings.is_regression());
}
