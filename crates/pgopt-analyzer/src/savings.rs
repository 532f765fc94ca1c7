//! What-if savings estimates between a measured node and an alternative

use crate::plan::PlanNode;
use serde::Serialize;

/// Difference between a baseline node and a hypothetical alternative.
///
/// Negative values mean the alternative is worse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimizationSavings {
    /// Milliseconds saved
    pub time_saved_ms: f64,
    /// Planner cost units saved
    pub cost_reduction: f64,
    /// Rows the baseline node produced
    pub rows_processed: u64,
}

impl OptimizationSavings {
    /// Returns true if the alternative is slower than the baseline
    pub fn is_regression(&self) -> bool {
        self.time_saved_ms < 0.0
    }
}

/// Compares a baseline node against an alternative. Results are not clamped.
pub fn estimate_savings(baseline: &PlanNode, alternative: &PlanNode) -> OptimizationSavings {
    OptimizationSavings {
        time_saved_ms: baseline.actual_time_ms - alternative.actual_time_ms,
        cost_reduction: baseline.total_cost - alternative.total_cost,
        rows_processed: baseline.actual_rows,
    }
}

/// Rows per millisecond across all loops; zero when no time was measured
pub fn processing_rate(rows: u64, time_ms: f64, loops: u64) -> f64 {
    if time_ms <= 0.0 {
        return 0.0;
    }
    rows as f64 * loops as f64 / time_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_index_scan_alternative_saves_time_and_cost() {
        let seq_scan = PlanNode::new("Seq Scan")
            .with_relation("users")
            .with_cost(0.0, 125.88)
            .with_actual(25.45, 10000, 1);
        let index_scan = PlanNode::new("Index Scan")
            .with_cost(5.0, 50.0)
            .with_actual(2.5, 0, 1);

        let savings = estimate_savings(&seq_scan, &index_scan);

        assert_close(savings.time_saved_ms, 22.95);
        assert_close(savings.cost_reduction, 75.88);
        assert_eq!(savings.rows_processed, 10000);
        assert!(!savings.is_regression());
    }

    #[test]
    fn test_regression_is_not_clamped() {
        let baseline = PlanNode::new("Index Scan")
            .with_cost(5.0, 50.0)
            .with_actual(2.5, 12, 1);
        let alternative = PlanNode::new("Seq Scan")
            .with_cost(0.0, 125.88)
            .with_actual(25.45, 10000, 1);

        let savings = estimate_savings(&baseline, &alternative);

        assert_close(savings.time_saved_ms, -22.95);
        assert_close(savings.cost_reduction, -75.88);
        assert_eq!(savings.rows_processed, 12);
        assert!(savings.is_regression());
    }

    #[test]
    fn test_identical_nodes_save_nothing() {
        let node = PlanNode::new("Sort").with_cost(1.0, 9.0).with_actual(3.0, 7, 1);

        let savings = estimate_savings(&node, &node);

        assert_eq!(savings.time_saved_ms, 0.0);
        assert_eq!(savings.cost_reduction, 0.0);
    }

    #[test]
    fn test_processing_rate() {
        assert_close(processing_rate(1000, 10.0, 1), 100.0);
        assert_close(processing_rate(500, 5.0, 4), 400.0);
        assert_eq!(processing_rate(1000, 0.0, 1), 0.0);
        assert_eq!(processing_rate(1000, -1.0, 1), 0.0);
    }
}
