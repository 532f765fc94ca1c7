//! Query Plan Model - Data structures for representing PostgreSQL execution plans
//!
//! A [`QueryPlan`] owns a single root [`PlanNode`]; every node owns its children
//! by value, so the structure is always a rooted tree. Nodes are built once by
//! the parser and only read afterwards.

use serde::Serialize;

/// Node type tag PostgreSQL uses for a sequential scan
pub const SEQ_SCAN: &str = "Seq Scan";

/// Represents a complete query execution plan
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryPlan {
    /// Root node of the plan tree
    pub root: PlanNode,
    /// Planning time in milliseconds, as reported by the server
    pub planning_time_ms: f64,
    /// Execution time in milliseconds, as reported by the server
    pub execution_time_ms: f64,
}

impl QueryPlan {
    /// Creates a new query plan with the given root node and zero timings
    pub fn new(root: PlanNode) -> Self {
        Self {
            root,
            planning_time_ms: 0.0,
            execution_time_ms: 0.0,
        }
    }

    /// Sets the planning time
    pub fn with_planning_time(mut self, ms: f64) -> Self {
        self.planning_time_ms = ms;
        self
    }

    /// Sets the execution time
    pub fn with_execution_time(mut self, ms: f64) -> Self {
        self.execution_time_ms = ms;
        self
    }

    /// Returns an iterator over all nodes in the plan (depth-first, pre-order)
    pub fn iter_nodes(&self) -> impl Iterator<Item = &PlanNode> {
        self.root.iter()
    }

    /// Visits every node in pre-order, passing its depth (root = 0)
    pub fn walk<'a, F>(&'a self, visit: F)
    where
        F: FnMut(&'a PlanNode, usize),
    {
        self.root.walk(visit);
    }

    /// Returns true if the plan contains any sequential scans
    pub fn has_sequential_scans(&self) -> bool {
        self.iter_nodes().any(PlanNode::is_seq_scan)
    }
}

/// Represents a single node in the query plan tree
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PlanNode {
    /// Raw node type tag, e.g. "Seq Scan" or "Hash Join"
    pub node_type: String,
    /// Relation/table name (scan nodes only)
    pub relation: Option<String>,
    /// Alias used in the query (scan nodes only)
    pub alias: Option<String>,
    /// Relationship to the parent node, e.g. "Outer" or "Inner"
    pub parent_relationship: Option<String>,
    /// Estimated cost before the first row is produced
    pub startup_cost: f64,
    /// Estimated cost to produce all rows
    pub total_cost: f64,
    /// Estimated number of rows
    pub plan_rows: u64,
    /// Estimated width of each row in bytes
    pub plan_width: u64,
    /// Actual time to the first row in milliseconds (from EXPLAIN ANALYZE)
    pub actual_startup_time_ms: f64,
    /// Actual total time in milliseconds (from EXPLAIN ANALYZE)
    pub actual_time_ms: f64,
    /// Actual rows returned (from EXPLAIN ANALYZE)
    pub actual_rows: u64,
    /// Number of loops/iterations
    pub loops: u64,
    /// Filter condition applied at this node
    pub filter: Option<String>,
    /// Child nodes, in document order
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Creates a new plan node with the given type tag
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            ..Self::default()
        }
    }

    /// Sets the relation/table name
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    /// Sets the alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the cost information
    pub fn with_cost(mut self, startup: f64, total: f64) -> Self {
        self.startup_cost = startup;
        self.total_cost = total;
        self
    }

    /// Sets the measured values from EXPLAIN ANALYZE
    pub fn with_actual(mut self, time_ms: f64, rows: u64, loops: u64) -> Self {
        self.actual_time_ms = time_ms;
        self.actual_rows = rows;
        self.loops = loops;
        self
    }

    /// Sets the filter condition
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Adds a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Relation name, or `""` when the node does not scan a relation
    pub fn relation_name(&self) -> &str {
        self.relation.as_deref().unwrap_or_default()
    }

    /// Alias, or `""` when absent
    pub fn alias_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_default()
    }

    /// Filter expression, or `""` when no filter was applied
    pub fn filter_expr(&self) -> &str {
        self.filter.as_deref().unwrap_or_default()
    }

    /// Returns true if this node is a sequential scan (exact tag match)
    pub fn is_seq_scan(&self) -> bool {
        self.node_type == SEQ_SCAN
    }

    /// Returns true if this is a leaf node (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Returns the maximum depth of this subtree, counting this node as 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        self.walk(|_, depth| deepest = deepest.max(depth));
        deepest + 1
    }

    /// Returns an iterator over this subtree (depth-first, pre-order)
    pub fn iter(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(self)
    }

    /// Visits this subtree in pre-order, children left to right.
    ///
    /// The visitor receives each node together with its depth relative to
    /// `self` (which is at depth 0).
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a PlanNode, usize),
    {
        for (depth, node) in self.iter().with_depth() {
            visit(node, depth);
        }
    }
}

/// Iterator for traversing plan nodes depth-first, in pre-order
pub struct PlanNodeIterator<'a> {
    stack: Vec<(usize, &'a PlanNode)>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(root: &'a PlanNode) -> Self {
        Self {
            stack: vec![(0, root)],
        }
    }

    /// Yields `(depth, node)` pairs instead of bare nodes
    pub fn with_depth(self) -> DepthIterator<'a> {
        DepthIterator { inner: self }
    }

    fn next_with_depth(&mut self) -> Option<(usize, &'a PlanNode)> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_with_depth().map(|(_, node)| node)
    }
}

/// Depth-annotated variant of [`PlanNodeIterator`]
pub struct DepthIterator<'a> {
    inner: PlanNodeIterator<'a>,
}

impl<'a> Iterator for DepthIterator<'a> {
    type Item = (usize, &'a PlanNode);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_with_depth()
    }
}
