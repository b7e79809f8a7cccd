//! Query type derivation from EXPLAIN plans.
//!
//! The HTTP Query API returns the plan tree but not the summary query type,
//! so the type is derived from the operators the plan contains.

use serde::Deserialize;

use crate::safety::QueryType;

/// One operator in an EXPLAIN plan.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanNode {
    pub operator_type: String,
    #[serde(default)]
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Creates a plan node with the given operator and children.
    pub fn new(operator_type: impl Into<String>, children: Vec<PlanNode>) -> Self {
        Self {
            operator_type: operator_type.into(),
            children,
        }
    }

    /// Visits every operator name in the tree, depth first.
    fn operators(&self) -> Vec<&str> {
        let mut out = vec![self.operator_name()];
        for child in &self.children {
            out.extend(child.operators());
        }
        out
    }

    /// Operator name without the runtime suffix or variant
    /// (`Create@neo4j` -> `Create`, `Expand(All)@neo4j` -> `Expand`).
    fn operator_name(&self) -> &str {
        let name = self
            .operator_type
            .split('@')
            .next()
            .unwrap_or(&self.operator_type);
        name.split('(').next().unwrap_or(name).trim()
    }
}

const WRITE_OPERATORS: &[&str] = &[
    "Create",
    "Merge",
    "LockingMerge",
    "SetProperty",
    "SetProperties",
    "SetNodeProperty",
    "SetNodeProperties",
    "SetNodePropertiesFromMap",
    "SetRelationshipProperty",
    "SetRelationshipProperties",
    "SetRelationshipPropertiesFromMap",
    "SetPropertiesFromMap",
    "SetLabels",
    "RemoveLabels",
    "Delete",
    "DetachDelete",
    "DeleteNode",
    "DetachDeleteNode",
    "DeleteRelationship",
    "DeleteExpression",
    "DetachDeleteExpression",
    "Foreach",
    "TransactionForeach",
    "SubqueryForeach",
];

const READ_MARKERS: &[&str] = &[
    "Scan",
    "Seek",
    "Expand",
    "ShortestPath",
    "ById",
    "ByElementId",
    "Triadic",
    "CountFromCountStore",
];

/// Operators that only shape rows. They neither read the store nor write.
const NEUTRAL_OPERATORS: &[&str] = &[
    "ProduceResults",
    "EmptyResult",
    "EmptyRow",
    "Argument",
    "Projection",
    "Filter",
    "Limit",
    "ExhaustiveLimit",
    "Skip",
    "Sort",
    "PartialSort",
    "Top",
    "PartialTop",
    "Distinct",
    "OrderedDistinct",
    "Aggregation",
    "EagerAggregation",
    "OrderedAggregation",
    "Eager",
    "Unwind",
    "Apply",
    "SemiApply",
    "AntiSemiApply",
    "LetSemiApply",
    "LetAntiSemiApply",
    "SelectOrSemiApply",
    "SelectOrAntiSemiApply",
    "LetSelectOrSemiApply",
    "LetSelectOrAntiSemiApply",
    "ConditionalApply",
    "AntiConditionalApply",
    "RollUpApply",
    "TransactionApply",
    "Optional",
    "Anti",
    "CartesianProduct",
    "NodeHashJoin",
    "ValueHashJoin",
    "NodeLeftOuterHashJoin",
    "NodeRightOuterHashJoin",
    "Union",
    "OrderedUnion",
    "ProjectEndpoints",
    "AssertSameNode",
    "AssertSameRelationship",
    "CacheProperties",
    "Trail",
    "Repeat",
    "NullifyMetadata",
    "LoadCSV",
    "Input",
];

fn is_schema_operator(op: &str) -> bool {
    let ddl = (op.starts_with("Create") || op.starts_with("Drop"))
        && (op.contains("Index") || op.contains("Constraint"));
    ddl || op.starts_with("DoNothingIfExists")
}

fn is_write_operator(op: &str) -> bool {
    WRITE_OPERATORS.contains(&op)
}

fn is_read_operator(op: &str) -> bool {
    op.starts_with("Show") || READ_MARKERS.iter().any(|marker| op.contains(marker))
}

/// Operators with no known effect, such as `ProcedureCall`, count as writes.
fn has_unknown_effect(op: &str) -> bool {
    !is_read_operator(op) && !NEUTRAL_OPERATORS.contains(&op)
}

/// Derives the query type from a plan tree.
///
/// Fails closed: an operator that is neither a known read nor a row-shaping
/// operator makes the plan a write.
pub fn classify_plan(plan: &PlanNode) -> QueryType {
    let operators = plan.operators();

    if operators.iter().any(|op| is_schema_operator(op)) {
        return QueryType::Schema;
    }

    let writes = operators
        .iter()
        .any(|op| is_write_operator(op) || has_unknown_effect(op));
    let reads = operators.iter().any(|op| is_read_operator(op));

    match (writes, reads) {
        (true, true) => QueryType::ReadWrite,
        (true, false) => QueryType::Write,
        _ => QueryType::Read,
    }
}
