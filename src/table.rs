//! Criteria comparison table - the tabular view of how well each of a
//! problem's solutions embodies each of its criteria.
//!
//! The engine supplies the pure data; rendering is the UI layer's concern.
//! Hidden criteria still appear here - the table is the place to inspect
//! them even when the diagram hides them.

use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::graph::{Diagram, Score};
use crate::ontology::{NodeType, RelationName};

/// One problem's criteria table: solution columns crossed with criterion
/// rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaTable {
    /// The problem the table compares solutions for.
    pub problem_id: String,
    /// Column headers: the problem's solutions, in insertion order.
    pub solutions: Vec<TableHeader>,
    /// Rows: one per criterion.
    pub rows: Vec<CriteriaTableRow>,
}

/// A column or row header: a node's id and label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableHeader {
    /// The node's id.
    pub id: String,
    /// The node's label.
    pub label: String,
}

/// One criterion row: a cell per solution column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaTableRow {
    /// The criterion this row scores against.
    pub criterion: TableHeader,
    /// One cell per solution, in column order. `None` when no embodiment
    /// edge connects the pair.
    pub cells: Vec<Option<TableCell>>,
}

/// The embodiment edge behind one table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    /// Id of the embodiment edge, so the cell can be scored or argued about.
    pub edge_id: String,
    /// The edge's score.
    pub score: Score,
}

/// Build the criteria table for a problem from the topic diagram.
pub fn build_criteria_table(topic: &Diagram, problem_id: &str) -> EngineResult<CriteriaTable> {
    let problem = topic.find_node(problem_id)?;
    if problem.node_type != NodeType::Problem {
        return Err(EngineError::Validation {
            field: "problemNodeId".to_string(),
            reason: "node is not a problem".to_string(),
        });
    }

    let children = topic.children(problem_id);
    let solutions: Vec<TableHeader> = children
        .iter()
        .filter(|child| child.node_type == NodeType::Solution)
        .map(|child| TableHeader {
            id: child.id.clone(),
            label: child.label.clone(),
        })
        .collect();
    let criteria: Vec<TableHeader> = children
        .iter()
        .filter(|child| child.node_type == NodeType::Criterion)
        .map(|child| TableHeader {
            id: child.id.clone(),
            label: child.label.clone(),
        })
        .collect();

    let rows = criteria
        .into_iter()
        .map(|criterion| {
            let cells = solutions
                .iter()
                .map(|solution| {
                    topic
                        .connecting_edge(&criterion.id, &solution.id)
                        .filter(|edge| edge.label == RelationName::Embodies)
                        .map(|edge| TableCell {
                            edge_id: edge.id.clone(),
                            score: edge.score,
                        })
                })
                .collect();
            CriteriaTableRow { criterion, cells }
        })
        .collect();

    Ok(CriteriaTable {
        problem_id: problem_id.to_string(),
        solutions,
        rows,
    })
}
