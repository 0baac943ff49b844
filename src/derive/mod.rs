//! Implied-edge derivation - keeps a diagram closed under the ontology's
//! shortcut and composition rules whenever a direct edge is created.
//!
//! Creating one edge can entail others: a criterion between a problem and a
//! solution entails a direct problem-solution edge (shortcut), and an edge
//! onto a solution entails edges onto the components the solution has
//! (composition). Derivation recurses until no rule produces a new edge; the
//! existing-edge check makes revisited states no-ops, so the recursion
//! reaches a fixed point without duplicates.

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::graph::{Diagram, Edge};
use crate::ontology::{lookup_relation, shortcut_relations, NodeType, Relation};


/// Create a direct edge between two nodes and every edge it implies.
///
/// Idempotent: if any edge already connects the pair (either direction) this
/// is a no-op. Implied pairs whose node types have no ontology relation are
/// skipped silently - the implied relationship simply doesn't apply there.
///
/// `next_edge_id` is the document's edge id counter; one id is consumed per
/// inserted edge.
pub fn create_edge_and_implied_edges(
    diagram: &mut Diagram,
    next_edge_id: &mut u64,
    parent_id: &str,
    child_id: &str,
    relation: Relation,
) -> EngineResult<()> {
    // a misconfigured ontology could make shortcut and composition rules
    // entail each other forever; bound the recursion by the diagram size
    let max_depth = diagram.nodes.len();
    derive(diagram, next_edge_id, parent_id, child_id, relation, 0, max_depth)
}

fn derive(
    diagram: &mut Diagram,
    next_edge_id: &mut u64,
    parent_id: &str,
    child_id: &str,
    relation: Relation,
    depth: usize,
    max_depth: usize,
) -> EngineResult<()> {
    if depth > max_depth {
        return Err(EngineError::Consistency {
            message: format!(
                "implied-edge recursion exceeded depth {} in diagram {}",
                max_depth, diagram.id
            ),
        });
    }

    // assumes only one edge can exist between two parts; a second relation
    // between an already-connected pair is not representable
    if diagram.connecting_edge(parent_id, child_id).is_some() {
        return Ok(());
    }

    // resolve both endpoints before mutating so a dangling id aborts cleanly
    let parent_type = diagram.find_node(parent_id)?.node_type;
    let child_type = diagram.find_node(child_id)?.node_type;

    let edge_id = mint_edge_id(next_edge_id);
    let edge = Edge::new(&diagram.id, relation.name, parent_id, child_id).with_id(edge_id);
    diagram.edges.push(edge);

    create_shortcut_edges(
        diagram,
        next_edge_id,
        parent_id,
        parent_type,
        child_id,
        child_type,
        depth,
        max_depth,
    )?;
    create_edges_implied_by_composition(
        diagram,
        next_edge_id,
        parent_id,
        parent_type,
        child_id,
        child_type,
        depth,
        max_depth,
    )?;

    Ok(())
}

/// When the new edge touches a detour node type, duplicate the more distant
/// relation past it.
///
/// This doesn't strictly need to run when adding nodes, since criteria are
/// the only detours and all their edges are created automatically, but it
/// must run when connecting nodes because criteria edges can be deleted and
/// re-added.
#[allow(clippy::too_many_arguments)]
fn create_shortcut_edges(
    diagram: &mut Diagram,
    next_edge_id: &mut u64,
    parent_id: &str,
    parent_type: NodeType,
    child_id: &str,
    child_type: NodeType,
    depth: usize,
    max_depth: usize,
) -> EngineResult<()> {
    for shortcut in shortcut_relations() {
        // the parent is the detour: connect its own matching parents down to
        // the child
        if parent_type == shortcut.detour_node_type && child_type == shortcut.relation.child {
            let grandparent_ids: Vec<String> = diagram
                .parents(parent_id)
                .into_iter()
                .filter(|grandparent| grandparent.node_type == shortcut.relation.parent)
                .map(|grandparent| grandparent.id.clone())
                .collect();

            for grandparent_id in grandparent_ids {
                derive(
                    diagram,
                    next_edge_id,
                    &grandparent_id,
                    child_id,
                    shortcut.relation,
                    depth + 1,
                    max_depth,
                )?;
            }
        }

        // the child is the detour: connect the parent down to its matching
        // children
        if child_type == shortcut.detour_node_type && parent_type == shortcut.relation.parent {
            let grandchild_ids: Vec<String> = diagram
                .children(child_id)
                .into_iter()
                .filter(|grandchild| grandchild.node_type == shortcut.relation.child)
                .map(|grandchild| grandchild.id.clone())
                .collect();

            for grandchild_id in grandchild_ids {
                derive(
                    diagram,
                    next_edge_id,
                    parent_id,
                    &grandchild_id,
                    shortcut.relation,
                    depth + 1,
                    max_depth,
                )?;
            }
        }
    }

    Ok(())
}

/// Propagate the new edge to the components of either endpoint. The relation
/// for each composed pair is resolved from the ontology by node types, so a
/// `solves` edge onto a solution implies `addresses` edges onto what the
/// solution has.
#[allow(clippy::too_many_arguments)]
fn create_edges_implied_by_composition(
    diagram: &mut Diagram,
    next_edge_id: &mut u64,
    parent_id: &str,
    parent_type: NodeType,
    child_id: &str,
    child_type: NodeType,
    depth: usize,
    max_depth: usize,
) -> EngineResult<()> {
    let composed_by_parent: Vec<(String, NodeType)> = diagram
        .nodes_composed_by(parent_id)
        .into_iter()
        .map(|node| (node.id.clone(), node.node_type))
        .collect();

    for (composed_id, composed_type) in composed_by_parent {
        let Some(relation_for_composed) = lookup_relation(composed_type, child_type) else {
            debug!(
                composed_type = %composed_type,
                child_type = %child_type,
                "No relation for composed pair, skipping propagation branch"
            );
            continue;
        };
        derive(
            diagram,
            next_edge_id,
            &composed_id,
            child_id,
            relation_for_composed,
            depth + 1,
            max_depth,
        )?;
    }

    let composed_by_child: Vec<(String, NodeType)> = diagram
        .nodes_composed_by(child_id)
        .into_iter()
        .map(|node| (node.id.clone(), node.node_type))
        .collect();

    for (composed_id, composed_type) in composed_by_child {
        let Some(relation_for_composed) = lookup_relation(parent_type, composed_type) else {
            debug!(
                parent_type = %parent_type,
                composed_type = %composed_type,
                "No relation for composed pair, skipping propagation branch"
            );
            continue;
        };
        derive(
            diagram,
            next_edge_id,
            parent_id,
            &composed_id,
            relation_for_composed,
            depth + 1,
            max_depth,
        )?;
    }

    Ok(())
}

fn mint_edge_id(next_edge_id: &mut u64) -> String {
    let id = next_edge_id.to_string();
    *next_edge_id += 1;
    id
}
