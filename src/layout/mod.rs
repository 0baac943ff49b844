//! Hierarchical layout - recomputes node positions for a diagram's visible
//! subgraph.
//!
//! A layered scheme in three phases: nodes are assigned to ranks so edges
//! point from a lower rank to a higher one wherever the graph is acyclic,
//! nodes within a rank are reordered to reduce edge crossings, and ranks are
//! placed with fixed separation. The computed center-anchored coordinates are
//! converted to top-left anchors before being written back.
//!
//! Only `showing` nodes and edges with both endpoints showing participate;
//! hidden nodes keep their previous positions. The whole pass is
//! deterministic and idempotent: ordering derives from edge structure and
//! insertion order, never from prior positions.

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::graph::{Diagram, Direction, Position};


// Crossing reduction converges quickly on diagrams of this scale.
const ORDERING_SWEEPS: usize = 4;

/// Recompute positions for the diagram's visible subgraph in place.
pub fn layout_visible_components(diagram: &mut Diagram, config: &LayoutConfig) {
    let visible_ids: Vec<String> = diagram
        .nodes
        .iter()
        .filter(|node| node.showing)
        .map(|node| node.id.clone())
        .collect();
    if visible_ids.is_empty() {
        return;
    }

    let index_of: HashMap<&str, usize> = visible_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (id.as_str(), index))
        .collect();

    // visible edges, as (parent index, child index)
    let edges: Vec<(usize, usize)> = diagram
        .edges
        .iter()
        .filter_map(|edge| {
            let source = index_of.get(edge.source.as_str())?;
            let target = index_of.get(edge.target.as_str())?;
            Some((*source, *target))
        })
        .collect();

    let ranks = assign_ranks(visible_ids.len(), &edges);
    let orders = order_within_ranks(visible_ids.len(), &edges, &ranks);
    let positions = place(&ranks, &orders, diagram.direction(), config);

    for node in diagram.nodes.iter_mut() {
        if let Some(index) = index_of.get(node.id.as_str()) {
            node.position = positions[*index];
        }
    }
}

/// Longest-path ranking: a node's rank is one more than its highest-ranked
/// visible parent. Cycles are broken by ignoring edges back into the active
/// traversal path.
fn assign_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut parents_of: Vec<Vec<usize>> = vec![vec![]; node_count];
    for (parent, child) in edges {
        parents_of[*child].push(*parent);
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Visit {
        Unvisited,
        InProgress,
        Done,
    }

    fn rank_of(
        node: usize,
        parents_of: &[Vec<usize>],
        ranks: &mut [usize],
        visits: &mut [Visit],
    ) -> usize {
        match visits[node] {
            Visit::Done => return ranks[node],
            // back edge: treat the cycle as already ranked at this node
            Visit::InProgress => return ranks[node],
            Visit::Unvisited => {}
        }

        visits[node] = Visit::InProgress;
        let mut rank = 0;
        for parent in &parents_of[node] {
            if visits[*parent] == Visit::InProgress {
                continue;
            }
            rank = rank.max(rank_of(*parent, parents_of, ranks, visits) + 1);
        }
        ranks[node] = rank;
        visits[node] = Visit::Done;
        rank
    }

    let mut ranks = vec![0; node_count];
    let mut visits = vec![Visit::Unvisited; node_count];
    for node in 0..node_count {
        rank_of(node, &parents_of, &mut ranks, &mut visits);
    }
    ranks
}

/// Median/barycenter crossing reduction: sweep down then up a fixed number of
/// times, reordering each rank by the average order of each node's neighbors
/// in the adjacent rank. Stable sorts keyed by the current order make the
/// result deterministic.
fn order_within_ranks(
    node_count: usize,
    edges: &[(usize, usize)],
    ranks: &[usize],
) -> Vec<usize> {
    let rank_count = ranks.iter().copied().max().unwrap_or(0) + 1;
    let mut layers: Vec<Vec<usize>> = vec![vec![]; rank_count];
    for node in 0..node_count {
        layers[ranks[node]].push(node);
    }

    // order[node] = index within its rank
    let mut order = vec![0usize; node_count];
    let reindex = |layers: &[Vec<usize>], order: &mut [usize]| {
        for layer in layers {
            for (index, node) in layer.iter().enumerate() {
                order[*node] = index;
            }
        }
    };
    reindex(&layers, &mut order);

    let barycenter = |node: usize, toward_parents: bool, order: &[usize]| -> Option<f64> {
        let neighbor_orders: Vec<usize> = edges
            .iter()
            .filter_map(|(parent, child)| {
                if toward_parents && *child == node && ranks[*parent] < ranks[node] {
                    Some(order[*parent])
                } else if !toward_parents && *parent == node && ranks[*child] > ranks[node] {
                    Some(order[*child])
                } else {
                    None
                }
            })
            .collect();
        if neighbor_orders.is_empty() {
            return None;
        }
        Some(neighbor_orders.iter().sum::<usize>() as f64 / neighbor_orders.len() as f64)
    };

    for _ in 0..ORDERING_SWEEPS {
        // downward: order each rank by parent positions
        for rank in 1..rank_count {
            let mut keyed: Vec<(f64, usize, usize)> = layers[rank]
                .iter()
                .map(|node| {
                    let key = barycenter(*node, true, &order).unwrap_or(order[*node] as f64);
                    (key, order[*node], *node)
                })
                .collect();
            keyed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            layers[rank] = keyed.into_iter().map(|(_, _, node)| node).collect();
            reindex(&layers, &mut order);
        }
        // upward: order each rank by child positions
        for rank in (0..rank_count.saturating_sub(1)).rev() {
            let mut keyed: Vec<(f64, usize, usize)> = layers[rank]
                .iter()
                .map(|node| {
                    let key = barycenter(*node, false, &order).unwrap_or(order[*node] as f64);
                    (key, order[*node], *node)
                })
                .collect();
            keyed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            layers[rank] = keyed.into_iter().map(|(_, _, node)| node).collect();
            reindex(&layers, &mut order);
        }
    }

    order
}

/// Place ranks along the direction axis and order within each rank along the
/// cross axis, centered around the origin, then convert the center anchor to
/// a top-left anchor.
fn place(
    ranks: &[usize],
    orders: &[usize],
    direction: Direction,
    config: &LayoutConfig,
) -> Vec<Position> {
    let mut rank_sizes: HashMap<usize, usize> = HashMap::new();
    for rank in ranks {
        *rank_sizes.entry(*rank).or_insert(0) += 1;
    }

    let (rank_extent, cross_extent) = match direction {
        Direction::TopBottom => (config.node_height, config.node_width),
        Direction::LeftRight => (config.node_width, config.node_height),
    };

    ranks
        .iter()
        .zip(orders)
        .map(|(rank, order)| {
            let along = *rank as f64 * (rank_extent + config.rank_separation);
            let in_rank = rank_sizes[rank];
            let span = in_rank as f64 * cross_extent
                + (in_rank.saturating_sub(1)) as f64 * config.node_separation;
            let across = *order as f64 * (cross_extent + config.node_separation)
                - span / 2.0
                + cross_extent / 2.0;

            let (center_x, center_y) = match direction {
                Direction::TopBottom => (across, along),
                Direction::LeftRight => (along, across),
            };
            Position {
                x: center_x - config.node_width / 2.0,
                y: center_y - config.node_height / 2.0,
            }
        })
        .collect()
}
