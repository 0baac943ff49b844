//! The topic engine - owns the persisted document and exposes the command
//! surface the UI layer drives.
//!
//! Every user action (add node, connect nodes, delete, set score, toggle
//! visibility) is a synchronous method that mutates the document and runs to
//! completion before returning: derived-edge insertion and layout
//! recomputation happen inside the action, so any subsequent read sees a
//! fully-closed, fully-laid-out graph. Lookups and validation run before any
//! state is touched, making failed mutations all-or-nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::derive::create_edge_and_implied_edges;
use crate::error::{EngineError, EngineResult};
use crate::graph::{
    claim_diagram_id, implicit_claim_label, parse_claim_diagram_id, Diagram, DiagramType, GraphPart,
    GraphPartType, Node, Score,
};
use crate::layout::layout_visible_components;
use crate::ontology::{lookup_relation, NodeType, Relation, RelationDirection, RelationName};
use crate::table::{build_criteria_table, CriteriaTable};


/// Id of the singleton topic diagram.
pub const TOPIC_DIAGRAM_ID: &str = "root";

/// Schema version produced by this build. Persisted documents at older
/// versions must pass through the migration pipeline first.
pub const DOCUMENT_VERSION: u32 = 4;

/// The serializable document the engine owns: all diagrams plus view state
/// and the id counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDocument {
    /// Schema version; selects the migration starting point on load.
    pub version: u32,
    /// All diagrams, keyed by diagram id.
    pub diagrams: BTreeMap<String, Diagram>,
    /// The claim diagram currently in view, if any.
    pub active_claim_diagram_id: Option<String>,
    /// The problem whose criteria table is in view, if any.
    pub active_table_problem_id: Option<String>,
    /// Next sequential node id. Ids are never reused.
    pub next_node_id: u64,
    /// Next sequential edge id. Ids are never reused.
    pub next_edge_id: u64,
}

impl TopicDocument {
    /// A fresh document: the topic diagram seeded with a single problem.
    pub fn new() -> Self {
        let mut topic = Diagram::new(TOPIC_DIAGRAM_ID, DiagramType::Topic);
        topic
            .nodes
            .push(Node::new(TOPIC_DIAGRAM_ID, NodeType::Problem).with_id("0"));

        let mut diagrams = BTreeMap::new();
        diagrams.insert(TOPIC_DIAGRAM_ID.to_string(), topic);

        Self {
            version: DOCUMENT_VERSION,
            diagrams,
            active_claim_diagram_id: None,
            active_table_problem_id: None,
            next_node_id: 1,
            next_edge_id: 0,
        }
    }

    /// Find a diagram by id. Fails with the present diagram ids attached.
    pub fn find_diagram(&self, diagram_id: &str) -> EngineResult<&Diagram> {
        self.diagrams
            .get(diagram_id)
            .ok_or_else(|| EngineError::DiagramNotFound {
                id: diagram_id.to_string(),
                searched: self.diagrams.keys().cloned().collect(),
            })
    }

    /// Find a diagram by id, mutably.
    pub fn find_diagram_mut(&mut self, diagram_id: &str) -> EngineResult<&mut Diagram> {
        let searched: Vec<String> = self.diagrams.keys().cloned().collect();
        self.diagrams
            .get_mut(diagram_id)
            .ok_or(EngineError::DiagramNotFound {
                id: diagram_id.to_string(),
                searched,
            })
    }
}

impl Default for TopicDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// The topic graph engine. Owns one document; every command is a method, so
/// independent engine instances can exist side by side.
#[derive(Debug, Clone)]
pub struct TopicEngine {
    document: TopicDocument,
    config: Config,
}

impl TopicEngine {
    /// Create an engine over a fresh document.
    pub fn new(config: Config) -> Self {
        Self {
            document: TopicDocument::new(),
            config,
        }
    }

    /// Create an engine over an existing document. The document must already
    /// be at the current schema version (run the migration pipeline first).
    pub fn with_document(document: TopicDocument, config: Config) -> Self {
        Self { document, config }
    }

    /// The engine's document.
    pub fn document(&self) -> &TopicDocument {
        &self.document
    }

    /// Consume the engine, yielding the document for persistence.
    pub fn into_document(self) -> TopicDocument {
        self.document
    }

    /// Id of the diagram user actions currently apply to: the open claim
    /// diagram, or the topic diagram.
    pub fn active_diagram_id(&self) -> String {
        self.document
            .active_claim_diagram_id
            .clone()
            .unwrap_or_else(|| TOPIC_DIAGRAM_ID.to_string())
    }

    /// The diagram user actions currently apply to.
    pub fn active_diagram(&self) -> EngineResult<&Diagram> {
        self.document.find_diagram(&self.active_diagram_id())
    }

    /// Create a node of `to_node_type` next to `from_node_id`, connected by
    /// `relation`, then restore edge closure and re-lay-out the diagram.
    /// Returns the new node's id.
    pub fn add_node(
        &mut self,
        from_node_id: &str,
        adding_as: RelationDirection,
        to_node_type: NodeType,
        relation: Relation,
    ) -> EngineResult<String> {
        let diagram_id = self.active_diagram_id();

        // resolve and validate everything before mutating
        let from_node_type = {
            let diagram = self.document.find_diagram(&diagram_id)?;
            diagram.find_node(from_node_id)?.node_type
        };
        let (parent_type, child_type) = match adding_as {
            RelationDirection::Parent => (to_node_type, from_node_type),
            RelationDirection::Child => (from_node_type, to_node_type),
        };
        let table_relation =
            lookup_relation(parent_type, child_type).ok_or(EngineError::InvalidRelation {
                parent_type,
                child_type,
            })?;
        if table_relation != relation {
            return Err(EngineError::InvalidRelation {
                parent_type,
                child_type,
            });
        }

        let TopicDocument {
            diagrams,
            next_node_id,
            next_edge_id,
            ..
        } = &mut self.document;
        let searched: Vec<String> = diagrams.keys().cloned().collect();
        let diagram = diagrams
            .get_mut(&diagram_id)
            .ok_or(EngineError::DiagramNotFound {
                id: diagram_id.clone(),
                searched,
            })?;

        let new_node_id = next_node_id.to_string();
        *next_node_id += 1;
        diagram
            .nodes
            .push(Node::new(&diagram_id, to_node_type).with_id(&new_node_id));

        let (parent_id, child_id) = match adding_as {
            RelationDirection::Parent => (new_node_id.as_str(), from_node_id),
            RelationDirection::Child => (from_node_id, new_node_id.as_str()),
        };
        create_edge_and_implied_edges(diagram, next_edge_id, parent_id, child_id, relation)?;

        // criteria mediate between a problem and the things addressing it, so
        // a new criterion or solution connects to its existing counterparts
        if matches!(to_node_type, NodeType::Criterion | NodeType::Solution)
            && from_node_type == NodeType::Problem
        {
            connect_criteria_to_solutions(
                diagram,
                next_edge_id,
                &new_node_id,
                to_node_type,
                from_node_id,
            )?;
        }

        layout_visible_components(diagram, &self.config.layout);

        info!(
            node_id = %new_node_id,
            node_type = %to_node_type,
            from = %from_node_id,
            diagram = %diagram_id,
            "Node added"
        );
        Ok(new_node_id)
    }

    /// Connect two existing nodes with the relation their types resolve to,
    /// then restore edge closure and re-lay-out the diagram. Connecting an
    /// already-connected pair is a no-op.
    pub fn connect_nodes(&mut self, parent_id: &str, child_id: &str) -> EngineResult<()> {
        let diagram_id = self.active_diagram_id();

        let relation = {
            let diagram = self.document.find_diagram(&diagram_id)?;
            let parent_type = diagram.find_node(parent_id)?.node_type;
            let child_type = diagram.find_node(child_id)?.node_type;

            if parent_id == child_id {
                return Err(EngineError::Validation {
                    field: "childId".to_string(),
                    reason: "cannot connect a node to itself".to_string(),
                });
            }
            // claim diagrams are trees; claim edges only come from add_node
            if parent_type.is_claim_type() {
                return Err(EngineError::Validation {
                    field: "parentId".to_string(),
                    reason: "claim nodes cannot be connected directly".to_string(),
                });
            }
            if diagram.connecting_edge(parent_id, child_id).is_some() {
                debug!(parent = %parent_id, child = %child_id, "Nodes already connected");
                return Ok(());
            }

            lookup_relation(parent_type, child_type).ok_or(EngineError::InvalidRelation {
                parent_type,
                child_type,
            })?
        };

        let TopicDocument {
            diagrams,
            next_edge_id,
            ..
        } = &mut self.document;
        let searched: Vec<String> = diagrams.keys().cloned().collect();
        let diagram = diagrams
            .get_mut(&diagram_id)
            .ok_or(EngineError::DiagramNotFound {
                id: diagram_id.clone(),
                searched,
            })?;

        create_edge_and_implied_edges(diagram, next_edge_id, parent_id, child_id, relation)?;
        layout_visible_components(diagram, &self.config.layout);

        info!(parent = %parent_id, child = %child_id, relation = %relation.name, "Nodes connected");
        Ok(())
    }

    /// Delete a node, cascading to its incident edges and its claim diagram.
    /// Deleting a root claim deletes the entire owning claim diagram instead.
    pub fn delete_node(&mut self, node_id: &str) -> EngineResult<()> {
        let diagram_id = self.active_diagram_id();
        let node_type = {
            let diagram = self.document.find_diagram(&diagram_id)?;
            diagram.find_node(node_id)?.node_type
        };

        if node_type == NodeType::RootClaim {
            self.document.diagrams.remove(&diagram_id);
            self.document.active_claim_diagram_id = None;
            info!(diagram = %diagram_id, "Root claim deleted, claim diagram removed");
            return Ok(());
        }

        let child_diagram_id = claim_diagram_id(node_id, GraphPartType::Node);
        let diagram = self.document.find_diagram_mut(&diagram_id)?;
        diagram.nodes.retain(|node| node.id != node_id);
        diagram
            .edges
            .retain(|edge| edge.source != node_id && edge.target != node_id);
        self.document.diagrams.remove(&child_diagram_id);

        let diagram = self.document.find_diagram_mut(&diagram_id)?;
        layout_visible_components(diagram, &self.config.layout);

        info!(node_id = %node_id, diagram = %diagram_id, "Node deleted");
        Ok(())
    }

    /// Delete an edge, then re-lay-out the diagram.
    pub fn delete_edge(&mut self, edge_id: &str) -> EngineResult<()> {
        let diagram_id = self.active_diagram_id();
        let diagram = self.document.find_diagram_mut(&diagram_id)?;
        diagram.find_edge(edge_id)?;

        diagram.edges.retain(|edge| edge.id != edge_id);
        layout_visible_components(diagram, &self.config.layout);

        info!(edge_id = %edge_id, diagram = %diagram_id, "Edge deleted");
        Ok(())
    }

    /// Set a node's display label.
    pub fn set_node_label(&mut self, node_id: &str, label: &str) -> EngineResult<()> {
        if label.chars().count() > self.config.limits.max_label_length {
            return Err(EngineError::Validation {
                field: "label".to_string(),
                reason: format!(
                    "exceeds {} characters",
                    self.config.limits.max_label_length
                ),
            });
        }

        let diagram_id = self.active_diagram_id();
        let diagram = self.document.find_diagram_mut(&diagram_id)?;
        diagram.find_node_mut(node_id)?.label = label.to_string();
        Ok(())
    }

    /// Set the notes on a node or edge.
    pub fn set_graph_part_notes(&mut self, part_id: &str, notes: &str) -> EngineResult<()> {
        if notes.chars().count() > self.config.limits.max_notes_length {
            return Err(EngineError::Validation {
                field: "notes".to_string(),
                reason: format!(
                    "exceeds {} characters",
                    self.config.limits.max_notes_length
                ),
            });
        }

        let diagram_id = self.active_diagram_id();
        let diagram = self.document.find_diagram_mut(&diagram_id)?;
        let part_type = match diagram.find_graph_part(part_id)? {
            GraphPart::Node(_) => GraphPartType::Node,
            GraphPart::Edge(_) => GraphPartType::Edge,
        };
        match part_type {
            GraphPartType::Node => diagram.find_node_mut(part_id)?.notes = notes.to_string(),
            GraphPartType::Edge => diagram.find_edge_mut(part_id)?.notes = notes.to_string(),
        }
        Ok(())
    }

    /// Set the score of an arguable and keep its mirror locations equal: the
    /// parent arguable when the arguable is a root claim, and the root claim
    /// of the arguable's own claim diagram when one exists.
    pub fn set_score(
        &mut self,
        arguable_id: &str,
        arguable_type: GraphPartType,
        score: Score,
    ) -> EngineResult<()> {
        let active_id = self.active_diagram_id();

        // resolve every mirror location before writing anything
        let is_root_claim = {
            let diagram = self.document.find_diagram(&active_id)?;
            match arguable_type {
                GraphPartType::Node => {
                    diagram.find_node(arguable_id)?.node_type == NodeType::RootClaim
                }
                GraphPartType::Edge => {
                    diagram.find_edge(arguable_id)?;
                    false
                }
            }
        };

        let parent_mirror = if is_root_claim {
            // the active diagram is the claim diagram; its id encodes the
            // parent arguable, which lives in the topic diagram
            let (parent_type, parent_id) = parse_claim_diagram_id(&active_id)?;
            let topic = self
                .document
                .find_diagram(TOPIC_DIAGRAM_ID)
                .map_err(|_| consistency("topic diagram missing"))?;
            let resolves = match parent_type {
                GraphPartType::Node => topic.find_node(&parent_id).is_ok(),
                GraphPartType::Edge => topic.find_edge(&parent_id).is_ok(),
            };
            if !resolves {
                return Err(consistency(&format!(
                    "parent arguable {} not found in topic diagram",
                    parent_id
                )));
            }
            Some((parent_type, parent_id))
        } else {
            None
        };

        let child_diagram_id = claim_diagram_id(arguable_id, arguable_type);
        let has_child_claim = self.document.diagrams.contains_key(&child_diagram_id);
        if has_child_claim {
            let child = self.document.find_diagram(&child_diagram_id)?;
            if !child
                .nodes
                .iter()
                .any(|node| node.node_type == NodeType::RootClaim)
            {
                return Err(consistency(&format!(
                    "claim diagram {} has no root claim",
                    child_diagram_id
                )));
            }
        }

        // all mirror locations resolve; write them
        let diagram = self.document.find_diagram_mut(&active_id)?;
        match arguable_type {
            GraphPartType::Node => diagram.find_node_mut(arguable_id)?.score = score,
            GraphPartType::Edge => diagram.find_edge_mut(arguable_id)?.score = score,
        }

        if let Some((parent_type, parent_id)) = parent_mirror {
            let topic = self.document.find_diagram_mut(TOPIC_DIAGRAM_ID)?;
            match parent_type {
                GraphPartType::Node => topic.find_node_mut(&parent_id)?.score = score,
                GraphPartType::Edge => topic.find_edge_mut(&parent_id)?.score = score,
            }
        }

        if has_child_claim {
            let child = self.document.find_diagram_mut(&child_diagram_id)?;
            if let Some(root) = child
                .nodes
                .iter_mut()
                .find(|node| node.node_type == NodeType::RootClaim)
            {
                root.score = score;
            }
        }

        info!(arguable = %arguable_id, score = %score, "Score set");
        Ok(())
    }

    /// Show or hide a problem's criteria, then re-lay-out the topic diagram.
    pub fn toggle_show_criteria(&mut self, problem_node_id: &str, show: bool) -> EngineResult<()> {
        // criteria only live in the topic diagram
        let topic = self.document.find_diagram_mut(TOPIC_DIAGRAM_ID)?;
        let node = topic.find_node(problem_node_id)?;
        if node.node_type != NodeType::Problem {
            return Err(EngineError::Validation {
                field: "problemNodeId".to_string(),
                reason: "node is not a problem".to_string(),
            });
        }

        let criterion_ids: Vec<String> = topic
            .children(problem_node_id)
            .into_iter()
            .filter(|child| child.node_type == NodeType::Criterion)
            .map(|child| child.id.clone())
            .collect();
        for criterion_id in &criterion_ids {
            topic.find_node_mut(criterion_id)?.showing = show;
        }

        layout_visible_components(topic, &self.config.layout);

        info!(problem = %problem_node_id, show, count = criterion_ids.len(), "Criteria visibility toggled");
        Ok(())
    }

    /// Open the claim diagram arguing about a graph part, creating it (with
    /// an implicit root claim mirroring the part's score) on first access.
    /// Returns the claim diagram's id.
    pub fn view_or_create_claim_diagram(
        &mut self,
        arguable_id: &str,
        arguable_type: GraphPartType,
    ) -> EngineResult<String> {
        let diagram_id = claim_diagram_id(arguable_id, arguable_type);

        if !self.document.diagrams.contains_key(&diagram_id) {
            let active_id = self.active_diagram_id();
            let (label, score) = {
                let active = self.document.find_diagram(&active_id)?;
                let score = match arguable_type {
                    GraphPartType::Node => active.find_node(arguable_id)?.score,
                    GraphPartType::Edge => active.find_edge(arguable_id)?.score,
                };
                (
                    implicit_claim_label(active, arguable_id, arguable_type)?,
                    score,
                )
            };

            let root_id = self.document.next_node_id.to_string();
            self.document.next_node_id += 1;

            let mut diagram = Diagram::new(&diagram_id, DiagramType::Claim);
            diagram.nodes.push(
                Node::new(&diagram_id, NodeType::RootClaim)
                    .with_id(root_id)
                    .with_label(label)
                    .with_score(score)
                    .with_argued_diagram_part(arguable_id),
            );
            layout_visible_components(&mut diagram, &self.config.layout);
            self.document.diagrams.insert(diagram_id.clone(), diagram);

            info!(diagram = %diagram_id, arguable = %arguable_id, "Claim diagram created");
        }

        self.document.active_claim_diagram_id = Some(diagram_id.clone());
        Ok(diagram_id)
    }

    /// Bring an existing claim diagram into view.
    pub fn view_claim_diagram(&mut self, diagram_id: &str) -> EngineResult<()> {
        let diagram = self.document.find_diagram(diagram_id)?;
        if diagram.diagram_type != DiagramType::Claim {
            return Err(EngineError::Validation {
                field: "diagramId".to_string(),
                reason: "diagram is not a claim diagram".to_string(),
            });
        }
        self.document.active_claim_diagram_id = Some(diagram_id.to_string());
        Ok(())
    }

    /// Close the claim diagram in view, returning to the topic diagram.
    pub fn close_claim_diagram(&mut self) {
        self.document.active_claim_diagram_id = None;
    }

    /// Bring a problem's criteria comparison table into view.
    pub fn view_criteria_table(&mut self, problem_node_id: &str) -> EngineResult<()> {
        let topic = self.document.find_diagram(TOPIC_DIAGRAM_ID)?;
        if topic.find_node(problem_node_id)?.node_type != NodeType::Problem {
            return Err(EngineError::Validation {
                field: "problemNodeId".to_string(),
                reason: "node is not a problem".to_string(),
            });
        }
        self.document.active_table_problem_id = Some(problem_node_id.to_string());
        self.document.active_claim_diagram_id = None;
        Ok(())
    }

    /// Close the criteria table in view.
    pub fn close_table(&mut self) {
        self.document.active_table_problem_id = None;
    }

    /// Return to the plain topic diagram, closing any claim diagram or table
    /// in view.
    pub fn view_topic_diagram(&mut self) {
        self.document.active_table_problem_id = None;
        self.document.active_claim_diagram_id = None;
    }

    /// The criteria comparison table data for a problem: solution columns,
    /// criterion rows, and the embodiment edge (with its score) in each cell.
    pub fn criteria_table(&self, problem_node_id: &str) -> EngineResult<CriteriaTable> {
        let topic = self.document.find_diagram(TOPIC_DIAGRAM_ID)?;
        build_criteria_table(topic, problem_node_id)
    }
}

/// When a criterion or solution is added under a problem, connect it to the
/// problem's existing solutions or criteria with embodiment edges, so the
/// criteria table stays complete.
fn connect_criteria_to_solutions(
    diagram: &mut Diagram,
    next_edge_id: &mut u64,
    new_node_id: &str,
    new_node_type: NodeType,
    problem_node_id: &str,
) -> EngineResult<()> {
    let counterpart_label = if new_node_type == NodeType::Criterion {
        RelationName::Solves
    } else {
        RelationName::CriterionFor
    };

    let counterpart_ids: Vec<String> = diagram
        .edges
        .iter()
        .filter(|edge| edge.source == problem_node_id && edge.label == counterpart_label)
        .map(|edge| edge.target.clone())
        .collect();

    for counterpart_id in counterpart_ids {
        let (criterion_id, embodied_id) = if new_node_type == NodeType::Criterion {
            (new_node_id, counterpart_id.as_str())
        } else {
            (counterpart_id.as_str(), new_node_id)
        };
        let embodied_type = diagram.find_node(embodied_id)?.node_type;
        let Some(relation) = lookup_relation(NodeType::Criterion, embodied_type) else {
            continue;
        };
        create_edge_and_implied_edges(diagram, next_edge_id, criterion_id, embodied_id, relation)?;
    }

    Ok(())
}

fn consistency(message: &str) -> EngineError {
    EngineError::Consistency {
        message: message.to_string(),
    }
}
