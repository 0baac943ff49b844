//! Graph model - node, edge, and diagram entities plus the pure query
//! helpers the rest of the engine is built on.
//!
//! Queries are linear scans over a diagram's node/edge lists. Diagrams are
//! small (hundreds of parts, not millions), so scans are an accepted tradeoff
//! over maintaining indexes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::ontology::{composed_relations, NodeType, RelationName};


/// A score on an arguable: unset ("-") or one of nine ordinal levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Score {
    /// Not scored.
    #[default]
    #[serde(rename = "-")]
    Unset,
    /// Score level 1.
    #[serde(rename = "1")]
    One,
    /// Score level 2.
    #[serde(rename = "2")]
    Two,
    /// Score level 3.
    #[serde(rename = "3")]
    Three,
    /// Score level 4.
    #[serde(rename = "4")]
    Four,
    /// Score level 5.
    #[serde(rename = "5")]
    Five,
    /// Score level 6.
    #[serde(rename = "6")]
    Six,
    /// Score level 7.
    #[serde(rename = "7")]
    Seven,
    /// Score level 8.
    #[serde(rename = "8")]
    Eight,
    /// Score level 9.
    #[serde(rename = "9")]
    Nine,
}

impl Score {
    /// Get the score as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Score::Unset => "-",
            Score::One => "1",
            Score::Two => "2",
            Score::Three => "3",
            Score::Four => "4",
            Score::Five => "5",
            Score::Six => "6",
            Score::Seven => "7",
            Score::Eight => "8",
            Score::Nine => "9",
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Score {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(Score::Unset),
            "1" => Ok(Score::One),
            "2" => Ok(Score::Two),
            "3" => Ok(Score::Three),
            "4" => Ok(Score::Four),
            "5" => Ok(Score::Five),
            "6" => Ok(Score::Six),
            "7" => Ok(Score::Seven),
            "8" => Ok(Score::Eight),
            "9" => Ok(Score::Nine),
            _ => Err(format!("Unknown score: {}", s)),
        }
    }
}

/// A top-left-anchored layout position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate of the node's top-left corner.
    pub x: f64,
    /// Vertical coordinate of the node's top-left corner.
    pub y: f64,
}

/// A typed node in a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique, stable id. Never reused.
    pub id: String,
    /// Id of the diagram this node lives in.
    pub diagram_id: String,
    /// The node's type.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Display text.
    pub label: String,
    /// Freeform notes.
    pub notes: String,
    /// Score, mirrored per the propagation rules.
    #[serde(default)]
    pub score: Score,
    /// Whether the node participates in layout and rendering.
    pub showing: bool,
    /// For nodes inside a claim diagram: the topic graph part the containing
    /// diagram argues about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argued_diagram_part_id: Option<String>,
    /// Layout output.
    #[serde(default)]
    pub position: Position,
}

impl Node {
    /// Create a node with a fresh UUID id and default label.
    pub fn new(diagram_id: &str, node_type: NodeType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            diagram_id: diagram_id.to_string(),
            node_type,
            label: "new node".to_string(),
            notes: String::new(),
            score: Score::Unset,
            showing: true,
            argued_diagram_part_id: None,
            position: Position::default(),
        }
    }

    /// Set an explicit id (engines mint sequential ids from the document).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the score.
    pub fn with_score(mut self, score: Score) -> Self {
        self.score = score;
        self
    }

    /// Set the argued graph part back-reference.
    pub fn with_argued_diagram_part(mut self, part_id: impl Into<String>) -> Self {
        self.argued_diagram_part_id = Some(part_id.into());
        self
    }
}

/// A typed edge in a diagram. The source is the parent-side graph part and
/// the target the child-side part; the relation for an edge is keyed by
/// `(source type, target type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique, stable id. Never reused.
    pub id: String,
    /// Id of the diagram this edge lives in.
    pub diagram_id: String,
    /// The relation this edge embodies.
    pub label: RelationName,
    /// Id of the parent-side graph part.
    pub source: String,
    /// Id of the child-side graph part.
    pub target: String,
    /// Freeform notes.
    pub notes: String,
    /// Score, mirrored per the propagation rules.
    #[serde(default)]
    pub score: Score,
}

impl Edge {
    /// Create an edge with a fresh UUID id.
    pub fn new(diagram_id: &str, label: RelationName, source: &str, target: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            diagram_id: diagram_id.to_string(),
            label,
            source: source.to_string(),
            target: target.to_string(),
            notes: String::new(),
            score: Score::Unset,
        }
    }

    /// Set an explicit id (engines mint sequential ids from the document).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Whether a graph part is a node or an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphPartType {
    /// The part is a node.
    Node,
    /// The part is an edge.
    Edge,
}

impl GraphPartType {
    /// Get the part type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphPartType::Node => "node",
            GraphPartType::Edge => "edge",
        }
    }
}

impl std::fmt::Display for GraphPartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GraphPartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(GraphPartType::Node),
            "edge" => Ok(GraphPartType::Edge),
            _ => Err(format!("Unknown graph part type: {}", s)),
        }
    }
}

/// A borrowed view of either kind of graph part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphPart<'a> {
    /// A node.
    Node(&'a Node),
    /// An edge.
    Edge(&'a Edge),
}

impl GraphPart<'_> {
    /// The part's id.
    pub fn id(&self) -> &str {
        match self {
            GraphPart::Node(node) => &node.id,
            GraphPart::Edge(edge) => &edge.id,
        }
    }

    /// The part's score.
    pub fn score(&self) -> Score {
        match self {
            GraphPart::Node(node) => node.score,
            GraphPart::Edge(edge) => edge.score,
        }
    }
}

/// Kind of diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    /// The singleton main diagram.
    Topic,
    /// A derived tree diagram arguing about one topic graph part.
    Claim,
}

/// Layout direction for a diagram's rank axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ranks stack top to bottom.
    TopBottom,
    /// Ranks stack left to right.
    LeftRight,
}

/// A diagram: a set of nodes and the edges between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    /// Unique diagram id. The topic diagram is the singleton `"root"`; claim
    /// diagrams are keyed by the part they argue about.
    pub id: String,
    /// Kind of diagram.
    #[serde(rename = "type")]
    pub diagram_type: DiagramType,
    /// Nodes, in insertion order.
    pub nodes: Vec<Node>,
    /// Edges, in insertion order.
    pub edges: Vec<Edge>,
}

impl Diagram {
    /// Create an empty diagram.
    pub fn new(id: &str, diagram_type: DiagramType) -> Self {
        Self {
            id: id.to_string(),
            diagram_type,
            nodes: vec![],
            edges: vec![],
        }
    }

    /// Layout direction for this diagram: topic diagrams lay out top to
    /// bottom, claim trees left to right.
    pub fn direction(&self) -> Direction {
        match self.diagram_type {
            DiagramType::Topic => Direction::TopBottom,
            DiagramType::Claim => Direction::LeftRight,
        }
    }

    /// Find a node by id. Fails with the searched ids attached.
    pub fn find_node(&self, node_id: &str) -> EngineResult<&Node> {
        self.nodes
            .iter()
            .find(|node| node.id == node_id)
            .ok_or_else(|| EngineError::NodeNotFound {
                id: node_id.to_string(),
                searched: self.nodes.iter().map(|node| node.id.clone()).collect(),
            })
    }

    /// Find a node by id, mutably.
    pub fn find_node_mut(&mut self, node_id: &str) -> EngineResult<&mut Node> {
        let searched: Vec<String> = self.nodes.iter().map(|node| node.id.clone()).collect();
        self.nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .ok_or(EngineError::NodeNotFound {
                id: node_id.to_string(),
                searched,
            })
    }

    /// Find an edge by id. Fails with the searched ids attached.
    pub fn find_edge(&self, edge_id: &str) -> EngineResult<&Edge> {
        self.edges
            .iter()
            .find(|edge| edge.id == edge_id)
            .ok_or_else(|| EngineError::EdgeNotFound {
                id: edge_id.to_string(),
                searched: self.edges.iter().map(|edge| edge.id.clone()).collect(),
            })
    }

    /// Find an edge by id, mutably.
    pub fn find_edge_mut(&mut self, edge_id: &str) -> EngineResult<&mut Edge> {
        let searched: Vec<String> = self.edges.iter().map(|edge| edge.id.clone()).collect();
        self.edges
            .iter_mut()
            .find(|edge| edge.id == edge_id)
            .ok_or(EngineError::EdgeNotFound {
                id: edge_id.to_string(),
                searched,
            })
    }

    /// Find a graph part (node or edge) by id.
    pub fn find_graph_part(&self, part_id: &str) -> EngineResult<GraphPart<'_>> {
        if let Ok(node) = self.find_node(part_id) {
            return Ok(GraphPart::Node(node));
        }
        if let Ok(edge) = self.find_edge(part_id) {
            return Ok(GraphPart::Edge(edge));
        }
        Err(EngineError::GraphPartNotFound {
            id: part_id.to_string(),
            searched: self
                .nodes
                .iter()
                .map(|node| node.id.clone())
                .chain(self.edges.iter().map(|edge| edge.id.clone()))
                .collect(),
        })
    }

    /// Nodes connected below the given node (the node is the parent side).
    /// Edge targets that are not nodes are tolerated and skipped.
    pub fn children(&self, node_id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|edge| edge.source == node_id)
            .filter_map(|edge| self.find_node(&edge.target).ok())
            .collect()
    }

    /// Nodes connected above the given node (the node is the child side).
    pub fn parents(&self, node_id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|edge| edge.target == node_id)
            .filter_map(|edge| self.find_node(&edge.source).ok())
            .collect()
    }

    /// All nodes adjacent to the given node.
    pub fn neighbors(&self, node_id: &str) -> Vec<&Node> {
        let mut neighbors = self.parents(node_id);
        neighbors.extend(self.children(node_id));
        neighbors
    }

    /// All edges incident to the given node.
    pub fn edges_of(&self, node_id: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|edge| edge.source == node_id || edge.target == node_id)
            .collect()
    }

    /// The edge connecting two parts, in either direction, if any. Exactly
    /// one edge may exist between an ordered pair, so this is the deriver's
    /// idempotency check.
    pub fn connecting_edge(&self, part_a_id: &str, part_b_id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| {
            (edge.source == part_a_id && edge.target == part_b_id)
                || (edge.source == part_b_id && edge.target == part_a_id)
        })
    }

    /// Nodes composed by the given node, walking only composition-relation
    /// edges and keeping targets whose type matches the relation's declared
    /// child type (defensive filter against stale edges).
    pub fn nodes_composed_by(&self, node_id: &str) -> Vec<&Node> {
        composed_relations()
            .flat_map(|composed_relation| {
                self.edges
                    .iter()
                    .filter(move |edge| {
                        edge.source == node_id && edge.label == composed_relation.name
                    })
                    .filter_map(|edge| self.find_node(&edge.target).ok())
                    .filter(move |node| node.node_type == composed_relation.child)
            })
            .collect()
    }
}

/// The deterministic id of the claim diagram arguing about a graph part.
pub fn claim_diagram_id(arguable_id: &str, arguable_type: GraphPartType) -> String {
    format!("{}-{}", arguable_type, arguable_id)
}

/// Decode a claim diagram id back into the argued part's type and id.
/// Malformed keys signal document corruption.
pub fn parse_claim_diagram_id(diagram_id: &str) -> EngineResult<(GraphPartType, String)> {
    let malformed = || EngineError::Consistency {
        message: format!("malformed claim diagram id: {}", diagram_id),
    };

    let (part_type, part_id) = diagram_id.split_once('-').ok_or_else(|| malformed())?;
    let part_type: GraphPartType = part_type.parse().map_err(|_| malformed())?;
    if part_id.is_empty() {
        return Err(malformed());
    }

    Ok((part_type, part_id.to_string()))
}

/// The generated label for a claim diagram's root claim, phrased from the
/// argued part.
pub fn implicit_claim_label(
    diagram: &Diagram,
    arguable_id: &str,
    arguable_type: GraphPartType,
) -> EngineResult<String> {
    match arguable_type {
        GraphPartType::Node => {
            let node = diagram.find_node(arguable_id)?;
            Ok(format!("\"{}\" is important", node.label))
        }
        GraphPartType::Edge => {
            let edge = diagram.find_edge(arguable_id)?;
            let parent = diagram.find_node(&edge.source)?;
            let child = diagram.find_node(&edge.target)?;
            Ok(format!(
                "\"{}\" {} \"{}\"",
                child.label,
                edge.label.as_phrase(),
                parent.label
            ))
        }
    }
}
