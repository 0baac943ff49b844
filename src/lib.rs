//! # Topic Graph Engine
//!
//! An engine for argument/topic maps: typed nodes (problems, solutions,
//! criteria, claims, questions, facts, sources) connected by typed,
//! directionally-meaningful edges, organized into a main topic diagram plus
//! derived per-part claim diagrams and a criteria comparison table view.
//!
//! ## Features
//!
//! - **Relation Ontology**: one static table of legal node-type pairings;
//!   every edge in every reachable state resolves against it
//! - **Implied-Edge Derivation**: creating an edge transitively creates the
//!   edges it entails under shortcut and composition rules, without
//!   duplicates and without unbounded recursion
//! - **Hierarchical Layout**: deterministic rank-based positioning of each
//!   diagram's visible subgraph after every structural mutation
//! - **Score Propagation**: one logical score stays equal across the up to
//!   three graph locations it can appear in
//! - **Versioned Migration**: ordered transformers bring older persisted
//!   documents up to the current schema before the engine sees them
//!
//! ## Architecture
//!
//! ```text
//! UI layer → TopicEngine (commands) → TopicDocument (diagrams)
//!                  ↓
//!       derive → layout (per mutation)
//!
//! persisted JSON → migrate → TopicDocument
//! ```
//!
//! The engine is synchronous and performs no I/O; persistence and rendering
//! are external collaborators that read a completed document.
//!
//! ## Example
//!
//! ```ignore
//! use topic_graph_engine::ontology::{lookup_relation, NodeType, RelationDirection};
//! use topic_graph_engine::{Config, TopicEngine};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut engine = TopicEngine::new(Config::from_env());
//!     engine.set_node_label("0", "traffic congestion")?;
//!
//!     let relation = lookup_relation(NodeType::Problem, NodeType::Solution).unwrap();
//!     let solution =
//!         engine.add_node("0", RelationDirection::Child, NodeType::Solution, relation)?;
//!     println!("added solution {solution}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Engine configuration: layout geometry, validation limits, logging.
pub mod config;
/// Implied-edge derivation under shortcut and composition rules.
pub mod derive;
/// The topic engine and its persisted document.
pub mod engine;
/// Error types and result aliases.
pub mod error;
/// Node, edge, and diagram entities plus pure query helpers.
pub mod graph;
/// Hierarchical layout of a diagram's visible subgraph.
pub mod layout;
/// Versioned migration of persisted documents.
pub mod migrate;
/// The relation ontology: legal node pairings and derivation rule subsets.
pub mod ontology;
/// Criteria comparison table data.
pub mod table;

pub use config::Config;
pub use engine::{TopicDocument, TopicEngine, DOCUMENT_VERSION, TOPIC_DIAGRAM_ID};
pub use error::{EngineError, EngineResult, MigrationError, MigrationResult};
pub use migrate::migrate;
