use thiserror::Error;

use crate::ontology::NodeType;

/// Engine-level errors raised by graph queries and mutating operations.
///
/// Lookup failures inside mutating operations abort the whole mutation so the
/// graph is never left half-updated; read-only query helpers recover absence
/// locally by returning empty collections instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced node id does not exist in the searched diagram.
    #[error("node not found: {id} (searched: {searched:?})")]
    NodeNotFound {
        /// The id that was looked up.
        id: String,
        /// Ids of the nodes that were actually present.
        searched: Vec<String>,
    },

    /// A referenced edge id does not exist in the searched diagram.
    #[error("edge not found: {id} (searched: {searched:?})")]
    EdgeNotFound {
        /// The id that was looked up.
        id: String,
        /// Ids of the edges that were actually present.
        searched: Vec<String>,
    },

    /// A referenced graph part id matches neither a node nor an edge.
    #[error("graph part not found: {id} (searched: {searched:?})")]
    GraphPartNotFound {
        /// The id that was looked up.
        id: String,
        /// Ids of all graph parts that were actually present.
        searched: Vec<String>,
    },

    /// A referenced diagram id does not exist in the document.
    #[error("diagram not found: {id} (searched: {searched:?})")]
    DiagramNotFound {
        /// The id that was looked up.
        id: String,
        /// Ids of the diagrams that were actually present.
        searched: Vec<String>,
    },

    /// An attempted connection's node-type pair has no ontology relation.
    /// The connection is rejected before any mutation.
    #[error("no relation exists from parent type {parent_type} to child type {child_type}")]
    InvalidRelation {
        /// Type of the would-be parent node.
        parent_type: NodeType,
        /// Type of the would-be child node.
        child_type: NodeType,
    },

    /// An expected mirror location or structural guarantee could not be
    /// resolved. Signals data corruption upstream (e.g. a stale migration).
    #[error("consistency error: {message}")]
    Consistency {
        /// What could not be resolved.
        message: String,
    },

    /// A field-level constraint violation caught at the engine boundary.
    #[error("validation failed: {field} - {reason}")]
    Validation {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Errors raised by the versioned document-migration pipeline.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The persisted document claims a version newer than this build knows.
    #[error("unknown document version: {version} (latest is {latest})")]
    UnknownVersion {
        /// Version found in the persisted document.
        version: u32,
        /// Latest version this build can produce.
        latest: u32,
    },

    /// The fully-migrated document failed validation against the current
    /// schema. Individual transformers prefer fallbacks over failure, but the
    /// pipeline as a whole fails fast here.
    #[error("migrated document does not match the current schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for migration operations.
pub type MigrationResult<T> = Result<T, MigrationError>;
