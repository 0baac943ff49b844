//! Versioned document migration - brings older persisted documents up to the
//! current schema.
//!
//! A fixed ordered list of transformers, one per version increment, applied
//! sequentially from the document's version through the latest. Each
//! transformer only assumes the shape produced by its predecessor and runs
//! exactly once per version gap. Transformers work on raw JSON and prefer
//! structurally-valid fallbacks over halting the load; the pipeline as a
//! whole still fails fast if the final shape doesn't deserialize into the
//! current schema.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::engine::{TopicDocument, DOCUMENT_VERSION};
use crate::error::{MigrationError, MigrationResult};


/// Migrate a persisted document from `from_version` to the current schema.
/// Running on an already-latest document only revalidates it.
pub fn migrate(persisted: Value, from_version: u32) -> MigrationResult<TopicDocument> {
    if from_version > DOCUMENT_VERSION {
        return Err(MigrationError::UnknownVersion {
            version: from_version,
            latest: DOCUMENT_VERSION,
        });
    }

    // non-object input can't be transformed; let schema validation report it
    if !persisted.is_object() {
        return serde_json::from_value(persisted).map_err(MigrationError::from);
    }

    let migrations: [fn(Value) -> Value; DOCUMENT_VERSION as usize] = [
        migrate_0_to_1,
        migrate_1_to_2,
        migrate_2_to_3,
        migrate_3_to_4,
    ];

    let mut state = persisted;
    for version in from_version..DOCUMENT_VERSION {
        debug!(from = version, to = version + 1, "Applying migration");
        state = migrations[version as usize](state);
    }

    state["version"] = json!(DOCUMENT_VERSION);
    let document: TopicDocument = serde_json::from_value(state)?;
    Ok(document)
}

fn each_diagram(state: &mut Value, mut apply: impl FnMut(&str, &mut Value)) {
    if let Some(diagrams) = state.get_mut("diagrams").and_then(Value::as_object_mut) {
        for (diagram_id, diagram) in diagrams.iter_mut() {
            apply(diagram_id, diagram);
        }
    }
}

/// 0 -> 1: edges gain a relation label inferred from their endpoint node
/// types; diagrams trade their layout `direction` for a `type`.
///
/// The relation snapshot is the table as of version 0 (PascalCase node
/// types), not the current ontology - this transformer must keep producing
/// the same output forever. Unresolvable endpoints leave a `null` label,
/// cleaned up in 3 -> 4.
fn migrate_0_to_1(mut state: Value) -> Value {
    const RELATIONS: &[(&str, &str, &str)] = &[
        ("Problem", "Problem", "causes"),
        ("Problem", "Solution", "solves"),
        ("Solution", "Problem", "createdBy"),
        ("RootClaim", "Support", "supports"),
        ("RootClaim", "Critique", "critiques"),
        ("Support", "Support", "supports"),
        ("Support", "Critique", "critiques"),
        ("Critique", "Support", "supports"),
        ("Critique", "Critique", "critiques"),
    ];

    each_diagram(&mut state, |_, diagram| {
        let node_type_of = |diagram: &Value, node_id: &Value| -> Option<String> {
            diagram
                .get("nodes")?
                .as_array()?
                .iter()
                .find(|node| node.get("id") == Some(node_id))?
                .get("type")?
                .as_str()
                .map(str::to_string)
        };

        let labels: Vec<Value> = diagram
            .get("edges")
            .and_then(Value::as_array)
            .map(|edges| {
                edges
                    .iter()
                    .map(|edge| {
                        let source_type = edge
                            .get("source")
                            .and_then(|id| node_type_of(diagram, id));
                        let target_type = edge
                            .get("target")
                            .and_then(|id| node_type_of(diagram, id));
                        let relation = match (source_type, target_type) {
                            (Some(source), Some(target)) => RELATIONS
                                .iter()
                                .find(|(parent, child, _)| *parent == source && *child == target)
                                .map(|(_, _, name)| *name),
                            _ => None,
                        };
                        match relation {
                            Some(name) => json!(name),
                            None => {
                                warn!("Edge endpoints unresolvable, leaving null label");
                                Value::Null
                            }
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(edges) = diagram.get_mut("edges").and_then(Value::as_array_mut) {
            for (edge, label) in edges.iter_mut().zip(labels) {
                edge["label"] = label;
            }
        }

        let diagram_type = if diagram.get("direction") == Some(&json!("TB")) {
            "Problem"
        } else {
            "Claim"
        };
        diagram["type"] = json!(diagram_type);
        if let Some(diagram) = diagram.as_object_mut() {
            diagram.remove("direction");
        }
    });

    state
}

/// 1 -> 2: node types change case ("Problem" -> "problem",
/// "SolutionComponent" -> "solutionComponent").
fn migrate_1_to_2(mut state: Value) -> Value {
    each_diagram(&mut state, |_, diagram| {
        if let Some(nodes) = diagram.get_mut("nodes").and_then(Value::as_array_mut) {
            for node in nodes {
                if let Some(node_type) = node.get("type").and_then(Value::as_str) {
                    node["type"] = json!(lower_first(node_type));
                }
            }
        }
    });
    state
}

/// 2 -> 3: every node gains `showing: true`.
fn migrate_2_to_3(mut state: Value) -> Value {
    each_diagram(&mut state, |_, diagram| {
        if let Some(nodes) = diagram.get_mut("nodes").and_then(Value::as_array_mut) {
            for node in nodes {
                node["data"]["showing"] = json!(true);
            }
        }
    });
    state
}

/// 3 -> 4: the stored shape becomes the current schema.
///
/// - `activeDiagramId` splits into `activeClaimDiagramId` and
///   `activeTableProblemId`, both reset to null
/// - each diagram is stamped with its map key as `id`; diagram types map to
///   "topic"/"claim"
/// - node and edge `data` fields hoist to the top level; stored widths and
///   rendering fields are dropped
/// - edges left with a null label in 0 -> 1 are dropped entirely (their
///   endpoints were already unresolvable)
fn migrate_3_to_4(mut state: Value) -> Value {
    state["activeClaimDiagramId"] = Value::Null;
    state["activeTableProblemId"] = Value::Null;
    if let Some(state) = state.as_object_mut() {
        state.remove("activeDiagramId");
    }

    each_diagram(&mut state, |diagram_id, diagram| {
        diagram["id"] = json!(diagram_id);

        let diagram_type = match diagram.get("type").and_then(Value::as_str) {
            Some("Claim") => "claim",
            _ => "topic",
        };
        diagram["type"] = json!(diagram_type);

        if let Some(nodes) = diagram.get_mut("nodes").and_then(Value::as_array_mut) {
            for node in nodes.iter_mut() {
                let data = node
                    .as_object_mut()
                    .and_then(|node| node.remove("data"))
                    .unwrap_or_else(|| json!({}));
                node["diagramId"] = json!(diagram_id);
                node["label"] = data.get("label").cloned().unwrap_or_else(|| json!(""));
                node["notes"] = data.get("notes").cloned().unwrap_or_else(|| json!(""));
                node["score"] = data.get("score").cloned().unwrap_or_else(|| json!("-"));
                node["showing"] = data.get("showing").cloned().unwrap_or_else(|| json!(true));
                if let Some(argued) = data.get("arguedDiagramPartId") {
                    if !argued.is_null() {
                        node["arguedDiagramPartId"] = argued.clone();
                    }
                }
                if node.get("position").is_none() {
                    node["position"] = json!({ "x": 0.0, "y": 0.0 });
                }
                if let Some(node) = node.as_object_mut() {
                    // rendering leftovers; width is hardcoded now
                    node.remove("selected");
                    node.remove("dragging");
                }
            }
        }

        if let Some(edges) = diagram.get_mut("edges").and_then(Value::as_array_mut) {
            edges.retain(|edge| edge.get("label").is_some_and(|label| !label.is_null()));
            for edge in edges.iter_mut() {
                let data = edge
                    .as_object_mut()
                    .and_then(|edge| edge.remove("data"))
                    .unwrap_or_else(|| json!({}));
                edge["diagramId"] = json!(diagram_id);
                edge["notes"] = data.get("notes").cloned().unwrap_or_else(|| json!(""));
                edge["score"] = data.get("score").cloned().unwrap_or_else(|| json!("-"));
                if let Some(edge) = edge.as_object_mut() {
                    edge.remove("markerStart");
                    edge.remove("type");
                }
            }
        }
    });

    state
}

fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
