//! Integration tests for the CLI binary: migrate and validate documents
//! through the real executable.

use std::fs;
use std::process::Command;

use serde_json::json;
use tempfile::tempdir;

use topic_graph_engine::TopicDocument;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_topic-graph-engine"))
}

#[test]
fn test_migrate_writes_a_current_schema_document() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("legacy.json");
    let output = dir.path().join("migrated.json");

    let legacy = json!({
        "diagrams": {
            "root": {
                "direction": "TB",
                "nodes": [
                    { "id": "0", "type": "Problem", "data": { "label": "p", "notes": "" } }
                ],
                "edges": []
            }
        },
        "activeDiagramId": "root",
        "nextNodeId": 1,
        "nextEdgeId": 0
    });
    fs::write(&input, legacy.to_string()).unwrap();

    let status = binary()
        .args(["migrate"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let migrated: TopicDocument =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(migrated.version, topic_graph_engine::DOCUMENT_VERSION);
    assert_eq!(migrated.diagrams.len(), 1);
}

#[test]
fn test_validate_accepts_a_fresh_document() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("current.json");
    let document = TopicDocument::new();
    fs::write(&input, serde_json::to_string(&document).unwrap()).unwrap();

    let status = binary().args(["validate"]).arg(&input).status().unwrap();
    assert!(status.success());
}

#[test]
fn test_validate_rejects_garbage() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("garbage.json");
    fs::write(&input, r#"{"diagrams": 5}"#).unwrap();

    let status = binary().args(["validate"]).arg(&input).status().unwrap();
    assert!(!status.success());
}

#[test]
fn test_layout_positions_visible_nodes() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("current.json");
    let output = dir.path().join("laid_out.json");
    let document = TopicDocument::new();
    fs::write(&input, serde_json::to_string(&document).unwrap()).unwrap();

    let status = binary()
        .args(["layout"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let laid_out: TopicDocument =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let topic = laid_out.diagrams.get("root").unwrap();
    // the single seeded problem is centered, top-left anchored
    assert!(topic.nodes[0].position.x < 0.0);
    assert!(topic.nodes[0].position.y < 0.0);
}
