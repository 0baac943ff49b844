//! Unit tests for the relation ontology.
//!
//! Tests the closed node-type/relation-name sets, table lookup, the
//! composition and shortcut subsets, and the addable-relations query.

use super::*;

// ============================================================================
// NodeType tests
// ============================================================================

#[test]
fn test_node_type_as_str() {
    assert_eq!(NodeType::Problem.as_str(), "problem");
    assert_eq!(NodeType::SolutionComponent.as_str(), "solutionComponent");
    assert_eq!(NodeType::RootClaim.as_str(), "rootClaim");
    assert_eq!(NodeType::Source.as_str(), "source");
}

#[test]
fn test_node_type_from_str_round_trip() {
    for node_type in NodeType::ALL {
        assert_eq!(node_type.as_str().parse::<NodeType>().unwrap(), node_type);
    }
}

#[test]
fn test_node_type_from_str_invalid() {
    let result = "Problem".parse::<NodeType>();
    assert!(result.is_err());
    assert_eq!(result.unwrap_err(), "Unknown node type: Problem");
}

#[test]
fn test_node_type_serde_wire_format() {
    let json = serde_json::to_string(&NodeType::SolutionComponent).unwrap();
    assert_eq!(json, r#""solutionComponent""#);

    let parsed: NodeType = serde_json::from_str(r#""rootClaim""#).unwrap();
    assert_eq!(parsed, NodeType::RootClaim);
}

#[test]
fn test_node_type_is_claim_type() {
    assert!(NodeType::RootClaim.is_claim_type());
    assert!(NodeType::Support.is_claim_type());
    assert!(NodeType::Critique.is_claim_type());
    assert!(!NodeType::Problem.is_claim_type());
    assert!(!NodeType::Criterion.is_claim_type());
    assert!(!NodeType::Question.is_claim_type());
}

// ============================================================================
// RelationName tests
// ============================================================================

#[test]
fn test_relation_name_as_str() {
    assert_eq!(RelationName::CriterionFor.as_str(), "criterionFor");
    assert_eq!(RelationName::CreatedBy.as_str(), "createdBy");
    assert_eq!(RelationName::Solves.as_str(), "solves");
}

#[test]
fn test_relation_name_as_phrase() {
    assert_eq!(RelationName::CriterionFor.as_phrase(), "criterion for");
    assert_eq!(RelationName::AsksAbout.as_phrase(), "asks about");
    assert_eq!(RelationName::Causes.as_phrase(), "causes");
}

#[test]
fn test_relation_name_from_str_round_trip() {
    let names = [
        RelationName::Causes,
        RelationName::CriterionFor,
        RelationName::Addresses,
        RelationName::Solves,
        RelationName::CreatedBy,
        RelationName::Creates,
        RelationName::Has,
        RelationName::Embodies,
        RelationName::AsksAbout,
        RelationName::RelevantFor,
        RelationName::SourceOf,
        RelationName::Supports,
        RelationName::Critiques,
    ];
    for name in names {
        assert_eq!(name.as_str().parse::<RelationName>().unwrap(), name);
    }
}

#[test]
fn test_relation_name_serde_wire_format() {
    let json = serde_json::to_string(&RelationName::CriterionFor).unwrap();
    assert_eq!(json, r#""criterionFor""#);
}

// ============================================================================
// Table lookup tests
// ============================================================================

#[test]
fn test_lookup_relation_topic_pairs() {
    let relation = lookup_relation(NodeType::Problem, NodeType::Solution).unwrap();
    assert_eq!(relation.name, RelationName::Solves);

    let relation = lookup_relation(NodeType::Problem, NodeType::Criterion).unwrap();
    assert_eq!(relation.name, RelationName::CriterionFor);

    let relation = lookup_relation(NodeType::Criterion, NodeType::Solution).unwrap();
    assert_eq!(relation.name, RelationName::Embodies);

    let relation = lookup_relation(NodeType::Solution, NodeType::SolutionComponent).unwrap();
    assert_eq!(relation.name, RelationName::Has);
}

#[test]
fn test_lookup_relation_claim_pairs() {
    let relation = lookup_relation(NodeType::RootClaim, NodeType::Support).unwrap();
    assert_eq!(relation.name, RelationName::Supports);

    let relation = lookup_relation(NodeType::Critique, NodeType::Critique).unwrap();
    assert_eq!(relation.name, RelationName::Critiques);
}

#[test]
fn test_lookup_relation_research_pairs() {
    // every node type can be asked about
    for node_type in NodeType::ALL {
        let relation = lookup_relation(node_type, NodeType::Question).unwrap();
        assert_eq!(relation.name, RelationName::AsksAbout);
    }

    let relation = lookup_relation(NodeType::Solution, NodeType::Fact).unwrap();
    assert_eq!(relation.name, RelationName::RelevantFor);

    let relation = lookup_relation(NodeType::Fact, NodeType::Source).unwrap();
    assert_eq!(relation.name, RelationName::SourceOf);
}

#[test]
fn test_lookup_relation_illegal_pairs() {
    assert!(lookup_relation(NodeType::Support, NodeType::Problem).is_none());
    assert!(lookup_relation(NodeType::Solution, NodeType::Criterion).is_none());
    assert!(lookup_relation(NodeType::Source, NodeType::Fact).is_none());
    assert!(lookup_relation(NodeType::Source, NodeType::Source).is_none());
}

#[test]
fn test_lookup_relation_unique_per_pair() {
    // exactly one relation may exist per ordered type pair
    let mut seen = std::collections::HashSet::new();
    for parent in NodeType::ALL {
        for child in NodeType::ALL {
            if lookup_relation(parent, child).is_some() {
                assert!(seen.insert((parent, child)));
            }
        }
    }
}

// ============================================================================
// Composition and shortcut subset tests
// ============================================================================

#[test]
fn test_composed_relations() {
    let composed: Vec<_> = composed_relations().collect();
    assert_eq!(composed.len(), 1);
    assert_eq!(composed[0].parent, NodeType::Solution);
    assert_eq!(composed[0].child, NodeType::SolutionComponent);
    assert!(is_composition(composed[0]));
}

#[test]
fn test_is_composition() {
    let has = lookup_relation(NodeType::Solution, NodeType::SolutionComponent).unwrap();
    assert!(is_composition(&has));

    let solves = lookup_relation(NodeType::Problem, NodeType::Solution).unwrap();
    assert!(!is_composition(&solves));
}

#[test]
fn test_shortcuts_for_criterion() {
    let shortcuts = shortcuts_for(NodeType::Criterion);
    assert_eq!(shortcuts.len(), 3);
    for shortcut in &shortcuts {
        assert_eq!(shortcut.detour_node_type, NodeType::Criterion);
        assert_eq!(shortcut.relation.parent, NodeType::Problem);
    }
}

#[test]
fn test_shortcuts_for_non_detour_type() {
    assert!(shortcuts_for(NodeType::Problem).is_empty());
    assert!(shortcuts_for(NodeType::Solution).is_empty());
}

#[test]
fn test_shortcut_relations_resolve_in_table() {
    // every shortcut's distant relation must itself be a table entry
    for shortcut in shortcut_relations() {
        let resolved =
            lookup_relation(shortcut.relation.parent, shortcut.relation.child).unwrap();
        assert_eq!(resolved.name, shortcut.relation.name);
    }
}

// ============================================================================
// Addable relations tests
// ============================================================================

#[test]
fn test_addable_relations_from_problem_as_child() {
    let addable = addable_relations_from(NodeType::Problem, RelationDirection::Child);
    // children of a problem: problem, criterion, effect, solutionComponent,
    // solution, question, fact, source
    let types: Vec<_> = addable.iter().map(|a| a.to_node_type).collect();
    assert!(types.contains(&NodeType::Solution));
    assert!(types.contains(&NodeType::Criterion));
    assert!(types.contains(&NodeType::Question));
    assert!(!types.contains(&NodeType::Support));
}

#[test]
fn test_addable_relations_claim_types_cannot_add_parents() {
    assert!(addable_relations_from(NodeType::RootClaim, RelationDirection::Parent).is_empty());
    assert!(addable_relations_from(NodeType::Support, RelationDirection::Parent).is_empty());
    assert!(addable_relations_from(NodeType::Critique, RelationDirection::Parent).is_empty());
}

#[test]
fn test_addable_relations_from_support_as_child() {
    let addable = addable_relations_from(NodeType::Support, RelationDirection::Child);
    let names: Vec<_> = addable.iter().map(|a| a.relation.name).collect();
    assert!(names.contains(&RelationName::Supports));
    assert!(names.contains(&RelationName::Critiques));
}

#[test]
fn test_addable_relations_direction_sides() {
    let addable = addable_relations_from(NodeType::Solution, RelationDirection::Parent);
    // parents of a solution: problem (solves), criterion (embodies)
    for entry in &addable {
        assert_eq!(entry.relation.child, NodeType::Solution);
        assert_eq!(entry.to_node_type, entry.relation.parent);
    }
}
