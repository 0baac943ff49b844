//! Relation ontology - the static table of legal (parent type, child type)
//! node pairings and the relation name each pair carries.
//!
//! The table is the single source of truth for which edges may exist: the
//! deriver, the connect command, and the migration pipeline all resolve
//! relations through [`lookup_relation`]. Adding a node or relation type is a
//! data-only change here; no call site branches on specific types.
//!
//! Two subsets of the table drive implied-edge derivation:
//! - **composition** relations ([`is_composition`]) mark that a child node is
//!   "part of" its parent (a solution *has* solution components), so edges
//!   added to the parent propagate to its components;
//! - **shortcut** relations ([`shortcut_relations`]) mark that a node type
//!   sitting between two others can be skipped by a direct edge (a criterion
//!   detours between a problem and the solutions that embody it).

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "ontology_tests.rs"]
mod ontology_tests;

/// Node types, closed set.
///
/// This order is generally used for sorting, e.g. the order in which add-node
/// options are offered and the order node types group within a layout rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    /// Something standing in the way of a goal.
    Problem,
    /// A measure by which solutions to a problem are judged.
    Criterion,
    /// A consequence created by a solution or one of its components.
    Effect,
    /// A part of a solution that can be reasoned about separately.
    SolutionComponent,
    /// A proposed way of addressing a problem.
    Solution,
    /// The root of a claim diagram, arguing about one topic graph part.
    RootClaim,
    /// An argument in favor of its parent claim.
    Support,
    /// An argument against its parent claim.
    Critique,
    /// An open question about a graph part.
    Question,
    /// A piece of information relevant to a graph part.
    Fact,
    /// Where a fact or statement comes from.
    Source,
}

impl NodeType {
    /// All node types, in sort order.
    pub const ALL: [NodeType; 11] = [
        NodeType::Problem,
        NodeType::Criterion,
        NodeType::Effect,
        NodeType::SolutionComponent,
        NodeType::Solution,
        NodeType::RootClaim,
        NodeType::Support,
        NodeType::Critique,
        NodeType::Question,
        NodeType::Fact,
        NodeType::Source,
    ];

    /// Get the node type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Problem => "problem",
            NodeType::Criterion => "criterion",
            NodeType::Effect => "effect",
            NodeType::SolutionComponent => "solutionComponent",
            NodeType::Solution => "solution",
            NodeType::RootClaim => "rootClaim",
            NodeType::Support => "support",
            NodeType::Critique => "critique",
            NodeType::Question => "question",
            NodeType::Fact => "fact",
            NodeType::Source => "source",
        }
    }

    /// Whether this type lives in claim diagrams (root claims, supports,
    /// critiques). Claim diagrams are trees, so claim nodes cannot add
    /// parents.
    pub fn is_claim_type(&self) -> bool {
        matches!(
            self,
            NodeType::RootClaim | NodeType::Support | NodeType::Critique
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "problem" => Ok(NodeType::Problem),
            "criterion" => Ok(NodeType::Criterion),
            "effect" => Ok(NodeType::Effect),
            "solutionComponent" => Ok(NodeType::SolutionComponent),
            "solution" => Ok(NodeType::Solution),
            "rootClaim" => Ok(NodeType::RootClaim),
            "support" => Ok(NodeType::Support),
            "critique" => Ok(NodeType::Critique),
            "question" => Ok(NodeType::Question),
            "fact" => Ok(NodeType::Fact),
            "source" => Ok(NodeType::Source),
            _ => Err(format!("Unknown node type: {}", s)),
        }
    }
}

/// Relation names, closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationName {
    /// A problem causes another problem.
    Causes,
    /// A criterion is a criterion for judging a problem's solutions.
    CriterionFor,
    /// An effect or solution component addresses a problem.
    Addresses,
    /// A solution solves a problem.
    Solves,
    /// A problem is created by a solution.
    CreatedBy,
    /// A solution or component creates an effect.
    Creates,
    /// A solution has a component.
    Has,
    /// A solution, component, or effect embodies a criterion.
    Embodies,
    /// A question asks about a graph part.
    AsksAbout,
    /// A fact or source is relevant for a graph part.
    RelevantFor,
    /// A source is the source of a fact.
    SourceOf,
    /// A support argues for its parent claim.
    Supports,
    /// A critique argues against its parent claim.
    Critiques,
}

impl RelationName {
    /// Get the relation name as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationName::Causes => "causes",
            RelationName::CriterionFor => "criterionFor",
            RelationName::Addresses => "addresses",
            RelationName::Solves => "solves",
            RelationName::CreatedBy => "createdBy",
            RelationName::Creates => "creates",
            RelationName::Has => "has",
            RelationName::Embodies => "embodies",
            RelationName::AsksAbout => "asksAbout",
            RelationName::RelevantFor => "relevantFor",
            RelationName::SourceOf => "sourceOf",
            RelationName::Supports => "supports",
            RelationName::Critiques => "critiques",
        }
    }

    /// Human-readable phrasing, used when generating implicit claim labels
    /// ("criterionFor" reads as "criterion for").
    pub fn as_phrase(&self) -> &'static str {
        match self {
            RelationName::Causes => "causes",
            RelationName::CriterionFor => "criterion for",
            RelationName::Addresses => "addresses",
            RelationName::Solves => "solves",
            RelationName::CreatedBy => "created by",
            RelationName::Creates => "creates",
            RelationName::Has => "has",
            RelationName::Embodies => "embodies",
            RelationName::AsksAbout => "asks about",
            RelationName::RelevantFor => "relevant for",
            RelationName::SourceOf => "source of",
            RelationName::Supports => "supports",
            RelationName::Critiques => "critiques",
        }
    }
}

impl std::fmt::Display for RelationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RelationName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "causes" => Ok(RelationName::Causes),
            "criterionFor" => Ok(RelationName::CriterionFor),
            "addresses" => Ok(RelationName::Addresses),
            "solves" => Ok(RelationName::Solves),
            "createdBy" => Ok(RelationName::CreatedBy),
            "creates" => Ok(RelationName::Creates),
            "has" => Ok(RelationName::Has),
            "embodies" => Ok(RelationName::Embodies),
            "asksAbout" => Ok(RelationName::AsksAbout),
            "relevantFor" => Ok(RelationName::RelevantFor),
            "sourceOf" => Ok(RelationName::SourceOf),
            "supports" => Ok(RelationName::Supports),
            "critiques" => Ok(RelationName::Critiques),
            _ => Err(format!("Unknown relation name: {}", s)),
        }
    }
}

/// Which side of a relation a node plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationDirection {
    /// The source side of an edge.
    Parent,
    /// The target side of an edge.
    Child,
}

/// One legal (parent type, child type) pairing and the relation name the
/// resulting edge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Type of the parent-side node.
    pub parent: NodeType,
    /// Type of the child-side node.
    pub child: NodeType,
    /// Name carried by edges of this relation.
    pub name: RelationName,
}

const fn relation(parent: NodeType, child: NodeType, name: RelationName) -> Relation {
    Relation {
        parent,
        child,
        name,
    }
}

// Assumes edges always point from child up to parent; the parent side is the
// edge source.
static RELATIONS: LazyLock<Vec<Relation>> = LazyLock::new(|| {
    use NodeType::*;
    use RelationName::*;

    let mut relations = vec![
        // topic
        relation(Problem, Problem, Causes),
        relation(Problem, Criterion, CriterionFor),
        relation(Problem, Effect, Addresses),
        relation(Problem, SolutionComponent, Addresses),
        relation(Problem, Solution, Solves),
        relation(Solution, Problem, CreatedBy),
        relation(Criterion, Effect, Embodies),
        relation(Criterion, SolutionComponent, Embodies),
        relation(Criterion, Solution, Embodies),
        relation(Solution, SolutionComponent, Has),
        relation(Solution, Effect, Creates),
        relation(SolutionComponent, Effect, Creates),
        // claim
        relation(RootClaim, Support, Supports),
        relation(RootClaim, Critique, Critiques),
        relation(Support, Support, Supports),
        relation(Support, Critique, Critiques),
        relation(Critique, Support, Supports),
        relation(Critique, Critique, Critiques),
    ];

    // research relations apply to every part of the map, so they are
    // generated rather than enumerated
    for node_type in NodeType::ALL {
        relations.push(relation(node_type, Question, AsksAbout));
    }
    for node_type in NodeType::ALL {
        if matches!(node_type, Fact | Source) {
            continue;
        }
        relations.push(relation(node_type, Fact, RelevantFor));
        relations.push(relation(node_type, Source, RelevantFor));
    }
    relations.push(relation(Fact, Source, SourceOf));

    relations
});

/// A rule stating that `detour_node_type` sitting directly between two nodes
/// that would satisfy `relation` one hop further can be skipped by a direct
/// edge duplicating `relation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutRelation {
    /// The node type that can be detoured around.
    pub detour_node_type: NodeType,
    /// The more distant relation the shortcut edge duplicates.
    pub relation: Relation,
}

// Criteria detour between problems and the things that embody them: a
// "problem - criterion - solution" chain also gets a direct
// "problem - solution" edge so the distant relationship is queryable.
static SHORTCUT_RELATIONS: LazyLock<Vec<ShortcutRelation>> = LazyLock::new(|| {
    use NodeType::*;
    use RelationName::*;

    vec![
        ShortcutRelation {
            detour_node_type: Criterion,
            relation: relation(Problem, Solution, Solves),
        },
        ShortcutRelation {
            detour_node_type: Criterion,
            relation: relation(Problem, SolutionComponent, Addresses),
        },
        ShortcutRelation {
            detour_node_type: Criterion,
            relation: relation(Problem, Effect, Addresses),
        },
    ]
});

/// Look up the single relation legal between an ordered node-type pair.
/// Returns `None` when the pair has no ontology entry.
pub fn lookup_relation(parent_type: NodeType, child_type: NodeType) -> Option<Relation> {
    RELATIONS
        .iter()
        .find(|relation| relation.parent == parent_type && relation.child == child_type)
        .copied()
}

/// Whether a relation marks its child as a part of its parent.
pub fn is_composition(relation: &Relation) -> bool {
    relation.name == RelationName::Has
}

/// The composition subset of the relation table.
pub fn composed_relations() -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(|relation| is_composition(relation))
}

/// All shortcut rules.
pub fn shortcut_relations() -> &'static [ShortcutRelation] {
    &SHORTCUT_RELATIONS
}

/// Shortcut rules whose detour type matches the given node type.
pub fn shortcuts_for(node_type: NodeType) -> Vec<&'static ShortcutRelation> {
    SHORTCUT_RELATIONS
        .iter()
        .filter(|shortcut| shortcut.detour_node_type == node_type)
        .collect()
}

/// A relation offered by the add-node menu: the node type to create and the
/// relation connecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddableRelation {
    /// Type of the node that would be created.
    pub to_node_type: NodeType,
    /// Relation that would connect it.
    pub relation: Relation,
}

/// Relations addable from a node of the given type in the given direction.
/// Claim diagrams are trees, so claim node types cannot add parents.
pub fn addable_relations_from(
    node_type: NodeType,
    adding_as: RelationDirection,
) -> Vec<AddableRelation> {
    if node_type.is_claim_type() && adding_as == RelationDirection::Parent {
        return vec![];
    }

    RELATIONS
        .iter()
        .filter(|relation| {
            let from_side = match adding_as {
                RelationDirection::Parent => relation.child,
                RelationDirection::Child => relation.parent,
            };
            from_side == node_type
        })
        .map(|relation| AddableRelation {
            to_node_type: match adding_as {
                RelationDirection::Parent => relation.parent,
                RelationDirection::Child => relation.child,
            },
            relation: *relation,
        })
        .collect()
}
