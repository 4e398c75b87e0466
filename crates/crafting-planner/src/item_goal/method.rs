//! Method nodes: one concrete way to obtain an item.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MethodId, NodeId};

/// How an item is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Technique {
    /// Craft from the ingredient edges.
    Craft,
    /// Mine `block` from the world.
    Collect { block: String },
    /// Smelt `input` in the smelting station.
    Smelt { input: String },
    /// Kill `animal` for its drops.
    Hunt { animal: String },
}

/// Field-less mirror of [`Technique`] for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueKind {
    Craft,
    Collect,
    Smelt,
    Hunt,
}

impl Technique {
    pub fn kind(&self) -> TechniqueKind {
        match self {
            Technique::Craft => TechniqueKind::Craft,
            Technique::Collect { .. } => TechniqueKind::Collect,
            Technique::Smelt { .. } => TechniqueKind::Smelt,
            Technique::Hunt { .. } => TechniqueKind::Hunt,
        }
    }

    /// The block, input item or animal this technique draws from.
    pub fn source(&self) -> Option<&str> {
        match self {
            Technique::Craft => None,
            Technique::Collect { block } => Some(block.as_str()),
            Technique::Smelt { input } => Some(input.as_str()),
            Technique::Hunt { animal } => Some(animal.as_str()),
        }
    }
}

impl fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TechniqueKind::Craft => "craft",
            TechniqueKind::Collect => "collect",
            TechniqueKind::Smelt => "smelt",
            TechniqueKind::Hunt => "hunt",
        };
        f.write_str(name)
    }
}

/// A required quantity of another item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub node: NodeId,
    pub quantity: u32,
}

/// One technique for producing a batch of `item`.
///
/// Edges are fixed at construction. Only `fails` changes afterwards, and only
/// through execution attempts.
#[derive(Debug, Clone)]
pub struct MethodNode {
    pub item: String,
    pub technique: Technique,
    pub ingredients: Vec<Edge>,
    /// Tool or station needed once (quantity 1)
    pub prerequisite: Option<NodeId>,
    pub fails: u32,
}

impl MethodNode {
    pub fn new(
        item: impl Into<String>,
        technique: Technique,
        ingredients: Vec<Edge>,
        prerequisite: Option<NodeId>,
    ) -> Self {
        Self {
            item: item.into(),
            technique,
            ingredients,
            prerequisite,
            fails: 0,
        }
    }

    /// Ingredient edges in declaration order, then the prerequisite.
    pub fn children(&self) -> impl Iterator<Item = Edge> + '_ {
        self.ingredients.iter().copied().chain(
            self.prerequisite
                .map(|node| Edge { node, quantity: 1 }),
        )
    }
}

/// The next actionable method and the quantity it should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextStep {
    pub method: MethodId,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_order() {
        let method = MethodNode::new(
            "wooden_pickaxe",
            Technique::Craft,
            vec![
                Edge { node: NodeId(1), quantity: 3 },
                Edge { node: NodeId(2), quantity: 2 },
            ],
            Some(NodeId(3)),
        );
        let children: Vec<Edge> = method.children().collect();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].node, NodeId(1));
        assert_eq!(children[2], Edge { node: NodeId(3), quantity: 1 });
    }

    #[test]
    fn test_technique_source() {
        assert_eq!(Technique::Craft.source(), None);
        let collect = Technique::Collect { block: "stone".to_string() };
        assert_eq!(collect.source(), Some("stone"));
        assert_eq!(collect.kind(), TechniqueKind::Collect);
        assert_eq!(TechniqueKind::Hunt.to_string(), "hunt");
    }
}
