//! Item Goal Graph
//!
//! An AND/OR graph of the ways to obtain items. Item goal nodes are the OR
//! side (any one method suffices); method nodes are the AND side (every
//! ingredient plus the optional tool or station prerequisite).

pub mod graph;
pub mod method;

pub use graph::{Discovery, Execution, ItemGoalNode, ItemGraph};
pub use method::{Edge, MethodNode, NextStep, Technique, TechniqueKind};

/// Index of an [`ItemGoalNode`] in its [`ItemGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Index of a [`MethodNode`] in its [`ItemGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub(crate) usize);
