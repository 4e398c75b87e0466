//! Goal-directed item acquisition and blueprint construction.
//!
//! Public API for the planner. Given an item or a blueprint name, the
//! [`GoalController`] works out the next concrete action (craft, collect,
//! smelt, hunt, place or break) and runs it against a
//! [`World`](crafting_world::World), one step per tick.

pub mod acquisition;
pub mod blocks;
pub mod blueprint;
pub mod config;
pub mod construction;
pub mod controller;
pub mod events;
pub mod item_goal;

pub use acquisition::{AcquisitionPlanner, AdvanceOutcome, DeferStrategy, ItemRequest};
pub use blocks::{block_satisfied, resolve_variant};
pub use blueprint::{rotate_xz, Blueprint, BlueprintError, BlueprintLibrary, Orientation};
pub use config::{ConfigError, PlannerConfig};
pub use construction::{
    BuildExecutor, BuildReport, ConstructionError, ConstructionGoal, ConstructionState,
    PlacedInstance, Placement,
};
pub use controller::{ActiveGoal, GoalController, TickOutcome};
pub use events::{EventKind, EventLogger, PendingEvents, PlannerEvent};
pub use item_goal::{ItemGraph, MethodId, NodeId, Technique, TechniqueKind};
