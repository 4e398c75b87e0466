//! Shared world and game-data interfaces for the goal planner.
//!
//! This crate holds the types the planner consumes from the outside: block
//! coordinates, item naming rules, the [`World`] query/action interface, the
//! [`GameData`] lookups, and an in-memory [`SandboxWorld`] implementation. It
//! contains no planning logic.

pub mod coord;
pub mod game_data;
pub mod item;
pub mod sandbox;
pub mod world;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use coord::BlockPos;
pub use game_data::{
    default_animal_sources, default_smelting_inputs, GameData, Ingredient, Recipe, StaticGameData,
};
pub use item::{
    is_air, is_generic_wood_label, qualifying_items, MATCHING_WOOD_BLOCKS, TOOL_KINDS,
    TOOL_TIERS, WOOD_TYPES, WOOL_COLORS,
};
pub use sandbox::{BlockEntry, SandboxAction, SandboxWorld, Scenario, ScenarioError};
pub use world::{ActionError, ActionResult, Inventory, World};
