//! The game-world interface.
//!
//! The planner never talks to the game directly. Everything it needs to know
//! about the agent's surroundings, and every primitive it can ask the agent
//! to perform, goes through [`World`].
//!
//! Actions are long-running on the game side but are awaited one at a time:
//! a call returns once the agent has finished (or given up). The returned
//! [`ActionResult`] is advisory only. Callers decide whether an action worked
//! by re-reading the inventory afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::coord::BlockPos;
use crate::item::qualifying_items;

/// Item name -> held count.
pub type Inventory = BTreeMap<String, u32>;

/// Errors reported by world actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The execution layer interrupted the action before it finished.
    #[error("action interrupted")]
    Interrupted,
    /// A required item, block or entity was not available.
    #[error("{0} is not available")]
    Unavailable(String),
    /// Any other game-side failure (pathing, reach, timeouts).
    #[error("action failed: {0}")]
    Failed(String),
}

pub type ActionResult = Result<(), ActionError>;

/// Read queries and mutating primitives offered by the game layer.
pub trait World {
    /// Snapshot of the whole inventory.
    fn inventory(&self) -> Inventory;

    /// Held count of a single item.
    fn inventory_count(&self, item: &str) -> u32 {
        self.inventory().get(item).copied().unwrap_or(0)
    }

    /// True if the agent holds at least `quantity` of `item` or of an item
    /// that qualifies for it (see [`qualifying_items`]).
    fn item_satisfied(&self, item: &str, quantity: u32) -> bool {
        qualifying_items(item)
            .iter()
            .any(|name| self.inventory_count(name) >= quantity)
    }

    /// Block types visible within `radius` of the agent.
    fn nearby_block_types(&self, radius: u32) -> BTreeSet<String>;

    /// Entity types visible within `radius` of the agent.
    fn nearby_entity_types(&self, radius: u32) -> BTreeSet<String>;

    /// Name of the nearest block whose type is one of `types`.
    fn nearest_block_type(&self, types: &[String], radius: u32) -> Option<String>;

    /// Corner of the nearest free `size` x `size` footprint within `radius`.
    fn nearest_free_space(&self, size: u32, radius: u32) -> Option<BlockPos>;

    /// Block name at `pos` (`"air"` when empty).
    fn block_at(&self, pos: BlockPos) -> String;

    /// The agent's current (floored) position.
    fn agent_position(&self) -> BlockPos;

    /// False while a previous action is still outstanding.
    fn is_idle(&self) -> bool;

    /// Set by the execution layer to abort the current step.
    fn is_interrupted(&self) -> bool;

    fn craft(&mut self, item: &str, count: u32) -> ActionResult;

    fn collect(&mut self, block: &str, count: u32) -> ActionResult;

    /// Smelts `count` units of the input item `item`.
    fn smelt(&mut self, item: &str, count: u32) -> ActionResult;

    fn attack_nearest(&mut self, entity: &str) -> ActionResult;

    fn place_block(&mut self, block: &str, pos: BlockPos) -> ActionResult;

    fn break_block(&mut self, pos: BlockPos) -> ActionResult;

    /// Walks roughly `distance` blocks away from the current position.
    fn move_away(&mut self, distance: u32) -> ActionResult;

    /// Opens the door at `pos` and walks through it.
    fn use_door(&mut self, pos: BlockPos) -> ActionResult;
}
