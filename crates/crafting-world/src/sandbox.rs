//! In-memory sandbox world.
//!
//! [`SandboxWorld`] implements [`World`] on top of a [`StaticGameData`] table so
//! planning runs can happen offline: the CLI drives it from a scenario file and
//! the test suites drive it directly.
//!
//! The rules are deliberately small:
//! - nearby block and entity types are inexhaustible sources
//! - crafting consumes exact ingredient names and needs a crafting table once
//!   a recipe uses more than four items
//! - smelting needs a furnace and one unit of fuel per eight items
//! - placed and broken blocks are tracked per position, everything else is air
//!
//! Every action is recorded in [`SandboxWorld::actions`] for assertions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::coord::BlockPos;
use crate::game_data::{GameData, StaticGameData};
use crate::item::is_air;
use crate::world::{ActionError, ActionResult, Inventory, World};

/// Recipes using more ingredients than this need a crafting table.
const HAND_CRAFTING_CAPACITY: u32 = 4;

/// Items smelted per unit of fuel.
const ITEMS_PER_FUEL: u32 = 8;

const FUELS: &[&str] = &["coal", "charcoal"];

/// A recorded sandbox action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SandboxAction {
    Craft { item: String, count: u32 },
    Collect { block: String, count: u32 },
    Smelt { item: String, count: u32 },
    Attack { entity: String },
    Place { block: String, pos: BlockPos },
    Break { pos: BlockPos },
    MoveAway { distance: u32 },
    UseDoor { pos: BlockPos },
}

/// A block set in the world at scenario load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    pub pos: BlockPos,
    pub block: String,
}

/// Serialized starting state for a sandbox run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub game_data: StaticGameData,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub nearby_blocks: Vec<String>,
    #[serde(default)]
    pub nearby_entities: Vec<String>,
    /// Block types that only become visible after the agent wanders
    #[serde(default)]
    pub hidden_blocks: Vec<String>,
    /// Entity types that only become visible after the agent wanders
    #[serde(default)]
    pub hidden_entities: Vec<String>,
    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
    #[serde(default)]
    pub position: BlockPos,
    /// Corner returned by every free-space search
    #[serde(default)]
    pub build_site: Option<BlockPos>,
}

/// Errors loading a scenario file.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario: {0}")]
    Json(#[from] serde_json::Error),
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Table-driven in-memory world.
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    pub game_data: StaticGameData,
    pub inventory: Inventory,
    pub nearby_blocks: BTreeSet<String>,
    pub nearby_entities: BTreeSet<String>,
    pub hidden_blocks: BTreeSet<String>,
    pub hidden_entities: BTreeSet<String>,
    pub blocks: BTreeMap<BlockPos, String>,
    pub position: BlockPos,
    pub build_site: Option<BlockPos>,
    /// While true the agent reports itself as busy
    pub busy: bool,
    pub interrupted: bool,
    /// Names whose craft/collect/smelt/attack silently produce nothing
    pub stalled: BTreeSet<String>,
    pub actions: Vec<SandboxAction>,
}

impl SandboxWorld {
    pub fn new(game_data: StaticGameData) -> Self {
        Self {
            game_data,
            inventory: Inventory::new(),
            nearby_blocks: BTreeSet::new(),
            nearby_entities: BTreeSet::new(),
            hidden_blocks: BTreeSet::new(),
            hidden_entities: BTreeSet::new(),
            blocks: BTreeMap::new(),
            position: BlockPos::default(),
            build_site: None,
            busy: false,
            interrupted: false,
            stalled: BTreeSet::new(),
            actions: Vec::new(),
        }
    }

    pub fn from_scenario(scenario: Scenario) -> Self {
        let mut world = Self::new(scenario.game_data);
        world.inventory = scenario.inventory;
        world.nearby_blocks = scenario.nearby_blocks.into_iter().collect();
        world.nearby_entities = scenario.nearby_entities.into_iter().collect();
        world.hidden_blocks = scenario.hidden_blocks.into_iter().collect();
        world.hidden_entities = scenario.hidden_entities.into_iter().collect();
        world.blocks = scenario
            .blocks
            .into_iter()
            .map(|entry| (entry.pos, entry.block))
            .collect();
        world.position = scenario.position;
        world.build_site = scenario.build_site;
        world
    }

    pub fn with_item(mut self, item: impl Into<String>, count: u32) -> Self {
        self.inventory.insert(item.into(), count);
        self
    }

    pub fn with_nearby_block(mut self, block: impl Into<String>) -> Self {
        self.nearby_blocks.insert(block.into());
        self
    }

    pub fn with_nearby_entity(mut self, entity: impl Into<String>) -> Self {
        self.nearby_entities.insert(entity.into());
        self
    }

    pub fn with_hidden_block(mut self, block: impl Into<String>) -> Self {
        self.hidden_blocks.insert(block.into());
        self
    }

    pub fn with_block(mut self, pos: BlockPos, block: impl Into<String>) -> Self {
        self.blocks.insert(pos, block.into());
        self
    }

    pub fn with_build_site(mut self, pos: BlockPos) -> Self {
        self.build_site = Some(pos);
        self
    }

    pub fn with_position(mut self, pos: BlockPos) -> Self {
        self.position = pos;
        self
    }

    /// Makes every action targeting `name` succeed without producing anything.
    pub fn stall(mut self, name: impl Into<String>) -> Self {
        self.stalled.insert(name.into());
        self
    }

    pub fn set_count(&mut self, item: &str, count: u32) {
        if count == 0 {
            self.inventory.remove(item);
        } else {
            self.inventory.insert(item.to_string(), count);
        }
    }

    fn add_item(&mut self, item: &str, count: u32) {
        *self.inventory.entry(item.to_string()).or_insert(0) += count;
    }

    fn take_item(&mut self, item: &str, count: u32) -> bool {
        let held = self.inventory.get(item).copied().unwrap_or(0);
        if held < count {
            return false;
        }
        self.set_count(item, held - count);
        true
    }

    /// Number of recorded actions matching `predicate`.
    pub fn count_actions(&self, predicate: impl Fn(&SandboxAction) -> bool) -> usize {
        self.actions.iter().filter(|a| predicate(a)).count()
    }

    /// Number of recorded block placements.
    pub fn placements(&self) -> usize {
        self.count_actions(|a| matches!(a, SandboxAction::Place { .. }))
    }

    /// Number of recorded block breaks.
    pub fn breaks(&self) -> usize {
        self.count_actions(|a| matches!(a, SandboxAction::Break { .. }))
    }

    fn craft_once(&mut self, item: &str) -> bool {
        let has_table = self.inventory_count("crafting_table") > 0;
        let recipe = self.game_data.crafting_recipes(item).into_iter().find(|recipe| {
            (recipe.total_ingredients() <= HAND_CRAFTING_CAPACITY || has_table)
                && recipe
                    .ingredients
                    .iter()
                    .all(|i| self.inventory_count(&i.item) >= i.count)
        });
        let Some(recipe) = recipe else {
            return false;
        };
        for ingredient in &recipe.ingredients {
            self.take_item(&ingredient.item, ingredient.count);
        }
        self.add_item(item, recipe.yields);
        true
    }
}

impl World for SandboxWorld {
    fn inventory(&self) -> Inventory {
        self.inventory.clone()
    }

    fn inventory_count(&self, item: &str) -> u32 {
        self.inventory.get(item).copied().unwrap_or(0)
    }

    fn nearby_block_types(&self, _radius: u32) -> BTreeSet<String> {
        let mut types = self.nearby_blocks.clone();
        types.extend(self.blocks.values().filter(|b| !is_air(b)).cloned());
        types
    }

    fn nearby_entity_types(&self, _radius: u32) -> BTreeSet<String> {
        self.nearby_entities.clone()
    }

    fn nearest_block_type(&self, types: &[String], radius: u32) -> Option<String> {
        let limit = (radius as i64) * (radius as i64);
        let placed = self
            .blocks
            .iter()
            .filter(|(pos, block)| {
                types.contains(block) && pos.distance_squared(&self.position) <= limit
            })
            .min_by_key(|(pos, _)| pos.distance_squared(&self.position))
            .map(|(_, block)| block.clone());
        placed.or_else(|| types.iter().find(|t| self.nearby_blocks.contains(*t)).cloned())
    }

    fn nearest_free_space(&self, _size: u32, _radius: u32) -> Option<BlockPos> {
        self.build_site
    }

    fn block_at(&self, pos: BlockPos) -> String {
        self.blocks.get(&pos).cloned().unwrap_or_else(|| "air".to_string())
    }

    fn agent_position(&self) -> BlockPos {
        self.position
    }

    fn is_idle(&self) -> bool {
        !self.busy
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    fn craft(&mut self, item: &str, count: u32) -> ActionResult {
        self.actions.push(SandboxAction::Craft {
            item: item.to_string(),
            count,
        });
        if self.interrupted {
            return Err(ActionError::Interrupted);
        }
        if self.stalled.contains(item) {
            return Ok(());
        }
        let mut crafted = 0;
        while crafted < count && self.craft_once(item) {
            crafted += 1;
        }
        if crafted == 0 {
            return Err(ActionError::Unavailable(format!("ingredients for {}", item)));
        }
        Ok(())
    }

    fn collect(&mut self, block: &str, count: u32) -> ActionResult {
        self.actions.push(SandboxAction::Collect {
            block: block.to_string(),
            count,
        });
        if self.interrupted {
            return Err(ActionError::Interrupted);
        }
        if !self.nearby_block_types(0).contains(block) {
            return Err(ActionError::Unavailable(block.to_string()));
        }
        if let Some(tool) = self.game_data.block_tool(block) {
            if !self.item_satisfied(&tool, 1) {
                return Err(ActionError::Failed(format!("{} requires {}", block, tool)));
            }
        }
        if self.stalled.contains(block) {
            return Ok(());
        }
        for drop in self.game_data.block_drops(block) {
            self.add_item(&drop, count);
        }
        Ok(())
    }

    fn smelt(&mut self, item: &str, count: u32) -> ActionResult {
        self.actions.push(SandboxAction::Smelt {
            item: item.to_string(),
            count,
        });
        if self.interrupted {
            return Err(ActionError::Interrupted);
        }
        if self.inventory_count("furnace") == 0 {
            return Err(ActionError::Unavailable("furnace".to_string()));
        }
        let Some(output) = self.game_data.smelting_output(item) else {
            return Err(ActionError::Failed(format!("{} cannot be smelted", item)));
        };
        if self.stalled.contains(item) {
            return Ok(());
        }
        let batch = count.min(self.inventory_count(item));
        if batch == 0 {
            return Err(ActionError::Unavailable(item.to_string()));
        }
        let fuel_needed = batch.div_ceil(ITEMS_PER_FUEL);
        let Some(fuel) = FUELS
            .iter()
            .find(|f| self.inventory_count(f) >= fuel_needed)
            .copied()
        else {
            return Err(ActionError::Unavailable("fuel".to_string()));
        };
        self.take_item(fuel, fuel_needed);
        self.take_item(item, batch);
        self.add_item(&output, batch);
        Ok(())
    }

    fn attack_nearest(&mut self, entity: &str) -> ActionResult {
        self.actions.push(SandboxAction::Attack {
            entity: entity.to_string(),
        });
        if self.interrupted {
            return Err(ActionError::Interrupted);
        }
        if !self.nearby_entities.contains(entity) {
            return Err(ActionError::Unavailable(entity.to_string()));
        }
        if self.stalled.contains(entity) {
            return Ok(());
        }
        for drop in self.game_data.animal_drops(entity) {
            self.add_item(&drop, 1);
        }
        Ok(())
    }

    fn place_block(&mut self, block: &str, pos: BlockPos) -> ActionResult {
        self.actions.push(SandboxAction::Place {
            block: block.to_string(),
            pos,
        });
        if self.interrupted {
            return Err(ActionError::Interrupted);
        }
        if !self.take_item(block, 1) {
            return Err(ActionError::Unavailable(block.to_string()));
        }
        self.blocks.insert(pos, block.to_string());
        Ok(())
    }

    fn break_block(&mut self, pos: BlockPos) -> ActionResult {
        self.actions.push(SandboxAction::Break { pos });
        if self.interrupted {
            return Err(ActionError::Interrupted);
        }
        if let Some(block) = self.blocks.remove(&pos) {
            if !is_air(&block) {
                self.add_item(&block, 1);
            }
        }
        Ok(())
    }

    fn move_away(&mut self, distance: u32) -> ActionResult {
        self.actions.push(SandboxAction::MoveAway { distance });
        if self.interrupted {
            return Err(ActionError::Interrupted);
        }
        self.position = self.position.offset(distance as i32, 0, 0);
        let revealed_blocks = std::mem::take(&mut self.hidden_blocks);
        self.nearby_blocks.extend(revealed_blocks);
        let revealed_entities = std::mem::take(&mut self.hidden_entities);
        self.nearby_entities.extend(revealed_entities);
        Ok(())
    }

    fn use_door(&mut self, pos: BlockPos) -> ActionResult {
        self.actions.push(SandboxAction::UseDoor { pos });
        if self.interrupted {
            return Err(ActionError::Interrupted);
        }
        self.position = pos;
        Ok(())
    }
}
