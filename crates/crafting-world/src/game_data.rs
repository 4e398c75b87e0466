//! Game data lookups.
//!
//! [`GameData`] answers "how can this item be obtained?" in four ways: crafting
//! recipes, a block that drops it (plus the tool needed to harvest that
//! block), a smelting input, and an animal that drops it.
//!
//! [`StaticGameData`] is a table-backed implementation that can be built in
//! code or deserialized from JSON. Its smelting and animal tables default to
//! the standard survival-mode values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: String,
    pub count: u32,
}

/// A crafting recipe. Ingredient order is preserved as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub ingredients: Vec<Ingredient>,
    /// Items produced per craft
    #[serde(default = "default_yield")]
    pub yields: u32,
}

fn default_yield() -> u32 {
    1
}

impl Recipe {
    /// Creates a recipe from `(item, count)` pairs yielding one item per craft.
    pub fn new<'a>(ingredients: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        Self {
            ingredients: ingredients
                .into_iter()
                .map(|(item, count)| Ingredient {
                    item: item.to_string(),
                    count,
                })
                .collect(),
            yields: 1,
        }
    }

    pub fn with_yield(mut self, yields: u32) -> Self {
        self.yields = yields;
        self
    }

    /// Total number of ingredient items consumed by one craft.
    pub fn total_ingredients(&self) -> u32 {
        self.ingredients.iter().map(|i| i.count).sum()
    }
}

/// Source of truth for how items are obtained.
pub trait GameData {
    /// All crafting recipes producing `item` (empty if not craftable).
    fn crafting_recipes(&self, item: &str) -> Vec<Recipe>;

    /// The block that drops `item` when mined.
    fn block_source(&self, item: &str) -> Option<String>;

    /// The weakest tool able to harvest `block`, if one is required.
    fn block_tool(&self, block: &str) -> Option<String>;

    /// The item that smelts into `item`.
    fn smelting_input(&self, item: &str) -> Option<String>;

    /// The animal that drops `item`.
    fn animal_source(&self, item: &str) -> Option<String>;
}

/// Default smelting table: output -> input.
pub fn default_smelting_inputs() -> BTreeMap<String, String> {
    [
        ("baked_potato", "potato"),
        ("steak", "raw_beef"),
        ("cooked_chicken", "raw_chicken"),
        ("cooked_cod", "raw_cod"),
        ("cooked_mutton", "raw_mutton"),
        ("cooked_porkchop", "raw_porkchop"),
        ("cooked_rabbit", "raw_rabbit"),
        ("cooked_salmon", "raw_salmon"),
        ("dried_kelp", "kelp"),
        ("iron_ingot", "raw_iron"),
        ("gold_ingot", "raw_gold"),
        ("copper_ingot", "raw_copper"),
        ("glass", "sand"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Default animal drop table: item -> animal.
pub fn default_animal_sources() -> BTreeMap<String, String> {
    [
        ("raw_beef", "cow"),
        ("raw_chicken", "chicken"),
        ("raw_cod", "cod"),
        ("raw_mutton", "sheep"),
        ("raw_porkchop", "pig"),
        ("raw_rabbit", "rabbit"),
        ("raw_salmon", "salmon"),
        ("leather", "cow"),
        ("wool", "sheep"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Table-backed game data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticGameData {
    /// Crafting recipes keyed by output item
    #[serde(default)]
    pub recipes: BTreeMap<String, Vec<Recipe>>,
    /// Item -> block that drops it
    #[serde(default)]
    pub block_sources: BTreeMap<String, String>,
    /// Block -> weakest harvesting tool
    #[serde(default)]
    pub block_tools: BTreeMap<String, String>,
    /// Smelted output -> input
    #[serde(default = "default_smelting_inputs")]
    pub smelting_inputs: BTreeMap<String, String>,
    /// Item -> animal that drops it
    #[serde(default = "default_animal_sources")]
    pub animal_sources: BTreeMap<String, String>,
}

impl Default for StaticGameData {
    fn default() -> Self {
        Self {
            recipes: BTreeMap::new(),
            block_sources: BTreeMap::new(),
            block_tools: BTreeMap::new(),
            smelting_inputs: default_smelting_inputs(),
            animal_sources: default_animal_sources(),
        }
    }
}

impl StaticGameData {
    /// Creates an empty table with no smelting or animal entries.
    pub fn empty() -> Self {
        Self {
            smelting_inputs: BTreeMap::new(),
            animal_sources: BTreeMap::new(),
            ..Self::default()
        }
    }

    /// Parses a table from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_recipe(mut self, item: impl Into<String>, recipe: Recipe) -> Self {
        self.recipes.entry(item.into()).or_default().push(recipe);
        self
    }

    pub fn with_block_source(mut self, item: impl Into<String>, block: impl Into<String>) -> Self {
        self.block_sources.insert(item.into(), block.into());
        self
    }

    pub fn with_block_tool(mut self, block: impl Into<String>, tool: impl Into<String>) -> Self {
        self.block_tools.insert(block.into(), tool.into());
        self
    }

    pub fn with_smelting(mut self, output: impl Into<String>, input: impl Into<String>) -> Self {
        self.smelting_inputs.insert(output.into(), input.into());
        self
    }

    pub fn with_animal_source(mut self, item: impl Into<String>, animal: impl Into<String>) -> Self {
        self.animal_sources.insert(item.into(), animal.into());
        self
    }

    /// Items dropped when `block` is mined. A block with no table entry drops itself.
    pub fn block_drops(&self, block: &str) -> Vec<String> {
        let drops: Vec<String> = self
            .block_sources
            .iter()
            .filter(|(_, source)| source.as_str() == block)
            .map(|(item, _)| item.clone())
            .collect();
        if drops.is_empty() {
            vec![block.to_string()]
        } else {
            drops
        }
    }

    /// The item produced by smelting `input`.
    pub fn smelting_output(&self, input: &str) -> Option<String> {
        self.smelting_inputs
            .iter()
            .find(|(_, i)| i.as_str() == input)
            .map(|(output, _)| output.clone())
    }

    /// Items dropped by killing `animal`.
    pub fn animal_drops(&self, animal: &str) -> Vec<String> {
        self.animal_sources
            .iter()
            .filter(|(_, a)| a.as_str() == animal)
            .map(|(item, _)| item.clone())
            .collect()
    }
}

impl GameData for StaticGameData {
    fn crafting_recipes(&self, item: &str) -> Vec<Recipe> {
        self.recipes.get(item).cloned().unwrap_or_default()
    }

    fn block_source(&self, item: &str) -> Option<String> {
        self.block_sources.get(item).cloned()
    }

    fn block_tool(&self, block: &str) -> Option<String> {
        self.block_tools.get(block).cloned()
    }

    fn smelting_input(&self, item: &str) -> Option<String> {
        self.smelting_inputs.get(item).cloned()
    }

    fn animal_source(&self, item: &str) -> Option<String> {
        self.animal_sources.get(item).cloned()
    }
}
