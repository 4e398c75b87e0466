//! Sample game data and worlds for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // [dev-dependencies]
//! // crafting-world = { path = "../crafting-world", features = ["test-fixtures"] }
//!
//! use crafting_world::fixtures;
//!
//! let data = fixtures::sample_game_data();
//! let world = fixtures::starter_world();
//! ```

use crate::coord::BlockPos;
use crate::game_data::{Recipe, StaticGameData};
use crate::sandbox::SandboxWorld;

/// Where [`starter_world`] reports free space.
pub const BUILD_SITE: BlockPos = BlockPos::new(10, 64, 10);

/// A small survival tech tree.
///
/// Contains:
/// - wood: `oak_log` (mined), `oak_planks`, `stick`, `crafting_table`
/// - tools: wooden, stone and iron pickaxes
/// - stone age: `cobblestone` (from `stone`, needs a wooden pickaxe), `furnace`,
///   `stone` (smelted from cobblestone)
/// - iron: `raw_iron` (from `iron_ore`, needs a stone pickaxe), `coal`
///   (from `coal_ore`), `iron_ingot` (smelted)
/// - hunting: `raw_beef`/`leather` from cows, `wool` from sheep
/// - degenerate entries: a self-referencing `loop_a`, a two-step cycle
///   `loop_b` <-> `loop_c`, and a blacklisted `coal_block`
pub fn sample_game_data() -> StaticGameData {
    StaticGameData::default()
        .with_block_source("oak_log", "oak_log")
        .with_recipe("oak_planks", Recipe::new([("oak_log", 1)]).with_yield(4))
        .with_recipe("stick", Recipe::new([("oak_planks", 2)]).with_yield(4))
        .with_recipe("crafting_table", Recipe::new([("oak_planks", 4)]))
        .with_recipe(
            "wooden_pickaxe",
            Recipe::new([("oak_planks", 3), ("stick", 2)]),
        )
        .with_block_source("cobblestone", "stone")
        .with_block_tool("stone", "wooden_pickaxe")
        .with_smelting("stone", "cobblestone")
        .with_recipe(
            "stone_pickaxe",
            Recipe::new([("cobblestone", 3), ("stick", 2)]),
        )
        .with_recipe("furnace", Recipe::new([("cobblestone", 8)]))
        .with_block_source("raw_iron", "iron_ore")
        .with_block_tool("iron_ore", "stone_pickaxe")
        .with_block_source("coal", "coal_ore")
        .with_block_tool("coal_ore", "wooden_pickaxe")
        .with_recipe(
            "iron_pickaxe",
            Recipe::new([("iron_ingot", 3), ("stick", 2)]),
        )
        .with_recipe("loop_a", Recipe::new([("loop_a", 1)]))
        .with_recipe("loop_b", Recipe::new([("loop_c", 1)]))
        .with_recipe("loop_c", Recipe::new([("loop_b", 1)]))
        .with_recipe("coal_block", Recipe::new([("coal", 9)]))
        .with_recipe("iron_block", Recipe::new([("iron_ingot", 9)]))
        .with_recipe(
            "compressed_iron",
            Recipe::new([("iron_block", 1)]),
        )
}

/// A world next to trees, stone, ores and cows with a free build site.
pub fn starter_world() -> SandboxWorld {
    SandboxWorld::new(sample_game_data())
        .with_nearby_block("oak_log")
        .with_nearby_block("stone")
        .with_nearby_block("coal_ore")
        .with_nearby_block("iron_ore")
        .with_nearby_entity("cow")
        .with_nearby_entity("sheep")
        .with_build_site(BUILD_SITE)
}

/// An empty world with the sample data: nothing nearby, empty inventory.
pub fn barren_world() -> SandboxWorld {
    SandboxWorld::new(sample_game_data()).with_build_site(BUILD_SITE)
}
