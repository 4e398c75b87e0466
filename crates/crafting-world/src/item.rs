//! Item name conventions.
//!
//! Item and block names are opaque strings owned by the game data, but a few
//! naming families carry meaning for planning: tool tiers (a better tool
//! satisfies a request for a worse one), wood variants and wool colours.

/// Name fragments that mark an item as a tier-ranked tool.
pub const TOOL_KINDS: &[&str] = &["pickaxe", "axe", "shovel", "hoe", "sword"];

/// Tool materials from weakest to strongest.
pub const TOOL_TIERS: &[&str] = &["wooden", "stone", "iron", "gold", "diamond"];

/// Wood types a generic wooden block label can resolve to.
pub const WOOD_TYPES: &[&str] = &["oak", "spruce", "birch", "jungle", "acacia", "dark_oak"];

/// Block labels that exist in one variant per wood type (`oak_planks`, `birch_door`, ...).
pub const MATCHING_WOOD_BLOCKS: &[&str] = &[
    "log",
    "planks",
    "sign",
    "boat",
    "fence_gate",
    "door",
    "fence",
    "slab",
    "stairs",
    "button",
    "pressure_plate",
    "trapdoor",
];

/// Wool colours a generic `bed` label can resolve to.
pub const WOOL_COLORS: &[&str] = &[
    "white",
    "orange",
    "magenta",
    "light_blue",
    "yellow",
    "lime",
    "pink",
    "gray",
    "light_gray",
    "cyan",
    "purple",
    "blue",
    "brown",
    "green",
    "red",
    "black",
];

/// Returns every item name that satisfies a request for `item`.
///
/// The requested name always qualifies. For tier-ranked tools
/// (`<material>_<kind>`) every stronger material of the same kind qualifies
/// too, so an `iron_pickaxe` satisfies a `wooden_pickaxe` requirement.
pub fn qualifying_items(item: &str) -> Vec<String> {
    let mut qualifying = vec![item.to_string()];
    if !TOOL_KINDS.iter().any(|kind| item.contains(kind)) {
        return qualifying;
    }

    let mut parts = item.split('_');
    let (Some(material), Some(kind)) = (parts.next(), parts.next()) else {
        return qualifying;
    };

    if let Some(tier) = TOOL_TIERS.iter().position(|t| *t == material) {
        for stronger in &TOOL_TIERS[tier + 1..] {
            qualifying.push(format!("{}_{}", stronger, kind));
        }
    }
    qualifying
}

/// True if `label` is one of the wood-family generic labels.
pub fn is_generic_wood_label(label: &str) -> bool {
    MATCHING_WOOD_BLOCKS.contains(&label)
}

/// True for the air block variants.
pub fn is_air(block: &str) -> bool {
    matches!(block, "air" | "cave_air" | "void_air")
}
