//! Block label matching.
//!
//! Blueprint labels may be concrete (`stone`) or generic (`planks`, `door`,
//! `bed`). A generic label accepts any matching variant already in the world
//! and resolves to one concrete variant when something has to be placed.

use crafting_world::{is_generic_wood_label, World, WOOD_TYPES, WOOL_COLORS};

const DEFAULT_WOOD: &str = "oak";
const DEFAULT_BED: &str = "white_bed";

/// True if the world `block` already fulfils the blueprint `label`.
pub fn block_satisfied(label: &str, block: &str) -> bool {
    if label == block {
        return true;
    }
    match label {
        "dirt" => block == "grass_block",
        "bed" => block.ends_with("_bed"),
        "torch" => block.contains("torch"),
        _ if is_generic_wood_label(label) => block.ends_with(label),
        _ => false,
    }
}

/// The concrete block to place for `label`.
///
/// Wood labels take the most abundant wood type in the inventory, then the
/// type of the nearest log within `search_radius`, then oak. `bed` takes the
/// most abundant colour among held wool and beds, then white.
pub fn resolve_variant<W: World + ?Sized>(label: &str, world: &W, search_radius: u32) -> String {
    if is_generic_wood_label(label) {
        let wood = most_abundant(world, WOOD_TYPES, |wood| {
            vec![format!("{}_log", wood), format!("{}_planks", wood)]
        })
        .or_else(|| nearest_log_type(world, search_radius))
        .unwrap_or_else(|| DEFAULT_WOOD.to_string());
        return format!("{}_{}", wood, label);
    }
    if label == "bed" {
        return most_abundant(world, WOOL_COLORS, |color| {
            vec![format!("{}_wool", color), format!("{}_bed", color)]
        })
        .map(|color| format!("{}_bed", color))
        .unwrap_or_else(|| DEFAULT_BED.to_string());
    }
    label.to_string()
}

/// The family member with the highest held count across its item names.
/// Earlier members win ties; zero counts never win.
fn most_abundant<W, F>(world: &W, family: &[&str], items: F) -> Option<String>
where
    W: World + ?Sized,
    F: Fn(&str) -> Vec<String>,
{
    let mut best: Option<(&str, u32)> = None;
    for &member in family {
        let held: u32 = items(member)
            .iter()
            .map(|item| world.inventory_count(item))
            .sum();
        if held > best.map_or(0, |(_, count)| count) {
            best = Some((member, held));
        }
    }
    best.map(|(member, _)| member.to_string())
}

fn nearest_log_type<W: World + ?Sized>(world: &W, radius: u32) -> Option<String> {
    let logs: Vec<String> = WOOD_TYPES.iter().map(|wood| format!("{}_log", wood)).collect();
    world
        .nearest_block_type(&logs, radius)
        .and_then(|log| log.strip_suffix("_log").map(str::to_string))
}
