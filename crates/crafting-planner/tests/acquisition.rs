//! Item acquisition tests
//!
//! Exercises the item goal graph and the acquisition planner against the
//! sandbox world.

use crafting_planner::config::AcquisitionConfig;
use crafting_planner::item_goal::{Discovery, Execution};
use crafting_planner::{AcquisitionPlanner, AdvanceOutcome, ItemGraph, Technique};
use crafting_world::fixtures::{sample_game_data, starter_world};
use crafting_world::{Recipe, SandboxWorld, StaticGameData, World};

fn graph() -> ItemGraph {
    ItemGraph::new(AcquisitionConfig::default())
}

/// Stick from two planks: small recipe, no station, craftable straight away.
#[test]
fn test_stick_scenario() {
    let data = StaticGameData::empty()
        .with_recipe("stick", Recipe::new([("planks", 2)]).with_yield(4))
        .with_block_source("planks", "planks");
    let world = SandboxWorld::new(data.clone()).with_item("planks", 2);
    let mut graph = graph();

    let stick = graph.resolve("stick", &data);
    let craft = graph.node(stick).methods[0];
    assert_eq!(graph.method(craft).technique, Technique::Craft);
    assert_eq!(graph.method(craft).prerequisite, None);

    let step = graph.next(stick, 1, &world).unwrap();
    assert_eq!(step.method, craft);
    assert_eq!(step.quantity, 1);
}

/// Every `next` result is ready, or there is nothing to do.
#[test]
fn test_next_always_returns_ready_method() {
    let data = sample_game_data();
    let mut graph = graph();
    let worlds = [
        starter_world(),
        starter_world().with_item("oak_planks", 5),
        starter_world().with_item("crafting_table", 1).with_item("stick", 2),
        starter_world().with_item("stone_pickaxe", 1).with_item("furnace", 1),
    ];
    let goals = [
        "stick",
        "crafting_table",
        "wooden_pickaxe",
        "stone_pickaxe",
        "furnace",
        "iron_ingot",
        "iron_pickaxe",
        "stone",
    ];

    for world in &worlds {
        for goal in goals {
            let node = graph.resolve(goal, &data);
            match graph.next(node, 1, world) {
                Some(step) => assert!(graph.method_is_ready(step.method, world), "{}", goal),
                None => assert!(graph.is_done(node, 1, world), "{}", goal),
            }
        }
    }
}

#[test]
fn test_done_means_zero_depth_and_fails() {
    let data = sample_game_data();
    let mut graph = graph();
    let world = starter_world()
        .with_item("wooden_pickaxe", 1)
        .with_item("oak_planks", 4);

    for (goal, quantity) in [("wooden_pickaxe", 1), ("oak_planks", 4), ("oak_planks", 2)] {
        let node = graph.resolve(goal, &data);
        for &method in &graph.node(node).methods.clone() {
            graph.method_mut(method).fails += 5;
        }
        assert!(graph.is_done(node, quantity, &world));
        assert_eq!(graph.depth(node, quantity, &world), 0);
        assert_eq!(graph.fails(node, quantity, &world), 0);
    }
}

#[test]
fn test_cyclic_recipe_is_unsatisfiable() {
    let data = sample_game_data();
    let mut graph = graph();
    let world = starter_world();

    let node = graph.resolve("loop_a", &data);
    assert!(graph.node(node).methods.is_empty());
    assert!(!graph.is_done(node, 1, &world));

    // A cycle through another item leaves the other side empty too.
    let loop_b = graph.resolve("loop_b", &data);
    assert!(graph.node(loop_b).methods.is_empty());
    assert_eq!(graph.node(loop_b).discovery, Discovery::Expanded);

    let mut planner = AcquisitionPlanner::new(AcquisitionConfig::default());
    let mut world = starter_world();
    assert_eq!(
        planner.advance("loop_c", 1, &mut world, &data),
        AdvanceOutcome::CannotProgress {
            item: "loop_c".to_string()
        }
    );
}

#[test]
fn test_configured_blacklist() {
    let data = sample_game_data();
    let config = AcquisitionConfig {
        blacklist: vec!["stick".to_string()],
        ..AcquisitionConfig::default()
    };
    let mut graph = ItemGraph::new(config);
    let pickaxe = graph.resolve("wooden_pickaxe", &data);
    assert!(graph.node(pickaxe).methods.is_empty());
    let stick = graph.get("stick").unwrap();
    assert_eq!(graph.node(stick).discovery, Discovery::Blacklisted);
}

/// Three fruitless runs cost three points and hand the choice to the
/// otherwise equal alternative.
#[test]
fn test_three_failures_prefer_alternative() {
    let data = StaticGameData::empty()
        .with_recipe("glass", Recipe::new([("sand", 1)]))
        .with_block_source("glass", "glass_pile")
        .with_block_source("sand", "sand");
    let mut world = SandboxWorld::new(data.clone())
        .with_item("sand", 1)
        .with_nearby_block("glass_pile")
        .stall("glass");
    let mut graph = graph();

    let glass = graph.resolve("glass", &data);
    let methods = graph.node(glass).methods.clone();
    let (craft, collect) = (methods[0], methods[1]);
    assert_eq!(graph.best_method(glass, 1, &world), Some(craft));

    for _ in 0..3 {
        let result = graph.execute(craft, 1, &mut world);
        assert!(matches!(result, Execution::Attempted { gained: 0, .. }));
    }
    assert_eq!(graph.method(craft).fails, 3);
    assert!(graph.method_cost(craft, 1, &world) >= graph.method_cost(collect, 1, &world) + 3);
    assert_eq!(graph.best_method(glass, 1, &world), Some(collect));
}

/// The planner reaches an iron pickaxe from bare hands.
#[test]
fn test_full_tech_tree_run() {
    let data = sample_game_data();
    let mut world = starter_world();
    let mut planner = AcquisitionPlanner::new(AcquisitionConfig::default());

    let mut steps = 0;
    loop {
        let outcome = planner.advance("iron_pickaxe", 1, &mut world, &data);
        if outcome == AdvanceOutcome::Satisfied {
            break;
        }
        assert!(
            matches!(outcome, AdvanceOutcome::Executed { progressed: true, .. }),
            "unexpected outcome {:?}",
            outcome
        );
        steps += 1;
        assert!(steps < 200, "planner did not converge");
    }

    assert_eq!(world.inventory_count("iron_pickaxe"), 1);
    assert!(world.inventory_count("crafting_table") >= 1);
    assert!(world.inventory_count("furnace") >= 1);
}
