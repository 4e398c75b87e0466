//! Determinism verification tests
//!
//! Ensures a session produces identical actions and events given the same seed.

use std::collections::BTreeSet;

use crafting_planner::{
    Blueprint, BlueprintLibrary, EventKind, GoalController, Orientation, PlannerConfig,
    TickOutcome,
};
use crafting_world::fixtures::{sample_game_data, starter_world};
use crafting_world::SandboxAction;

fn library() -> BlueprintLibrary {
    let mut library = BlueprintLibrary::new();
    library.insert(
        Blueprint::from_labels(
            "shed",
            0,
            &[
                &[&["cobblestone", "cobblestone"], &["planks", "planks"]],
                &[&["planks", "planks"], &["", "planks"]],
            ],
        )
        .unwrap(),
    );
    library
}

struct Session {
    actions: Vec<SandboxAction>,
    events: Vec<EventKind>,
    orientation: Option<Orientation>,
}

/// Builds the shed from scratch and then fetches an iron pickaxe.
fn run_session(seed: u64) -> Session {
    let mut config = PlannerConfig::default();
    config.session.seed = seed;
    let data = sample_game_data();
    let mut world = starter_world();
    let mut controller = GoalController::new(&config, library());
    let mut events = Vec::new();
    let mut orientation = None;

    for goal in ["shed", "iron_pickaxe"] {
        controller.set_goal(goal, 1);
        for _ in 0..300 {
            let outcome = controller.tick(&mut world, &data).unwrap();
            events.extend(controller.drain_events());
            match outcome {
                TickOutcome::Completed { .. } => break,
                TickOutcome::Stuck { goal, item } => panic!("{} stuck on {}", goal, item),
                _ => {}
            }
        }
        if let Some(instance) = controller.built().get("shed") {
            orientation = Some(instance.orientation);
        }
    }

    Session {
        actions: world.actions,
        events,
        orientation,
    }
}

/// Same seed, same session
#[test]
fn test_session_determinism() {
    let first = run_session(42);
    let second = run_session(42);

    assert!(first.orientation.is_some(), "shed should have been built");
    assert_eq!(first.orientation, second.orientation);
    assert_eq!(first.actions, second.actions, "Actions should be identical with same seed");
    assert_eq!(first.events, second.events, "Events should be identical with same seed");
}

/// The seed only decides orientation picks; over a range of seeds every
/// quarter turn shows up.
#[test]
fn test_seeds_vary_orientation() {
    let orientations: BTreeSet<u8> = (0..64)
        .map(|seed| {
            run_session(seed)
                .orientation
                .map(Orientation::quarter_turns)
                .unwrap()
        })
        .collect();
    assert!(orientations.len() > 1, "all seeds picked {:?}", orientations);
}

#[test]
fn test_completed_session_reaches_both_goals() {
    let session = run_session(7);
    assert!(session
        .events
        .iter()
        .any(|event| matches!(event, EventKind::ConstructionComplete { blueprint, .. } if blueprint == "shed")));
    assert!(session
        .events
        .iter()
        .any(|event| matches!(event, EventKind::MethodExecuted { item, .. } if item == "iron_pickaxe")));
}
