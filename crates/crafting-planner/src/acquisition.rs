//! Acquisition Planner
//!
//! Drives the item goal graph one step at a time: pick the cheapest ready
//! method below the requested item, check that its world source is in view,
//! run it, and record the outcome.
//!
//! The planner keeps its [`ItemGraph`] for the whole session so failure
//! counts keep steering method selection across calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crafting_world::{GameData, World};

use crate::config::AcquisitionConfig;
use crate::events::{EventKind, PendingEvents};
use crate::item_goal::{Execution, ItemGraph, Technique, TechniqueKind};

/// An item and the quantity wanted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub item: String,
    pub quantity: u32,
}

impl ItemRequest {
    pub fn new(item: impl Into<String>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// What to do about a source that is not in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferStrategy {
    /// Give the surroundings a tick to change.
    Wait,
    /// Walk away and re-scan.
    Explore,
}

/// Result of one [`AcquisitionPlanner::advance`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The requested quantity is already held.
    Satisfied,
    /// No candidate method exists for `item`.
    CannotProgress { item: String },
    /// The agent is still working on a previous action.
    Busy,
    /// The next leaf's source is out of view.
    Deferred {
        item: String,
        source: String,
        strategy: DeferStrategy,
    },
    /// A method ran against the world.
    Executed {
        item: String,
        technique: TechniqueKind,
        quantity: u32,
        progressed: bool,
    },
}

impl AdvanceOutcome {
    /// True when this goal will never progress.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AdvanceOutcome::CannotProgress { .. })
    }
}

/// Session-scoped driver over the item goal graph.
pub struct AcquisitionPlanner {
    graph: ItemGraph,
    /// Items whose source was missing on the last attempt
    deferred: BTreeSet<String>,
    events: PendingEvents,
}

impl AcquisitionPlanner {
    pub fn new(config: AcquisitionConfig) -> Self {
        Self {
            graph: ItemGraph::new(config),
            deferred: BTreeSet::new(),
            events: PendingEvents::new(),
        }
    }

    pub fn graph(&self) -> &ItemGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ItemGraph {
        &mut self.graph
    }

    pub fn drain_events(&mut self) -> Vec<EventKind> {
        self.events.drain()
    }

    /// Takes one step toward holding `quantity` of `item`.
    pub fn advance<W, G>(&mut self, item: &str, quantity: u32, world: &mut W, data: &G) -> AdvanceOutcome
    where
        W: World + ?Sized,
        G: GameData + ?Sized,
    {
        if world.item_satisfied(item, quantity) {
            return AdvanceOutcome::Satisfied;
        }

        let node = self.graph.resolve(item, data);
        if !self.graph.node(node).is_satisfiable() {
            warn!(item, "no way to obtain item");
            self.events.push(EventKind::GoalUnsatisfiable {
                item: item.to_string(),
            });
            return AdvanceOutcome::CannotProgress {
                item: item.to_string(),
            };
        }

        if !world.is_idle() {
            return AdvanceOutcome::Busy;
        }

        let Some(step) = self.graph.next(node, quantity, &*world) else {
            // Satisfiable but nothing actionable below it.
            return AdvanceOutcome::CannotProgress {
                item: item.to_string(),
            };
        };

        let method = self.graph.method(step.method);
        let leaf = method.item.clone();
        let technique = method.technique.clone();

        if let Some(source) = self.missing_source(&technique, &*world) {
            self.graph.method_mut(step.method).fails += 1;
            let strategy = self.defer(&leaf, world);
            info!(item = %leaf, source = %source, ?strategy, "source out of view");
            self.events.push(EventKind::AcquisitionDeferred {
                item: leaf.clone(),
                source: source.clone(),
                strategy,
            });
            return AdvanceOutcome::Deferred {
                item: leaf,
                source,
                strategy,
            };
        }

        let execution = self.graph.execute(step.method, step.quantity, world);
        let gained = match &execution {
            Execution::Attempted { gained, .. } => *gained,
            Execution::Unready => 0,
        };
        if let Execution::Attempted { error: Some(error), .. } = &execution {
            debug!(item = %leaf, %error, "world action reported an error");
        }
        if gained > 0 {
            info!(item = %leaf, goal = item, gained, "obtained item");
        } else {
            info!(item = %leaf, goal = item, "failed to obtain item");
        }

        self.events.push(EventKind::MethodExecuted {
            item: leaf.clone(),
            technique: technique.kind(),
            quantity: step.quantity,
            gained,
            fails: self.graph.method(step.method).fails,
        });

        AdvanceOutcome::Executed {
            item: leaf,
            technique: technique.kind(),
            quantity: step.quantity,
            progressed: gained > 0,
        }
    }

    /// Advances the first request in `goals` that is not yet satisfied.
    pub fn advance_first<W, G>(&mut self, goals: &[ItemRequest], world: &mut W, data: &G) -> AdvanceOutcome
    where
        W: World + ?Sized,
        G: GameData + ?Sized,
    {
        match goals
            .iter()
            .find(|goal| !world.item_satisfied(&goal.item, goal.quantity))
        {
            Some(goal) => self.advance(&goal.item, goal.quantity, world, data),
            None => AdvanceOutcome::Satisfied,
        }
    }

    /// The block or animal a leaf technique needs, when it is not in view.
    fn missing_source<W: World + ?Sized>(&self, technique: &Technique, world: &W) -> Option<String> {
        let radius = self.graph.rules().scan_radius;
        match technique {
            Technique::Collect { block } if !world.nearby_block_types(radius).contains(block) => {
                Some(block.clone())
            }
            Technique::Hunt { animal } if !world.nearby_entity_types(radius).contains(animal) => {
                Some(animal.clone())
            }
            _ => None,
        }
    }

    /// Alternates between waiting and wandering for the same item.
    fn defer<W: World + ?Sized>(&mut self, item: &str, world: &mut W) -> DeferStrategy {
        if self.deferred.remove(item) {
            let distance = self.graph.rules().explore_distance;
            if let Err(error) = world.move_away(distance) {
                debug!(%error, "explore move failed");
            }
            DeferStrategy::Explore
        } else {
            self.deferred.insert(item.to_string());
            DeferStrategy::Wait
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crafting_world::fixtures::{barren_world, sample_game_data, starter_world};
    use crafting_world::{Recipe, SandboxAction, SandboxWorld, StaticGameData};

    fn planner() -> AcquisitionPlanner {
        AcquisitionPlanner::new(AcquisitionConfig::default())
    }

    #[test]
    fn test_satisfied_is_noop() {
        let data = sample_game_data();
        let mut world = starter_world().with_item("stick", 4);
        let mut planner = planner();
        assert_eq!(planner.advance("stick", 4, &mut world, &data), AdvanceOutcome::Satisfied);
        assert!(world.actions.is_empty());
    }

    #[test]
    fn test_cycle_cannot_progress() {
        let data = sample_game_data();
        let mut world = starter_world();
        let mut planner = planner();
        let outcome = planner.advance("loop_a", 1, &mut world, &data);
        assert!(outcome.is_terminal());
        assert_eq!(
            planner.drain_events(),
            vec![EventKind::GoalUnsatisfiable {
                item: "loop_a".to_string()
            }]
        );
    }

    #[test]
    fn test_busy_agent_is_left_alone() {
        let data = sample_game_data();
        let mut world = starter_world();
        world.busy = true;
        let mut planner = planner();
        assert_eq!(planner.advance("stick", 1, &mut world, &data), AdvanceOutcome::Busy);
        assert!(world.actions.is_empty());
    }

    #[test]
    fn test_executes_ready_leaf() {
        let data = sample_game_data();
        let mut world = starter_world();
        let mut planner = planner();
        let outcome = planner.advance("stick", 1, &mut world, &data);
        assert_eq!(
            outcome,
            AdvanceOutcome::Executed {
                item: "oak_log".to_string(),
                technique: TechniqueKind::Collect,
                quantity: 1,
                progressed: true,
            }
        );
        assert_eq!(world.inventory_count("oak_log"), 1);
    }

    #[test]
    fn test_unreachable_source_waits_then_explores() {
        let data = sample_game_data();
        let mut world = barren_world().with_hidden_block("oak_log");
        let mut planner = planner();

        let first = planner.advance("oak_planks", 1, &mut world, &data);
        assert!(matches!(
            first,
            AdvanceOutcome::Deferred { strategy: DeferStrategy::Wait, ref source, .. } if source == "oak_log"
        ));
        assert!(world.actions.is_empty());

        let second = planner.advance("oak_planks", 1, &mut world, &data);
        assert!(matches!(
            second,
            AdvanceOutcome::Deferred { strategy: DeferStrategy::Explore, .. }
        ));
        assert_eq!(world.actions, vec![SandboxAction::MoveAway { distance: 8 }]);

        // Exploring revealed the trees.
        let third = planner.advance("oak_planks", 1, &mut world, &data);
        assert!(matches!(third, AdvanceOutcome::Executed { progressed: true, .. }));

        let log = planner.graph().get("oak_log").unwrap();
        let method = planner.graph().node(log).methods[0];
        assert_eq!(planner.graph().method(method).fails, 2);
    }

    #[test]
    fn test_advance_first_skips_satisfied_goals() {
        let data = sample_game_data();
        let mut world = starter_world().with_item("oak_log", 1);
        let mut planner = planner();
        let goals = vec![ItemRequest::new("oak_log", 1), ItemRequest::new("raw_beef", 1)];
        let outcome = planner.advance_first(&goals, &mut world, &data);
        assert!(matches!(
            outcome,
            AdvanceOutcome::Executed { technique: TechniqueKind::Hunt, .. }
        ));

        let mut world = starter_world().with_item("oak_log", 1);
        let outcome = planner.advance_first(&goals[..1], &mut world, &data);
        assert_eq!(outcome, AdvanceOutcome::Satisfied);
    }

    #[test]
    fn test_failed_method_loses_to_alternative() {
        let data = StaticGameData::empty()
            .with_recipe("glass", Recipe::new([("sand", 1)]))
            .with_block_source("glass", "glass_pile")
            .with_block_source("sand", "sand");
        let mut world = SandboxWorld::new(data.clone())
            .with_item("sand", 1)
            .with_nearby_block("glass_pile")
            .stall("glass");
        let mut planner = planner();

        // Both methods cost one; the first registered runs and fails.
        let outcome = planner.advance("glass", 1, &mut world, &data);
        assert!(matches!(
            outcome,
            AdvanceOutcome::Executed { technique: TechniqueKind::Craft, progressed: false, .. }
        ));

        let outcome = planner.advance("glass", 1, &mut world, &data);
        assert!(matches!(
            outcome,
            AdvanceOutcome::Executed { technique: TechniqueKind::Collect, progressed: true, .. }
        ));
    }
}
