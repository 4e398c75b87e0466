//! Goal Controller
//!
//! Owns the active goal and a FIFO of transient acquisition goals. A goal
//! is either an item request or the name of a blueprint in the library.
//!
//! Each tick performs at most one unit of work:
//! 1. nothing happens while the agent is busy
//! 2. the agent steps aside, then leaves any building it stands in
//! 3. the oldest unsatisfied transient goal gets one planner step
//! 4. otherwise the active goal gets one planner step or one build pass
//!
//! Build passes that run short push their deficits onto the FIFO, so the
//! materials are gathered before placement resumes.

use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info, warn};

use crafting_world::{BlockPos, GameData, World};

use crate::acquisition::{AcquisitionPlanner, AdvanceOutcome, ItemRequest};
use crate::blueprint::BlueprintLibrary;
use crate::config::{ControllerConfig, PlannerConfig};
use crate::construction::{
    BuildExecutor, BuildReport, ConstructionError, ConstructionGoal, PlacedInstance,
};
use crate::events::{EventKind, PendingEvents};

/// The goal the controller is working toward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveGoal {
    Item(ItemRequest),
    Construction(ConstructionGoal),
}

impl ActiveGoal {
    pub fn name(&self) -> &str {
        match self {
            ActiveGoal::Item(request) => &request.item,
            ActiveGoal::Construction(goal) => goal.blueprint(),
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No goal is set.
    Idle,
    /// The agent is still finishing a previous action.
    Busy,
    /// A planner step ran for `goal`.
    Acquiring { goal: String, outcome: AdvanceOutcome },
    /// A build pass ran.
    Building { blueprint: String, report: BuildReport },
    /// The active goal finished and was cleared.
    Completed { goal: String },
    /// `item` cannot be obtained; the active goal was abandoned.
    Stuck { goal: String, item: String },
}

/// Tick-driven goal runner.
pub struct GoalController {
    config: ControllerConfig,
    planner: AcquisitionPlanner,
    executor: BuildExecutor,
    library: BlueprintLibrary,
    active: Option<ActiveGoal>,
    transient: VecDeque<ItemRequest>,
    built: BTreeMap<String, PlacedInstance>,
    events: PendingEvents,
    ticks: u64,
}

impl GoalController {
    pub fn new(config: &PlannerConfig, library: BlueprintLibrary) -> Self {
        Self {
            config: config.controller.clone(),
            planner: AcquisitionPlanner::new(config.acquisition.clone()),
            executor: BuildExecutor::new(config.construction.clone(), config.session.seed),
            library,
            active: None,
            transient: VecDeque::new(),
            built: BTreeMap::new(),
            events: PendingEvents::new(),
            ticks: 0,
        }
    }

    /// Replaces the active goal. Names found in the blueprint library become
    /// construction goals, everything else an item request.
    pub fn set_goal(&mut self, name: &str, quantity: u32) {
        self.transient.clear();
        let goal = if self.library.contains(name) {
            ActiveGoal::Construction(ConstructionGoal::new(name))
        } else {
            ActiveGoal::Item(ItemRequest::new(name, quantity))
        };
        info!(goal = name, quantity, "set goal");
        self.active = Some(goal);
    }

    /// Drops the active goal and pending materials, keeping built instances.
    pub fn stop(&mut self) {
        self.active = None;
        self.transient.clear();
    }

    /// Stops and forgets every built instance.
    pub fn reset(&mut self) {
        self.stop();
        self.built.clear();
    }

    pub fn active_goal(&self) -> Option<&ActiveGoal> {
        self.active.as_ref()
    }

    pub fn transient_goals(&self) -> impl Iterator<Item = &ItemRequest> {
        self.transient.iter()
    }

    pub fn planner(&self) -> &AcquisitionPlanner {
        &self.planner
    }

    pub fn library(&self) -> &BlueprintLibrary {
        &self.library
    }

    pub fn built(&self) -> &BTreeMap<String, PlacedInstance> {
        &self.built
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn drain_events(&mut self) -> Vec<EventKind> {
        self.events.drain()
    }

    /// Every voxel position covered by a built instance.
    pub fn built_positions(&self) -> Vec<BlockPos> {
        self.built
            .values()
            .filter_map(|instance| {
                self.library
                    .get(&instance.blueprint)
                    .map(|blueprint| instance.positions(blueprint))
            })
            .flatten()
            .collect()
    }

    /// The built instance whose bounding box contains `pos`. Instances still
    /// under construction are not buildings yet.
    pub fn current_building(&self, pos: BlockPos) -> Option<&PlacedInstance> {
        self.built.values().find(|instance| {
            self.library
                .get(&instance.blueprint)
                .is_some_and(|blueprint| instance.contains(blueprint, pos))
        })
    }

    /// Runs one tick. A construction error abandons the active goal.
    pub fn tick<W, G>(&mut self, world: &mut W, data: &G) -> Result<TickOutcome, ConstructionError>
    where
        W: World + ?Sized,
        G: GameData + ?Sized,
    {
        self.ticks += 1;
        if !world.is_idle() {
            return Ok(TickOutcome::Busy);
        }
        let Some(goal_name) = self.active.as_ref().map(|goal| goal.name().to_string()) else {
            return Ok(TickOutcome::Idle);
        };

        if self.config.step_aside_distance > 0 {
            if let Err(error) = world.move_away(self.config.step_aside_distance) {
                debug!(%error, "step aside failed");
            }
        }
        self.exit_building(world);

        if let Some(outcome) = self.advance_transient(&goal_name, world, data) {
            return Ok(outcome);
        }

        let result = match self.active.take() {
            Some(ActiveGoal::Item(request)) => Ok(self.advance_item(request, world, data)),
            Some(ActiveGoal::Construction(goal)) => self.build(goal, world),
            None => Ok(TickOutcome::Idle),
        };
        if let Err(error) = &result {
            warn!(goal = %goal_name, %error, "abandoning goal");
            self.stop();
        }
        result
    }

    /// Uses the door of the building the agent stands in, then walks off.
    fn exit_building<W: World + ?Sized>(&mut self, world: &mut W) {
        let position = world.agent_position();
        let Some(instance) = self.current_building(position) else {
            return;
        };
        let Some(door) = self
            .library
            .get(&instance.blueprint)
            .and_then(|blueprint| instance.door(blueprint))
        else {
            return;
        };
        let blueprint = instance.blueprint.clone();

        match world.use_door(door) {
            Ok(()) => {
                info!(%blueprint, %door, "left building");
                if let Err(error) = world.move_away(self.config.exit_move_distance) {
                    debug!(%error, "move away from door failed");
                }
                self.events.push(EventKind::BuildingExited { blueprint, door });
            }
            Err(error) => debug!(%blueprint, %door, %error, "door use failed"),
        }
    }

    /// One planner step for the oldest transient goal not yet held.
    fn advance_transient<W, G>(&mut self, goal: &str, world: &mut W, data: &G) -> Option<TickOutcome>
    where
        W: World + ?Sized,
        G: GameData + ?Sized,
    {
        while let Some(request) = self.transient.front().cloned() {
            if world.item_satisfied(&request.item, request.quantity) {
                self.transient.pop_front();
                continue;
            }
            let outcome = self.planner.advance(&request.item, request.quantity, world, data);
            self.events.extend(self.planner.drain_events());
            match outcome {
                AdvanceOutcome::Satisfied => {
                    self.transient.pop_front();
                }
                AdvanceOutcome::CannotProgress { item } => return Some(self.stuck(goal, item)),
                outcome => {
                    return Some(TickOutcome::Acquiring {
                        goal: request.item,
                        outcome,
                    })
                }
            }
        }
        None
    }

    fn advance_item<W, G>(&mut self, request: ItemRequest, world: &mut W, data: &G) -> TickOutcome
    where
        W: World + ?Sized,
        G: GameData + ?Sized,
    {
        let outcome = self.planner.advance(&request.item, request.quantity, world, data);
        self.events.extend(self.planner.drain_events());
        match outcome {
            AdvanceOutcome::Satisfied => {
                info!(goal = %request.item, "goal complete");
                TickOutcome::Completed { goal: request.item }
            }
            AdvanceOutcome::CannotProgress { item } => {
                let goal = request.item.clone();
                self.stuck(&goal, item)
            }
            outcome => {
                let goal = request.item.clone();
                self.active = Some(ActiveGoal::Item(request));
                TickOutcome::Acquiring { goal, outcome }
            }
        }
    }

    fn build<W: World + ?Sized>(
        &mut self,
        mut goal: ConstructionGoal,
        world: &mut W,
    ) -> Result<TickOutcome, ConstructionError> {
        let name = goal.blueprint().to_string();
        let Some(blueprint) = self.library.get(&name) else {
            return Ok(TickOutcome::Stuck {
                goal: name.clone(),
                item: name,
            });
        };

        let report = goal.step(&mut self.executor, blueprint, world)?;
        self.events.extend(self.executor.drain_events());

        for (item, missing) in &report.deficits {
            self.transient.push_back(ItemRequest::new(item.clone(), *missing));
        }

        if report.is_complete() {
            let instance = PlacedInstance::new(&name, report.placement());
            info!(blueprint = %name, anchor = %instance.anchor, "construction complete");
            self.events.push(EventKind::ConstructionComplete {
                blueprint: name.clone(),
                anchor: instance.anchor,
                orientation: instance.orientation.quarter_turns(),
            });
            self.built.insert(name.clone(), instance);
            return Ok(TickOutcome::Completed { goal: name });
        }

        self.active = Some(ActiveGoal::Construction(goal));
        Ok(TickOutcome::Building {
            blueprint: name,
            report,
        })
    }

    fn stuck(&mut self, goal: &str, item: String) -> TickOutcome {
        warn!(goal, item = %item, "stuck, abandoning goal");
        self.stop();
        TickOutcome::Stuck {
            goal: goal.to_string(),
            item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Blueprint;
    use crafting_world::fixtures::{sample_game_data, starter_world, BUILD_SITE};
    use crafting_world::SandboxAction;

    fn config() -> PlannerConfig {
        let mut config = PlannerConfig::default();
        config.controller.step_aside_distance = 0;
        config
    }

    fn library() -> BlueprintLibrary {
        let mut library = BlueprintLibrary::new();
        library.insert(Blueprint::from_labels("post", 0, &[&[&["stone"]], &[&["stone"]]]).unwrap());
        library
    }

    #[test]
    fn test_no_goal_is_idle() {
        let mut controller = GoalController::new(&config(), library());
        let mut world = starter_world();
        assert_eq!(controller.tick(&mut world, &sample_game_data()), Ok(TickOutcome::Idle));
        assert!(world.actions.is_empty());
    }

    #[test]
    fn test_busy_agent_skips_tick() {
        let mut controller = GoalController::new(&config(), library());
        controller.set_goal("stick", 1);
        let mut world = starter_world();
        world.busy = true;
        assert_eq!(controller.tick(&mut world, &sample_game_data()), Ok(TickOutcome::Busy));
        assert_eq!(controller.ticks(), 1);
    }

    #[test]
    fn test_item_goal_runs_to_completion() {
        let data = sample_game_data();
        let mut controller = GoalController::new(&config(), library());
        controller.set_goal("stick", 4);
        let mut world = starter_world();

        let mut completed = false;
        for _ in 0..20 {
            if let TickOutcome::Completed { goal } = controller.tick(&mut world, &data).unwrap() {
                assert_eq!(goal, "stick");
                completed = true;
                break;
            }
        }
        assert!(completed);
        assert!(world.inventory_count("stick") >= 4);
        assert!(controller.active_goal().is_none());
    }

    #[test]
    fn test_unobtainable_item_is_stuck() {
        let mut controller = GoalController::new(&config(), library());
        controller.set_goal("loop_a", 1);
        let mut world = starter_world();
        let outcome = controller.tick(&mut world, &sample_game_data()).unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Stuck {
                goal: "loop_a".to_string(),
                item: "loop_a".to_string()
            }
        );
        assert!(controller.active_goal().is_none());
    }

    #[test]
    fn test_construction_collects_deficits_then_builds() {
        let data = sample_game_data();
        let mut controller = GoalController::new(&config(), library());
        controller.set_goal("post", 1);
        let mut world = starter_world().with_item("stone", 1);

        let first = controller.tick(&mut world, &data).unwrap();
        let TickOutcome::Building { report, .. } = first else {
            panic!("expected a build pass, got {:?}", first);
        };
        assert_eq!(report.deficits.get("stone"), Some(&1));
        assert_eq!(
            controller.transient_goals().cloned().collect::<Vec<_>>(),
            vec![ItemRequest::new("stone", 1)]
        );

        let second = controller.tick(&mut world, &data).unwrap();
        assert!(matches!(second, TickOutcome::Acquiring { ref goal, .. } if goal == "stone"));

        world.set_count("stone", 1);
        let mut completed = false;
        for _ in 0..5 {
            if let TickOutcome::Completed { goal } = controller.tick(&mut world, &data).unwrap() {
                assert_eq!(goal, "post");
                completed = true;
                break;
            }
        }
        assert!(completed);
        assert!(controller.built().contains_key("post"));
        assert_eq!(controller.built_positions().len(), 2);
    }

    #[test]
    fn test_exits_building_through_door() {
        let mut library = BlueprintLibrary::new();
        library.insert(
            Blueprint::from_labels(
                "hut",
                0,
                &[&[&["planks", "door", "planks"], &["planks", "", "planks"], &["planks", "planks", "planks"]]],
            )
            .unwrap(),
        );
        let data = sample_game_data();
        let mut controller = GoalController::new(&config(), library);
        controller.set_goal("hut", 1);
        let mut world = starter_world()
            .with_item("oak_planks", 8)
            .with_item("oak_door", 1);

        controller.tick(&mut world, &data).unwrap();
        let outcome = controller.tick(&mut world, &data).unwrap();
        assert_eq!(outcome, TickOutcome::Completed { goal: "hut".to_string() });

        // Stand in the empty centre of the hut and give it something to do.
        world.position = BUILD_SITE.offset(1, 0, 1);
        controller.set_goal("stick", 1);
        controller.tick(&mut world, &data).unwrap();

        let door = controller.built()["hut"].door(controller.library().get("hut").unwrap()).unwrap();
        assert!(world.actions.contains(&SandboxAction::UseDoor { pos: door }));
        assert!(controller
            .drain_events()
            .iter()
            .any(|event| matches!(event, EventKind::BuildingExited { .. })));
    }

    fn hut_library() -> BlueprintLibrary {
        let mut library = BlueprintLibrary::new();
        library.insert(
            Blueprint::from_labels(
                "hut",
                0,
                &[&[&["planks", "door", "planks"], &["planks", "", "planks"], &["planks", "planks", "planks"]]],
            )
            .unwrap(),
        );
        library
    }

    #[test]
    fn test_unfinished_instance_is_not_exited() {
        let data = sample_game_data();
        let mut controller = GoalController::new(&config(), hut_library());
        controller.set_goal("hut", 1);
        let mut world = starter_world().with_item("oak_planks", 8);

        let first = controller.tick(&mut world, &data).unwrap();
        let TickOutcome::Building { report, .. } = first else {
            panic!("expected a build pass, got {:?}", first);
        };
        assert_eq!(report.deficits.get("oak_door"), Some(&1));

        world.position = BUILD_SITE.offset(1, 0, 1);
        assert!(controller.current_building(world.position).is_none());
        controller.tick(&mut world, &data).unwrap();

        assert_eq!(world.count_actions(|action| matches!(action, SandboxAction::UseDoor { .. })), 0);
        assert!(!controller
            .drain_events()
            .iter()
            .any(|event| matches!(event, EventKind::BuildingExited { .. })));
    }

    #[test]
    fn test_failed_door_use_is_not_reported() {
        let data = sample_game_data();
        let mut controller = GoalController::new(&config(), hut_library());
        controller.set_goal("hut", 1);
        let mut world = starter_world()
            .with_item("oak_planks", 8)
            .with_item("oak_door", 1);
        controller.tick(&mut world, &data).unwrap();
        controller.tick(&mut world, &data).unwrap();
        assert!(controller.built().contains_key("hut"));
        controller.drain_events();

        world.position = BUILD_SITE.offset(1, 0, 1);
        world.interrupted = true;
        controller.set_goal("stick", 1);
        controller.tick(&mut world, &data).unwrap();

        assert_eq!(world.count_actions(|action| matches!(action, SandboxAction::UseDoor { .. })), 1);
        assert_eq!(world.position, BUILD_SITE.offset(1, 0, 1));
        assert!(!controller
            .drain_events()
            .iter()
            .any(|event| matches!(event, EventKind::BuildingExited { .. })));
    }

    #[test]
    fn test_failed_step_aside_does_not_abort_tick() {
        let mut config = PlannerConfig::default();
        config.controller.step_aside_distance = 2;
        let mut controller = GoalController::new(&config, library());
        controller.set_goal("stick", 1);
        let mut world = starter_world();
        world.interrupted = true;

        let outcome = controller.tick(&mut world, &sample_game_data()).unwrap();
        assert!(matches!(outcome, TickOutcome::Acquiring { .. }));
        assert_eq!(world.actions[0], SandboxAction::MoveAway { distance: 2 });
        assert_eq!(world.position, BlockPos::default());
    }

    #[test]
    fn test_reset_forgets_built_instances() {
        let data = sample_game_data();
        let mut controller = GoalController::new(&config(), library());
        controller.set_goal("post", 1);
        let mut world = starter_world().with_item("stone", 2);
        controller.tick(&mut world, &data).unwrap();
        controller.tick(&mut world, &data).unwrap();
        assert!(controller.built().contains_key("post"));

        controller.stop();
        assert!(controller.built().contains_key("post"));
        controller.reset();
        assert!(controller.built().is_empty());
    }
}
