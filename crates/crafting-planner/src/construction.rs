//! Construction Executor
//!
//! Diffs a blueprint against the world one pass at a time. Each pass walks
//! the footprint in `[y][z][x]` order, reads the blueprint cell that the
//! instance's orientation maps onto each world column, and for every voxel
//! whose world block does not satisfy its label breaks the obstruction and
//! places the resolved variant. Labels the inventory cannot cover are
//! collected into a deficit map.
//!
//! A pass stops early when the agent becomes busy or the action is
//! interrupted; the next pass resumes from the world state.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crafting_world::{is_air, ActionError, BlockPos, World};

use crate::blocks::{block_satisfied, resolve_variant};
use crate::blueprint::{rotate_xz, Blueprint, Orientation};
use crate::config::ConstructionConfig;
use crate::events::{EventKind, PendingEvents};

/// Errors that abort a construction goal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("no free space for {blueprint} within {radius} blocks")]
    NoFreeSpace { blueprint: String, radius: u32 },
}

/// Where and how a blueprint is realized in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub anchor: BlockPos,
    pub orientation: Orientation,
}

/// A blueprint bound to a world placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedInstance {
    pub blueprint: String,
    pub anchor: BlockPos,
    pub orientation: Orientation,
}

impl PlacedInstance {
    pub fn new(blueprint: impl Into<String>, placement: Placement) -> Self {
        Self {
            blueprint: blueprint.into(),
            anchor: placement.anchor,
            orientation: placement.orientation,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            anchor: self.anchor,
            orientation: self.orientation,
        }
    }

    /// Horizontal extent in world axes.
    pub fn footprint(&self, blueprint: &Blueprint) -> (usize, usize) {
        if self.orientation.swaps_axes() {
            (blueprint.size_z(), blueprint.size_x())
        } else {
            (blueprint.size_x(), blueprint.size_z())
        }
    }

    /// True if `pos` lies inside the instance's bounding box.
    pub fn contains(&self, blueprint: &Blueprint, pos: BlockPos) -> bool {
        let (size_x, size_z) = self.footprint(blueprint);
        let base_y = self.anchor.y + blueprint.offset();
        pos.x >= self.anchor.x
            && pos.x < self.anchor.x + size_x as i32
            && pos.y >= base_y
            && pos.y < base_y + blueprint.size_y() as i32
            && pos.z >= self.anchor.z
            && pos.z < self.anchor.z + size_z as i32
    }

    /// Every world position inside the bounding box.
    pub fn positions(&self, blueprint: &Blueprint) -> Vec<BlockPos> {
        let (size_x, size_z) = self.footprint(blueprint);
        let mut positions = Vec::with_capacity(size_x * size_z * blueprint.size_y());
        for y in 0..blueprint.size_y() {
            for z in 0..size_z {
                for x in 0..size_x {
                    positions.push(self.world_pos(blueprint, x, y, z));
                }
            }
        }
        positions
    }

    /// World position of the blueprint's first door cell.
    pub fn door(&self, blueprint: &Blueprint) -> Option<BlockPos> {
        let (x, y, z) = blueprint.door()?;
        let (wx, wz) = rotate_xz(
            x,
            z,
            self.orientation.inverse(),
            blueprint.size_x(),
            blueprint.size_z(),
        );
        Some(self.world_pos(blueprint, wx, y, wz))
    }

    fn world_pos(&self, blueprint: &Blueprint, x: usize, layer: usize, z: usize) -> BlockPos {
        self.anchor
            .offset(x as i32, layer as i32 + blueprint.offset(), z as i32)
    }
}

/// Outcome of one executor pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// At least one voxel did not satisfy its label
    pub acted: bool,
    /// Resolved block name -> missing count
    pub deficits: BTreeMap<String, u32>,
    pub anchor: BlockPos,
    pub orientation: Orientation,
    pub placed: u32,
    pub broken: u32,
    /// The pass stopped before visiting every voxel
    pub interrupted: bool,
}

impl BuildReport {
    fn new(placement: Placement) -> Self {
        Self {
            acted: false,
            deficits: BTreeMap::new(),
            anchor: placement.anchor,
            orientation: placement.orientation,
            placed: 0,
            broken: 0,
            interrupted: false,
        }
    }

    /// Nothing left to do and nothing missing.
    pub fn is_complete(&self) -> bool {
        !self.acted && self.deficits.is_empty()
    }

    pub fn placement(&self) -> Placement {
        Placement {
            anchor: self.anchor,
            orientation: self.orientation,
        }
    }
}

/// Runs blueprint passes against the world.
pub struct BuildExecutor {
    config: ConstructionConfig,
    rng: SmallRng,
    events: PendingEvents,
}

impl BuildExecutor {
    /// Orientation picks are drawn from a generator seeded with `seed`.
    pub fn new(config: ConstructionConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
            events: PendingEvents::new(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<EventKind> {
        self.events.drain()
    }

    /// Resolves a placement, searching footprints from the full width down
    /// to a single column when no anchor is given.
    pub fn resolve_placement<W: World + ?Sized>(
        &mut self,
        blueprint: &Blueprint,
        anchor: Option<BlockPos>,
        orientation: Option<Orientation>,
        world: &W,
    ) -> Result<Placement, ConstructionError> {
        let anchor = match anchor {
            Some(anchor) => anchor,
            None => {
                let radius = self.config.free_space_radius;
                (1..=blueprint.size_x())
                    .rev()
                    .find_map(|size| world.nearest_free_space(size as u32, radius))
                    .ok_or_else(|| ConstructionError::NoFreeSpace {
                        blueprint: blueprint.name().to_string(),
                        radius,
                    })?
            }
        };
        let orientation =
            orientation.unwrap_or_else(|| Orientation::new(self.rng.gen_range(0..4)));
        Ok(Placement { anchor, orientation })
    }

    /// Runs one pass. A missing anchor or orientation is chosen here and
    /// reported back so later passes can reuse it.
    pub fn execute_next<W: World + ?Sized>(
        &mut self,
        blueprint: &Blueprint,
        anchor: Option<BlockPos>,
        orientation: Option<Orientation>,
        world: &mut W,
    ) -> Result<BuildReport, ConstructionError> {
        let placement = self.resolve_placement(blueprint, anchor, orientation, &*world)?;
        let instance = PlacedInstance::new(blueprint.name(), placement);
        let mut report = BuildReport::new(placement);
        let mut inventory = world.inventory();

        let (size_x, size_z) = (blueprint.size_x(), blueprint.size_z());
        'pass: for layer in 0..blueprint.size_y() {
            for z in 0..size_z {
                for x in 0..size_x {
                    let (bx, bz) = rotate_xz(x, z, placement.orientation, size_x, size_z);
                    let Some(label) = blueprint.label(bx, layer, bz) else {
                        continue;
                    };
                    let pos = instance.world_pos(blueprint, x, layer, z);
                    let current = world.block_at(pos);
                    if block_satisfied(label, &current) {
                        continue;
                    }
                    report.acted = true;

                    if !world.is_idle() || world.is_interrupted() {
                        report.interrupted = true;
                        break 'pass;
                    }

                    if !is_air(&current) {
                        match world.break_block(pos) {
                            Ok(()) => report.broken += 1,
                            Err(ActionError::Interrupted) => {
                                report.interrupted = true;
                                break 'pass;
                            }
                            Err(error) => debug!(%pos, %error, "break failed"),
                        }
                    }

                    let variant = resolve_variant(label, &*world, self.config.variant_search_radius);
                    let held = inventory.get(&variant).copied().unwrap_or(0);
                    if held == 0 {
                        *report.deficits.entry(variant).or_insert(0) += 1;
                        continue;
                    }

                    match world.place_block(&variant, pos) {
                        Ok(()) => {
                            report.placed += 1;
                            inventory.insert(variant, held - 1);
                        }
                        Err(ActionError::Interrupted) => {
                            report.interrupted = true;
                            break 'pass;
                        }
                        Err(error) => debug!(%pos, %error, "place failed"),
                    }
                }
            }
        }

        info!(
            blueprint = blueprint.name(),
            anchor = %placement.anchor,
            orientation = %placement.orientation,
            placed = report.placed,
            broken = report.broken,
            missing = report.deficits.values().sum::<u32>(),
            "build pass"
        );
        self.events.push(EventKind::BuildPass {
            blueprint: blueprint.name().to_string(),
            anchor: placement.anchor,
            orientation: placement.orientation.quarter_turns(),
            placed: report.placed,
            broken: report.broken,
            deficits: report.deficits.clone(),
        });

        Ok(report)
    }
}

/// Progress of a named construction goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionState {
    Unstarted,
    /// Last pass found missing materials.
    AwaitingMaterials,
    /// Last pass changed blocks without running short.
    Placing,
    Complete,
}

/// A blueprint goal and the instance it is building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionGoal {
    blueprint: String,
    instance: Option<PlacedInstance>,
    state: ConstructionState,
}

impl ConstructionGoal {
    pub fn new(blueprint: impl Into<String>) -> Self {
        Self {
            blueprint: blueprint.into(),
            instance: None,
            state: ConstructionState::Unstarted,
        }
    }

    pub fn blueprint(&self) -> &str {
        &self.blueprint
    }

    pub fn instance(&self) -> Option<&PlacedInstance> {
        self.instance.as_ref()
    }

    pub fn state(&self) -> ConstructionState {
        self.state
    }

    /// Runs one executor pass, binding the instance on the first one.
    pub fn step<W: World + ?Sized>(
        &mut self,
        executor: &mut BuildExecutor,
        blueprint: &Blueprint,
        world: &mut W,
    ) -> Result<BuildReport, ConstructionError> {
        let placement = self.instance.as_ref().map(PlacedInstance::placement);
        let report = executor.execute_next(
            blueprint,
            placement.map(|p| p.anchor),
            placement.map(|p| p.orientation),
            world,
        )?;
        if self.instance.is_none() {
            self.instance = Some(PlacedInstance::new(&self.blueprint, report.placement()));
        }

        if self.state != ConstructionState::Complete {
            self.state = if report.is_complete() {
                ConstructionState::Complete
            } else if !report.deficits.is_empty() {
                ConstructionState::AwaitingMaterials
            } else {
                ConstructionState::Placing
            };
        }
        Ok(report)
    }

    /// Forgets the instance and starts over.
    pub fn reset(&mut self) {
        self.instance = None;
        self.state = ConstructionState::Unstarted;
    }
}
