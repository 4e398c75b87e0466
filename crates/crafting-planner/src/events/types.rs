//! Event Types
//!
//! Records written to the planner's JSONL event log. Every line is a
//! [`PlannerEvent`]: a session-scoped envelope around one [`EventKind`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crafting_world::BlockPos;

use crate::acquisition::DeferStrategy;
use crate::item_goal::TechniqueKind;

/// One logged planner decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerEvent {
    pub event_id: String,
    pub session_id: Uuid,
    pub tick: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl PlannerEvent {
    pub fn new(event_id: impl Into<String>, session_id: Uuid, tick: u64, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            session_id,
            tick,
            kind,
        }
    }
}

/// Event payloads, tagged by `kind` in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A method ran against the world.
    MethodExecuted {
        item: String,
        technique: TechniqueKind,
        quantity: u32,
        gained: u32,
        fails: u32,
    },
    /// The next leaf's source was not in view.
    AcquisitionDeferred {
        item: String,
        source: String,
        strategy: DeferStrategy,
    },
    /// No candidate method exists for the item.
    GoalUnsatisfiable { item: String },
    /// One pass of the blueprint executor.
    BuildPass {
        blueprint: String,
        anchor: BlockPos,
        orientation: u8,
        placed: u32,
        broken: u32,
        deficits: BTreeMap<String, u32>,
    },
    ConstructionComplete {
        blueprint: String,
        anchor: BlockPos,
        orientation: u8,
    },
    BuildingExited { blueprint: String, door: BlockPos },
}

impl EventKind {
    /// The snake_case tag used in the log.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::MethodExecuted { .. } => "method_executed",
            EventKind::AcquisitionDeferred { .. } => "acquisition_deferred",
            EventKind::GoalUnsatisfiable { .. } => "goal_unsatisfiable",
            EventKind::BuildPass { .. } => "build_pass",
            EventKind::ConstructionComplete { .. } => "construction_complete",
            EventKind::BuildingExited { .. } => "building_exited",
        }
    }
}
