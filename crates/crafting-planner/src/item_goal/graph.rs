//! The item goal arena.
//!
//! [`ItemGraph`] owns every [`ItemGoalNode`] and [`MethodNode`] of a planning
//! session. Nodes are keyed by item name and created on first reference, so
//! failure counts survive across planning calls for as long as the graph
//! lives.
//!
//! Expansion walks the game data depth-first and carries the chain of items
//! currently being expanded. A reference back into that chain yields a
//! degenerate node with no methods, and any method depending on a node with
//! no methods is discarded, so the finished graph is acyclic.
//!
//! Evaluation (`is_done`, `depth`, `fails`, `next`) reads the world but never
//! mutates the graph. Only [`ItemGraph::execute`] changes failure counts.

use std::collections::HashMap;

use crafting_world::{ActionError, GameData, World};
use tracing::debug;

use super::method::{Edge, MethodNode, NextStep, Technique};
use super::{MethodId, NodeId};
use crate::config::AcquisitionConfig;

/// Why a node does or does not have methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    /// Game data was queried; methods may still be empty.
    Expanded,
    /// Name matched the blacklist; never expanded.
    Blacklisted,
    /// Name appeared among its own ancestors; never expanded.
    Cyclic,
}

/// All known ways of obtaining one item.
#[derive(Debug, Clone)]
pub struct ItemGoalNode {
    pub name: String,
    pub discovery: Discovery,
    /// Candidates in registration order
    pub methods: Vec<MethodId>,
}

impl ItemGoalNode {
    /// A node with no methods can never be satisfied by planning.
    pub fn is_satisfiable(&self) -> bool {
        !self.methods.is_empty()
    }
}

/// Result of one [`ItemGraph::execute`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// A dependency was missing; nothing was attempted.
    Unready,
    /// The world action ran. `gained` is the inventory increase of the item.
    Attempted {
        gained: u32,
        error: Option<ActionError>,
    },
}

impl Execution {
    pub fn progressed(&self) -> bool {
        matches!(self, Execution::Attempted { gained, .. } if *gained > 0)
    }
}

/// Arena of item goal nodes and their methods.
#[derive(Debug, Clone)]
pub struct ItemGraph {
    nodes: Vec<ItemGoalNode>,
    methods: Vec<MethodNode>,
    index: HashMap<String, NodeId>,
    rules: AcquisitionConfig,
}

impl ItemGraph {
    pub fn new(rules: AcquisitionConfig) -> Self {
        Self {
            nodes: Vec::new(),
            methods: Vec::new(),
            index: HashMap::new(),
            rules,
        }
    }

    pub fn rules(&self) -> &AcquisitionConfig {
        &self.rules
    }

    /// Looks up an already-created node.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &ItemGoalNode {
        &self.nodes[id.0]
    }

    pub fn method(&self, id: MethodId) -> &MethodNode {
        &self.methods[id.0]
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodNode {
        &mut self.methods[id.0]
    }

    /// Number of named nodes in the registry.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the node for `name`, expanding it on first reference.
    pub fn resolve<G: GameData + ?Sized>(&mut self, name: &str, data: &G) -> NodeId {
        self.resolve_within(name, &[], data)
    }

    fn resolve_within<G: GameData + ?Sized>(
        &mut self,
        name: &str,
        ancestors: &[String],
        data: &G,
    ) -> NodeId {
        if let Some(id) = self.get(name) {
            return id;
        }
        if ancestors.iter().any(|a| a == name) {
            // Left out of the index: the in-progress ancestor claims the name.
            return self.push_node(name, Discovery::Cyclic, Vec::new());
        }
        if self.rules.is_blacklisted(name) {
            let id = self.push_node(name, Discovery::Blacklisted, Vec::new());
            self.index.insert(name.to_string(), id);
            return id;
        }

        let mut lineage = ancestors.to_vec();
        lineage.push(name.to_string());
        let candidates = self.discover(name, &lineage, data);

        let mut methods = Vec::new();
        for candidate in candidates {
            let obtainable = candidate
                .children()
                .all(|edge| self.node(edge.node).is_satisfiable());
            if obtainable {
                methods.push(MethodId(self.methods.len()));
                self.methods.push(candidate);
            }
        }

        debug!(item = name, methods = methods.len(), "expanded item goal");
        let id = self.push_node(name, Discovery::Expanded, methods);
        self.index.insert(name.to_string(), id);
        id
    }

    fn push_node(&mut self, name: &str, discovery: Discovery, methods: Vec<MethodId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ItemGoalNode {
            name: name.to_string(),
            discovery,
            methods,
        });
        id
    }

    /// Builds one candidate per technique the game data offers for `name`.
    fn discover<G: GameData + ?Sized>(
        &mut self,
        name: &str,
        lineage: &[String],
        data: &G,
    ) -> Vec<MethodNode> {
        let mut candidates = Vec::new();

        for recipe in data.crafting_recipes(name) {
            let ingredients = recipe
                .ingredients
                .iter()
                .map(|ingredient| Edge {
                    node: self.resolve_within(&ingredient.item, lineage, data),
                    quantity: ingredient.count,
                })
                .collect();
            let prerequisite = if recipe.total_ingredients() > self.rules.crafting_grid_capacity {
                let station = self.rules.crafting_station.clone();
                Some(self.resolve_within(&station, lineage, data))
            } else {
                None
            };
            candidates.push(MethodNode::new(name, Technique::Craft, ingredients, prerequisite));
        }

        if let Some(block) = data.block_source(name) {
            let prerequisite = data
                .block_tool(&block)
                .map(|tool| self.resolve_within(&tool, lineage, data));
            candidates.push(MethodNode::new(
                name,
                Technique::Collect { block },
                Vec::new(),
                prerequisite,
            ));
        }

        if let Some(input) = data.smelting_input(name) {
            let fuel = self.rules.smelting_fuel.clone();
            let station = self.rules.smelting_station.clone();
            let ingredients = vec![
                Edge {
                    node: self.resolve_within(&input, lineage, data),
                    quantity: 1,
                },
                Edge {
                    node: self.resolve_within(&fuel, lineage, data),
                    quantity: 1,
                },
            ];
            let prerequisite = Some(self.resolve_within(&station, lineage, data));
            candidates.push(MethodNode::new(
                name,
                Technique::Smelt { input },
                ingredients,
                prerequisite,
            ));
        }

        if let Some(animal) = data.animal_source(name) {
            candidates.push(MethodNode::new(
                name,
                Technique::Hunt { animal },
                Vec::new(),
                None,
            ));
        }

        candidates
    }

    // ------------------------------------------------------------------
    // Method evaluation
    // ------------------------------------------------------------------

    /// True if every ingredient and the prerequisite are already held.
    pub fn method_is_ready<W: World + ?Sized>(&self, id: MethodId, world: &W) -> bool {
        self.method(id)
            .children()
            .all(|edge| self.is_done(edge.node, edge.quantity, world))
    }

    pub fn method_is_done<W: World + ?Sized>(&self, id: MethodId, quantity: u32, world: &W) -> bool {
        world.item_satisfied(&self.method(id).item, quantity)
    }

    /// Length of the longest unmet dependency chain below this method.
    pub fn method_depth<W: World + ?Sized>(&self, id: MethodId, quantity: u32, world: &W) -> u32 {
        if self.method_is_done(id, quantity, world) {
            return 0;
        }
        let deepest = self
            .method(id)
            .children()
            .map(|edge| self.depth(edge.node, edge.quantity, world))
            .max()
            .unwrap_or(0);
        deepest + 1
    }

    /// Failures recorded on this method and its unmet dependencies.
    pub fn method_fails<W: World + ?Sized>(&self, id: MethodId, quantity: u32, world: &W) -> u32 {
        if self.method_is_done(id, quantity, world) {
            return 0;
        }
        let below: u32 = self
            .method(id)
            .children()
            .map(|edge| self.fails(edge.node, edge.quantity, world))
            .sum();
        below + self.method(id).fails
    }

    /// Cost heuristic: depth plus accumulated failures.
    pub fn method_cost<W: World + ?Sized>(&self, id: MethodId, quantity: u32, world: &W) -> u32 {
        self.method_depth(id, quantity, world) + self.method_fails(id, quantity, world)
    }

    pub fn method_next<W: World + ?Sized>(
        &self,
        id: MethodId,
        quantity: u32,
        world: &W,
    ) -> Option<NextStep> {
        if self.method_is_done(id, quantity, world) {
            return None;
        }
        if self.method_is_ready(id, world) {
            return Some(NextStep { method: id, quantity });
        }
        self.method(id)
            .children()
            .find_map(|edge| self.next(edge.node, edge.quantity, world))
    }

    // ------------------------------------------------------------------
    // Node evaluation (delegates to the cheapest method)
    // ------------------------------------------------------------------

    /// Cheapest candidate by [`Self::method_cost`]; the earliest wins ties.
    pub fn best_method<W: World + ?Sized>(
        &self,
        node: NodeId,
        quantity: u32,
        world: &W,
    ) -> Option<MethodId> {
        self.node(node)
            .methods
            .iter()
            .copied()
            .min_by_key(|&method| self.method_cost(method, quantity, world))
    }

    pub fn is_done<W: World + ?Sized>(&self, node: NodeId, quantity: u32, world: &W) -> bool {
        self.best_method(node, quantity, world)
            .is_some_and(|method| self.method_is_done(method, quantity, world))
    }

    pub fn depth<W: World + ?Sized>(&self, node: NodeId, quantity: u32, world: &W) -> u32 {
        self.best_method(node, quantity, world)
            .map_or(0, |method| self.method_depth(method, quantity, world))
    }

    pub fn fails<W: World + ?Sized>(&self, node: NodeId, quantity: u32, world: &W) -> u32 {
        self.best_method(node, quantity, world)
            .map_or(0, |method| self.method_fails(method, quantity, world))
    }

    pub fn next<W: World + ?Sized>(
        &self,
        node: NodeId,
        quantity: u32,
        world: &W,
    ) -> Option<NextStep> {
        self.best_method(node, quantity, world)
            .and_then(|method| self.method_next(method, quantity, world))
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Runs one method against the world and records a failure when the
    /// method was not ready, was interrupted, or the item count did not grow.
    pub fn execute<W: World + ?Sized>(
        &mut self,
        id: MethodId,
        quantity: u32,
        world: &mut W,
    ) -> Execution {
        if !self.method_is_ready(id, &*world) {
            self.method_mut(id).fails += 1;
            return Execution::Unready;
        }

        let item = self.method(id).item.clone();
        let technique = self.method(id).technique.clone();
        let before = world.inventory_count(&item);

        let result = if world.is_interrupted() {
            Err(ActionError::Interrupted)
        } else {
            match &technique {
                Technique::Craft => world.craft(&item, quantity),
                Technique::Collect { block } => world.collect(block, quantity),
                Technique::Smelt { input } => {
                    let held = world.inventory_count(input);
                    let batch = quantity.min(if held == 0 { 1 } else { held });
                    world.smelt(input, batch)
                }
                Technique::Hunt { animal } => hunt(world, animal, quantity),
            }
        };

        let after = world.inventory_count(&item);
        let interrupted = world.is_interrupted() || result == Err(ActionError::Interrupted);
        let gained = if interrupted { 0 } else { after.saturating_sub(before) };
        if gained == 0 {
            self.method_mut(id).fails += 1;
        }

        debug!(
            item = %item,
            technique = %technique.kind(),
            quantity,
            gained,
            fails = self.method(id).fails,
            "executed method"
        );

        Execution::Attempted {
            gained,
            error: result.err(),
        }
    }
}

/// Attacks the nearest `animal` up to `times` times, stopping at the first
/// failed attack or interrupt.
fn hunt<W: World + ?Sized>(world: &mut W, animal: &str, times: u32) -> Result<(), ActionError> {
    for _ in 0..times {
        if world.is_interrupted() {
            return Err(ActionError::Interrupted);
        }
        world.attack_nearest(animal)?;
    }
    Ok(())
}
