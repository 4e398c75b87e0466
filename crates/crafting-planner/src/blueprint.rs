//! Blueprints
//!
//! A blueprint is a `[y][z][x]` grid of optional block labels plus a vertical
//! offset relative to the placement anchor. Grids are padded on load to a
//! square horizontal footprint so every orientation maps each cell to a cell
//! inside the grid.
//!
//! Blueprint files are JSON:
//!
//! ```json
//! { "offset": -1, "blocks": [[["stone", "", "stone"], ...], ...] }
//! ```
//!
//! Empty strings and `null` both mark cells the executor leaves alone.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// One blueprint cell. `None` is left untouched.
pub type Voxel = Option<String>;

/// A horizontal rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Orientation(u8);

impl Orientation {
    pub const IDENTITY: Orientation = Orientation(0);
    pub const ALL: [Orientation; 4] = [Orientation(0), Orientation(1), Orientation(2), Orientation(3)];

    /// Wraps `quarter_turns` into `0..=3`.
    pub const fn new(quarter_turns: u8) -> Self {
        Orientation(quarter_turns % 4)
    }

    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    /// The rotation that undoes this one.
    pub const fn inverse(self) -> Self {
        Orientation((4 - self.0) % 4)
    }

    /// True for 90 and 270 degree turns, which swap the footprint axes.
    pub const fn swaps_axes(self) -> bool {
        self.0 % 2 == 1
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 as u16 * 90)
    }
}

/// Maps a local `(x, z)` through `orientation` in a `size_x` by `size_z`
/// footprint.
pub fn rotate_xz(
    x: usize,
    z: usize,
    orientation: Orientation,
    size_x: usize,
    size_z: usize,
) -> (usize, usize) {
    match orientation.0 {
        0 => (x, z),
        1 => (z, size_x - x - 1),
        2 => (size_x - x - 1, size_z - z - 1),
        _ => (size_z - z - 1, x),
    }
}

/// Errors loading blueprints.
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid blueprint {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("blueprint {0} has no blocks")]
    Empty(String),
    #[error("unknown blueprint: {0}")]
    Unknown(String),
}

#[derive(Deserialize)]
struct BlueprintFile {
    #[serde(default)]
    offset: i32,
    blocks: Vec<Vec<Vec<Option<String>>>>,
}

/// A named voxel structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    name: String,
    offset: i32,
    layers: Vec<Vec<Vec<Voxel>>>,
    size_x: usize,
    size_z: usize,
}

impl Blueprint {
    /// Builds a blueprint from raw layers, padding ragged rows to a square
    /// footprint. Empty-string labels become `None`.
    pub fn new(
        name: impl Into<String>,
        offset: i32,
        layers: Vec<Vec<Vec<Voxel>>>,
    ) -> Result<Self, BlueprintError> {
        let name = name.into();
        let size_z = layers.iter().map(Vec::len).max().unwrap_or(0);
        let size_x = layers
            .iter()
            .flat_map(|layer| layer.iter().map(Vec::len))
            .max()
            .unwrap_or(0);
        if size_x == 0 || size_z == 0 {
            return Err(BlueprintError::Empty(name));
        }

        let side = size_x.max(size_z);
        let layers = layers
            .into_iter()
            .map(|mut layer| {
                layer.resize_with(side, Vec::new);
                layer
                    .into_iter()
                    .map(|mut row| {
                        row.resize(side, None);
                        row.into_iter()
                            .map(|cell| cell.filter(|label| !label.is_empty()))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            name,
            offset,
            layers,
            size_x: side,
            size_z: side,
        })
    }

    /// Parses the JSON file format.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, BlueprintError> {
        let name = name.into();
        let file: BlueprintFile = match serde_json::from_str(json) {
            Ok(file) => file,
            Err(source) => return Err(BlueprintError::Parse { name, source }),
        };
        Self::new(name, file.offset, file.blocks)
    }

    /// Builds a blueprint from rows of string labels, `""` meaning empty.
    pub fn from_labels(name: impl Into<String>, offset: i32, layers: &[&[&[&str]]]) -> Result<Self, BlueprintError> {
        let layers = layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|row| row.iter().map(|label| Some(label.to_string())).collect())
                    .collect()
            })
            .collect();
        Self::new(name, offset, layers)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vertical offset of layer 0 relative to the anchor.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_y(&self) -> usize {
        self.layers.len()
    }

    pub fn size_z(&self) -> usize {
        self.size_z
    }

    /// Label stored at local blueprint coordinates.
    pub fn label(&self, x: usize, y: usize, z: usize) -> Option<&str> {
        self.layers
            .get(y)
            .and_then(|layer| layer.get(z))
            .and_then(|row| row.get(x))
            .and_then(|cell| cell.as_deref())
    }

    /// First cell whose label contains `door`, scanning layers bottom-up.
    pub fn door(&self) -> Option<(usize, usize, usize)> {
        for (y, layer) in self.layers.iter().enumerate() {
            for (z, row) in layer.iter().enumerate() {
                for (x, cell) in row.iter().enumerate() {
                    if cell.as_deref().is_some_and(|label| label.contains("door")) {
                        return Some((x, y, z));
                    }
                }
            }
        }
        None
    }

    /// Count of every non-empty label.
    pub fn materials(&self) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for label in self.layers.iter().flatten().flatten().flatten() {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Blueprints keyed by name.
#[derive(Debug, Clone, Default)]
pub struct BlueprintLibrary {
    blueprints: BTreeMap<String, Blueprint>,
}

impl BlueprintLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.json` file in `dir` (dotfiles skipped), named by stem.
    pub fn load_dir(dir: &Path) -> Result<Self, BlueprintError> {
        let mut library = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = std::fs::read_to_string(&path)?;
            let blueprint = Blueprint::from_json(name, &content)?;
            debug!(
                name,
                size_x = blueprint.size_x(),
                size_y = blueprint.size_y(),
                "loaded blueprint"
            );
            library.insert(blueprint);
        }
        Ok(library)
    }

    pub fn insert(&mut self, blueprint: Blueprint) {
        self.blueprints.insert(blueprint.name.clone(), blueprint);
    }

    pub fn get(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Blueprint, BlueprintError> {
        self.get(name)
            .ok_or_else(|| BlueprintError::Unknown(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blueprints.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blueprints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}
