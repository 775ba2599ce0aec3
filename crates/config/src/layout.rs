// Grid layout preferences (column widths per grid)
// Held in memory by the host; persisted only if the host calls save()

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_COLUMN_WIDTH: u32 = 150;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStore {
    pub default_width: u32,
    /// grid id -> (column field -> width)
    pub grids: BTreeMap<String, BTreeMap<String, u32>>,
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_COLUMN_WIDTH,
            grids: BTreeMap::new(),
        }
    }
}

impl LayoutStore {
    pub fn new(default_width: u32) -> Self {
        Self {
            default_width,
            grids: BTreeMap::new(),
        }
    }

    /// Stored width, or the default when the column was never resized.
    pub fn width(&self, grid: &str, field: &str) -> u32 {
        self.grids
            .get(grid)
            .and_then(|cols| cols.get(field))
            .copied()
            .unwrap_or(self.default_width)
    }

    pub fn set_width(&mut self, grid: &str, field: &str, width: u32) {
        self.grids
            .entry(grid.to_string())
            .or_default()
            .insert(field.to_string(), width);
    }

    /// Forget every width stored for `grid`.
    pub fn reset(&mut self, grid: &str) {
        self.grids.remove(grid);
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rowmap")
            .join("layout.json")
    }

    /// Load from `path`. A missing or unreadable file yields `None`.
    pub fn load(path: &Path) -> Option<Self> {
        fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }
}
