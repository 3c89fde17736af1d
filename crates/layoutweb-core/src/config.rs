//! Editor configuration.

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::snap::GridSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a rubber-band box on empty canvas selects elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarqueeMode {
    /// Overlapping elements are captured into a session that can be dragged as a group.
    #[default]
    Session,
    /// Elements whose center lies in the box are selected on release.
    Instant,
}

/// Tunables of the editing core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub grid: GridSettings,
    pub marquee: MarqueeMode,
    /// Snapshots kept by the undo history.
    pub history_limit: usize,
    /// Offset applied by target-less paste.
    pub paste_offset: f64,
    /// Area boxes narrower or shorter than this are discarded.
    pub min_area_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            marquee: MarqueeMode::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            paste_offset: 20.0,
            min_area_size: 10.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read a JSON config file.
    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(std::io::Error::other)
    }

    /// Replace out-of-range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.grid.size.is_finite() && self.grid.size > 0.0) {
            self.grid.size = defaults.grid.size;
        }
        if self.history_limit == 0 {
            self.history_limit = defaults.history_limit;
        }
        if !self.paste_offset.is_finite() {
            self.paste_offset = defaults.paste_offset;
        }
        if !(self.min_area_size.is_finite() && self.min_area_size >= 0.0) {
            self.min_area_size = defaults.min_area_size;
        }
        self
    }
}
