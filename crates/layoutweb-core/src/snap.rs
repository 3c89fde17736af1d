//! Grid snapping for element positions.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Grid behaviour of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridSettings {
    /// Snap positions to the grid pitch.
    pub snap: bool,
    /// Draw the grid behind the elements (host concern, persisted only).
    pub visible: bool,
    /// Grid pitch in surface units.
    pub size: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            snap: false,
            visible: false,
            size: GRID_SIZE,
        }
    }
}

impl GridSettings {
    /// Snap a single coordinate, or pass it through when snapping is off.
    pub fn snap_value(&self, value: f64) -> f64 {
        if self.snap {
            snap_value(value, self.size)
        } else {
            value
        }
    }

    pub fn snap_point(&self, point: Point) -> Point {
        Point::new(self.snap_value(point.x), self.snap_value(point.y))
    }
}

/// Round to the nearest multiple of `grid_size`, halves rounding up.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if grid_size.is_nan() || grid_size <= 0.0 || !value.is_finite() {
        return value;
    }
    (value / grid_size + 0.5).floor() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}
