// Plot-space geometry: parallel-edge curvature, arc sampling and label decluttering.
// Nothing in here knows about a plotting backend.

pub mod arc;
pub mod curvature;
pub mod declutter;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use arc::{arc_control_point, arc_points};
pub use curvature::{
    CurvatureAssignment, EdgeKey, RAD_SCALE, assign_curvatures, offsets_for_count,
    offsets_for_count_scaled,
};
pub use declutter::{Declutter, DeclutterOutcome, OnExhausted, conflicts, declutter};

/// A point in plot coordinates. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(value: Point2D) -> Self {
        [value.x, value.y]
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Label identifiers mapped to their positions. Sorted iteration gives the
/// stable order declutter relies on.
pub type LabelSet<K> = BTreeMap<K, Point2D>;
