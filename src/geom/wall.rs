use crate::{Point, Vector};
use serde::{Deserialize, Serialize};

/// Directed wall segment of a building outline.
///
/// Both endpoints carry the building height as `z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub start: Point,
    pub end: Point,
}

impl Wall {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Height shared by both endpoints.
    pub fn height(&self) -> f64 {
        self.start.z.max(self.end.z)
    }

    /// Direction of the wall projected onto the ground plane.
    pub fn direction_2d(&self) -> Vector {
        Vector::new(self.end.x - self.start.x, self.end.y - self.start.y, 0.0)
    }
}
