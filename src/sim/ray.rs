use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::propagation::berg_diffraction_loss;
use crate::scene::cell::Cell;
use crate::{Point, Vector};

/// Last surface a ray interacted with.
///
/// Stops a ray from re-triggering on the surface it is still crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    #[default]
    None,
    Ground,
    Roof,
    Corner,
    RoofCorner,
    Wall(u32),
}

impl Surface {
    /// Surface matching a solid cell, `None` for free space and interiors.
    pub fn of_cell(cell: Cell) -> Self {
        match cell {
            Cell::Wall(id) => Surface::Wall(id),
            Cell::Corner => Surface::Corner,
            Cell::Roof => Surface::Roof,
            Cell::RoofCorner => Surface::RoofCorner,
            Cell::Empty | Cell::Interior => Surface::None,
        }
    }
}

/// Knife-edge loss carried by a diffracted ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLoss {
    /// Path length from the transmitter to the edge.
    pub to_edge: f64,
    /// Deviation of this sub-ray from the incident direction (radians).
    pub angle: f64,
    /// Loss already accumulated at earlier edges (dB).
    pub base_db: f64,
}

impl EdgeLoss {
    /// Total loss at a point `path_length` metres along the ray.
    pub fn loss_db(&self, path_length: f64, wavelength: f64) -> f64 {
        let d2 = path_length - self.to_edge;
        self.base_db + berg_diffraction_loss(self.to_edge, d2, wavelength, self.angle)
    }
}

/// Mutable record of one marching ray.
#[derive(Debug, Clone, PartialEq)]
pub struct RayState {
    pub position: Point,
    /// Direction scaled to one grid step.
    pub direction: Vector,
    pub bounces: usize,
    /// Power at the last free-space sample (dBm).
    pub power_dbm: f64,
    pub last: Surface,
    /// Where the current straight segment began.
    pub segment_start: Point,
    /// Length of all segments before the current one.
    pub prior_length: f64,
    /// Product of all reflection factors so far.
    pub reflection: f64,
    pub edge_loss: Option<EdgeLoss>,
    /// Number of edges this ray has diffracted at.
    pub order: usize,
}

impl RayState {
    /// A fresh ray one step away from `origin`.
    pub fn launch(origin: Point, direction: Vector) -> Self {
        Self {
            position: origin + direction,
            direction,
            bounces: 0,
            power_dbm: 0.0,
            last: Surface::None,
            segment_start: origin,
            prior_length: 0.0,
            reflection: 1.0,
            edge_loss: None,
            order: 0,
        }
    }

    /// Total unfolded path length up to the current position.
    pub fn path_length(&self) -> f64 {
        self.prior_length + self.segment_start.distance(&self.position)
    }

    /// Closes the current segment at the current position.
    pub fn flush_segment(&mut self) {
        self.prior_length += self.segment_start.distance(&self.position);
        self.segment_start = self.position;
    }

    pub fn advance(&mut self) {
        self.position = self.position + self.direction;
    }

    /// Voxel containing the current position.
    pub fn voxel(&self, step: f64) -> (i64, i64, i64) {
        (
            (self.position.x / step).round() as i64,
            (self.position.y / step).round() as i64,
            (self.position.z / step).round() as i64,
        )
    }

    pub fn loss_db(&self, wavelength: f64) -> f64 {
        self.edge_loss
            .map(|e| e.loss_db(self.path_length(), wavelength))
            .unwrap_or(0.0)
    }
}

/// A unit of work for the casting loop: a ray plus its launch-time rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RayTask {
    pub state: RayState,
    /// Walls of the edge this ray was diffracted at. They neither reflect
    /// nor re-trigger the ray.
    pub ignored_walls: BTreeSet<u32>,
    /// Upward sub-ray leaving a roof edge: roofs do not reflect it.
    pub skip_roof: bool,
    /// Upward sub-ray: stops once it has touched a roof.
    pub stop_after_roof: bool,
    /// Slot in the tracked-ray list, if recorded.
    pub tracked: Option<usize>,
}

impl RayTask {
    pub fn new(state: RayState, tracked: Option<usize>) -> Self {
        Self {
            state,
            ignored_walls: BTreeSet::new(),
            skip_roof: false,
            stop_after_roof: false,
            tracked,
        }
    }

    pub fn ignores(&self, wall_id: u32) -> bool {
        self.ignored_walls.contains(&wall_id)
    }
}

/// One recorded sample of a tracked ray: voxel indices and received power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub power: f64,
}

pub type RayPath = Vec<RayPoint>;
