//! Rasterization of building walls into the voxel scene.
//!
//! Walls are stepped across the (x, y) grid and extruded from the ground up
//! to their height. Where two different walls claim the same voxel the
//! junction is either promoted to a diffracting edge or treated as a
//! continuation of the same surface, depending on the angle between the
//! walls' normals.

use anyhow::{Result, bail};
use log::{debug, info};

use super::Scene;
use super::cell::{Cell, MAX_WALLS};
use super::grid::{Dims, SceneGrid};
use super::normals::WallNormal;
use crate::geom::bounds::GeoBounds;
use crate::{Building, Wall};

/// Junctions with a normal angle strictly inside this range become corners.
pub const CORNER_MIN_DEG: f64 = 40.0;
pub const CORNER_MAX_DEG: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Junction {
    /// A real edge that diffracts rays.
    Corner,
    /// Same planar surface; the newer wall overwrites the voxel.
    Continuation,
}

/// Classifies the meeting point of two walls from their normals.
pub fn classify_junction(a: &WallNormal, b: &WallNormal) -> Junction {
    let angle = a.angle_deg(b);
    if angle > CORNER_MIN_DEG && angle < CORNER_MAX_DEG {
        Junction::Corner
    } else {
        Junction::Continuation
    }
}

/// Counters reported after voxelization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoxelStats {
    pub walls: usize,
    pub outside: usize,
    pub degenerate: usize,
    pub corners: usize,
}

pub struct Voxelizer {
    pub bounds: GeoBounds,
    pub size: usize,
    pub height_levels: usize,
}

impl Voxelizer {
    pub fn new(bounds: GeoBounds, size: usize, height_levels: usize) -> Self {
        Self {
            bounds,
            size,
            height_levels,
        }
    }

    pub fn dims(&self) -> Dims {
        Dims::square(self.size, self.height_levels)
    }

    /// Rasterizes all buildings into a fresh scene.
    ///
    /// Wall ids follow building/wall order and skipped walls do not consume one.
    pub fn voxelize(&self, buildings: &[Building]) -> Result<Scene> {
        let (scene, stats) = self.voxelize_with_stats(buildings)?;
        info!(
            "Voxelized {} walls into {:?} ({} corners, {} outside bounds, {} degenerate)",
            stats.walls, scene.dims(), stats.corners, stats.outside, stats.degenerate
        );
        Ok(scene)
    }

    pub fn voxelize_with_stats(&self, buildings: &[Building]) -> Result<(Scene, VoxelStats)> {
        let mut grid = SceneGrid::new(self.dims());
        let mut normals: Vec<WallNormal> = Vec::new();
        let mut stats = VoxelStats::default();

        for building in buildings {
            for wall in &building.walls {
                let Some((x1, y1, x2, y2)) = self.wall_indices(wall) else {
                    debug!("Wall of {} lies outside the map bounds", building.name);
                    stats.outside += 1;
                    continue;
                };
                let Some(normal) = WallNormal::from_span(x2 - x1, y2 - y1) else {
                    stats.degenerate += 1;
                    continue;
                };
                if normals.len() >= MAX_WALLS {
                    bail!("Scene exceeds the maximum of {MAX_WALLS} walls");
                }

                let id = normals.len() as u32;
                normals.push(normal);
                let z_top = self.top_level(wall.height());
                for (x, y) in raster_line(x1, y1, x2, y2) {
                    let Some((x, y, _)) = grid.dims().index(x, y, 0) else {
                        continue;
                    };
                    for z in 0..=z_top {
                        if place_wall(&mut grid, &normals, x, y, z, id) {
                            stats.corners += 1;
                        }
                    }
                }
                stats.walls += 1;
            }
        }

        Ok((Scene::new(grid, normals)?, stats))
    }

    /// Grid indices of both endpoints, or `None` if either falls outside.
    fn wall_indices(&self, wall: &Wall) -> Option<(i64, i64, i64, i64)> {
        let (x1, y1) = self
            .bounds
            .to_grid_index(wall.start.x, wall.start.y, self.size)?;
        let (x2, y2) = self.bounds.to_grid_index(wall.end.x, wall.end.y, self.size)?;
        Some((x1 as i64, y1 as i64, x2 as i64, y2 as i64))
    }

    fn top_level(&self, height: f64) -> usize {
        let top = height.round().max(0.0) as usize;
        top.min(self.height_levels.saturating_sub(1))
    }
}

/// Writes a wall id into a voxel, resolving collisions with other walls.
///
/// Returns true when the write created a new corner.
fn place_wall(
    grid: &mut SceneGrid,
    normals: &[WallNormal],
    x: usize,
    y: usize,
    z: usize,
    id: u32,
) -> bool {
    let new_cell = match grid.get(x, y, z) {
        Some(Cell::Wall(other)) if other != id => {
            match classify_junction(&normals[other as usize], &normals[id as usize]) {
                Junction::Corner => Cell::Corner,
                Junction::Continuation => Cell::Wall(id),
            }
        }
        Some(Cell::Corner) => return false,
        _ => Cell::Wall(id),
    };
    grid.set(x, y, z, new_cell);
    new_cell == Cell::Corner
}

/// Grid cells covered by a wall between two voxel indices.
///
/// Axis-aligned walls are a direct span. Diagonal walls use proportional
/// stepping, and every diagonal move also covers the L-corner cell so that
/// no ray can slip through between two diagonal neighbours.
pub fn raster_line(x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<(i64, i64)> {
    if x1 == x2 {
        let (lo, hi) = (y1.min(y2), y1.max(y2));
        return (lo..=hi).map(|y| (x1, y)).collect();
    }
    if y1 == y2 {
        let (lo, hi) = (x1.min(x2), x1.max(x2));
        return (lo..=hi).map(|x| (x, y1)).collect();
    }

    let dx = x2 - x1;
    let dy = y2 - y1;
    let steps = dx.abs().max(dy.abs());
    let mut cells = Vec::with_capacity(2 * steps as usize + 1);
    let (mut prev_x, mut prev_y) = (x1, y1);
    for j in 0..=steps {
        let x = x1 + dx * j / steps;
        let y = y1 + dy * j / steps;
        if prev_y != y {
            if prev_x < x {
                cells.push((prev_x, y));
            } else if prev_x > x {
                cells.push((x, prev_y));
            }
        }
        cells.push((x, y));
        prev_x = x;
        prev_y = y;
    }
    cells
}
