//! Voxel scene: semantic grid plus the wall normals it references.

pub mod cell;
pub mod grid;
pub mod normals;
pub mod roof;
pub mod voxelizer;

use anyhow::{Result, bail};
use std::collections::BTreeMap;

use self::cell::Cell;
use self::grid::{Dims, SceneGrid};
use self::normals::WallNormal;

/// Read-only scene handed to the ray engine.
///
/// Every `Cell::Wall` id is guaranteed to index into `normals`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    grid: SceneGrid,
    normals: Vec<WallNormal>,
}

impl Scene {
    pub fn new(grid: SceneGrid, normals: Vec<WallNormal>) -> Result<Self> {
        for ((x, y, z), cell) in grid.indexed_iter() {
            if let Cell::Wall(id) = cell
                && *id as usize >= normals.len()
            {
                bail!(
                    "Voxel ({x}, {y}, {z}) references wall {id} but only {} normals are known",
                    normals.len()
                );
            }
        }
        Ok(Self { grid, normals })
    }

    pub fn grid(&self) -> &SceneGrid {
        &self.grid
    }

    pub fn normals(&self) -> &[WallNormal] {
        &self.normals
    }

    pub fn dims(&self) -> Dims {
        self.grid.dims()
    }

    pub fn normal(&self, wall_id: u32) -> Option<&WallNormal> {
        self.normals.get(wall_id as usize)
    }

    /// Distinct walls within a cube of `radius` voxels around a voxel, by id.
    pub fn walls_near(&self, x: i64, y: i64, z: i64, radius: i64) -> BTreeMap<u32, WallNormal> {
        let mut found = BTreeMap::new();
        for dz in -radius..=radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if let Some(Cell::Wall(id)) = self.grid.get_signed(x + dx, y + dy, z + dz)
                        && let Some(n) = self.normal(id)
                    {
                        found.entry(id).or_insert(*n);
                    }
                }
            }
        }
        found
    }
}
