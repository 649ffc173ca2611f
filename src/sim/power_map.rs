use ndarray::{Array3, Zip};

use crate::scene::cell::UNVISITED_DBM;
use crate::scene::grid::{Dims, SceneGrid};

/// Max-hold received power per voxel, with an explicit visited flag.
///
/// Same shape and (z, y, x) storage order as the scene grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerMap {
    power: Array3<f64>,
    visited: Array3<bool>,
}

impl PowerMap {
    pub fn new(dims: Dims) -> Self {
        Self {
            power: Array3::from_elem(dims.shape(), UNVISITED_DBM),
            visited: Array3::from_elem(dims.shape(), false),
        }
    }

    pub fn dims(&self) -> Dims {
        let (nz, ny, nx) = self.power.dim();
        Dims::new(nx, ny, nz)
    }

    /// Keeps the stronger of the stored and the new value.
    ///
    /// Returns `true` if the voxel changed. Out-of-grid writes are ignored.
    pub fn record(&mut self, x: usize, y: usize, z: usize, dbm: f64) -> bool {
        let (Some(power), Some(visited)) = (
            self.power.get_mut((z, y, x)),
            self.visited.get_mut((z, y, x)),
        ) else {
            return false;
        };
        if !*visited || dbm > *power {
            *power = dbm;
            *visited = true;
            true
        } else {
            false
        }
    }

    /// Stored power, if any ray reached the voxel.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f64> {
        match self.visited.get((z, y, x)) {
            Some(true) => self.power.get((z, y, x)).copied(),
            _ => None,
        }
    }

    pub fn is_visited(&self, x: usize, y: usize, z: usize) -> bool {
        self.visited.get((z, y, x)).copied().unwrap_or(false)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|v| **v).count()
    }

    /// Element-wise max with another map of the same shape.
    pub fn merge(&mut self, other: &PowerMap) {
        Zip::from(&mut self.power)
            .and(&mut self.visited)
            .and(&other.power)
            .and(&other.visited)
            .for_each(|p, v, &op, &ov| {
                if ov && (!*v || op > *p) {
                    *p = op;
                    *v = true;
                }
            });
    }

    /// Per-floor `[z][y][x]` slices: dBm where visited, the unvisited code
    /// for untouched free space and the cell code for solid voxels.
    pub fn to_floor_slices(&self, grid: &SceneGrid) -> Vec<Vec<Vec<f64>>> {
        let dims = self.dims();
        (0..dims.nz)
            .map(|z| {
                (0..dims.ny)
                    .map(|y| {
                        (0..dims.nx)
                            .map(|x| match (self.get(x, y, z), grid.get(x, y, z)) {
                                (_, Some(cell)) if !cell.is_empty() => cell.encode(),
                                (Some(dbm), _) => dbm,
                                _ => UNVISITED_DBM,
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }
}
