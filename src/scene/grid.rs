use anyhow::{Result, anyhow};
use ndarray::{Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// Grid extent in voxels. Storage order is (z, y, x), z outermost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl Dims {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// Square map with `levels` floors.
    pub fn square(size: usize, levels: usize) -> Self {
        Self::new(size, size, levels)
    }

    /// Shape in storage order, as expected by `ndarray`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nz, self.ny, self.nx)
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the flat little-endian `f64` file for this grid.
    pub fn byte_len(&self) -> u64 {
        self.len() as u64 * std::mem::size_of::<f64>() as u64
    }

    /// Converts signed voxel indices, returning `None` outside the grid.
    pub fn index(&self, x: i64, y: i64, z: i64) -> Option<(usize, usize, usize)> {
        let inside = |v: i64, n: usize| v >= 0 && (v as usize) < n;
        if inside(x, self.nx) && inside(y, self.ny) && inside(z, self.nz) {
            Some((x as usize, y as usize, z as usize))
        } else {
            None
        }
    }
}

/// Dense voxel scene: walls, edges, roofs and interiors.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGrid {
    cells: Array3<Cell>,
}

impl SceneGrid {
    /// Creates a grid of free space.
    pub fn new(dims: Dims) -> Self {
        Self {
            cells: Array3::from_elem(dims.shape(), Cell::Empty),
        }
    }

    pub fn dims(&self) -> Dims {
        let (nz, ny, nx) = self.cells.dim();
        Dims::new(nx, ny, nz)
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<Cell> {
        self.cells.get((z, y, x)).copied()
    }

    /// Like [`SceneGrid::get`] but with signed indices.
    pub fn get_signed(&self, x: i64, y: i64, z: i64) -> Option<Cell> {
        let (x, y, z) = self.dims().index(x, y, z)?;
        self.get(x, y, z)
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, cell: Cell) {
        if let Some(c) = self.cells.get_mut((z, y, x)) {
            *c = cell;
        }
    }

    /// One floor as a (y, x) view.
    pub fn floor(&self, z: usize) -> ArrayView2<'_, Cell> {
        self.cells.index_axis(Axis(0), z)
    }

    /// Cells with their (x, y, z) indices.
    pub fn indexed_iter(&self) -> impl Iterator<Item = ((usize, usize, usize), &Cell)> {
        self.cells
            .indexed_iter()
            .map(|((z, y, x), cell)| ((x, y, z), cell))
    }

    /// Numeric codes in storage order.
    pub fn to_codes(&self) -> Vec<f64> {
        self.cells.iter().map(Cell::encode).collect()
    }

    /// Builds a grid from numeric codes in storage order.
    pub fn from_codes(dims: Dims, codes: &[f64]) -> Result<Self> {
        if codes.len() != dims.len() {
            return Err(anyhow!(
                "Expected {} voxel codes for {:?}, got {}",
                dims.len(),
                dims,
                codes.len()
            ));
        }
        let cells = codes
            .iter()
            .enumerate()
            .map(|(i, &code)| {
                Cell::decode(code).map_err(|e| anyhow!("Voxel {i} of {dims:?}: {e}"))
            })
            .collect::<Result<Vec<Cell>>>()?;
        let cells = Array3::from_shape_vec(dims.shape(), cells)?;
        Ok(Self { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_order_is_z_y_x() {
        let dims = Dims::new(3, 2, 2);
        let mut grid = SceneGrid::new(dims);
        grid.set(2, 1, 0, Cell::Wall(7));
        grid.set(0, 0, 1, Cell::Roof);
        let codes = grid.to_codes();
        assert_eq!(codes.len(), 12);
        // (x=2, y=1, z=0) -> 0*6 + 1*3 + 2
        assert_eq!(codes[5], 1007.0);
        // (x=0, y=0, z=1) -> 1*6
        assert_eq!(codes[6], 5000.0);
        let back = SceneGrid::from_codes(dims, &codes).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_from_codes_length_mismatch() {
        let dims = Dims::new(2, 2, 1);
        assert!(SceneGrid::from_codes(dims, &[-150.0; 3]).is_err());
    }

    #[test]
    fn test_signed_access_outside() {
        let grid = SceneGrid::new(Dims::square(3, 3));
        assert_eq!(grid.get_signed(-1, 0, 0), None);
        assert_eq!(grid.get_signed(0, 3, 0), None);
        assert_eq!(grid.get_signed(2, 2, 2), Some(Cell::Empty));
    }

    #[test]
    fn test_byte_len() {
        assert_eq!(Dims::new(250, 250, 30).byte_len(), 250 * 250 * 30 * 8);
    }
}
