//! Roof capping of filled building interiors.
//!
//! Runs after the interior fill: the topmost interior voxel of each column
//! becomes a roof surface, and wall tops bordering a roof become roof edges.

use super::cell::Cell;
use super::grid::SceneGrid;

const NEIGHBOURS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoofStats {
    pub roofs: usize,
    pub roof_corners: usize,
}

/// Level of the highest non-empty voxel in a column.
fn column_top(grid: &SceneGrid, x: usize, y: usize) -> Option<usize> {
    let nz = grid.dims().nz;
    (0..nz)
        .rev()
        .find(|&z| grid.get(x, y, z).is_some_and(|c| !c.is_empty()))
}

/// Caps every building interior with roof voxels and marks roof edges.
pub fn cap_roofs(grid: &mut SceneGrid) -> RoofStats {
    let dims = grid.dims();
    let mut stats = RoofStats::default();

    let mut tops = Vec::with_capacity(dims.nx * dims.ny);
    for y in 0..dims.ny {
        for x in 0..dims.nx {
            if let Some(z) = column_top(grid, x, y) {
                tops.push((x, y, z));
            }
        }
    }

    for &(x, y, z) in &tops {
        if grid.get(x, y, z) == Some(Cell::Interior) {
            grid.set(x, y, z, Cell::Roof);
            stats.roofs += 1;
        }
    }

    for &(x, y, z) in &tops {
        let top = grid.get(x, y, z);
        if !matches!(top, Some(Cell::Wall(_)) | Some(Cell::Corner)) {
            continue;
        }
        let borders_roof = NEIGHBOURS.iter().any(|(dx, dy)| {
            grid.get_signed(x as i64 + dx, y as i64 + dy, z as i64) == Some(Cell::Roof)
        });
        if borders_roof {
            grid.set(x, y, z, Cell::RoofCorner);
            stats.roof_corners += 1;
        }
    }

    stats
}
