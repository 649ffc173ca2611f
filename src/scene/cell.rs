//! Voxel cell semantics and their numeric encoding.
//!
//! Inside the crate every voxel is a [`Cell`]. The flat `f64` encoding only
//! exists at the file boundary shared with the interior-fill step.

use anyhow::{Result, bail};

/// Code of a free-space voxel that no ray has reached (dBm).
pub const UNVISITED_DBM: f64 = -150.0;
/// Wall surfaces are encoded as `WALL_CODE_BASE + wall_id`.
pub const WALL_CODE_BASE: f64 = 1000.0;
pub const ROOF_CODE: f64 = 5000.0;
pub const CORNER_CODE: f64 = 10000.0;
pub const ROOF_CORNER_CODE: f64 = 10001.0;
pub const INTERIOR_CODE: f64 = 20000.0;

/// Wall ids must stay below the roof code.
pub const MAX_WALLS: usize = (ROOF_CODE - WALL_CODE_BASE) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Free space.
    #[default]
    Empty,
    /// Surface of the wall with this id (index into the normals).
    Wall(u32),
    /// Vertical diffracting edge.
    Corner,
    /// Horizontal roof or ceiling surface.
    Roof,
    /// Edge where a wall meets the roof plane.
    RoofCorner,
    /// Opaque building interior.
    Interior,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Numeric code used in grid files.
    pub fn encode(&self) -> f64 {
        match self {
            Cell::Empty => UNVISITED_DBM,
            Cell::Wall(id) => WALL_CODE_BASE + f64::from(*id),
            Cell::Corner => CORNER_CODE,
            Cell::Roof => ROOF_CODE,
            Cell::RoofCorner => ROOF_CORNER_CODE,
            Cell::Interior => INTERIOR_CODE,
        }
    }

    /// Parses a numeric code. Any negative value is free space.
    pub fn decode(code: f64) -> Result<Self> {
        if code < 0.0 {
            return Ok(Cell::Empty);
        }
        let cell = if code == ROOF_CODE {
            Cell::Roof
        } else if code == CORNER_CODE {
            Cell::Corner
        } else if code == ROOF_CORNER_CODE {
            Cell::RoofCorner
        } else if code == INTERIOR_CODE {
            Cell::Interior
        } else if (WALL_CODE_BASE..ROOF_CODE).contains(&code) && code.fract() == 0.0 {
            Cell::Wall((code - WALL_CODE_BASE) as u32)
        } else {
            bail!("Unknown voxel code: {code}");
        };
        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_disjoint() {
        let cells = [
            Cell::Empty,
            Cell::Wall(0),
            Cell::Wall(3999),
            Cell::Corner,
            Cell::Roof,
            Cell::RoofCorner,
            Cell::Interior,
        ];
        for (i, a) in cells.iter().enumerate() {
            for b in cells.iter().skip(i + 1) {
                assert_ne!(a.encode(), b.encode(), "{a:?} and {b:?} share a code");
            }
            assert_eq!(Cell::decode(a.encode()).unwrap(), *a);
        }
    }

    #[test]
    fn test_any_negative_value_is_free_space() {
        assert_eq!(Cell::decode(-160.0).unwrap(), Cell::Empty);
        assert_eq!(Cell::decode(-0.5).unwrap(), Cell::Empty);
    }

    #[test]
    fn test_unknown_codes_are_rejected() {
        assert!(Cell::decode(0.0).is_err());
        assert!(Cell::decode(999.0).is_err());
        assert!(Cell::decode(1000.5).is_err());
        assert!(Cell::decode(7000.0).is_err());
        assert!(Cell::decode(f64::NAN).is_err());
    }

    #[test]
    fn test_max_walls() {
        assert_eq!(MAX_WALLS, 4000);
        assert_eq!(Cell::decode(4999.0).unwrap(), Cell::Wall(3999));
    }
}
