use serde::{Deserialize, Serialize};

use crate::Vector;

/// Horizontal unit normal of a wall, indexed by wall id. `nz` is always 0.
///
/// Expressed in grid index space, the same (x, y) frame rays march in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallNormal {
    pub nx: f64,
    pub ny: f64,
    pub nz: f64,
}

impl WallNormal {
    pub fn new(nx: f64, ny: f64) -> Self {
        Self { nx, ny, nz: 0.0 }
    }

    /// Normal of a wall whose grid projection spans (dx, dy): `normalize(-dy, dx)`.
    ///
    /// Returns `None` for a zero-length projection.
    pub fn from_span(dx: i64, dy: i64) -> Option<Self> {
        let v = Vector::new(-dy as f64, dx as f64, 0.0).normalize()?;
        Some(Self::new(v.dx, v.dy))
    }

    pub fn as_vector(&self) -> Vector {
        Vector::new(self.nx, self.ny, self.nz)
    }

    /// Angle between two normals in degrees.
    pub fn angle_deg(&self, other: &Self) -> f64 {
        let cos = self.as_vector().dot(other.as_vector()).clamp(-1.0, 1.0);
        cos.acos().to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_span_is_orthogonal_unit() {
        for (dx, dy) in [(3, 0), (0, -5), (4, 3), (-7, 2)] {
            let n = WallNormal::from_span(dx, dy).unwrap();
            let dir = Vector::new(dx as f64, dy as f64, 0.0);
            assert!(n.as_vector().dot(dir).abs() < 1e-12);
            assert!((n.as_vector().length() - 1.0).abs() < 1e-12);
            assert_eq!(n.nz, 0.0);
        }
    }

    #[test]
    fn test_zero_span_has_no_normal() {
        assert!(WallNormal::from_span(0, 0).is_none());
    }

    #[test]
    fn test_angle_deg() {
        let a = WallNormal::new(1.0, 0.0);
        let b = WallNormal::new(0.0, 1.0);
        assert!((a.angle_deg(&b) - 90.0).abs() < 1e-9);
        assert!(a.angle_deg(&a).abs() < 1e-6);
        let c = WallNormal::new(-1.0, 0.0);
        assert!((a.angle_deg(&c) - 180.0).abs() < 1e-6);
    }
}
