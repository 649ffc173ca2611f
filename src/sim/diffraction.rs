//! Sub-ray fans spawned where a ray grazes a building edge.
//!
//! At a vertical edge the incident direction is swept azimuthally towards
//! the shadow boundary of the wedge face it grazes. At a roof edge it is
//! tilted in z, downwards over the edge or back to horizontal.

use std::f64::consts::FRAC_PI_2;

use crate::Vector;
use crate::scene::cell::Cell;
use crate::scene::normals::WallNormal;

/// Radius (voxels) searched for the walls that form an edge.
pub const EDGE_SEARCH_RADIUS: i64 = 3;

/// One sub-ray of a fan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanRay {
    /// Direction scaled like the incident one.
    pub direction: Vector,
    /// Deviation from the incident direction used for the edge loss (radians).
    pub angle: f64,
}

/// Builds the fan for an edge cell. Returns no rays for non-edge cells,
/// fans narrower than two rays, or a vertical edge with no wall nearby.
pub fn edge_fan(
    edge: Cell,
    incident: Vector,
    normals: &[WallNormal],
    fan_width: usize,
) -> Vec<FanRay> {
    if fan_width < 2 {
        return Vec::new();
    }
    match edge {
        Cell::Corner => vertical_edge_fan(incident, normals, fan_width),
        Cell::RoofCorner => roof_edge_fan(incident, fan_width),
        _ => Vec::new(),
    }
}

/// Wedge face the ray grazes: the wall normal, turned to face the ray,
/// most aligned with the incident direction.
fn grazed_face(dir: Vector, normals: &[WallNormal]) -> Option<Vector> {
    let mut best: Option<(f64, Vector)> = None;
    for n in normals {
        let facing = -n.as_vector();
        let dot = dir.dot(facing);
        if best.is_none_or(|(b, _)| dot > b) {
            best = Some((dot, facing));
        }
    }
    best.map(|(_, n)| n)
}

/// Signed azimuthal increment between consecutive sub-rays.
///
/// The sign follows the rotation from the face normal to the incident
/// direction; when they are aligned the sign of `final_angle` is kept.
pub fn angular_step(normal: Vector, dir: Vector, final_angle: f64, steps: usize) -> f64 {
    if steps == 0 {
        return 0.0;
    }
    let (Some(n), Some(d)) = (
        Vector::new(normal.dx, normal.dy, 0.0).normalize(),
        Vector::new(dir.dx, dir.dy, 0.0).normalize(),
    ) else {
        return 0.0;
    };
    let angle = (n.dx * d.dy - n.dy * d.dx).atan2(n.dx * d.dx + n.dy * d.dy);
    if angle.abs() < 1e-12 {
        final_angle / steps as f64
    } else {
        (final_angle.abs() / steps as f64).copysign(angle)
    }
}

fn vertical_edge_fan(incident: Vector, normals: &[WallNormal], fan_width: usize) -> Vec<FanRay> {
    let step_len = incident.length();
    let Some(dir) = incident.normalize() else {
        return Vec::new();
    };
    let Some(face) = grazed_face(dir, normals) else {
        return Vec::new();
    };

    let theta = dir.dot(face).clamp(-1.0, 1.0).acos();
    let cross = dir.dx * -face.dy - dir.dy * face.dx;
    let mut final_angle = FRAC_PI_2 - theta;
    if cross < 0.0 {
        final_angle = -final_angle;
    }

    let steps = fan_width - 1;
    let one_step = angular_step(face, dir, final_angle, steps);
    let swept = final_angle.abs();

    (0..=steps)
        .filter_map(|k| {
            let d = dir.rotate_z(k as f64 * one_step).normalize()?;
            Some(FanRay {
                direction: d * step_len,
                angle: k as f64 / steps as f64 * swept,
            })
        })
        .collect()
}

fn roof_edge_fan(incident: Vector, fan_width: usize) -> Vec<FanRay> {
    let step_len = incident.length();
    let Some(dir) = incident.normalize() else {
        return Vec::new();
    };

    let descending = dir.dz < 0.0;
    let (theta, end_dz) = if descending {
        ((-dir.dz).clamp(-1.0, 1.0).acos(), -1.0)
    } else {
        (dir.dz.clamp(-1.0, 1.0).acos(), 0.0)
    };

    let steps = fan_width - 1;
    let one_step = (end_dz - dir.dz) / steps as f64;
    let swept = FRAC_PI_2 - theta;

    (0..=steps)
        .filter_map(|k| {
            let dz = dir.dz + k as f64 * one_step;
            // Going over the edge the horizontal part shrinks towards a vertical drop
            let shrink = if descending {
                1.0 - k as f64 / (steps + 1) as f64
            } else {
                1.0
            };
            let d = Vector::new(dir.dx * shrink, dir.dy * shrink, dz).normalize()?;
            Some(FanRay {
                direction: d * step_len,
                angle: k as f64 / steps as f64 * swept,
            })
        })
        .collect()
}
