use std::f64::consts::FRAC_PI_2;

use crate::Vector;

/// Surface materials with their relative permittivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    Concrete,
    CeilingBoard,
    MediumDryGround,
}

impl Material {
    pub fn permittivity(&self) -> f64 {
        match self {
            Material::Concrete => 5.31,
            Material::CeilingBoard => 1.50,
            Material::MediumDryGround => 15.0,
        }
    }

    /// Power reflection factor for a given angle of incidence (radians from the normal).
    pub fn reflection_factor(&self, incidence: f64) -> f64 {
        fresnel_factor(incidence, self.permittivity())
    }
}

/// Mean of the squared TE and TM Fresnel coefficients.
///
/// Angles beyond 90 degrees are folded back, so either side of a surface
/// gives the same factor.
pub fn fresnel_factor(incidence: f64, permittivity: f64) -> f64 {
    let angle = if incidence > FRAC_PI_2 {
        std::f64::consts::PI - incidence
    } else {
        incidence
    };
    let (sin, cos) = angle.sin_cos();
    let cos = cos.clamp(-1.0, 1.0);
    let root = (permittivity - sin * sin).max(0.0).sqrt();

    let r_te = (cos - root) / (cos + root);
    let r_tm = (permittivity * cos - root) / (permittivity * cos + root);
    (r_te.powi(2) + r_tm.powi(2)) / 2.0
}

/// Angle between a direction and a surface normal, in `[0, pi/2]`.
pub fn incidence_angle(direction: Vector, normal: Vector) -> f64 {
    let len = direction.length() * normal.length();
    if len == 0.0 {
        return 0.0;
    }
    (direction.dot(normal).abs() / len).clamp(-1.0, 1.0).acos()
}

/// Defines how rays bounce off surfaces.
pub trait ReflectionModel {
    /// Computes the reflected direction given incident direction and surface normal.
    fn reflect(&self, incident: Vector, normal: Vector) -> Vector;
}

/// Perfect specular (mirror) reflection.
///
/// The normal is turned to face the incoming ray first, so its orientation
/// does not matter.
pub struct Specular;

impl ReflectionModel for Specular {
    fn reflect(&self, incident: Vector, normal: Vector) -> Vector {
        let facing = if incident.dot(normal) > 0.0 {
            -normal
        } else {
            normal
        };
        incident.reflect(facing)
    }
}
