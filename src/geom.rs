pub mod bounds;
pub mod building;
pub mod features;
pub mod point;
pub mod vector;
pub mod wall;

/// Geometric precision
const EPS: f64 = 1e-13;
