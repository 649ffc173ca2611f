//! Radio coverage by 3D ray launching over a voxel scene.
//!
//! A fixed bundle of rays is marched voxel by voxel from the transmitter.
//! Rays reflect off walls, roofs and the ground, fan out at building edges,
//! and deposit received power into a max-hold [`PowerMap`](power_map::PowerMap).

pub mod config;
pub mod diffraction;
pub mod engine;
pub mod legend;
pub mod power_map;
pub mod propagation;
pub mod ray;
pub mod reflection;
