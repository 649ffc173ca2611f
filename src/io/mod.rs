//! File I/O for scenes, footprints and simulation documents.
//!
//! Scene grids use a headerless little-endian `f64` layout shared with the
//! external interior-fill step; everything else is JSON.

pub mod geojson;
pub mod grid_file;
pub mod interior_fill;
pub mod json;
pub mod normals;

pub use grid_file::{read_grid, write_grid};
pub use interior_fill::{ExternalInteriorFill, InteriorFill, SkipInteriorFill};
pub use json::{read_json, write_json};
