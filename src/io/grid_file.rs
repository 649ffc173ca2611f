//! Flat voxel grid files.
//!
//! A grid file is a headerless sequence of little-endian `f64` values in
//! (z, y, x) order, z outermost. The file length must match the grid
//! dimensions exactly.

use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::scene::grid::{Dims, SceneGrid};

const VALUE_BYTES: usize = std::mem::size_of::<f64>();

/// Writes raw values in storage order.
pub fn write_values(path: &Path, values: &[f64]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for v in values {
        writer.write_all(&v.to_le_bytes())?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write grid file: {}", path.display()))?;

    Ok(())
}

/// Reads raw values, failing unless the file holds exactly `dims.len()` of them.
pub fn read_values(path: &Path, dims: Dims) -> Result<Vec<f64>> {
    let actual = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat file: {}", path.display()))?
        .len();
    let expected = dims.byte_len();
    if actual != expected {
        bail!(
            "Grid file {} has {} bytes, expected {} for {}x{}x{} voxels",
            path.display(),
            actual,
            expected,
            dims.nx,
            dims.ny,
            dims.nz
        );
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let mut values = Vec::with_capacity(dims.len());
    let mut buf = [0u8; VALUE_BYTES];
    for _ in 0..dims.len() {
        reader
            .read_exact(&mut buf)
            .with_context(|| format!("Truncated grid file: {}", path.display()))?;
        values.push(f64::from_le_bytes(buf));
    }

    Ok(values)
}

/// Writes a scene grid as cell codes.
pub fn write_grid(path: &Path, grid: &SceneGrid) -> Result<()> {
    write_values(path, &grid.to_codes())
}

/// Reads a scene grid of the given dimensions.
pub fn read_grid(path: &Path, dims: Dims) -> Result<SceneGrid> {
    let codes = read_values(path, dims)?;
    SceneGrid::from_codes(dims, &codes)
        .with_context(|| format!("Invalid voxel codes in {}", path.display()))
}
