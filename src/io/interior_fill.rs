//! Building interior fill.
//!
//! The fill step takes the raw voxel file written by the voxelizer and
//! produces a processed file where enclosed building interiors are marked
//! with the interior code. Any tool honouring this file contract can be
//! plugged in.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

use crate::scene::grid::Dims;

/// A step turning a raw grid file into a processed one with interiors filled.
pub trait InteriorFill {
    fn fill(&self, raw: &Path, processed: &Path, dims: Dims) -> Result<()>;
}

/// Runs an external program:
/// `program [args..] --input <raw> --output <processed> --dims <nz>,<ny>,<nx>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalInteriorFill {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ExternalInteriorFill {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl InteriorFill for ExternalInteriorFill {
    fn fill(&self, raw: &Path, processed: &Path, dims: Dims) -> Result<()> {
        let (nz, ny, nx) = dims.shape();
        let dims_arg = format!("{nz},{ny},{nx}");
        info!("Running interior fill: {} {:?}", self.program, self.args);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--input")
            .arg(raw)
            .arg("--output")
            .arg(processed)
            .arg("--dims")
            .arg(&dims_arg)
            .output()
            .with_context(|| format!("Failed to start interior fill program: {}", self.program))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!("Interior fill stdout: {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            warn!("Interior fill stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            bail!(
                "Interior fill program {} failed ({}): {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }
        if !processed.exists() {
            bail!(
                "Interior fill program {} did not produce {}",
                self.program,
                processed.display()
            );
        }

        Ok(())
    }
}

/// Leaves the grid as voxelized: interiors stay free space.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipInteriorFill;

impl InteriorFill for SkipInteriorFill {
    fn fill(&self, raw: &Path, processed: &Path, _dims: Dims) -> Result<()> {
        std::fs::copy(raw, processed).with_context(|| {
            format!("Failed to copy {} to {}", raw.display(), processed.display())
        })?;
        Ok(())
    }
}
