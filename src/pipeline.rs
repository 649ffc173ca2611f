//! End-to-end run: footprints to voxel scene to coverage response.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Building;
use crate::geom::bounds::GeoBounds;
use crate::io::geojson::read_buildings;
use crate::io::grid_file::{read_grid, write_grid};
use crate::io::interior_fill::{ExternalInteriorFill, InteriorFill, SkipInteriorFill};
use crate::io::json::{read_json, write_json};
use crate::io::normals::{read_normals, write_normals};
use crate::request::{SimulationRequest, SimulationResponse};
use crate::scene::Scene;
use crate::scene::grid::Dims;
use crate::scene::roof::cap_roofs;
use crate::scene::voxelizer::Voxelizer;
use crate::sim::engine::cast;

pub const RAW_GRID_FILE: &str = "walls3D.bin";
pub const PROCESSED_GRID_FILE: &str = "walls3D_processed.bin";
pub const NORMALS_FILE: &str = "wallNormals3D.json";

pub const DEFAULT_HEIGHT_LEVELS: usize = 30;

fn default_height_levels() -> usize {
    DEFAULT_HEIGHT_LEVELS
}

fn default_cap_roofs() -> bool {
    true
}

/// Run configuration, read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunConfig {
    /// GeoJSON feature collection with building footprints.
    pub buildings: PathBuf,
    pub bounds: GeoBounds,
    /// Grid size along x and y (voxels).
    pub size: usize,
    #[serde(default = "default_height_levels")]
    pub height_levels: usize,
    /// Directory for the scene files.
    pub work_dir: PathBuf,
    /// External interior-fill program. Without one interiors stay open.
    #[serde(default)]
    pub interior_fill: Option<ExternalInteriorFill>,
    #[serde(default = "default_cap_roofs")]
    pub cap_roofs: bool,
    /// Simulation request (JSON).
    pub request: PathBuf,
    /// Where the response JSON is written.
    pub output: PathBuf,
}

impl RunConfig {
    /// Loads a TOML file. Relative paths are taken from the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: RunConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new("."));
        for p in [
            &mut config.buildings,
            &mut config.work_dir,
            &mut config.request,
            &mut config.output,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
        Ok(config)
    }

    pub fn voxelizer(&self) -> Voxelizer {
        Voxelizer::new(self.bounds, self.size, self.height_levels)
    }
}

/// Locations of the scene files inside a work directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenePaths {
    pub raw: PathBuf,
    pub processed: PathBuf,
    pub normals: PathBuf,
}

impl ScenePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            raw: dir.join(RAW_GRID_FILE),
            processed: dir.join(PROCESSED_GRID_FILE),
            normals: dir.join(NORMALS_FILE),
        }
    }
}

/// Voxelizes buildings, runs the interior fill and loads the processed scene.
pub fn prepare_scene(
    buildings: &[Building],
    voxelizer: &Voxelizer,
    work_dir: &Path,
    fill: &dyn InteriorFill,
    with_roofs: bool,
) -> Result<Scene> {
    std::fs::create_dir_all(work_dir)
        .with_context(|| format!("Failed to create work dir: {}", work_dir.display()))?;
    let paths = ScenePaths::in_dir(work_dir);

    let raw = voxelizer.voxelize(buildings)?;
    write_grid(&paths.raw, raw.grid())?;
    write_normals(&paths.normals, raw.normals())?;
    info!("Wrote raw scene to {}", paths.raw.display());

    let dims = raw.dims();
    fill.fill(&paths.raw, &paths.processed, dims)?;

    load_scene(&paths, dims, with_roofs)
}

/// Loads a processed grid and its normals, optionally capping roofs.
pub fn load_scene(paths: &ScenePaths, dims: Dims, with_roofs: bool) -> Result<Scene> {
    let mut grid = read_grid(&paths.processed, dims)?;
    let normals = read_normals(&paths.normals)?;
    info!(
        "Loaded {} ({} bytes) with {} wall normals",
        paths.processed.display(),
        dims.byte_len(),
        normals.len()
    );

    if with_roofs {
        let stats = cap_roofs(&mut grid);
        info!(
            "Capped {} roof voxels and {} roof edges",
            stats.roofs, stats.roof_corners
        );
    }

    Scene::new(grid, normals)
        .with_context(|| format!("Scene in {} is inconsistent", paths.processed.display()))
}

/// Validates a request and casts it into the scene.
pub fn simulate(scene: &Scene, request: &SimulationRequest) -> Result<SimulationResponse> {
    let config = request.to_config(scene.dims())?;
    let result = cast(scene, &config);
    let response = SimulationResponse::new(scene, &config, result);
    for (z, floor) in &response.power_map_legend {
        debug!("Floor {z}: {:.2}% covered, buckets {:?}", floor.total, floor.buckets());
    }
    Ok(response)
}

/// Full run described by a [`RunConfig`]. Writes and returns the response.
pub fn run(config: &RunConfig) -> Result<SimulationResponse> {
    let buildings = read_buildings(&config.buildings)?;

    let fill: &dyn InteriorFill = match &config.interior_fill {
        Some(external) => external,
        None => &SkipInteriorFill,
    };
    let scene = prepare_scene(
        &buildings,
        &config.voxelizer(),
        &config.work_dir,
        fill,
        config.cap_roofs,
    )?;

    let request: SimulationRequest = read_json(&config.request)?;
    let response = simulate(&scene, &request)?;
    write_json(&config.output, &response)?;
    info!("Wrote response to {}", config.output.display());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_run_config_from_toml() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            r#"
buildings = "rawBuildings.json"
size = 250
work-dir = "/tmp/raycheck"
request = "request.json"
output = "out/response.json"

[bounds]
lat_min = 50.065311
lat_max = 50.067556
lon_min = 19.914029
lon_max = 19.917527

[interior-fill]
program = "python3"
args = ["process_map.py"]
"#,
        )?;

        let config = RunConfig::load(&path)?;
        assert_eq!(config.size, 250);
        assert_eq!(config.height_levels, DEFAULT_HEIGHT_LEVELS);
        assert!(config.cap_roofs);
        assert_eq!(config.buildings, dir.path().join("rawBuildings.json"));
        assert_eq!(config.work_dir, PathBuf::from("/tmp/raycheck"));
        assert_eq!(config.output, dir.path().join("out/response.json"));
        let fill = config.interior_fill.unwrap();
        assert_eq!(fill.program, "python3");
        assert_eq!(fill.args, vec!["process_map.py".to_string()]);
        Ok(())
    }

    #[test]
    fn test_missing_config_file() {
        assert!(RunConfig::load(Path::new("/nonexistent/run.toml")).is_err());
    }

    #[test]
    fn test_scene_paths() {
        let paths = ScenePaths::in_dir(Path::new("/data/map"));
        assert_eq!(paths.raw, PathBuf::from("/data/map/walls3D.bin"));
        assert_eq!(paths.processed, PathBuf::from("/data/map/walls3D_processed.bin"));
        assert_eq!(paths.normals, PathBuf::from("/data/map/wallNormals3D.json"));
    }

    #[test]
    fn test_missing_processed_grid_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let paths = ScenePaths::in_dir(dir.path());
        write_normals(&paths.normals, &[])?;
        let err = load_scene(&paths, Dims::square(3, 3), true).unwrap_err();
        assert!(format!("{err:#}").contains(PROCESSED_GRID_FILE));
        Ok(())
    }
}
