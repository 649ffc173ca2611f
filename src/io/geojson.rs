//! Building footprints from a GeoJSON file.

use anyhow::Result;
use log::info;
use std::path::Path;

use super::json::read_json;
use crate::Building;
use crate::geom::features::{FeatureCollection, extract_buildings};

/// Reads a feature collection and extracts one building per feature.
pub fn read_buildings(path: &Path) -> Result<Vec<Building>> {
    let collection: FeatureCollection = read_json(path)?;
    let buildings = extract_buildings(&collection);
    let walls: usize = buildings.iter().map(|b| b.walls.len()).sum();
    info!(
        "Loaded {} buildings with {} walls from {}",
        buildings.len(),
        walls,
        path.display()
    );
    Ok(buildings)
}
