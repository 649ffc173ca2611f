//! Simulation request and response documents.
//!
//! Range checks live here, at the boundary. The engine assumes a
//! validated [`TransmitterConfig`].

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::Point;
use crate::scene::Scene;
use crate::scene::grid::Dims;
use crate::sim::config::{TrackedRay, TransmitterConfig};
use crate::sim::engine::CastResult;
use crate::sim::legend::{FloorLegend, build_legend};
use crate::sim::ray::RayPath;

pub const RAY_COUNT_RANGE: RangeInclusive<usize> = 1..=2879;
/// Cap on azimuth plus elevation ray counts.
pub const MAX_TOTAL_RAYS: usize = 2880;
pub const INTERACTIONS_RANGE: RangeInclusive<usize> = 1..=10;
pub const STATION_POWER_RANGE_W: RangeInclusive<f64> = 0.01..=100.0;
pub const MINIMAL_POWER_RANGE_DBM: RangeInclusive<f64> = -160.0..=-60.0;
pub const FREQUENCY_RANGE_GHZ: RangeInclusive<f64> = 0.1..=100.0;
pub const DIFFRACTION_RAYS_RANGE: RangeInclusive<usize> = 0..=120;

/// Parameters of one coverage simulation, as sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub number_of_rays_azimuth: usize,
    pub number_of_rays_elevation: usize,
    /// Maximum number of reflections per ray.
    pub number_of_interactions: usize,
    /// Transmit power (W).
    pub station_power: f64,
    /// Termination threshold (dBm).
    pub minimal_ray_power: f64,
    /// Carrier frequency (GHz).
    pub frequency: f64,
    /// Transmitter position in voxel units.
    pub station_pos: Point,
    #[serde(default)]
    pub single_rays: Vec<TrackedRay>,
    /// Sub-rays per diffracting edge; 0 disables diffraction.
    #[serde(default)]
    pub diffraction_ray_number: usize,
}

fn check<T: PartialOrd + std::fmt::Display>(
    name: &str,
    value: T,
    range: &RangeInclusive<T>,
) -> Result<()> {
    if !range.contains(&value) {
        bail!(
            "{name} = {value} is outside [{}, {}]",
            range.start(),
            range.end()
        );
    }
    Ok(())
}

impl SimulationRequest {
    /// Checks every field range, and the station position against `dims`.
    pub fn validate(&self, dims: Dims) -> Result<()> {
        check("numberOfRaysAzimuth", self.number_of_rays_azimuth, &RAY_COUNT_RANGE)?;
        check("numberOfRaysElevation", self.number_of_rays_elevation, &RAY_COUNT_RANGE)?;
        let total = self.number_of_rays_azimuth + self.number_of_rays_elevation;
        if total > MAX_TOTAL_RAYS {
            bail!(
                "Total number of rays ({total}) exceeds maximum limit ({MAX_TOTAL_RAYS}). \
                 Azimuth: {}, Elevation: {}",
                self.number_of_rays_azimuth,
                self.number_of_rays_elevation
            );
        }
        check("numberOfInteractions", self.number_of_interactions, &INTERACTIONS_RANGE)?;
        check("stationPower", self.station_power, &STATION_POWER_RANGE_W)?;
        check("minimalRayPower", self.minimal_ray_power, &MINIMAL_POWER_RANGE_DBM)?;
        check("frequency", self.frequency, &FREQUENCY_RANGE_GHZ)?;
        check("diffractionRayNumber", self.diffraction_ray_number, &DIFFRACTION_RAYS_RANGE)?;

        let p = self.station_pos;
        if dims
            .index(p.x.round() as i64, p.y.round() as i64, p.z.round() as i64)
            .is_none()
            || p.x < 0.0
            || p.y < 0.0
            || p.z < 0.0
        {
            bail!(
                "stationPos {} is outside the {}x{}x{} grid",
                p,
                dims.nx,
                dims.ny,
                dims.nz
            );
        }
        for ray in &self.single_rays {
            if ray.azimuth >= self.number_of_rays_azimuth
                || ray.elevation >= self.number_of_rays_elevation
            {
                bail!(
                    "singleRays entry ({}, {}) does not name a launched ray",
                    ray.azimuth,
                    ray.elevation
                );
            }
        }
        Ok(())
    }

    /// Validates the request and converts it to engine parameters.
    pub fn to_config(&self, dims: Dims) -> Result<TransmitterConfig> {
        self.validate(dims)?;
        Ok(TransmitterConfig {
            num_azimuth: self.number_of_rays_azimuth,
            num_elevation: self.number_of_rays_elevation,
            max_bounces: self.number_of_interactions,
            tracked_rays: self.single_rays.clone(),
            tx_power_w: self.station_power,
            min_power_dbm: self.minimal_ray_power,
            frequency_hz: self.frequency * 1e9,
            tx_position: self.station_pos,
            fan_width: self.diffraction_ray_number,
            ..TransmitterConfig::new()
        })
    }
}

/// Result of a simulation, as returned to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub station_pos: Point,
    /// `[z][y][x]`: dBm where reached, -150 where not, cell codes for solids.
    pub power_map: Vec<Vec<Vec<f64>>>,
    pub power_map_legend: BTreeMap<usize, FloorLegend>,
    pub ray_paths: Vec<RayPath>,
}

impl SimulationResponse {
    pub fn new(scene: &Scene, config: &TransmitterConfig, result: CastResult) -> Self {
        let grid = scene.grid();
        Self {
            station_pos: config.tx_position,
            power_map: result.power_map.to_floor_slices(grid),
            power_map_legend: build_legend(grid, &result.power_map),
            ray_paths: result.ray_paths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SimulationRequest {
        serde_json::from_str(
            r#"{
                "numberOfRaysAzimuth": 360,
                "numberOfRaysElevation": 90,
                "numberOfInteractions": 3,
                "reflectionFactor": 0.5,
                "stationPower": 5,
                "minimalRayPower": -120,
                "frequency": 2.4,
                "size": 250,
                "stationPos": {"x": 10, "y": 20, "z": 2}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_request_parses_camel_case() {
        let req = request();
        assert_eq!(req.number_of_rays_azimuth, 360);
        assert_eq!(req.number_of_interactions, 3);
        assert!(req.single_rays.is_empty());
        assert_eq!(req.diffraction_ray_number, 0);
        assert!((req.station_pos.y - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_to_config() {
        let config = request().to_config(Dims::square(50, 5)).unwrap();
        assert_eq!(config.num_rays(), 360 * 90);
        assert_eq!(config.max_bounces, 3);
        assert!((config.frequency_hz - 2.4e9).abs() < 1.0);
        assert!((config.tx_power_w - 5.0).abs() < 1e-12);
        assert!(!config.diffraction_enabled());
    }

    #[test]
    fn test_range_violations() {
        let dims = Dims::square(50, 5);
        let mut req = request();
        req.number_of_rays_azimuth = 0;
        assert!(req.validate(dims).is_err());

        let mut req = request();
        req.number_of_interactions = 11;
        assert!(req.validate(dims).is_err());

        let mut req = request();
        req.station_power = 0.001;
        assert!(req.validate(dims).is_err());

        let mut req = request();
        req.minimal_ray_power = -50.0;
        assert!(req.validate(dims).is_err());

        let mut req = request();
        req.frequency = 120.0;
        let err = req.validate(dims).unwrap_err();
        assert!(err.to_string().contains("frequency"));

        let mut req = request();
        req.diffraction_ray_number = 121;
        assert!(req.validate(dims).is_err());
    }

    #[test]
    fn test_total_ray_cap() {
        let mut req = request();
        req.number_of_rays_azimuth = 2000;
        req.number_of_rays_elevation = 881;
        assert!(req.validate(Dims::square(50, 5)).is_err());
        req.number_of_rays_elevation = 880;
        assert!(req.validate(Dims::square(50, 5)).is_ok());
    }

    #[test]
    fn test_station_must_be_inside_grid() {
        let mut req = request();
        assert!(req.validate(Dims::square(20, 5)).is_err());
        req.station_pos = Point::new(10.0, 19.0, 4.0);
        assert!(req.validate(Dims::square(20, 5)).is_ok());
        req.station_pos = Point::new(10.0, 19.0, -1.0);
        assert!(req.validate(Dims::square(20, 5)).is_err());
    }

    #[test]
    fn test_tracked_rays_must_exist() {
        let mut req = request();
        req.single_rays = vec![TrackedRay::new(359, 89)];
        assert!(req.validate(Dims::square(50, 5)).is_ok());
        req.single_rays = vec![TrackedRay::new(360, 0)];
        assert!(req.validate(Dims::square(50, 5)).is_err());
    }
}
