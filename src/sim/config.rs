use serde::{Deserialize, Serialize};

use crate::Point;

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// A (azimuth index, elevation index) pair whose path is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedRay {
    pub azimuth: usize,
    pub elevation: usize,
}

impl TrackedRay {
    pub fn new(azimuth: usize, elevation: usize) -> Self {
        Self { azimuth, elevation }
    }
}

/// Immutable parameters of one casting run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmitterConfig {
    // Rays
    pub num_azimuth: usize,
    pub num_elevation: usize,
    pub max_bounces: usize,
    /// Rays whose full path is recorded, in response order.
    pub tracked_rays: Vec<TrackedRay>,

    // Grid
    /// Voxel pitch in metres.
    pub step: f64,

    // Radio
    /// Transmit power (W).
    pub tx_power_w: f64,
    /// Rays whose last received power falls below this (dBm) stop.
    pub min_power_dbm: f64,
    pub frequency_hz: f64,
    /// Transmitter position in voxel units.
    pub tx_position: Point,

    // Diffraction
    /// Number of sub-rays spawned at an edge. Below 2 edges are opaque.
    pub fan_width: usize,
    /// How many successive edges a ray may diffract at.
    pub max_diffraction_order: usize,
}

impl TransmitterConfig {
    pub fn new() -> Self {
        Self {
            num_azimuth: 360,
            num_elevation: 180,
            max_bounces: 3,
            tracked_rays: Vec::new(),
            step: 1.0,
            tx_power_w: 1.0,
            min_power_dbm: -120.0,
            frequency_hz: 2.4e9,
            tx_position: Point::new(0.0, 0.0, 0.0),
            fan_width: 0,
            max_diffraction_order: 1,
        }
    }

    /// Wavelength in metres.
    pub fn wavelength(&self) -> f64 {
        SPEED_OF_LIGHT / self.frequency_hz
    }

    pub fn num_rays(&self) -> usize {
        self.num_azimuth * self.num_elevation
    }

    /// Slot of a ray in `tracked_rays`, if it is tracked.
    pub fn tracked_index(&self, azimuth: usize, elevation: usize) -> Option<usize> {
        self.tracked_rays
            .iter()
            .position(|t| t.azimuth == azimuth && t.elevation == elevation)
    }

    pub fn diffraction_enabled(&self) -> bool {
        self.fan_width >= 2 && self.max_diffraction_order > 0
    }
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TransmitterConfig::new();
        assert_eq!(config.num_rays(), 360 * 180);
        assert!((config.step - 1.0).abs() < 1e-12);
        assert!(!config.diffraction_enabled());
        assert_eq!(config.max_diffraction_order, 1);
    }

    #[test]
    fn test_config_default_trait() {
        let config: TransmitterConfig = Default::default();
        assert_eq!(config.max_bounces, 3);
    }

    #[test]
    fn test_wavelength() {
        let mut config = TransmitterConfig::new();
        config.frequency_hz = 2.4e9;
        assert!((config.wavelength() - 0.124913524).abs() < 1e-8);
        config.frequency_hz = 299_792_458.0;
        assert!((config.wavelength() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tracked_index_returns_first_match() {
        let mut config = TransmitterConfig::new();
        config.tracked_rays = vec![
            TrackedRay::new(3, 1),
            TrackedRay::new(0, 0),
            TrackedRay::new(3, 1),
        ];
        assert_eq!(config.tracked_index(3, 1), Some(0));
        assert_eq!(config.tracked_index(0, 0), Some(1));
        assert_eq!(config.tracked_index(1, 3), None);
    }

    #[test]
    fn test_diffraction_needs_two_sub_rays() {
        let mut config = TransmitterConfig::new();
        config.fan_width = 1;
        assert!(!config.diffraction_enabled());
        config.fan_width = 2;
        assert!(config.diffraction_enabled());
        config.max_diffraction_order = 0;
        assert!(!config.diffraction_enabled());
    }
}
