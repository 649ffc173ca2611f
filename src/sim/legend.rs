//! Per-floor coverage summary of a power map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::power_map::PowerMap;
use crate::scene::grid::SceneGrid;

/// Width of one loss bucket (dB).
const BUCKET_DB: f64 = 20.0;
const NUM_BUCKETS: usize = 8;

/// Coverage of one floor, in percent.
///
/// `total` is the share of free-space voxels reached by any ray. The
/// buckets split the reached voxels by received power, in 20 dB steps.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FloorLegend {
    #[serde(rename = "total")]
    pub total: f64,
    #[serde(rename = "< 0dbm")]
    pub below_0: f64,
    #[serde(rename = "< -20dbm")]
    pub below_20: f64,
    #[serde(rename = "< -40dbm")]
    pub below_40: f64,
    #[serde(rename = "< -60dbm")]
    pub below_60: f64,
    #[serde(rename = "< -80dbm")]
    pub below_80: f64,
    #[serde(rename = "< -100dbm")]
    pub below_100: f64,
    #[serde(rename = "< -120dbm")]
    pub below_120: f64,
    #[serde(rename = "< -140dbm")]
    pub below_140: f64,
}

impl FloorLegend {
    fn from_counts(candidates: usize, buckets: [usize; NUM_BUCKETS]) -> Self {
        let covered: usize = buckets.iter().sum();
        let share = |n: usize, of: usize| {
            if of == 0 {
                0.0
            } else {
                n as f64 / of as f64 * 100.0
            }
        };
        Self {
            total: share(covered, candidates),
            below_0: share(buckets[0], covered),
            below_20: share(buckets[1], covered),
            below_40: share(buckets[2], covered),
            below_60: share(buckets[3], covered),
            below_80: share(buckets[4], covered),
            below_100: share(buckets[5], covered),
            below_120: share(buckets[6], covered),
            below_140: share(buckets[7], covered),
        }
    }

    pub fn buckets(&self) -> [f64; NUM_BUCKETS] {
        [
            self.below_0,
            self.below_20,
            self.below_40,
            self.below_60,
            self.below_80,
            self.below_100,
            self.below_120,
            self.below_140,
        ]
    }
}

fn bucket_of(dbm: f64) -> usize {
    let loss = (-dbm).max(0.0);
    ((loss / BUCKET_DB) as usize).min(NUM_BUCKETS - 1)
}

/// Builds the legend for every floor, keyed by level.
pub fn build_legend(grid: &SceneGrid, map: &PowerMap) -> BTreeMap<usize, FloorLegend> {
    let dims = grid.dims();
    let mut legend = BTreeMap::new();

    for z in 0..dims.nz {
        let mut candidates = 0;
        let mut buckets = [0usize; NUM_BUCKETS];
        for ((y, x), cell) in grid.floor(z).indexed_iter() {
            if !cell.is_empty() {
                continue;
            }
            candidates += 1;
            if let Some(dbm) = map.get(x, y, z) {
                buckets[bucket_of(dbm)] += 1;
            }
        }
        legend.insert(z, FloorLegend::from_counts(candidates, buckets));
    }

    legend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::cell::Cell;
    use crate::scene::grid::Dims;

    #[test]
    fn test_bucket_edges() {
        assert_eq!(bucket_of(0.0), 0);
        assert_eq!(bucket_of(3.0), 0);
        assert_eq!(bucket_of(-19.99), 0);
        assert_eq!(bucket_of(-20.0), 1);
        assert_eq!(bucket_of(-139.9), 6);
        assert_eq!(bucket_of(-140.0), 7);
        assert_eq!(bucket_of(-400.0), 7);
    }

    #[test]
    fn test_legend_counts_only_free_space() {
        let dims = Dims::new(4, 1, 1);
        let mut grid = SceneGrid::new(dims);
        grid.set(3, 0, 0, Cell::Wall(0));
        let mut map = PowerMap::new(dims);
        map.record(0, 0, 0, -10.0);
        map.record(1, 0, 0, -45.0);
        // Power on a solid voxel does not count
        map.record(3, 0, 0, -5.0);

        let legend = build_legend(&grid, &map);
        let floor = legend[&0];
        assert!((floor.total - 200.0 / 3.0).abs() < 1e-9);
        assert!((floor.below_0 - 50.0).abs() < 1e-9);
        assert!((floor.below_40 - 50.0).abs() < 1e-9);
        assert!((floor.buckets().iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_legend_without_coverage() {
        let dims = Dims::new(2, 2, 2);
        let mut grid = SceneGrid::new(dims);
        for y in 0..2 {
            for x in 0..2 {
                grid.set(x, y, 1, Cell::Interior);
            }
        }
        let legend = build_legend(&grid, &PowerMap::new(dims));
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[&0], FloorLegend::default());
        // No candidates at all
        assert_eq!(legend[&1].total, 0.0);
    }

    #[test]
    fn test_legend_field_names() {
        let json = serde_json::to_value(FloorLegend::default()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "total", "< 0dbm", "< -20dbm", "< -40dbm", "< -60dbm", "< -80dbm", "< -100dbm",
            "< -120dbm", "< -140dbm",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
    }
}
