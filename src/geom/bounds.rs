use serde::{Deserialize, Serialize};

/// Geographic bounding box of a map; `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBounds {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Maps a (lon, lat) coordinate onto a `size` x `size` grid.
    ///
    /// Returns `None` when either rounded index falls outside `[0, size)`.
    pub fn to_grid_index(&self, lon: f64, lat: f64, size: usize) -> Option<(usize, usize)> {
        let x = axis_index(lon, self.lon_min, self.lon_max, size)?;
        let y = axis_index(lat, self.lat_min, self.lat_max, size)?;
        Some((x, y))
    }
}

fn axis_index(coord: f64, min: f64, max: f64, size: usize) -> Option<usize> {
    if size == 0 || max <= min {
        return None;
    }
    let idx = ((coord - min) / (max - min) * (size - 1) as f64).round();
    if idx.is_finite() && idx >= 0.0 && idx < size as f64 {
        Some(idx as usize)
    } else {
        None
    }
}
