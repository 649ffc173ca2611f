use crate::Wall;
use serde::{Deserialize, Serialize};

/// Metres per building level.
pub const LEVEL_HEIGHT: f64 = 3.0;

/// Number of levels assumed when a feature does not state it.
pub const DEFAULT_LEVELS: f64 = 3.0;

/// Extruded building outline: the exterior ring as a list of walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub height: f64,
    pub walls: Vec<Wall>,
}

impl Building {
    pub fn new(name: &str, height: f64, walls: Vec<Wall>) -> Self {
        Self {
            name: name.to_string(),
            height,
            walls,
        }
    }

    /// Height in metres for a number of levels.
    pub fn height_from_levels(levels: f64) -> f64 {
        levels * LEVEL_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_from_levels() {
        assert!((Building::height_from_levels(DEFAULT_LEVELS) - 9.0).abs() < 1e-12);
        assert!((Building::height_from_levels(2.5) - 7.5).abs() < 1e-12);
    }
}
