//! Building outlines from polygon features.
//!
//! Input follows the GeoJSON `FeatureCollection` layout. Every feature yields
//! one [`Building`]; only `Polygon` geometries contribute walls, and anything
//! malformed or missing simply produces a building without walls.

use crate::geom::building::DEFAULT_LEVELS;
use crate::{Building, Point, Wall};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NAME_KEY: &str = "addr:housename";
const LEVEL_KEYS: [&str; 2] = ["building:levels", "levels"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// Single feature. Geometry is kept untyped so that malformed shapes
/// degrade to "no walls" instead of failing the whole collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Option<Value>,
}

/// Converts every feature into a building, in collection order.
pub fn extract_buildings(collection: &FeatureCollection) -> Vec<Building> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(i, feature)| extract_building(feature, i + 1))
        .collect()
}

/// Converts a single feature; `ordinal` (1-based) names unnamed buildings.
pub fn extract_building(feature: &Feature, ordinal: usize) -> Building {
    let props = feature.properties.as_ref();
    let name = props
        .and_then(|p| p.get(NAME_KEY))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| format!("Building {ordinal}"));

    let levels = props.and_then(read_levels).unwrap_or(DEFAULT_LEVELS);
    let height = Building::height_from_levels(levels);

    let walls = feature
        .geometry
        .as_ref()
        .and_then(exterior_ring)
        .map(|ring| ring_walls(&ring, height))
        .unwrap_or_default();

    Building::new(&name, height, walls)
}

fn read_levels(props: &Map<String, Value>) -> Option<f64> {
    let value = LEVEL_KEYS.iter().find_map(|k| props.get(*k))?;
    let levels = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    levels.is_finite().then_some(levels)
}

/// Returns the first ring of a `Polygon` geometry as (x, y) pairs.
fn exterior_ring(geometry: &Value) -> Option<Vec<(f64, f64)>> {
    if geometry.get("type")?.as_str()? != "Polygon" {
        return None;
    }
    let ring = geometry.get("coordinates")?.as_array()?.first()?.as_array()?;
    ring.iter()
        .map(|pos| {
            let pos = pos.as_array()?;
            Some((pos.first()?.as_f64()?, pos.get(1)?.as_f64()?))
        })
        .collect()
}

/// Consecutive edges of a ring, closing back to the first vertex.
fn ring_walls(ring: &[(f64, f64)], height: f64) -> Vec<Wall> {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % n];
            Wall::new(Point::new(x0, y0, height), Point::new(x1, y1, height))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(value: Value) -> FeatureCollection {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_square_building_walls() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"building:levels": 2, "addr:housename": "Library"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]
                }
            }]
        }));
        let buildings = extract_buildings(&fc);
        assert_eq!(buildings.len(), 1);
        let b = &buildings[0];
        assert_eq!(b.name, "Library");
        assert!((b.height - 6.0).abs() < 1e-12);
        assert_eq!(b.walls.len(), 4);
        // Last edge wraps to the first vertex
        let last = b.walls[3];
        assert!(last.start.is_close(&Point::new(0.0, 1.0, 6.0)));
        assert!(last.end.is_close(&Point::new(0.0, 0.0, 6.0)));
        for w in &b.walls {
            assert_eq!(w.start.z, 6.0);
            assert_eq!(w.end.z, 6.0);
        }
    }

    #[test]
    fn test_levels_as_string_and_default() {
        let fc = collection(json!({
            "features": [
                {"properties": {"building:levels": "4"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0]]]}},
                {"properties": {"building:levels": "many"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0]]]}},
                {"properties": null,
                 "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0]]]}}
            ]
        }));
        let buildings = extract_buildings(&fc);
        assert!((buildings[0].height - 12.0).abs() < 1e-12);
        assert!((buildings[1].height - 9.0).abs() < 1e-12);
        assert!((buildings[2].height - 9.0).abs() < 1e-12);
        assert_eq!(buildings[2].name, "Building 3");
    }

    #[test]
    fn test_non_polygon_and_malformed_geometry_have_no_walls() {
        let fc = collection(json!({
            "features": [
                {"geometry": {"type": "Point", "coordinates": [0.0, 0.0]}},
                {"geometry": {"type": "Polygon", "coordinates": "broken"}},
                {"properties": {"levels": 1}}
            ]
        }));
        let buildings = extract_buildings(&fc);
        assert_eq!(buildings.len(), 3);
        assert!(buildings.iter().all(|b| b.walls.is_empty()));
        assert!((buildings[2].height - 3.0).abs() < 1e-12);
    }
}
