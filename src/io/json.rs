//! JSON file helpers shared by the normals, geometry, request and response files.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Writes any serializable value to a pretty-printed JSON file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, value)
        .with_context(|| format!("Failed to serialize JSON to: {}", path.display()))?;

    Ok(())
}

/// Reads a JSON file into any deserializable value.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let value: T = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize JSON from: {}", path.display()))?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use tempfile::tempdir;

    #[test]
    fn test_write_and_read_json() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("points.json");
        let points = vec![Point::new(1.0, 2.0, 3.0), Point::new(-1.0, 0.5, 0.0)];

        write_json(&path, &points)?;
        let loaded: Vec<Point> = read_json(&path)?;

        assert_eq!(loaded, points);
        Ok(())
    }

    #[test]
    fn test_read_nonexistent_file() {
        let result: Result<Vec<Point>> = read_json(Path::new("/nonexistent/path/file.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_invalid_json() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json")?;
        let result: Result<Vec<Point>> = read_json(&path);
        assert!(result.is_err());
        Ok(())
    }
}
