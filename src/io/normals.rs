//! Normals file: JSON array of `{nx, ny, nz}` index-aligned with wall ids.

use anyhow::Result;
use std::path::Path;

use super::json::{read_json, write_json};
use crate::scene::normals::WallNormal;

pub fn write_normals(path: &Path, normals: &[WallNormal]) -> Result<()> {
    write_json(path, &normals)
}

pub fn read_normals(path: &Path) -> Result<Vec<WallNormal>> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_normals_roundtrip_keeps_order() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("wallNormals3D.json");
        let normals = vec![
            WallNormal::new(0.0, 1.0),
            WallNormal::new(-0.6, 0.8),
            WallNormal::new(1.0, 0.0),
        ];
        write_normals(&path, &normals)?;
        assert_eq!(read_normals(&path)?, normals);
        Ok(())
    }
}
