// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Result files: atomic writes and Wavefront OBJ export.

use anyhow::{Context, Result};
use roofsolid_geometry::Solid;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `bytes` to `path` through a temporary file in the same directory,
/// renamed into place once complete.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "Wrote output");
    Ok(())
}

/// Wavefront OBJ text for a set of solids: one `o solid_<index>` object
/// each, with its colour in a comment and 1-based face indices.
pub fn solids_to_obj(solids: &[Solid]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# roofsolid export: {} solid(s)", solids.len());

    let mut vertex_base = 1usize;
    for solid in solids {
        let mesh = &solid.mesh;
        let _ = writeln!(out, "o solid_{}", solid.index);
        if let Some(color) = mesh.face_colors.first() {
            let _ = writeln!(out, "# color {}", color.to_hex());
        }
        for v in &mesh.vertices {
            let _ = writeln!(out, "v {} {} {}", v.x, v.y, v.z);
        }
        for [a, b, c] in &mesh.triangles {
            let _ = writeln!(
                out,
                "f {} {} {}",
                *a as usize + vertex_base,
                *b as usize + vertex_base,
                *c as usize + vertex_base
            );
        }
        vertex_base += mesh.vertex_count();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use roofsolid_geometry::{palette_color, solidify_polygon, Point3, Role};

    fn cube_solid(index: usize) -> Solid {
        let ring = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let mut mesh = solidify_polygon(&ring, 1.0).unwrap();
        mesh.paint(palette_color(index));
        Solid {
            index,
            role: Role::Roof,
            mesh,
        }
    }

    #[test]
    fn test_obj_groups_and_offsets() {
        let obj = solids_to_obj(&[cube_solid(0), cube_solid(3)]);

        assert!(obj.contains("o solid_0\n# color #4b0000\n"));
        assert!(obj.contains("o solid_3\n# color #4b3b00\n"));
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 16);
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 24);

        // Second object's faces index past the first object's 8 vertices
        let second = obj.split("o solid_3").nth(1).unwrap();
        let first_face = second.lines().find(|l| l.starts_with("f ")).unwrap();
        let indices: Vec<usize> = first_face[2..]
            .split(' ')
            .map(|s| s.parse().unwrap())
            .collect();
        assert!(indices.iter().all(|&i| (9..=16).contains(&i)));
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("result.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
