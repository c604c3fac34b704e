use crate::error::AssetError;
use crate::mesh::{MeshData, Vertex};
use glam::Vec3;
use std::io::BufRead;
use std::path::Path;

/// Load a Wavefront OBJ file as a flat-indexed triangle list.
///
/// Polygons are fan-triangulated. Faces without normals get their flat face
/// normal; faces without texture coordinates get (0, 0).
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshData, AssetError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_obj(std::io::BufReader::new(file), path)?;
    tracing::debug!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        triangles = mesh.triangle_count(),
        "loaded obj"
    );
    Ok(mesh)
}

/// Parse OBJ text; `path` only names the source in errors.
pub fn parse_obj(reader: impl BufRead, path: &Path) -> Result<MeshData, AssetError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut mesh = MeshData::default();

    for (number, line) in reader.lines().enumerate() {
        let line_no = number + 1;
        let line = line.map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let err = |message: String| AssetError::ObjParse {
            path: path.to_path_buf(),
            line: line_no,
            message,
        };

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => positions.push(Vec3::from(parse_floats::<3>(&mut parts).map_err(err)?)),
            Some("vn") => normals.push(Vec3::from(parse_floats::<3>(&mut parts).map_err(err)?)),
            Some("vt") => uvs.push(parse_floats::<2>(&mut parts).map_err(err)?),
            Some("f") => {
                let corners = parts
                    .map(|corner| parse_corner(corner, positions.len(), uvs.len(), normals.len()))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(err)?;
                if corners.len() < 3 {
                    return Err(err(format!("face has {} corners", corners.len())));
                }
                let face_normal = {
                    let a = positions[corners[0].0];
                    let b = positions[corners[1].0];
                    let c = positions[corners[2].0];
                    (b - a).cross(c - a).normalize_or_zero()
                };
                let base = mesh.vertices.len() as u32;
                for &(p, t, n) in &corners {
                    mesh.vertices.push(Vertex::new(
                        positions[p],
                        n.map_or(face_normal, |n| normals[n]),
                        t.map_or([0.0, 0.0], |t| uvs[t]),
                    ));
                }
                for i in 1..corners.len() as u32 - 1 {
                    mesh.indices.extend_from_slice(&[base, base + i, base + i + 1]);
                }
            }
            // groups, materials, smoothing and comments are ignored
            _ => {}
        }
    }

    if mesh.is_empty() {
        return Err(AssetError::EmptyMesh {
            path: path.to_path_buf(),
        });
    }
    Ok(mesh)
}

fn parse_floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
) -> Result<[f32; N], String> {
    let mut out = [0.0; N];
    for slot in &mut out {
        let token = parts.next().ok_or_else(|| format!("expected {N} numbers"))?;
        *slot = token
            .parse()
            .map_err(|_| format!("invalid number `{token}`"))?;
    }
    Ok(out)
}

/// Resolve one `p/t/n` face corner to zero-based indices.
fn parse_corner(
    corner: &str,
    positions: usize,
    uvs: usize,
    normals: usize,
) -> Result<(usize, Option<usize>, Option<usize>), String> {
    let mut fields = corner.split('/');
    let p = resolve_index(fields.next(), positions, "position")?
        .ok_or_else(|| format!("corner `{corner}` has no position"))?;
    let t = resolve_index(fields.next(), uvs, "texture coordinate")?;
    let n = resolve_index(fields.next(), normals, "normal")?;
    Ok((p, t, n))
}

/// OBJ indices are 1-based; negative indices count back from the end.
fn resolve_index(field: Option<&str>, len: usize, what: &str) -> Result<Option<usize>, String> {
    let Some(field) = field.filter(|f| !f.is_empty()) else {
        return Ok(None);
    };
    let raw: i64 = field
        .parse()
        .map_err(|_| format!("invalid {what} index `{field}`"))?;
    let index = match raw {
        0 => return Err(format!("{what} index 0 is invalid")),
        r if r > 0 => r as usize - 1,
        r => len
            .checked_sub(r.unsigned_abs() as usize)
            .ok_or_else(|| format!("{what} index {r} out of range"))?,
    };
    if index >= len {
        return Err(format!("{what} index {raw} out of range"));
    }
    Ok(Some(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    fn parse(text: &str) -> Result<MeshData, AssetError> {
        parse_obj(Cursor::new(text), Path::new("test.obj"))
    }

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = parse(QUAD).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 1.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_normals_use_face_normal() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertices[1].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices[1].uv, [0.0, 0.0]);
    }

    #[test]
    fn negative_indices_count_from_end() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.vertices[2].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn out_of_range_index_reports_line() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        match err {
            AssetError::ObjParse { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("out of range"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn bad_number_is_a_parse_error() {
        assert!(matches!(
            parse("v 0 zero 0\n"),
            Err(AssetError::ObjParse { line: 1, .. })
        ));
    }

    #[test]
    fn file_without_faces_is_empty() {
        assert!(matches!(
            parse("v 0 0 0\n"),
            Err(AssetError::EmptyMesh { .. })
        ));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        std::fs::write(&path, QUAD).unwrap();
        assert_eq!(load_obj(&path).unwrap().triangle_count(), 2);
        assert!(matches!(
            load_obj(dir.path().join("missing.obj")),
            Err(AssetError::Io { .. })
        ));
    }
}
