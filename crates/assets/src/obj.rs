//! Wavefront OBJ loading.
//!
//! Supports `v`, `vt`, `vn` and `f` statements. Faces may use any of the
//! `v`, `v/vt`, `v//vn`, `v/vt/vn` forms and negative (relative) indices;
//! polygons are fan-triangulated. Other statements (`o`, `g`, `s`,
//! `usemtl`, `mtllib`, ...) are ignored.

use crate::AssetError;
use glam::Vec3;
use scene_common::{MeshData, Vertex};
use std::collections::HashMap;
use std::path::Path;

/// Read and parse an OBJ file.
pub fn load(path: impl AsRef<Path>) -> Result<MeshData, AssetError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse(&source)?;
    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        triangles = mesh.triangle_count(),
        "loaded OBJ mesh"
    );
    Ok(mesh)
}

/// A face corner: resolved zero-based indices into the attribute lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Corner {
    position: usize,
    tex_coord: Option<usize>,
    normal: Option<usize>,
}

/// Parse OBJ source text into indexed geometry.
///
/// Corners sharing the same position/tex-coord/normal triple become one
/// vertex. Texture V is flipped so that `v = 0` is the top row. Vertices
/// without a normal get the area-weighted average of their face normals.
pub fn parse(source: &str) -> Result<MeshData, AssetError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();

    let mut vertices: Vec<Vertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut corners: HashMap<Corner, u32> = HashMap::new();

    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or_default();
        let mut parts = content.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let [x, y, z] = floats::<3>(&mut parts, line)?;
                positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                // `v` and `w` are optional; `w` is ignored.
                let [u] = floats::<1>(&mut parts, line)?;
                let v = optional_float(&mut parts, line)?.unwrap_or(0.0);
                tex_coords.push([u, 1.0 - v]);
            }
            "vn" => {
                let n = floats::<3>(&mut parts, line)?;
                normals.push(Vec3::from(n).normalize_or_zero());
            }
            "f" => {
                let counts = [positions.len(), tex_coords.len(), normals.len()];
                let face = parts
                    .map(|token| parse_corner(token, line, counts))
                    .collect::<Result<Vec<_>, _>>()?;
                if face.len() < 3 {
                    return Err(AssetError::ObjParse {
                        line,
                        message: format!("face has {} corners, need at least 3", face.len()),
                    });
                }

                let mut face_indices = Vec::with_capacity(face.len());
                for corner in face {
                    let index = *corners.entry(corner).or_insert_with(|| {
                        vertices.push(Vertex::new(
                            positions[corner.position],
                            corner.normal.map_or(Vec3::ZERO, |n| normals[n]),
                            corner.tex_coord.map_or([0.0, 0.0], |t| tex_coords[t]),
                        ));
                        (vertices.len() - 1) as u32
                    });
                    face_indices.push(index);
                }

                for k in 1..face_indices.len() - 1 {
                    indices.extend_from_slice(&[
                        face_indices[0],
                        face_indices[k],
                        face_indices[k + 1],
                    ]);
                }
            }
            _ => tracing::trace!(line, keyword, "ignoring OBJ statement"),
        }
    }

    if indices.is_empty() {
        return Err(AssetError::ObjEmpty);
    }

    fill_missing_normals(&mut vertices, &indices);
    Ok(MeshData::new(vertices, indices))
}

fn floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[f32; N], AssetError> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let token = parts.next().ok_or_else(|| AssetError::ObjParse {
            line,
            message: format!("expected {N} numbers"),
        })?;
        *slot = number(token, line)?;
    }
    Ok(out)
}

fn optional_float<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Option<f32>, AssetError> {
    parts.next().map(|token| number(token, line)).transpose()
}

fn number(token: &str, line: usize) -> Result<f32, AssetError> {
    token.parse().map_err(|_| AssetError::ObjParse {
        line,
        message: format!("invalid number {token:?}"),
    })
}

fn parse_corner(token: &str, line: usize, counts: [usize; 3]) -> Result<Corner, AssetError> {
    let mut fields = token.split('/');
    let position = resolve(fields.next(), counts[0], line)?
        .ok_or_else(|| AssetError::ObjParse {
            line,
            message: format!("face corner {token:?} has no position"),
        })?;
    let tex_coord = resolve(fields.next(), counts[1], line)?;
    let normal = resolve(fields.next(), counts[2], line)?;
    Ok(Corner {
        position,
        tex_coord,
        normal,
    })
}

/// One-based or negative (relative to the end) index into a list of `count`.
fn resolve(field: Option<&str>, count: usize, line: usize) -> Result<Option<usize>, AssetError> {
    let Some(field) = field.filter(|f| !f.is_empty()) else {
        return Ok(None);
    };
    let index: i64 = field.parse().map_err(|_| AssetError::ObjParse {
        line,
        message: format!("invalid index {field:?}"),
    })?;
    let resolved = if index > 0 {
        index - 1
    } else {
        count as i64 + index
    };
    if index == 0 || resolved < 0 || resolved >= count as i64 {
        return Err(AssetError::ObjIndex { line, index });
    }
    Ok(Some(resolved as usize))
}

fn fill_missing_normals(vertices: &mut [Vertex], indices: &[u32]) {
    if vertices.iter().all(|v| v.normal != [0.0; 4]) {
        return;
    }

    let mut accumulated = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = vertices[a].position3();
        let n = (vertices[b].position3() - pa).cross(vertices[c].position3() - pa);
        for i in [a, b, c] {
            accumulated[i] += n;
        }
    }

    for (vertex, n) in vertices.iter_mut().zip(accumulated) {
        if vertex.normal == [0.0; 4] {
            vertex.normal = n.normalize_or_zero().extend(0.0).to_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const QUAD: &str = "\
# unit quad
o quad
v -0.5 0.0  0.5
v  0.5 0.0  0.5
v  0.5 0.0 -0.5
v -0.5 0.0 -0.5
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = parse(QUAD).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices[0].normal, [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn texture_v_is_flipped() {
        let mesh = parse(QUAD).unwrap();
        assert_eq!(mesh.vertices[0].tex_coord, [0.0, 1.0]);
        assert_eq!(mesh.vertices[2].tex_coord, [1.0, 0.0]);
    }

    #[test]
    fn single_component_tex_coord_defaults_v_to_zero() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5\nvt 0.25 0.5 0.0\nf 1/1 2/2 3/1\n";
        let mesh = parse(src).unwrap();
        assert_eq!(mesh.vertices[0].tex_coord, [0.5, 1.0]);
        assert_eq!(mesh.vertices[1].tex_coord, [0.25, 0.5]);
    }

    #[test]
    fn tex_coord_without_u_is_rejected() {
        assert!(matches!(
            parse("v 0 0 0\nvt\n"),
            Err(AssetError::ObjParse { line: 2, .. })
        ));
    }

    #[test]
    fn shared_corners_are_deduplicated() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 3 2 4\n";
        let mesh = parse(src).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn negative_indices_are_relative() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse(src).unwrap();
        assert_eq!(mesh.vertices[1].position3(), Vec3::X);
        assert_eq!(mesh.vertices[2].position3(), Vec3::Y);
    }

    #[test]
    fn missing_normals_are_computed_from_winding() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse(src).unwrap();
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn index_out_of_range_is_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        match parse(src) {
            Err(AssetError::ObjIndex { line: 3, index: 3 }) => {}
            other => panic!("expected ObjIndex, got {other:?}"),
        }
    }

    #[test]
    fn bad_number_reports_line() {
        let src = "v 0 0 0\nv 1 x 0\n";
        match parse(src) {
            Err(AssetError::ObjParse { line: 2, .. }) => {}
            other => panic!("expected ObjParse, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_face_is_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        let err = parse(src).unwrap_err();
        assert!(matches!(err, AssetError::ObjParse { line: 3, .. }));
    }

    #[test]
    fn file_without_faces_is_empty() {
        assert!(matches!(parse("v 0 0 0\n"), Err(AssetError::ObjEmpty)));
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(QUAD.as_bytes()).unwrap();
        let mesh = load(file.path()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("soulspear.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains("soulspear.obj"));
    }
}
