//! Wavefront OBJ mesh loading
//!
//! Only what the renderer consumes is read: `v` positions, `vt` texture
//! coordinates and triangular `f` faces in `v/vt` or `v/vt/vn` form. Normals,
//! groups, materials and smoothing records are skipped.

use std::fs;
use std::path::Path;

use crate::rasterizer::{AssetError, Face, Mesh, Scalar, Vec2, Vec3, FACE_PALETTE};

/// Load and validate a mesh from an OBJ file
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, AssetError> {
    let path = path.as_ref();
    tracing::info!("Loading mesh from OBJ file '{}'", path.display());
    let source = fs::read_to_string(path)?;
    let mesh = parse_obj(&source)?;
    tracing::info!(
        "Loaded OBJ file '{}' with {} vertices, {} texture coordinates, {} faces",
        path.display(),
        mesh.vertices.len(),
        mesh.tex_coords.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

/// Parse OBJ source text. Faces are coloured from the palette in file order.
pub fn parse_obj(source: &str) -> Result<Mesh, AssetError> {
    let mut vertices = Vec::new();
    let mut tex_coords = Vec::new();
    let mut faces = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        let mut parts = content.split_whitespace();
        let Some(prefix) = parts.next() else {
            continue;
        };

        match prefix {
            "v" => {
                let [x, y, z] = parse_scalars::<3>(&mut parts, line)?;
                vertices.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_scalars::<2>(&mut parts, line)?;
                tex_coords.push(Vec2::new(u, v));
            }
            "f" => {
                let corners: Vec<&str> = parts.collect();
                if corners.len() != 3 {
                    return Err(AssetError::NonTriangleFace { line, count: corners.len() });
                }
                let mut vertex_idx = [0usize; 3];
                let mut tex_idx = [0usize; 3];
                for (i, corner) in corners.iter().enumerate() {
                    let (v, vt) = parse_corner(corner, line)?;
                    vertex_idx[i] = v;
                    tex_idx[i] = vt;
                }
                let color = FACE_PALETTE[faces.len() % FACE_PALETTE.len()];
                faces.push(Face::with_color(vertex_idx, tex_idx, color));
            }
            _ => {}
        }
    }

    let mesh = Mesh::new(vertices, tex_coords, faces);
    mesh.validate()?;
    Ok(mesh)
}

fn parse_scalars<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[Scalar; N], AssetError> {
    let mut out = [Scalar::ZERO; N];
    for slot in out.iter_mut() {
        let token = parts.next().ok_or_else(|| AssetError::ParseError {
            line,
            message: format!("expected {} numbers", N),
        })?;
        let value: f32 = token.parse().map_err(|_| AssetError::ParseError {
            line,
            message: format!("'{}' is not a number", token),
        })?;
        if !value.is_finite() {
            return Err(AssetError::ParseError {
                line,
                message: format!("'{}' is not a finite number", token),
            });
        }
        *slot = Scalar::from_f32(value);
    }
    Ok(out)
}

/// Split a `v/vt[/vn]` corner into 0-based vertex and texcoord indices
fn parse_corner(corner: &str, line: usize) -> Result<(usize, usize), AssetError> {
    let mut fields = corner.split('/');
    let vertex = fields.next().unwrap_or("");
    let tex = match fields.next() {
        Some(t) if !t.is_empty() => t,
        _ => return Err(AssetError::MissingTexCoords { line }),
    };
    Ok((parse_index(vertex, line)?, parse_index(tex, line)?))
}

fn parse_index(token: &str, line: usize) -> Result<usize, AssetError> {
    match token.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(AssetError::ParseError {
            line,
            message: format!("'{}' is not a valid 1-based index", token),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::IndexKind;

    const QUAD: &str = "\
# two triangles
v -0.5 -0.5 0.0
v 0.5 -0.5 0.0
v -0.5 0.5 0.0
v 0.5 0.5 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vt 1.0 1.0
vn 0.0 0.0 -1.0
s off
f 3/3/1 2/2/1 1/1/1
f 3/3 4/4 2/2
";

    #[test]
    fn test_parse_quad() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.tex_coords.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.faces[0].vertices, [2, 1, 0]);
        assert_eq!(mesh.faces[1].tex_coords, [2, 3, 1]);
        assert_eq!(mesh.vertices[1], Vec3::new(Scalar::HALF, -Scalar::HALF, Scalar::ZERO));
        assert_eq!(mesh.faces[0].color, Some(FACE_PALETTE[0]));
        assert_eq!(mesh.faces[1].color, Some(FACE_PALETTE[1]));
        assert!(mesh.texture.is_none());
    }

    #[test]
    fn test_rejects_quads() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 3/1 4/1\n";
        assert!(matches!(
            parse_obj(src),
            Err(AssetError::NonTriangleFace { line: 6, count: 4 })
        ));
    }

    #[test]
    fn test_requires_tex_coords() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n";
        assert!(matches!(parse_obj(src), Err(AssetError::MissingTexCoords { line: 4 })));
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1//1 2//1 3//1\n";
        assert!(matches!(parse_obj(src), Err(AssetError::MissingTexCoords { line: 4 })));
    }

    #[test]
    fn test_bad_numbers() {
        assert!(matches!(
            parse_obj("v 0 zero 0\n"),
            Err(AssetError::ParseError { line: 1, .. })
        ));
        assert!(matches!(parse_obj("vt 0.5\n"), Err(AssetError::ParseError { line: 1, .. })));
        let src = "v 0 0 0\nvt 0 0\nf 0/1 1/1 1/1\n";
        assert!(matches!(parse_obj(src), Err(AssetError::ParseError { line: 3, .. })));
    }

    #[test]
    fn test_rejects_non_finite_numbers() {
        for src in ["v nan 0 0\n", "v inf 0 0\n", "v 0 0 -infinity\n", "vt NaN 0\n"] {
            assert!(
                matches!(parse_obj(src), Err(AssetError::ParseError { line: 1, .. })),
                "accepted {:?}",
                src
            );
        }
    }

    #[test]
    fn test_out_of_range_index() {
        let src = "v 0 0 0\nv 1 0 0\nvt 0 0\nf 1/1 2/1 3/1\n";
        match parse_obj(src) {
            Err(AssetError::IndexOutOfRange { face, kind, index, len }) => {
                assert_eq!((face, kind, index, len), (0, IndexKind::Vertex, 2, 2));
            }
            other => panic!("expected index error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(load_obj("/nonexistent/mesh.obj"), Err(AssetError::IoError(_))));
    }
}
