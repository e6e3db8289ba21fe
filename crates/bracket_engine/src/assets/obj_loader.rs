//! OBJ file loader (triangle soup)
//!
//! Every face corner becomes its own vertex; polygons are fan-triangulated.
//! `o`/`g` statements start a new primitive so grouped files keep their parts.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::render::{MeshData, MeshPrimitive, Vertex};

/// OBJ parsing errors
#[derive(Error, Debug)]
pub enum ObjError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A number or index could not be parsed
    #[error("Parse error on line {line}: {message}")]
    ParseError {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },
    /// The file parsed but holds no usable geometry
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Loader for Wavefront OBJ files
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file and return a mesh
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshData, ObjError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::parse(BufReader::new(file), &path.to_string_lossy())
    }

    /// Parse OBJ text from any buffered reader
    pub fn parse<R: BufRead>(reader: R, name: &str) -> Result<MeshData, ObjError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut tex_coords: Vec<[f32; 2]> = Vec::new();
        let mut primitives = Vec::new();
        let mut current = MeshPrimitive::default();

        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = line_index + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };
            let args: Vec<&str> = parts.collect();

            match keyword {
                "v" => positions.push(parse_floats::<3>(&args, line_number, "vertex")?),
                "vn" => normals.push(parse_floats::<3>(&args, line_number, "normal")?),
                "vt" => tex_coords.push(parse_floats::<2>(&args, line_number, "tex coord")?),
                "o" | "g" => {
                    if !current.vertices.is_empty() {
                        primitives.push(std::mem::take(&mut current));
                    }
                    current.name = args.join(" ");
                }
                "f" => {
                    if args.len() < 3 {
                        return Err(ObjError::ParseError {
                            line: line_number,
                            message: format!("face needs at least 3 corners, got {}", args.len()),
                        });
                    }

                    let mut face_indices = Vec::with_capacity(args.len());
                    for corner in &args {
                        let vertex = parse_corner(corner, line_number, &positions, &normals, &tex_coords)?;
                        current.vertices.push(vertex);
                        face_indices.push((current.vertices.len() - 1) as u32);
                    }

                    // Triangulate face (simple fan triangulation)
                    for i in 1..(face_indices.len() - 1) {
                        current.indices.push(face_indices[0]);
                        current.indices.push(face_indices[i]);
                        current.indices.push(face_indices[i + 1]);
                    }
                }
                _ => {
                    // Materials, smoothing groups and the like are ignored
                }
            }
        }

        if !current.vertices.is_empty() {
            primitives.push(current);
        }

        if primitives.is_empty() {
            return Err(ObjError::InvalidFormat("No faces found in OBJ file".to_string()));
        }

        Ok(MeshData {
            name: name.to_string(),
            primitives,
        })
    }
}

fn parse_floats<const N: usize>(args: &[&str], line: usize, what: &str) -> Result<[f32; N], ObjError> {
    if args.len() < N {
        return Err(ObjError::ParseError {
            line,
            message: format!("{what} needs {N} components"),
        });
    }
    let mut values = [0.0; N];
    for (value, text) in values.iter_mut().zip(args) {
        *value = text.parse().map_err(|_| ObjError::ParseError {
            line,
            message: format!("invalid {what} component '{text}'"),
        })?;
    }
    Ok(values)
}

/// Resolve a 1-based (or negative, relative) OBJ index
fn resolve_index(text: &str, len: usize, line: usize) -> Result<usize, ObjError> {
    let raw: i64 = text.parse().map_err(|_| ObjError::ParseError {
        line,
        message: format!("invalid index '{text}'"),
    })?;
    let resolved = if raw > 0 {
        raw - 1
    } else {
        len as i64 + raw
    };
    if raw == 0 || resolved < 0 || resolved >= len as i64 {
        return Err(ObjError::InvalidFormat(format!(
            "index {raw} out of bounds on line {line}"
        )));
    }
    Ok(resolved as usize)
}

fn parse_corner(
    corner: &str,
    line: usize,
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
) -> Result<Vertex, ObjError> {
    let mut fields = corner.split('/');

    let position_index = resolve_index(fields.next().unwrap_or(""), positions.len(), line)?;

    let tex_coord = match fields.next() {
        Some(text) if !text.is_empty() => tex_coords[resolve_index(text, tex_coords.len(), line)?],
        _ => [0.0, 0.0],
    };

    let normal = match fields.next() {
        Some(text) if !text.is_empty() => normals[resolve_index(text, normals.len(), line)?],
        _ => [0.0, 1.0, 0.0],
    };

    Ok(Vertex {
        position: positions[position_index],
        normal,
        tex_coord,
    })
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
vn 0 0 1
f 1/1/1 2/1/1 3/1/1 4/1/1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = ObjLoader::parse(Cursor::new(QUAD), "quad").unwrap();
        assert_eq!(mesh.primitives.len(), 1);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.primitives[0].indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.primitives[0].vertices[2].position, [1.0, 1.0, 0.0]);
        assert_eq!(mesh.primitives[0].vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_groups_split_primitives() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\no first\nf 1 2 3\no second\nf -3 -2 -1\n";
        let mesh = ObjLoader::parse(Cursor::new(text), "groups").unwrap();
        assert_eq!(mesh.primitives.len(), 2);
        assert_eq!(mesh.primitives[0].name, "first");
        assert_eq!(mesh.primitives[1].name, "second");
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_index_zero_is_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n";
        assert!(matches!(
            ObjLoader::parse(Cursor::new(text), "bad"),
            Err(ObjError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_empty_file_is_invalid() {
        assert!(ObjLoader::parse(Cursor::new("# nothing\n"), "empty").is_err());
    }

    #[test]
    fn test_bad_number_reports_line() {
        let err = ObjLoader::parse(Cursor::new("v 0 0 0\nv 1 x 0\n"), "bad").unwrap_err();
        assert!(matches!(err, ObjError::ParseError { line: 2, .. }));
    }
}
