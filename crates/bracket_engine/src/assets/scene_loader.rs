//! Scene-graph mesh import through the `gltf` crate
//!
//! Every glTF mesh primitive becomes one [`MeshPrimitive`] named after the
//! mesh it belongs to. Node transforms are not baked in.

use std::path::Path;

use gltf::mesh::util::ReadIndices;
use thiserror::Error;

use crate::render::{MeshData, MeshPrimitive, Vertex};

/// Scene import errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// The importer rejected the file
    #[error("Import failed: {0}")]
    Import(#[from] gltf::Error),
    /// The file holds no triangle geometry
    #[error("No geometry found in {0}")]
    Empty(String),
}

/// Loader for scene-graph files
pub struct SceneLoader;

impl SceneLoader {
    /// Import every mesh primitive of a scene file
    pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<MeshData, SceneError> {
        let path = path.as_ref();
        let (document, buffers, _images) = gltf::import(path)?;

        let mut primitives = Vec::new();
        for mesh in document.meshes() {
            let name = mesh.name().unwrap_or_default().to_string();
            for primitive in mesh.primitives() {
                let reader = primitive.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));

                let Some(positions) = reader.read_positions() else {
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();

                let normals: Vec<[f32; 3]> = match reader.read_normals() {
                    Some(it) => it.collect(),
                    None => vec![[0.0, 1.0, 0.0]; positions.len()],
                };
                let tex_coords: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                    Some(it) => it.into_f32().collect(),
                    None => vec![[0.0, 0.0]; positions.len()],
                };

                let vertices = positions
                    .iter()
                    .enumerate()
                    .map(|(i, &position)| Vertex {
                        position,
                        normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                        tex_coord: tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                    })
                    .collect::<Vec<_>>();

                let indices: Vec<u32> = match reader.read_indices() {
                    Some(ReadIndices::U16(it)) => it.map(u32::from).collect(),
                    Some(ReadIndices::U32(it)) => it.collect(),
                    Some(ReadIndices::U8(it)) => it.map(u32::from).collect(),
                    None => (0..vertices.len() as u32).collect(),
                };

                primitives.push(MeshPrimitive {
                    name: name.clone(),
                    vertices,
                    indices,
                });
            }
        }

        if primitives.is_empty() {
            return Err(SceneError::Empty(path.display().to_string()));
        }

        log::debug!("Imported {} primitive(s) from {}", primitives.len(), path.display());
        Ok(MeshData {
            name: path.to_string_lossy().into_owned(),
            primitives,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // One triangle, positions only, buffer embedded as a data URI
    const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scenes": [ { "nodes": [0] } ],
  "nodes": [ { "mesh": 0 } ],
  "meshes": [ { "name": "tri", "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
  "buffers": [ { "byteLength": 36, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA" } ],
  "bufferViews": [ { "buffer": 0, "byteOffset": 0, "byteLength": 36 } ],
  "accessors": [ { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                   "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] } ]
}"#;

    #[test]
    fn test_import_embedded_triangle() {
        let mut file = tempfile::Builder::new().suffix(".gltf").tempfile().unwrap();
        file.write_all(TRIANGLE_GLTF.as_bytes()).unwrap();

        let mesh = SceneLoader::load_scene(file.path()).unwrap();
        assert_eq!(mesh.primitives.len(), 1);
        assert_eq!(mesh.primitives[0].name, "tri");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.primitives[0].indices, vec![0, 1, 2]);
        assert_eq!(mesh.primitives[0].vertices[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_garbage_is_an_import_error() {
        let mut file = tempfile::Builder::new().suffix(".fbx").tempfile().unwrap();
        file.write_all(b"Kaydara FBX Binary  \0").unwrap();
        assert!(matches!(SceneLoader::load_scene(file.path()), Err(SceneError::Import(_))));
    }
}
