//! Mesh geometry produced by the importers
//!
//! Pure data: vertices and triangle indices, grouped into named primitives
//! so scene-graph formats can keep their node structure.

use crate::foundation::math::Vec3;

/// 3D vertex data structure for rendering
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Vertex with an up-facing normal and zero texture coordinate
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            normal: [0.0, 1.0, 0.0],
            tex_coord: [0.0, 0.0],
        }
    }
}

/// One drawable part of a mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshPrimitive {
    /// Node or group name, empty when the source had none
    pub name: String,
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl MeshPrimitive {
    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Imported mesh: one or more primitives
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Source path or a caller-chosen name
    pub name: String,
    /// Drawable parts, in source order
    pub primitives: Vec<MeshPrimitive>,
}

impl MeshData {
    /// Mesh made of a single primitive
    pub fn single(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let name = name.into();
        Self {
            primitives: vec![MeshPrimitive {
                name: name.clone(),
                vertices,
                indices,
            }],
            name,
        }
    }

    /// Total vertex count over all primitives
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.vertices.len()).sum()
    }

    /// Total triangle count over all primitives
    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(MeshPrimitive::triangle_count).sum()
    }

    /// Axis-aligned bounds as (min, max), `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self
            .primitives
            .iter()
            .flat_map(|p| p.vertices.iter())
            .map(|v| Vec3::from(v.position));
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p))))
    }

    /// Unit cube centered on the origin (24 vertices, 12 triangles)
    pub fn cube(name: impl Into<String>) -> Self {
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            ([0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let n = Vec3::from(normal);
            let u = Vec3::from(u);
            let v = Vec3::from(v);
            let base = vertices.len() as u32;
            for (su, sv, uv) in [(-1.0, -1.0, [0.0, 0.0]), (1.0, -1.0, [1.0, 0.0]), (1.0, 1.0, [1.0, 1.0]), (-1.0, 1.0, [0.0, 1.0])] {
                let p = (n + u * su + v * sv) * 0.5;
                vertices.push(Vertex {
                    position: [p.x, p.y, p.z],
                    normal,
                    tex_coord: uv,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::single(name, vertices, indices)
    }
}
