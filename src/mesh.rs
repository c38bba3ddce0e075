use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, Mesh, PrimitiveTopology},
};

use crate::types::{Point, Vector};

/// Output buffers of one surface extraction.
///
/// Vertices are never shared: every triangle corner gets its own vertex and normal,
/// so `vertices`, `normals` and `indices` always have the same length and
/// `indices[i] == i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    /// Flat list of vertex positions: `[[x, y, z], ...]`
    pub vertices: Vec<[f32; 3]>,

    /// Per-vertex unit normals, index-aligned with `vertices`.
    pub normals: Vec<[f32; 3]>,

    /// Triangle list into `vertices`, three entries per triangle.
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    /// Creates an empty mesh with no vertices, triangles, or normals.
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Empties all three buffers, keeping their allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.indices.clear();
    }

    /// Appends a vertex with its normal and indexes it as the next triangle corner.
    pub fn push_vertex(&mut self, position: &Point, normal: &Vector) {
        self.indices.push(self.vertices.len() as u32);
        self.vertices.push([position.x, position.y, position.z]);
        self.normals.push([normal.x, normal.y, normal.z]);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates over the vertex index triples of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Returns the three vertex positions of triangle `tri`.
    #[cfg(test)]
    pub(crate) fn tri_coords(&self, tri: usize) -> [Point; 3] {
        [0, 1, 2].map(|corner| {
            let [x, y, z] = self.vertices[self.indices[tri * 3 + corner] as usize];
            Point::new(x, y, z)
        })
    }

    /// Builds a Bevy triangle-list [`Mesh`] from a copy of the buffers.
    pub fn to_bevy_mesh(&self) -> Mesh {
        let mut bevy_mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        );

        bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.vertices.clone());
        bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone());
        bevy_mesh.insert_indices(Indices::U32(self.indices.clone()));
        bevy_mesh
    }
}
