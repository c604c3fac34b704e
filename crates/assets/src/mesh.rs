use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex layout shared by every mesh: position, normal, uv, color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
            color: [1.0; 4],
        }
    }
}

/// Indexed triangle list ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Axis-aligned bounds of the vertex positions, if any.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Append another mesh, offsetting its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 12 * 4);
        let v = Vertex::new(Vec3::X, Vec3::Z, [0.5, 0.5]);
        assert_eq!(bytemuck::bytes_of(&v).len(), 48);
    }

    #[test]
    fn append_offsets_indices() {
        let tri = MeshData::new(
            vec![Vertex::new(Vec3::ZERO, Vec3::Z, [0.0; 2]); 3],
            vec![0, 1, 2],
        );
        let mut mesh = tri.clone();
        mesh.append(&tri);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mesh = MeshData::new(
            vec![
                Vertex::new(Vec3::new(-1.0, 2.0, 0.0), Vec3::Z, [0.0; 2]),
                Vertex::new(Vec3::new(3.0, -2.0, 1.0), Vec3::Z, [0.0; 2]),
            ],
            vec![],
        );
        assert_eq!(
            mesh.bounds(),
            Some((Vec3::new(-1.0, -2.0, 0.0), Vec3::new(3.0, 2.0, 1.0)))
        );
        assert_eq!(MeshData::default().bounds(), None);
    }
}
