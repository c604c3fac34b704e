use crate::mesh::{MeshData, Vertex};
use glam::Vec3;
use std::collections::HashMap;
use std::f32::consts::PI;

/// Procedural mesh builders.
pub struct MeshFactory;

impl MeshFactory {
    /// Ico-sphere centered on `center`, refined `subdivisions` times.
    ///
    /// UVs are spherical (longitude, latitude) and normals point outward.
    pub fn ico_sphere(center: Vec3, radius: f32, subdivisions: u32) -> MeshData {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let mut points: Vec<Vec3> = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .into_iter()
        .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
        .collect();

        let mut faces: Vec<[u32; 3]> = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut midpoint = |a: u32, b: u32, points: &mut Vec<Vec3>| -> u32 {
                let key = (a.min(b), a.max(b));
                *midpoints.entry(key).or_insert_with(|| {
                    let m = ((points[a as usize] + points[b as usize]) * 0.5).normalize();
                    points.push(m);
                    points.len() as u32 - 1
                })
            };
            faces = faces
                .iter()
                .flat_map(|&[a, b, c]| {
                    let ab = midpoint(a, b, &mut points);
                    let bc = midpoint(b, c, &mut points);
                    let ca = midpoint(c, a, &mut points);
                    [[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]
                })
                .collect();
        }

        let vertices = points
            .iter()
            .map(|&n| {
                let u = 0.5 + n.y.atan2(n.x) / (2.0 * PI);
                let v = 0.5 - n.z.asin() / PI;
                Vertex::new(center + n * radius, n, [u, v])
            })
            .collect();
        MeshData::new(vertices, faces.into_iter().flatten().collect())
    }

    /// Flip winding and normals so the mesh is seen from inside.
    pub fn invert_faces(mesh: &mut MeshData) {
        for tri in mesh.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        for v in &mut mesh.vertices {
            v.normal = v.normal.map(|c| -c);
        }
    }

    /// Square in the XY plane facing +Z.
    pub fn plane(center: Vec3, size: f32) -> MeshData {
        let h = size * 0.5;
        let corners = [(-h, -h, [0.0, 0.0]), (h, -h, [1.0, 0.0]), (h, h, [1.0, 1.0]), (-h, h, [0.0, 1.0])];
        let vertices = corners
            .into_iter()
            .map(|(x, y, uv)| Vertex::new(center + Vec3::new(x, y, 0.0), Vec3::Z, uv))
            .collect();
        MeshData::new(vertices, vec![0, 1, 2, 0, 2, 3])
    }
}
