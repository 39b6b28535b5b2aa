use glam::{Mat4, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
}

/// Indexed triangle mesh with a world transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    /// Counter-clockwise front faces.
    pub indices: Vec<[u32; 3]>,
    pub transform: Mat4,
    pub paintable: bool,
}

impl Mesh {
    /// Axis-aligned box centered on the origin with one UV square per face.
    ///
    /// Face order and per-face UV orientation follow the common box layout used by web 3D
    /// engines: +X, -X, +Y, -Y, +Z, -Z, each with `(0, 1)` at the top-left corner as seen from
    /// outside.
    pub fn cuboid(name: impl Into<String>, size: Vec3, transform: Mat4, paintable: bool) -> Self {
        let (w, h, d) = (size.x, size.y, size.z);
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(12);

        // (u axis, v axis, w axis, udir, vdir, extent along u, along v, along w)
        let faces: [(usize, usize, usize, f32, f32, f32, f32, f32); 6] = [
            (2, 1, 0, -1.0, -1.0, d, h, w),
            (2, 1, 0, 1.0, -1.0, d, h, -w),
            (0, 2, 1, 1.0, 1.0, w, d, h),
            (0, 2, 1, 1.0, -1.0, w, d, -h),
            (0, 1, 2, 1.0, -1.0, w, h, d),
            (0, 1, 2, -1.0, -1.0, w, h, -d),
        ];

        for (ua, va, wa, udir, vdir, fw, fh, fd) in faces {
            let base = vertices.len() as u32;
            for iy in 0..2 {
                for ix in 0..2 {
                    let x = ix as f32 * fw - fw / 2.0;
                    let y = iy as f32 * fh - fh / 2.0;
                    let mut p = [0.0f32; 3];
                    p[ua] = x * udir;
                    p[va] = y * vdir;
                    p[wa] = fd / 2.0;
                    vertices.push(Vertex {
                        position: Vec3::from_array(p),
                        uv: Vec2::new(ix as f32, 1.0 - iy as f32),
                    });
                }
            }
            // a = (0,0), b = (0,1), c = (1,1), d = (1,0)
            let (a, b, c, dd) = (base, base + 2, base + 3, base + 1);
            indices.push([a, b, dd]);
            indices.push([b, c, dd]);
        }

        Self {
            name: name.into(),
            vertices,
            indices,
            transform,
            paintable,
        }
    }

    pub fn world_positions(&self) -> Vec<Vec3> {
        self.vertices
            .iter()
            .map(|v| self.transform.transform_point3(v.position))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_has_six_quads() {
        let m = Mesh::cuboid("box", Vec3::ONE, Mat4::IDENTITY, true);
        assert_eq!(m.vertices.len(), 24);
        assert_eq!(m.indices.len(), 12);
    }

    #[test]
    fn front_face_faces_positive_z() {
        let m = Mesh::cuboid("box", Vec3::new(2.0, 4.0, 6.0), Mat4::IDENTITY, true);
        let [a, b, c] = m.indices[8].map(|i| m.vertices[i as usize].position);
        assert_eq!(a.z, 3.0);
        let n = (b - a).cross(c - a);
        assert!(n.z > 0.0);
        // Top-left of the front face carries uv (0, 1).
        assert_eq!(m.vertices[16].position, Vec3::new(-1.0, 2.0, 3.0));
        assert_eq!(m.vertices[16].uv, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn every_face_points_outward() {
        let m = Mesh::cuboid("box", Vec3::new(1.0, 2.0, 3.0), Mat4::IDENTITY, false);
        for tri in &m.indices {
            let [a, b, c] = tri.map(|i| m.vertices[i as usize].position);
            let n = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(n.dot(centroid) > 0.0, "inward face {tri:?}");
        }
    }
}
