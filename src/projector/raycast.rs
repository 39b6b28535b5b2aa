use glam::{Vec2, Vec3};

use crate::projector::mesh::Mesh;

/// A ray in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Front-face ray/triangle hit: distance plus barycentric `(u, v)` weights of `v1` and `v2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleHit {
    pub distance: f32,
    pub u: f32,
    pub v: f32,
}

/// Möller-Trumbore ray-triangle intersection with backface culling.
///
/// Triangles are front-facing when their vertices wind counter-clockwise as seen by the ray.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Parallel, or seen from behind
    if a < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(TriangleHit { distance: t, u, v })
}

/// Nearest hit on a paintable surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceHit {
    pub mesh: String,
    pub distance: f32,
    pub point: Vec3,
    pub uv: Vec2,
}

/// Find the nearest front-facing triangle among `meshes` that are flagged paintable.
///
/// Meshes that are not paintable are not tested at all.
pub fn pick_paintable(ray: &Ray, meshes: &[Mesh]) -> Option<SurfaceHit> {
    let mut best: Option<SurfaceHit> = None;

    for mesh in meshes.iter().filter(|m| m.paintable) {
        let world = mesh.world_positions();
        for tri in &mesh.indices {
            let [i0, i1, i2] = tri.map(|i| i as usize);
            let Some(hit) = ray_triangle_intersect(ray, world[i0], world[i1], world[i2]) else {
                continue;
            };
            if best.as_ref().is_some_and(|b| b.distance <= hit.distance) {
                continue;
            }

            let w = 1.0 - hit.u - hit.v;
            let uv = mesh.vertices[i0].uv * w
                + mesh.vertices[i1].uv * hit.u
                + mesh.vertices[i2].uv * hit.v;
            best = Some(SurfaceHit {
                mesh: mesh.name.clone(),
                distance: hit.distance,
                point: ray.origin + ray.direction * hit.distance,
                uv,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> (Vec3, Vec3, Vec3) {
        (
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn front_face_hit() {
        let (a, b, c) = tri();
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        let hit = ray_triangle_intersect(&ray, a, b, c).unwrap();
        assert!((hit.distance - 5.0).abs() < 1e-5);
    }

    #[test]
    fn back_face_is_culled() {
        let (a, b, c) = tri();
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -5.0),
            direction: Vec3::Z,
        };
        assert!(ray_triangle_intersect(&ray, a, b, c).is_none());
    }

    #[test]
    fn miss_and_behind_origin() {
        let (a, b, c) = tri();
        let off = Ray {
            origin: Vec3::new(3.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert!(ray_triangle_intersect(&off, a, b, c).is_none());

        let away = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::Z,
        };
        assert!(ray_triangle_intersect(&away, a, b, c).is_none());
    }
}
