use glam::{Mat4, Vec3};

use crate::projector::{
    mesh::Mesh,
    raycast::{Ray, SurfaceHit, pick_paintable},
};

/// Meshes of the paintable character. Only the shirt parts (torso and sleeves) take paint.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintableScene {
    pub meshes: Vec<Mesh>,
}

impl PaintableScene {
    pub fn new(meshes: Vec<Mesh>) -> Self {
        Self { meshes }
    }

    /// Blocky character standing at the origin.
    pub fn character() -> Self {
        Self::new(character_meshes())
    }

    pub fn paintable_count(&self) -> usize {
        self.meshes.iter().filter(|m| m.paintable).count()
    }

    pub fn pick(&self, ray: &Ray) -> Option<SurfaceHit> {
        pick_paintable(ray, &self.meshes)
    }
}

fn at(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

pub fn character_meshes() -> Vec<Mesh> {
    let root = at(0.0, -0.5, 0.0);
    let part = |name: &str, parent: Mat4, pos: Mat4, size: [f32; 3], paintable: bool| {
        Mesh::cuboid(name, Vec3::from_array(size), parent * pos, paintable)
    };

    let left_arm = root * at(-0.6, 0.6, 0.0);
    let right_arm = root * at(0.6, 0.6, 0.0);

    vec![
        part("head", root, at(0.0, 1.4, 0.0), [0.8, 0.8, 0.8], false),
        part("hair", root, at(0.0, 1.85, 0.0), [0.85, 0.15, 0.85], false),
        part("torso", root, at(0.0, 0.6, 0.0), [0.9, 0.9, 0.5], true),
        part("left_sleeve", left_arm, at(0.0, 0.15, 0.0), [0.3, 0.35, 0.3], true),
        part("left_forearm", left_arm, at(0.0, -0.25, 0.0), [0.28, 0.4, 0.28], false),
        part("right_sleeve", right_arm, at(0.0, 0.15, 0.0), [0.3, 0.35, 0.3], true),
        part("right_forearm", right_arm, at(0.0, -0.25, 0.0), [0.28, 0.4, 0.28], false),
        part("left_leg", root, at(-0.22, -0.35, 0.0), [0.35, 0.9, 0.35], false),
        part("right_leg", root, at(0.22, -0.35, 0.0), [0.35, 0.9, 0.35], false),
        part("left_foot", root, at(-0.22, -0.85, 0.05), [0.35, 0.15, 0.45], false),
        part("right_foot", root, at(0.22, -0.85, 0.05), [0.35, 0.15, 0.45], false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_shirt_parts_are_paintable() {
        let scene = PaintableScene::character();
        assert_eq!(scene.paintable_count(), 3);
        assert!(
            scene
                .meshes
                .iter()
                .filter(|m| m.paintable)
                .all(|m| m.name == "torso" || m.name.ends_with("_sleeve"))
        );
    }

    #[test]
    fn straight_ray_hits_torso_front() {
        let scene = PaintableScene::character();
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 4.0),
            direction: Vec3::NEG_Z,
        };
        let hit = scene.pick(&ray).unwrap();
        assert_eq!(hit.mesh, "torso");
        assert!((hit.point.z - 0.25).abs() < 1e-5);
        assert!((hit.uv.x - 0.5).abs() < 1e-4);
        assert!((hit.uv.y - 0.38889).abs() < 1e-4);
    }

    #[test]
    fn head_does_not_take_paint() {
        let scene = PaintableScene::character();
        let ray = Ray {
            origin: Vec3::new(0.0, 0.9, 4.0),
            direction: Vec3::NEG_Z,
        };
        assert!(scene.pick(&ray).is_none());
    }

    #[test]
    fn sleeve_is_hit_from_the_side() {
        let scene = PaintableScene::character();
        let ray = Ray {
            origin: Vec3::new(4.0, 0.25, 0.0),
            direction: Vec3::NEG_X,
        };
        let hit = scene.pick(&ray).unwrap();
        assert_eq!(hit.mesh, "right_sleeve");
    }
}
