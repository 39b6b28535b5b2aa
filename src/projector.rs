pub mod camera;
pub mod character;
pub mod flat;
pub mod mesh;
pub mod raycast;
pub mod stroke;
