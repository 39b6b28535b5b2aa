use crate::{foundation::error::StudioResult, render::raster::RasterImage, scene::model::Scene};

pub mod cpu;
pub mod raster;
pub mod svg_raster;
pub mod text;

/// Flattens a scene into a raster. The 2D editor's export goes through this seam.
pub trait SceneRenderer {
    fn render(&mut self, scene: &Scene) -> StudioResult<RasterImage>;
}
