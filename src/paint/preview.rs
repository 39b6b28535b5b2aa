use std::sync::Arc;

use crate::{
    foundation::{core::Rgba8, error::StudioResult},
    paint::{
        bridge::TextureSnapshot,
        texture::{hline, vline},
    },
    render::raster::RasterImage,
};

/// Read-only consumer of texture snapshots, standing in for the 3D material.
///
/// Shows `placeholder` until the first texture arrives. `needs_update` is raised on every accepted
/// snapshot and lowered by whoever uploads it.
#[derive(Clone, Debug)]
pub struct TexturePreview {
    placeholder: Rgba8,
    texture: Option<Arc<RasterImage>>,
    revision: Option<u64>,
    needs_update: bool,
}

impl TexturePreview {
    pub fn new(placeholder: Rgba8) -> Self {
        Self {
            placeholder,
            texture: None,
            revision: None,
            needs_update: false,
        }
    }

    /// Stale snapshots (older revision than the one held) are ignored.
    pub fn accept(&mut self, snapshot: &TextureSnapshot) {
        if self.revision.is_some_and(|r| r > snapshot.revision) {
            return;
        }
        self.texture = Some(snapshot.image.clone());
        self.revision = Some(snapshot.revision);
        self.needs_update = true;
    }

    pub fn is_ready(&self) -> bool {
        self.texture.is_some()
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// Returns the pending flag and lowers it.
    pub fn take_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    /// Nearest-texel lookup with the same UV convention as painting.
    pub fn sample_uv(&self, u: f64, v: f64) -> Rgba8 {
        let Some(tex) = &self.texture else {
            return self.placeholder;
        };
        let x = (u.clamp(0.0, 1.0) * f64::from(tex.width)).floor() as u32;
        let y = ((1.0 - v.clamp(0.0, 1.0)) * f64::from(tex.height)).floor() as u32;
        tex.pixel(x.min(tex.width - 1), y.min(tex.height - 1))
            .unwrap_or(self.placeholder)
    }
}

const GRID_COLOR: Rgba8 = Rgba8::rgba(100, 100, 255, 77);
const GRID_STEP: u32 = 64;

/// Flat UV view: the texture scaled to the display with a 64px grid drawn over it.
pub fn compose_uv_view(
    texture: &RasterImage,
    width: u32,
    height: u32,
) -> StudioResult<RasterImage> {
    let mut out = texture.resize(width, height)?;
    let mut grid = out.clone();
    let mut x = 0;
    while x < width {
        vline(&mut grid, x, 0, height - 1, GRID_COLOR, None);
        x += GRID_STEP;
    }
    let mut y = 0;
    while y < height {
        hline(&mut grid, y, 0, width - 1, GRID_COLOR, None);
        y += GRID_STEP;
    }

    // Blend the translucent grid over the texture.
    for (dst, src) in out.data.chunks_exact_mut(4).zip(grid.data.chunks_exact(4)) {
        if src != &dst[..] {
            let a = u16::from(GRID_COLOR.a);
            for c in 0..3 {
                let blended = (u16::from(src[c]) * a + u16::from(dst[c]) * (255 - a) + 127) / 255;
                dst[c] = blended as u8;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(rev: u64, color: Rgba8) -> TextureSnapshot {
        TextureSnapshot {
            revision: rev,
            image: Arc::new(RasterImage::new(4, 4, color).unwrap()),
        }
    }

    #[test]
    fn placeholder_until_first_texture() {
        let mut p = TexturePreview::new(Rgba8::rgb(0xFF, 0xE4, 0xC4));
        assert!(!p.is_ready());
        assert_eq!(p.sample_uv(0.5, 0.5), Rgba8::rgb(0xFF, 0xE4, 0xC4));

        p.accept(&snap(1, Rgba8::BLACK));
        assert!(p.is_ready());
        assert!(p.take_update());
        assert!(!p.take_update());
        assert_eq!(p.sample_uv(1.0, 0.0), Rgba8::BLACK);
    }

    #[test]
    fn stale_snapshots_are_ignored() {
        let mut p = TexturePreview::new(Rgba8::WHITE);
        p.accept(&snap(5, Rgba8::BLACK));
        p.take_update();
        p.accept(&snap(3, Rgba8::WHITE));
        assert!(!p.needs_update());
        assert_eq!(p.revision(), Some(5));
    }

    #[test]
    fn uv_view_draws_grid() {
        let tex = RasterImage::new(512, 512, Rgba8::WHITE).unwrap();
        let view = compose_uv_view(&tex, 256, 256).unwrap();
        assert_ne!(view.pixel(64, 10), Some(Rgba8::WHITE));
        assert_eq!(view.pixel(65, 10), Some(Rgba8::WHITE));
    }
}
