use crate::projector::camera::Viewport;

/// Maps pointer positions on the flat UV view to texture pixels.
///
/// The view shows the whole texture stretched over `display`; each axis scales independently.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatProjector {
    pub texture_width: u32,
    pub texture_height: u32,
    pub display: Viewport,
}

impl FlatProjector {
    pub fn new(texture_width: u32, texture_height: u32, display: Viewport) -> Self {
        Self {
            texture_width,
            texture_height,
            display,
        }
    }

    pub fn scale(&self) -> (f64, f64) {
        (
            f64::from(self.texture_width) / f64::from(self.display.width),
            f64::from(self.texture_height) / f64::from(self.display.height),
        )
    }

    /// Texture pixel under the pointer, or `None` when the pointer is outside the view.
    pub fn project(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !self.display.is_valid() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (w, h) = (f64::from(self.display.width), f64::from(self.display.height));
        if !(0.0..=w).contains(&x) || !(0.0..=h).contains(&y) {
            return None;
        }
        let (sx, sy) = self.scale();
        Some((x * sx, y * sy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_each_axis() {
        let p = FlatProjector::new(512, 512, Viewport::new(256.0, 128.0));
        assert_eq!(p.project(128.0, 64.0), Some((256.0, 256.0)));
        assert_eq!(p.project(256.0, 128.0), Some((512.0, 512.0)));
    }

    #[test]
    fn outside_is_ignored() {
        let p = FlatProjector::new(512, 512, Viewport::new(256.0, 256.0));
        assert_eq!(p.project(-1.0, 10.0), None);
        assert_eq!(p.project(10.0, 300.0), None);
        assert_eq!(p.project(f64::NAN, 1.0), None);
    }

    #[test]
    fn degenerate_display_is_ignored() {
        let p = FlatProjector::new(512, 512, Viewport::new(0.0, 256.0));
        assert_eq!(p.project(0.0, 0.0), None);
    }
}
