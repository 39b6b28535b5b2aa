use crate::{foundation::core::Rgba8, render::raster::RasterImage};

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    pub fn union(self, other: PixelRect) -> PixelRect {
        PixelRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Stamp a hard-edged disk centered at `(cx, cy)` in pixel space.
///
/// A pixel is covered when its center lies inside the circle. The pixel containing the center is
/// always covered when the center lies inside the closed image rectangle, so tiny brushes and
/// centers on the far edges still leave a mark. Covered pixels are replaced by `color`.
/// Returns the touched rectangle, or `None` if nothing was covered.
pub fn stamp_disk(
    img: &mut RasterImage,
    cx: f64,
    cy: f64,
    radius: f64,
    color: Rgba8,
) -> Option<PixelRect> {
    if !cx.is_finite() || !cy.is_finite() || !radius.is_finite() {
        return None;
    }
    let radius = radius.max(0.0);
    let (w, h) = (f64::from(img.width), f64::from(img.height));

    let mut dirty: Option<PixelRect> = None;
    let mut mark = |img: &mut RasterImage, x: u32, y: u32| {
        img.put_pixel(x, y, color);
        let px = PixelRect {
            x0: x,
            y0: y,
            x1: x + 1,
            y1: y + 1,
        };
        dirty = Some(dirty.map_or(px, |d| d.union(px)));
    };

    // Candidate pixel rows/columns whose centers may fall inside the circle.
    let x_lo = (cx - radius - 0.5).floor().max(0.0);
    let x_hi = (cx + radius - 0.5).ceil().min(w - 1.0);
    let y_lo = (cy - radius - 0.5).floor().max(0.0);
    let y_hi = (cy + radius - 0.5).ceil().min(h - 1.0);

    if x_lo <= x_hi && y_lo <= y_hi {
        let r2 = radius * radius;
        for y in (y_lo as u32)..=(y_hi as u32) {
            let dy = f64::from(y) + 0.5 - cy;
            for x in (x_lo as u32)..=(x_hi as u32) {
                let dx = f64::from(x) + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    mark(img, x, y);
                }
            }
        }
    }

    if (0.0..=w).contains(&cx) && (0.0..=h).contains(&cy) {
        let x = (cx.floor() as u32).min(img.width - 1);
        let y = (cy.floor() as u32).min(img.height - 1);
        mark(img, x, y);
    }

    dirty
}

/// Dashed or solid horizontal run on row `y` from `x0` to `x1` inclusive.
pub fn hline(
    img: &mut RasterImage,
    y: u32,
    x0: u32,
    x1: u32,
    color: Rgba8,
    dash: Option<(u32, u32)>,
) {
    for x in x0..=x1.min(img.width.saturating_sub(1)) {
        if dash_on(x - x0, dash) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Dashed or solid vertical run on column `x` from `y0` to `y1` inclusive.
pub fn vline(
    img: &mut RasterImage,
    x: u32,
    y0: u32,
    y1: u32,
    color: Rgba8,
    dash: Option<(u32, u32)>,
) {
    for y in y0..=y1.min(img.height.saturating_sub(1)) {
        if dash_on(y - y0, dash) {
            img.put_pixel(x, y, color);
        }
    }
}

fn dash_on(offset: u32, dash: Option<(u32, u32)>) -> bool {
    match dash {
        Some((on, off)) if on + off > 0 => offset % (on + off) < on,
        _ => true,
    }
}

pub fn stroke_rect(img: &mut RasterImage, x: u32, y: u32, w: u32, h: u32, color: Rgba8) {
    let (x1, y1) = (x + w, y + h);
    hline(img, y, x, x1, color, None);
    hline(img, y1, x, x1, color, None);
    vline(img, x, y, y1, color, None);
    vline(img, x1, y, y1, color, None);
}

const CROSS_COLOR: Rgba8 = Rgba8::rgb(0xE5, 0xE7, 0xEB);
const BORDER_COLOR: Rgba8 = Rgba8::rgb(0xD1, 0xD5, 0xDB);

/// Clothing guides: dashed center cross and a border inset by 10px.
///
/// Laid out for 512x512 and scaled proportionally to other sizes.
pub fn draw_clothing_guides(img: &mut RasterImage) {
    let (w, h) = (img.width, img.height);
    let (cx, cy) = (w / 2, h / 2);
    vline(img, cx, 0, h - 1, CROSS_COLOR, Some((5, 5)));
    hline(img, cy, 0, w - 1, CROSS_COLOR, Some((5, 5)));

    let inset_x = (10 * w / 512).max(1);
    let inset_y = (10 * h / 512).max(1);
    if w > 2 * inset_x && h > 2 * inset_y {
        stroke_rect(
            img,
            inset_x,
            inset_y,
            w - 2 * inset_x,
            h - 2 * inset_y,
            BORDER_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(n: u32) -> RasterImage {
        RasterImage::new(n, n, Rgba8::WHITE).unwrap()
    }

    #[test]
    fn disk_covers_by_pixel_center() {
        let mut img = white(16);
        let red = Rgba8::rgb(255, 0, 0);
        let dirty = stamp_disk(&mut img, 8.0, 8.0, 2.0, red).unwrap();

        assert_eq!(img.pixel(7, 7), Some(red));
        assert_eq!(img.pixel(8, 8), Some(red));
        assert_eq!(img.pixel(6, 7), Some(red));
        // (5.5 - 8)^2 = 6.25 > 4
        assert_eq!(img.pixel(5, 7), Some(Rgba8::WHITE));
        assert!(dirty.contains(6, 7));
        assert!(!dirty.contains(5, 7));
    }

    #[test]
    fn corners_land_on_corner_pixels() {
        let mut img = white(8);
        let c = Rgba8::rgb(0, 0, 255);
        stamp_disk(&mut img, 8.0, 8.0, 0.0, c).unwrap();
        assert_eq!(img.pixel(7, 7), Some(c));

        stamp_disk(&mut img, 0.0, 0.0, 0.0, c).unwrap();
        assert_eq!(img.pixel(0, 0), Some(c));
    }

    #[test]
    fn far_outside_is_none() {
        let mut img = white(8);
        assert!(stamp_disk(&mut img, -50.0, 4.0, 3.0, Rgba8::BLACK).is_none());
        assert!(stamp_disk(&mut img, f64::NAN, 4.0, 3.0, Rgba8::BLACK).is_none());
        assert!(img.data.iter().all(|b| *b == 255));
    }

    #[test]
    fn partially_outside_is_clipped() {
        let mut img = white(8);
        let dirty = stamp_disk(&mut img, -1.0, 4.0, 3.0, Rgba8::BLACK).unwrap();
        assert_eq!(dirty.x0, 0);
        assert_eq!(img.pixel(0, 4), Some(Rgba8::BLACK));
    }

    #[test]
    fn guides_on_512() {
        let mut img = white(512);
        draw_clothing_guides(&mut img);
        assert_eq!(img.pixel(256, 0), Some(CROSS_COLOR));
        assert_eq!(img.pixel(256, 5), Some(Rgba8::WHITE));
        assert_eq!(img.pixel(10, 100), Some(BORDER_COLOR));
        assert_eq!(img.pixel(502, 100), Some(BORDER_COLOR));
        assert_eq!(img.pixel(100, 100), Some(Rgba8::WHITE));
    }
}
