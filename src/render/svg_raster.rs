use anyhow::Context;

use crate::{
    foundation::{
        core::Affine,
        error::{StudioError, StudioResult},
    },
    render::raster::MAX_DIM,
};

pub fn parse_svg(source: &str) -> StudioResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_str(source, &opts)
        .context("parse svg tree")
        .map_err(|e| StudioError::decode(format!("{e:#}")))?;
    Ok(tree)
}

/// Raster size and draw transform for an SVG sticker.
///
/// The document is fitted so its longest side is `size_px`, then rasterized at the device scale
/// implied by `transform` to avoid blurry upscaling. The returned `(width, height,
/// transform_adjust)` are used as:
///
/// - rasterize the SVG into a pixmap of `(width, height)`
/// - draw the resulting image with `transform_adjust`, with the image's top-left at the origin
pub fn svg_raster_params(
    tree: &usvg::Tree,
    size_px: f32,
    transform: Affine,
) -> StudioResult<(u32, u32, Affine)> {
    let size = tree.size();
    let (sw, sh) = (f64::from(size.width()), f64::from(size.height()));
    if !sw.is_finite() || !sh.is_finite() || sw <= 0.0 || sh <= 0.0 {
        return Err(StudioError::render("svg has invalid width/height"));
    }
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(StudioError::validation("svg size_px must be finite and > 0"));
    }

    let fit = f64::from(size_px) / sw.max(sh);
    let (logical_w, logical_h) = (sw * fit, sh * fit);

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    let w = (logical_w * sx).ceil().max(1.0) as u32;
    let h = (logical_h * sy).ceil().max(1.0) as u32;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(StudioError::render(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    // Centered on the placement origin, then undo the device scale baked into the pixmap.
    let transform_adjust = transform
        * Affine::translate((-logical_w / 2.0, -logical_h / 2.0))
        * Affine::scale_non_uniform(logical_w / f64::from(w), logical_h / f64::from(h));

    Ok((w, h, transform_adjust))
}

pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StudioResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StudioError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="20">
        <rect width="10" height="20" fill="#ff0000"/></svg>"##;

    #[test]
    fn parse_ok_and_err() {
        parse_svg(SQUARE).unwrap();
        assert!(matches!(parse_svg("<svg"), Err(StudioError::Decode(_))));
    }

    #[test]
    fn params_fit_longest_side() {
        let tree = parse_svg(SQUARE).unwrap();
        let (w, h, _) = svg_raster_params(&tree, 40.0, Affine::IDENTITY).unwrap();
        assert_eq!((w, h), (20, 40));

        let (w, h, _) = svg_raster_params(&tree, 40.0, Affine::scale(2.0)).unwrap();
        assert_eq!((w, h), (40, 80));
    }

    #[test]
    fn rasterizes_opaque_fill() {
        let tree = parse_svg(SQUARE).unwrap();
        let px = rasterize_svg_to_premul_rgba8(&tree, 5, 10).unwrap();
        assert_eq!(px.len(), 5 * 10 * 4);
        assert_eq!(&px[0..4], &[255, 0, 0, 255]);
    }
}
