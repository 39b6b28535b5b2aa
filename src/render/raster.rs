use std::io::Cursor;

use anyhow::Context;

use crate::foundation::{
    core::Rgba8,
    error::{StudioError, StudioResult},
};

/// Largest side accepted for any raster the crate allocates.
pub const MAX_DIM: u32 = 16_384;

/// Straight-alpha RGBA8 image, row-major, no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, fill: Rgba8) -> StudioResult<Self> {
        check_dims(width, height)?;
        let px = fill.to_array();
        let data = px
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> StudioResult<Self> {
        check_dims(width, height)?;
        if data.len() != width as usize * height as usize * 4 {
            return Err(StudioError::validation(format!(
                "raster byte length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert premultiplied RGBA8 (as produced by the rasterizers) into straight alpha.
    pub fn from_premul(width: u32, height: u32, mut data: Vec<u8>) -> StudioResult<Self> {
        unpremultiply_in_place(&mut data);
        Self::from_raw(width, height, data)
    }

    pub fn to_premul(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        premultiply_in_place(&mut out);
        out
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        let i = self.offset(x, y)?;
        Some(Rgba8::rgba(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, c: Rgba8) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&c.to_array());
        }
    }

    pub fn fill(&mut self, c: Rgba8) {
        let px = c.to_array();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    pub fn encode_png(&self) -> StudioResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| StudioError::encode("raster buffer size mismatch"))?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| StudioError::encode(format!("png encode failed: {e}")))?;
        Ok(buf)
    }

    pub fn decode_png(bytes: &[u8]) -> StudioResult<Self> {
        let dyn_img = image::load_from_memory(bytes)
            .context("decode image from memory")
            .map_err(|e| StudioError::decode(format!("{e:#}")))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_raw(width, height, rgba.into_raw())
    }

    /// Resample to `width`x`height` with bilinear filtering.
    pub fn resize(&self, width: u32, height: u32) -> StudioResult<Self> {
        check_dims(width, height)?;
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| StudioError::validation("raster buffer size mismatch"))?;
        let resized =
            image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        Self::from_raw(width, height, resized.into_raw())
    }
}

pub(crate) fn check_dims(width: u32, height: u32) -> StudioResult<()> {
    if width == 0 || height == 0 {
        return Err(StudioError::validation("raster width/height must be > 0"));
    }
    if width > MAX_DIM || height > MAX_DIM {
        return Err(StudioError::validation(format!(
            "raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok(())
}

pub(crate) fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_every_pixel() {
        let img = RasterImage::new(3, 2, Rgba8::rgb(1, 2, 3)).unwrap();
        assert_eq!(img.data.len(), 24);
        assert_eq!(img.pixel(2, 1), Some(Rgba8::rgb(1, 2, 3)));
        assert_eq!(img.pixel(3, 0), None);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(RasterImage::new(0, 4, Rgba8::WHITE).is_err());
        assert!(RasterImage::new(MAX_DIM + 1, 1, Rgba8::WHITE).is_err());
        assert!(RasterImage::from_raw(2, 2, vec![0; 3]).is_err());
    }

    #[test]
    fn png_roundtrip_keeps_pixels() {
        let mut img = RasterImage::new(4, 4, Rgba8::WHITE).unwrap();
        img.put_pixel(1, 2, Rgba8::rgba(10, 20, 30, 128));
        let back = RasterImage::decode_png(&img.encode_png().unwrap()).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let err = RasterImage::decode_png(b"not a png").unwrap_err();
        assert!(matches!(err, StudioError::Decode(_)));
    }

    #[test]
    fn premul_opaque_is_identity() {
        let img = RasterImage::new(1, 1, Rgba8::rgb(200, 100, 50)).unwrap();
        assert_eq!(img.to_premul(), vec![200, 100, 50, 255]);
        let back = RasterImage::from_premul(1, 1, vec![0, 0, 0, 0]).unwrap();
        assert_eq!(back.pixel(0, 0), Some(Rgba8::TRANSPARENT));
    }

    #[test]
    fn resize_changes_dimensions() {
        let img = RasterImage::new(8, 8, Rgba8::BLACK).unwrap();
        let small = img.resize(2, 4).unwrap();
        assert_eq!((small.width, small.height), (2, 4));
        assert_eq!(small.pixel(1, 3), Some(Rgba8::BLACK));
    }
}
