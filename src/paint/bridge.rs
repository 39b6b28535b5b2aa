use std::sync::Arc;

use crate::{
    foundation::{core::Rgba8, error::StudioResult},
    observer::{Observers, SubscriptionId},
    paint::texture::{PixelRect, draw_clothing_guides, stamp_disk},
    render::raster::RasterImage,
};

/// Where a stamp lands: normalized texture coordinates or texture pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "space", rename_all = "snake_case")]
pub enum PaintTarget {
    /// `u` grows right, `v` grows up (v = 1 is the top row).
    Uv { u: f64, v: f64 },
    Pixel { x: f64, y: f64 },
}

/// One brush stamp. `brush_size` is the diameter in texture pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeEvent {
    pub target: PaintTarget,
    pub color: Rgba8,
    pub brush_size: f64,
}

impl StrokeEvent {
    pub fn uv(u: f64, v: f64, color: Rgba8, brush_size: f64) -> Self {
        Self {
            target: PaintTarget::Uv { u, v },
            color,
            brush_size,
        }
    }

    pub fn pixel(x: f64, y: f64, color: Rgba8, brush_size: f64) -> Self {
        Self {
            target: PaintTarget::Pixel { x, y },
            color,
            brush_size,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureTemplate {
    #[default]
    Blank,
    /// Dashed center cross and inset border.
    ClothingGuides,
}

/// Immutable copy of the texture at one revision.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureSnapshot {
    pub revision: u64,
    pub image: Arc<RasterImage>,
}

impl TextureSnapshot {
    pub fn encode_png(&self) -> StudioResult<Vec<u8>> {
        self.image.encode_png()
    }
}

type TextureCallback = dyn FnMut(&TextureSnapshot);

/// Sole owner of the shared texture raster.
///
/// Every completed mutation bumps the revision and notifies subscribers, in registration order,
/// with a fresh snapshot. Snapshots are only built when someone is listening.
pub struct PaintBridge {
    buffer: RasterImage,
    fill: Rgba8,
    clear_state: RasterImage,
    revision: u64,
    last_dirty: Option<PixelRect>,
    observers: Observers<TextureCallback>,
}

impl std::fmt::Debug for PaintBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintBridge")
            .field("width", &self.buffer.width)
            .field("height", &self.buffer.height)
            .field("fill", &self.fill)
            .field("revision", &self.revision)
            .field("observers", &self.observers)
            .finish()
    }
}

impl PaintBridge {
    pub fn initialize(width: u32, height: u32, fill: Rgba8) -> StudioResult<Self> {
        Self::initialize_with_template(width, height, fill, TextureTemplate::Blank)
    }

    pub fn initialize_with_template(
        width: u32,
        height: u32,
        fill: Rgba8,
        template: TextureTemplate,
    ) -> StudioResult<Self> {
        let mut buffer = RasterImage::new(width, height, fill)?;
        if template == TextureTemplate::ClothingGuides {
            draw_clothing_guides(&mut buffer);
        }
        tracing::debug!(width, height, ?template, "texture initialized");
        Ok(Self {
            clear_state: buffer.clone(),
            buffer,
            fill,
            revision: 0,
            last_dirty: None,
            observers: Observers::new(),
        })
    }

    /// Reallocate the buffer in place. Subscribers are kept and notified.
    pub fn reinitialize(
        &mut self,
        width: u32,
        height: u32,
        fill: Rgba8,
        template: TextureTemplate,
    ) -> StudioResult<()> {
        let fresh = Self::initialize_with_template(width, height, fill, template)?;
        self.buffer = fresh.buffer;
        self.clear_state = fresh.clear_state;
        self.fill = fill;
        self.mutated(Some(PixelRect::full(width, height)));
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    /// Color used by the eraser and by `clear` on a blank template.
    pub fn fill(&self) -> Rgba8 {
        self.fill
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Pixels touched by the most recent mutation.
    pub fn dirty_rect(&self) -> Option<PixelRect> {
        self.last_dirty
    }

    pub fn buffer(&self) -> &RasterImage {
        &self.buffer
    }

    /// Map an event target to texture pixel space: `x = u * w`, `y = (1 - v) * h`.
    pub fn to_pixel(&self, target: PaintTarget) -> (f64, f64) {
        match target {
            PaintTarget::Uv { u, v } => (
                u * f64::from(self.buffer.width),
                (1.0 - v) * f64::from(self.buffer.height),
            ),
            PaintTarget::Pixel { x, y } => (x, y),
        }
    }

    /// Stamp one disk. Stamps that touch no pixel change nothing and notify nobody.
    pub fn paint(&mut self, event: &StrokeEvent) -> Option<PixelRect> {
        let (x, y) = self.to_pixel(event.target);
        let dirty = stamp_disk(
            &mut self.buffer,
            x,
            y,
            event.brush_size / 2.0,
            event.color,
        )?;
        self.mutated(Some(dirty));
        Some(dirty)
    }

    pub fn clear(&mut self) {
        self.buffer.clone_from(&self.clear_state);
        self.mutated(Some(PixelRect::full(self.buffer.width, self.buffer.height)));
    }

    /// Decode an image and draw it scaled to the buffer; it becomes the new clear state.
    #[tracing::instrument(skip_all, fields(bytes = png_bytes.len()))]
    pub fn load_image(&mut self, png_bytes: &[u8]) -> StudioResult<()> {
        let decoded = RasterImage::decode_png(png_bytes)?;
        self.load_raster(&decoded)
    }

    pub fn load_raster(&mut self, image: &RasterImage) -> StudioResult<()> {
        let scaled = image.resize(self.buffer.width, self.buffer.height)?;
        self.buffer = scaled.clone();
        self.clear_state = scaled;
        self.mutated(Some(PixelRect::full(self.buffer.width, self.buffer.height)));
        Ok(())
    }

    pub fn snapshot(&self) -> TextureSnapshot {
        TextureSnapshot {
            revision: self.revision,
            image: Arc::new(self.buffer.clone()),
        }
    }

    /// Call `callback` with a fresh snapshot after every mutation: each `paint` that touches at
    /// least one pixel, every `clear` and every image load. A stamp clipped away entirely leaves
    /// the revision alone and is not reported.
    pub fn on_change(&mut self, callback: Box<TextureCallback>) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn mutated(&mut self, dirty: Option<PixelRect>) {
        self.revision += 1;
        self.last_dirty = dirty;
        if self.observers.is_empty() {
            return;
        }
        let snap = self.snapshot();
        self.observers.for_each(|f| f(&snap));
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    const RED: Rgba8 = Rgba8::rgb(255, 0, 0);

    #[test]
    fn zero_size_is_rejected() {
        assert!(PaintBridge::initialize(0, 512, Rgba8::WHITE).is_err());
    }

    #[test]
    fn uv_maps_with_flipped_v() {
        let bridge = PaintBridge::initialize(512, 256, Rgba8::WHITE).unwrap();
        assert_eq!(bridge.to_pixel(PaintTarget::Uv { u: 0.0, v: 1.0 }), (0.0, 0.0));
        assert_eq!(
            bridge.to_pixel(PaintTarget::Uv { u: 0.5, v: 0.25 }),
            (256.0, 192.0)
        );
    }

    #[test]
    fn paint_bumps_revision_and_notifies() {
        let mut bridge = PaintBridge::initialize(64, 64, Rgba8::WHITE).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        bridge.on_change(Box::new(move |snap| log.borrow_mut().push(snap.revision)));

        bridge.paint(&StrokeEvent::uv(0.5, 0.5, RED, 8.0)).unwrap();
        bridge.clear();
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(bridge.revision(), 2);
    }

    #[test]
    fn missed_stamp_changes_nothing() {
        let mut bridge = PaintBridge::initialize(16, 16, Rgba8::WHITE).unwrap();
        assert!(bridge.paint(&StrokeEvent::pixel(-100.0, -100.0, RED, 10.0)).is_none());
        assert_eq!(bridge.revision(), 0);
    }

    #[test]
    fn clear_restores_template() {
        let mut bridge = PaintBridge::initialize_with_template(
            512,
            512,
            Rgba8::WHITE,
            TextureTemplate::ClothingGuides,
        )
        .unwrap();
        let initial = bridge.buffer().clone();
        bridge.paint(&StrokeEvent::uv(0.5, 0.5, RED, 40.0));
        assert_ne!(bridge.buffer(), &initial);
        bridge.clear();
        assert_eq!(bridge.buffer(), &initial);
    }

    #[test]
    fn load_raster_scales_and_becomes_clear_state() {
        let mut bridge = PaintBridge::initialize(8, 8, Rgba8::WHITE).unwrap();
        let src = RasterImage::new(2, 2, Rgba8::rgb(0, 128, 0)).unwrap();
        bridge.load_raster(&src).unwrap();
        assert_eq!(bridge.buffer().pixel(7, 7), Some(Rgba8::rgb(0, 128, 0)));

        bridge.paint(&StrokeEvent::pixel(4.0, 4.0, RED, 2.0));
        bridge.clear();
        assert_eq!(bridge.buffer().pixel(4, 4), Some(Rgba8::rgb(0, 128, 0)));
    }

    #[test]
    fn stroke_event_json_shape() {
        let ev: StrokeEvent = serde_json::from_str(
            r##"{"target":{"space":"uv","u":0.25,"v":0.75},"color":"#FF6B6B","brush_size":20}"##,
        )
        .unwrap();
        assert_eq!(ev, StrokeEvent::uv(0.25, 0.75, Rgba8::rgb(255, 107, 107), 20.0));
    }
}
