use crate::{
    foundation::core::Rgba8,
    paint::bridge::{PaintTarget, StrokeEvent},
};

pub const MIN_BRUSH_SIZE: f64 = 5.0;
pub const MAX_BRUSH_SIZE: f64 = 50.0;
pub const DEFAULT_BRUSH_SIZE: f64 = 20.0;
pub const DEFAULT_BRUSH_COLOR: Rgba8 = Rgba8::rgb(0xFF, 0x6B, 0x6B);

/// Active tool. Orbiting only happens with `Rotate`; painting only with `Paint`/`Erase`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Rotate,
    Paint,
    Erase,
}

impl Tool {
    pub fn paints(self) -> bool {
        matches!(self, Tool::Paint | Tool::Erase)
    }
}

/// Turns pointer samples (already projected to texture targets) into stroke events.
///
/// Down starts a stroke and stamps, moves while down stamps, up or leave ends the stroke. With
/// interpolation on, extra stamps are laid between consecutive samples every quarter brush
/// size, except across gaps wider than four brush sizes (jumps between separate UV islands).
#[derive(Clone, Debug)]
pub struct StrokeController {
    tool: Tool,
    color: Rgba8,
    eraser: Rgba8,
    brush_size: f64,
    interpolate: bool,
    texture_size: (f64, f64),
    painting: bool,
    last: Option<PaintTarget>,
}

impl StrokeController {
    pub fn new(texture_width: u32, texture_height: u32, eraser: Rgba8) -> Self {
        Self {
            tool: Tool::default(),
            color: DEFAULT_BRUSH_COLOR,
            eraser,
            brush_size: DEFAULT_BRUSH_SIZE,
            interpolate: false,
            texture_size: (f64::from(texture_width), f64::from(texture_height)),
            painting: false,
            last: None,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switching tools ends any stroke in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.end();
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    pub fn set_eraser(&mut self, eraser: Rgba8) {
        self.eraser = eraser;
    }

    pub fn brush_size(&self) -> f64 {
        self.brush_size
    }

    pub fn set_brush_size(&mut self, size: f64) {
        if size.is_finite() {
            self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        }
    }

    pub fn set_interpolate(&mut self, on: bool) {
        self.interpolate = on;
    }

    pub fn is_painting(&self) -> bool {
        self.painting
    }

    fn stamp_color(&self) -> Rgba8 {
        match self.tool {
            Tool::Erase => self.eraser,
            _ => self.color,
        }
    }

    fn event(&self, target: PaintTarget) -> StrokeEvent {
        StrokeEvent {
            target,
            color: self.stamp_color(),
            brush_size: self.brush_size,
        }
    }

    /// Pointer down. `target` is `None` when the pointer missed every paintable surface.
    pub fn begin(&mut self, target: Option<PaintTarget>) -> Vec<StrokeEvent> {
        if !self.tool.paints() {
            return Vec::new();
        }
        self.painting = true;
        self.last = None;
        self.sample(target)
    }

    /// Pointer move. Ignored unless a stroke is in progress.
    pub fn extend(&mut self, target: Option<PaintTarget>) -> Vec<StrokeEvent> {
        if !self.painting {
            return Vec::new();
        }
        self.sample(target)
    }

    /// Pointer up or leave. Stamps already emitted stay.
    pub fn end(&mut self) {
        self.painting = false;
        self.last = None;
    }

    fn sample(&mut self, target: Option<PaintTarget>) -> Vec<StrokeEvent> {
        let Some(target) = target else {
            // A miss breaks the chain so the next hit does not bridge across it.
            self.last = None;
            return Vec::new();
        };

        let mut out = Vec::new();
        if let Some(prev) = self.last.filter(|_| self.interpolate) {
            self.interpolate_between(prev, target, &mut out);
        }
        out.push(self.event(target));
        self.last = Some(target);
        out
    }

    fn to_pixels(&self, t: PaintTarget) -> (f64, f64) {
        match t {
            PaintTarget::Uv { u, v } => (u * self.texture_size.0, v * self.texture_size.1),
            PaintTarget::Pixel { x, y } => (x, y),
        }
    }

    // Every sample is stamped, so each segment starts from a fresh dab at `prev`.
    fn interpolate_between(
        &self,
        prev: PaintTarget,
        next: PaintTarget,
        out: &mut Vec<StrokeEvent>,
    ) {
        let same_space = matches!(
            (prev, next),
            (PaintTarget::Uv { .. }, PaintTarget::Uv { .. })
                | (PaintTarget::Pixel { .. }, PaintTarget::Pixel { .. })
        );
        if !same_space {
            return;
        }

        let (ax, ay) = self.to_pixels(prev);
        let (bx, by) = self.to_pixels(next);
        let segment_len = (bx - ax).hypot(by - ay);
        if segment_len == 0.0 || segment_len > self.brush_size * 4.0 {
            return;
        }

        let step = (self.brush_size / 4.0).max(1.0);
        let mut d = step;
        while d < segment_len {
            out.push(self.event(lerp(prev, next, d / segment_len)));
            d += step;
        }
    }
}

fn lerp(a: PaintTarget, b: PaintTarget, t: f64) -> PaintTarget {
    match (a, b) {
        (PaintTarget::Uv { u: u0, v: v0 }, PaintTarget::Uv { u: u1, v: v1 }) => PaintTarget::Uv {
            u: u0 + (u1 - u0) * t,
            v: v0 + (v1 - v0) * t,
        },
        (PaintTarget::Pixel { x: x0, y: y0 }, PaintTarget::Pixel { x: x1, y: y1 }) => {
            PaintTarget::Pixel {
                x: x0 + (x1 - x0) * t,
                y: y0 + (y1 - y0) * t,
            }
        }
        (_, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(x: f64, y: f64) -> Option<PaintTarget> {
        Some(PaintTarget::Pixel { x, y })
    }

    fn painter() -> StrokeController {
        let mut c = StrokeController::new(512, 512, Rgba8::WHITE);
        c.set_tool(Tool::Paint);
        c
    }

    #[test]
    fn rotate_tool_never_paints() {
        let mut c = StrokeController::new(512, 512, Rgba8::WHITE);
        assert!(c.begin(px(1.0, 1.0)).is_empty());
        assert!(c.extend(px(2.0, 2.0)).is_empty());
        assert!(!c.is_painting());
    }

    #[test]
    fn down_move_up_sequence() {
        let mut c = painter();
        assert!(c.extend(px(1.0, 1.0)).is_empty());
        assert_eq!(c.begin(px(1.0, 1.0)).len(), 1);
        assert_eq!(c.extend(px(40.0, 1.0)).len(), 1);
        c.end();
        assert!(c.extend(px(50.0, 1.0)).is_empty());
    }

    #[test]
    fn miss_on_down_still_starts_stroke() {
        let mut c = painter();
        assert!(c.begin(None).is_empty());
        assert!(c.is_painting());
        assert_eq!(c.extend(px(3.0, 3.0)).len(), 1);
    }

    #[test]
    fn erase_uses_eraser_color() {
        let mut c = painter();
        c.set_tool(Tool::Erase);
        let ev = c.begin(px(1.0, 1.0));
        assert_eq!(ev[0].color, Rgba8::WHITE);
    }

    #[test]
    fn brush_size_is_clamped() {
        let mut c = painter();
        c.set_brush_size(1.0);
        assert_eq!(c.brush_size(), MIN_BRUSH_SIZE);
        c.set_brush_size(500.0);
        assert_eq!(c.brush_size(), MAX_BRUSH_SIZE);
        c.set_brush_size(f64::NAN);
        assert_eq!(c.brush_size(), MAX_BRUSH_SIZE);
    }

    #[test]
    fn interpolation_fills_gaps() {
        let mut c = painter();
        c.set_interpolate(true);
        c.set_brush_size(20.0);
        c.begin(px(0.0, 0.0));
        // 40px gap at 5px spacing: stamps at 5..35 plus the sample itself.
        let ev = c.extend(px(40.0, 0.0));
        assert_eq!(ev.len(), 8);
        assert_eq!(ev[0].target, PaintTarget::Pixel { x: 5.0, y: 0.0 });
        assert_eq!(ev[7].target, PaintTarget::Pixel { x: 40.0, y: 0.0 });
    }

    #[test]
    fn interpolation_skips_large_jumps() {
        let mut c = painter();
        c.set_interpolate(true);
        c.set_brush_size(10.0);
        c.begin(px(0.0, 0.0));
        assert_eq!(c.extend(px(100.0, 0.0)).len(), 1);
    }
}
