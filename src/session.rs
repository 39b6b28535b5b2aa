use std::{cell::RefCell, rc::Rc};

use crate::{
    catalog::{self, AccessoryLoadout, TextSize},
    config::StudioConfig,
    foundation::{
        core::Rgba8,
        error::{StudioError, StudioResult},
    },
    observer::SubscriptionId,
    paint::{
        bridge::{PaintBridge, PaintTarget},
        preview::TexturePreview,
        texture::PixelRect,
    },
    projector::{
        camera::{OrbitCamera, Viewport},
        character::PaintableScene,
        flat::FlatProjector,
        stroke::{StrokeController, Tool},
    },
    render::{SceneRenderer, cpu::CpuSceneRenderer, raster::RasterImage, text::FontBook},
    scene::{
        editor::SceneEditor,
        model::{ObjectId, default_drop_point},
    },
};

/// Which view a pointer event was captured on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerSurface {
    /// 3D view of the character; positions are raycast against paintable meshes.
    Model,
    /// Flat texture view; positions map straight to texture pixels.
    UvView,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Leave,
}

/// Pointer sample in surface pixels, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }
}

/// One editing session: the 2D scene editor, the shared paint texture and everything that feeds
/// or reads it. Nothing here is global; create as many sessions as needed.
pub struct EditorSession {
    config: StudioConfig,
    editor: SceneEditor,
    bridge: PaintBridge,
    preview: Rc<RefCell<TexturePreview>>,
    preview_subscription: SubscriptionId,
    camera: OrbitCamera,
    character: PaintableScene,
    flat: FlatProjector,
    strokes: StrokeController,
    loadout: AccessoryLoadout,
    renderer: Box<dyn SceneRenderer>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("editor", &self.editor)
            .field("bridge", &self.bridge)
            .field("tool", &self.strokes.tool())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Session with the CPU renderer over the system fonts, with faces from `config.font_dir`
    /// taking precedence.
    #[tracing::instrument(skip_all)]
    pub fn new(config: StudioConfig) -> StudioResult<Self> {
        let mut fonts = FontBook::system();
        if let Some(dir) = &config.font_dir {
            fonts.load_dir(dir)?;
        }
        Self::with_renderer(config, Box::new(CpuSceneRenderer::new(fonts)))
    }

    pub fn with_renderer(
        config: StudioConfig,
        renderer: Box<dyn SceneRenderer>,
    ) -> StudioResult<Self> {
        config.validate()?;

        let editor =
            SceneEditor::with_options(config.canvas, config.scene_template, config.history_limit);
        let size = config.texture_size;
        let mut bridge = PaintBridge::initialize_with_template(
            size,
            size,
            config.texture_fill,
            config.texture_template,
        )?;

        let preview = Rc::new(RefCell::new(TexturePreview::new(config.placeholder_color)));
        let sink = Rc::clone(&preview);
        let preview_subscription = bridge.on_change(Box::new(move |snap| {
            sink.borrow_mut().accept(snap);
        }));
        // The material starts from the initial texture, not the placeholder.
        preview.borrow_mut().accept(&bridge.snapshot());

        let mut strokes = StrokeController::new(size, size, config.texture_fill);
        strokes.set_interpolate(config.interpolate_strokes);

        Ok(Self {
            editor,
            bridge,
            preview,
            preview_subscription,
            camera: OrbitCamera::new(),
            character: PaintableScene::character(),
            flat: FlatProjector::new(size, size, config.uv_viewport),
            strokes,
            loadout: AccessoryLoadout::new(),
            renderer,
            config,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn editor(&self) -> &SceneEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut SceneEditor {
        &mut self.editor
    }

    pub fn bridge(&self) -> &PaintBridge {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut PaintBridge {
        &mut self.bridge
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn loadout(&self) -> &AccessoryLoadout {
        &self.loadout
    }

    pub fn loadout_mut(&mut self) -> &mut AccessoryLoadout {
        &mut self.loadout
    }

    /// Read-only handle to the material preview.
    pub fn preview(&self) -> std::cell::Ref<'_, TexturePreview> {
        self.preview.borrow()
    }

    /// Whether the material needs a texture upload; lowers the flag.
    pub fn take_preview_update(&mut self) -> bool {
        self.preview.borrow_mut().take_update()
    }

    /// Place a catalog sticker at the default drop point.
    pub fn add_sticker(&mut self, sticker_id: &str) -> Option<ObjectId> {
        let def = catalog::find_sticker(sticker_id)?;
        let at = default_drop_point(self.editor.scene().canvas);
        Some(self.editor.add_object(def.to_spec(at)))
    }

    /// Place a text object; blank input adds nothing.
    pub fn add_text(
        &mut self,
        input: &str,
        color: Rgba8,
        size: TextSize,
        font_family: &str,
    ) -> Option<ObjectId> {
        let at = default_drop_point(self.editor.scene().canvas);
        let spec = catalog::text_spec(input, color, size, font_family, at)?;
        Some(self.editor.add_object(spec))
    }

    pub fn tool(&self) -> Tool {
        self.strokes.tool()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.strokes.set_tool(tool);
    }

    pub fn set_brush_color(&mut self, color: Rgba8) {
        self.strokes.set_color(color);
    }

    pub fn set_brush_size(&mut self, size: f64) {
        self.strokes.set_brush_size(size);
    }

    pub fn brush_size(&self) -> f64 {
        self.strokes.brush_size()
    }

    pub fn set_viewport(&mut self, surface: PointerSurface, viewport: Viewport) {
        match surface {
            PointerSurface::Model => self.config.model_viewport = viewport,
            PointerSurface::UvView => {
                self.config.uv_viewport = viewport;
                self.flat.display = viewport;
            }
        }
    }

    /// Feed one pointer sample. Returns the pixels it painted, if any.
    ///
    /// Misses (outside the flat view, or no paintable mesh under the cursor) paint nothing and
    /// leave the texture untouched.
    pub fn pointer(&mut self, surface: PointerSurface, event: PointerEvent) -> Option<PixelRect> {
        let stamps = match event.kind {
            PointerKind::Down => {
                let target = self.project(surface, event.x, event.y);
                self.strokes.begin(target)
            }
            PointerKind::Move => {
                if !self.strokes.is_painting() {
                    return None;
                }
                let target = self.project(surface, event.x, event.y);
                self.strokes.extend(target)
            }
            PointerKind::Up | PointerKind::Leave => {
                self.strokes.end();
                return None;
            }
        };

        stamps
            .iter()
            .filter_map(|stamp| self.bridge.paint(stamp))
            .reduce(PixelRect::union)
    }

    fn project(&self, surface: PointerSurface, x: f32, y: f32) -> Option<PaintTarget> {
        match surface {
            PointerSurface::Model => {
                let viewport = self.config.model_viewport;
                if !viewport.is_valid() || !x.is_finite() || !y.is_finite() {
                    return None;
                }
                let ray = self.camera.screen_ray(x, y, viewport);
                let hit = self.character.pick(&ray)?;
                Some(PaintTarget::Uv {
                    u: f64::from(hit.uv.x),
                    v: f64::from(hit.uv.y),
                })
            }
            PointerSurface::UvView => {
                let (px, py) = self.flat.project(f64::from(x), f64::from(y))?;
                Some(PaintTarget::Pixel { x: px, y: py })
            }
        }
    }

    /// Orbit by a pointer drag in model-view pixels. Ignored unless the rotate tool is active.
    pub fn orbit(&mut self, dx: f32, dy: f32) -> bool {
        if self.strokes.tool() != Tool::Rotate || !self.config.model_viewport.is_valid() {
            return false;
        }
        let per_px = std::f32::consts::TAU / self.config.model_viewport.height;
        self.camera.rotate(-dx * per_px, -dy * per_px);
        true
    }

    /// Ignored unless the rotate tool is active.
    pub fn zoom(&mut self, factor: f32) -> bool {
        if self.strokes.tool() != Tool::Rotate {
            return false;
        }
        self.camera.zoom(factor);
        true
    }

    pub fn clear_texture(&mut self) {
        self.strokes.end();
        self.bridge.clear();
    }

    /// Use the flattened 2D design as the paint texture (and its new clear state).
    #[tracing::instrument(skip(self))]
    pub fn sync_scene_to_texture(&mut self) -> StudioResult<()> {
        let design = self.editor.rasterize(self.renderer.as_mut())?;
        self.bridge.load_raster(&design)
    }

    pub fn render_design(&mut self) -> StudioResult<RasterImage> {
        self.editor.rasterize(self.renderer.as_mut())
    }

    /// PNG bytes of the 2D design, as saved under [`catalog::EXPORT_FILENAME`].
    #[tracing::instrument(skip(self))]
    pub fn export_design_png(&mut self) -> StudioResult<Vec<u8>> {
        self.editor.serialize(self.renderer.as_mut())
    }

    /// PNG bytes of the paint texture, as saved under [`catalog::TEXTURE_EXPORT_FILENAME`].
    #[tracing::instrument(skip(self))]
    pub fn export_texture_png(&self) -> StudioResult<Vec<u8>> {
        self.bridge.snapshot().encode_png()
    }

    /// Detach the material preview from the texture. Returns an error if it was already detached.
    pub fn detach_preview(&mut self) -> StudioResult<()> {
        if self.bridge.unsubscribe(self.preview_subscription) {
            Ok(())
        } else {
            Err(StudioError::validation("preview already detached"))
        }
    }
}
