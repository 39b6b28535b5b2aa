use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{Canvas, Rgba8},
        error::{StudioError, StudioResult},
    },
    paint::bridge::TextureTemplate,
    projector::camera::Viewport,
    render::raster::MAX_DIM,
    scene::template::SceneTemplate,
};

pub const ENV_HISTORY_LIMIT: &str = "UGC_STUDIO_HISTORY_LIMIT";
pub const ENV_TEXTURE_SIZE: &str = "UGC_STUDIO_TEXTURE_SIZE";
pub const ENV_INTERPOLATE_STROKES: &str = "UGC_STUDIO_INTERPOLATE_STROKES";
pub const ENV_FONT_DIR: &str = "UGC_STUDIO_FONT_DIR";

/// Session settings. Every field has a default, so a partial JSON file is enough.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub canvas: Canvas,
    pub scene_template: SceneTemplate,
    /// Maximum number of history snapshots; `None` keeps all of them.
    pub history_limit: Option<usize>,
    /// Side of the square paint texture, in pixels.
    pub texture_size: u32,
    pub texture_fill: Rgba8,
    pub texture_template: TextureTemplate,
    /// Material color shown before the first texture arrives.
    pub placeholder_color: Rgba8,
    pub interpolate_strokes: bool,
    pub model_viewport: Viewport,
    pub uv_viewport: Viewport,
    pub font_dir: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::TSHIRT,
            scene_template: SceneTemplate::TShirt,
            history_limit: None,
            texture_size: 512,
            texture_fill: Rgba8::WHITE,
            texture_template: TextureTemplate::Blank,
            placeholder_color: Rgba8::rgb(0xFF, 0xE4, 0xC4),
            interpolate_strokes: false,
            model_viewport: Viewport::new(800.0, 600.0),
            uv_viewport: Viewport::new(512.0, 512.0),
            font_dir: None,
        }
    }
}

impl StudioConfig {
    pub fn from_json_file(path: &Path) -> StudioResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `UGC_STUDIO_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Unparseable values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup(ENV_HISTORY_LIMIT) {
            match v.trim() {
                "" | "none" | "unlimited" => self.history_limit = None,
                s => {
                    if let Ok(n) = s.parse::<usize>() {
                        self.history_limit = Some(n);
                    }
                }
            }
        }
        if let Some(n) = lookup(ENV_TEXTURE_SIZE)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            self.texture_size = n;
        }
        if let Some(v) = lookup(ENV_INTERPOLATE_STROKES) {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.interpolate_strokes = true,
                "0" | "false" | "no" | "off" => self.interpolate_strokes = false,
                _ => {}
            }
        }
        if let Some(dir) = lookup(ENV_FONT_DIR).filter(|v| !v.trim().is_empty()) {
            self.font_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn validate(&self) -> StudioResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if self.texture_size == 0 || self.texture_size > MAX_DIM {
            return Err(StudioError::validation(format!(
                "texture_size must be in 1..={MAX_DIM}, got {}",
                self.texture_size
            )));
        }
        if !self.model_viewport.is_valid() || !self.uv_viewport.is_valid() {
            return Err(StudioError::validation(
                "viewports must have positive finite dimensions",
            ));
        }
        Ok(())
    }
}
