//! Editing core for a Roblox UGC design tool.
//!
//! Two editors share this crate:
//!
//! - a 2D T-shirt canvas ([`SceneEditor`]) with stickers, text and snapshot undo/redo, flattened
//!   to PNG through a [`SceneRenderer`];
//! - a clothing painter that projects pointer input onto a character's UV layout and stamps it
//!   into one shared texture ([`PaintBridge`]).
//!
//! [`EditorSession`] owns one of each and wires them together.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
mod foundation;
pub mod observer;
pub mod paint;
pub mod projector;
pub mod render;
pub mod scene;
pub mod session;

pub use crate::foundation::core::{Affine, Canvas, Placement, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{StudioError, StudioResult};

pub use crate::catalog::{AccessoryCategory, AccessoryLoadout, TextSize};
pub use crate::config::StudioConfig;
pub use crate::observer::SubscriptionId;
pub use crate::paint::bridge::{
    PaintBridge, PaintTarget, StrokeEvent, TextureSnapshot, TextureTemplate,
};
pub use crate::paint::preview::TexturePreview;
pub use crate::paint::texture::PixelRect;
pub use crate::projector::camera::{OrbitCamera, Viewport};
pub use crate::projector::stroke::{StrokeController, Tool};
pub use crate::render::SceneRenderer;
pub use crate::render::cpu::CpuSceneRenderer;
pub use crate::render::raster::RasterImage;
pub use crate::scene::editor::{SceneChange, SceneEditor};
pub use crate::scene::history::HistoryState;
pub use crate::scene::model::{
    GuideShape, ObjectId, ObjectKind, ObjectPatch, ObjectSpec, Scene, SceneObject, StickerSource,
    TextStyle,
};
pub use crate::scene::template::SceneTemplate;
pub use crate::session::{EditorSession, PointerEvent, PointerKind, PointerSurface};
