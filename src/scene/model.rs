use crate::foundation::{
    core::{Canvas, Placement, Point, Rgba8, Vec2},
    error::{StudioError, StudioResult},
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// Where a sticker's pixels come from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StickerSource {
    /// A single emoji or character, drawn through the text path.
    Glyph { glyph: String, size_px: f32 },
    /// Inline SVG document, scaled so its longest side is `size_px`.
    Svg { source: String, size_px: f32 },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    pub text: String,
    pub color: Rgba8,
    pub font_family: String,
    pub size_px: f32,
}

/// Template elements drawn under user content.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuideShape {
    Panel {
        width: f64,
        height: f64,
        corner_radius: f64,
        fill: Option<Rgba8>,
        stroke: Rgba8,
        stroke_width: f64,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        dash: Vec<f64>,
    },
    Label {
        text: String,
        color: Rgba8,
        font_family: String,
        size_px: f32,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectKind {
    Sticker { source: StickerSource },
    Text(TextStyle),
    Guide { shape: GuideShape },
}

impl ObjectKind {
    pub fn is_guide(&self) -> bool {
        matches!(self, ObjectKind::Guide { .. })
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub placement: Placement,
    pub selectable: bool,
    pub deletable: bool,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

/// Description of an object to insert; the editor assigns the id.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSpec {
    pub placement: Placement,
    pub kind: ObjectKind,
}

/// Default drop point for new stickers and text on a canvas.
pub fn default_drop_point(canvas: Canvas) -> Point {
    Point::new(f64::from(canvas.width) / 2.0, 150.0)
}

impl ObjectSpec {
    pub fn sticker(source: StickerSource, at: Point) -> Self {
        Self {
            placement: Placement::at(at.x, at.y),
            kind: ObjectKind::Sticker { source },
        }
    }

    pub fn glyph_sticker(glyph: impl Into<String>, at: Point) -> Self {
        Self::sticker(
            StickerSource::Glyph {
                glyph: glyph.into(),
                size_px: 60.0,
            },
            at,
        )
    }

    pub fn text(style: TextStyle, at: Point) -> Self {
        Self {
            placement: Placement::at(at.x, at.y),
            kind: ObjectKind::Text(style),
        }
    }
}

/// Partial update produced by direct manipulation or property edits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectPatch {
    pub position: Option<Point>,
    pub rotation_deg: Option<f64>,
    pub scale: Option<Vec2>,
    pub text: Option<String>,
    pub color: Option<Rgba8>,
    pub font_family: Option<String>,
    pub size_px: Option<f32>,
}

impl ObjectPatch {
    pub fn move_to(x: f64, y: f64) -> Self {
        Self {
            position: Some(Point::new(x, y)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the fields that make sense for `obj`. Returns whether anything changed.
    ///
    /// Non-finite numbers and non-positive sizes are dropped rather than applied.
    pub fn apply(&self, obj: &mut SceneObject) -> bool {
        let before = obj.clone();

        if let Some(p) = self.position.filter(|p| p.is_finite()) {
            obj.placement.position = p;
        }
        if let Some(r) = self.rotation_deg.filter(|r| r.is_finite()) {
            obj.placement.rotation_deg = r;
        }
        if let Some(s) = self.scale.filter(|s| s.is_finite() && s.x > 0.0 && s.y > 0.0) {
            obj.placement.scale = s;
        }

        let size = self.size_px.filter(|s| s.is_finite() && *s > 0.0);
        match &mut obj.kind {
            ObjectKind::Text(style) => {
                if let Some(t) = &self.text {
                    style.text = t.clone();
                }
                if let Some(c) = self.color {
                    style.color = c;
                }
                if let Some(f) = &self.font_family {
                    style.font_family = f.clone();
                }
                if let Some(s) = size {
                    style.size_px = s;
                }
            }
            ObjectKind::Sticker { source } => {
                if let Some(s) = size {
                    match source {
                        StickerSource::Glyph { size_px, .. } | StickerSource::Svg { size_px, .. } => {
                            *size_px = s
                        }
                    }
                }
            }
            ObjectKind::Guide { .. } => {}
        }

        *obj != before
    }
}

/// Ordered scene graph. Index order is paint order; later objects are drawn on top.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub canvas: Canvas,
    pub background: Rgba8,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new(canvas: Canvas, background: Rgba8) -> Self {
        Self {
            canvas,
            background,
            objects: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Objects the user placed (everything except template guides).
    pub fn user_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| !o.kind.is_guide())
    }

    pub fn max_id(&self) -> Option<ObjectId> {
        self.objects.iter().map(|o| o.id).max()
    }

    pub fn push(&mut self, obj: SceneObject) {
        self.objects.push(obj);
    }

    /// Removes and returns the object, or `None` if the id is unknown.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(idx))
    }

    pub fn to_json(&self) -> StudioResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> StudioResult<Self> {
        let scene: Scene = serde_json::from_str(s)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> StudioResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(StudioError::validation("canvas width/height must be > 0"));
        }
        let mut seen = std::collections::BTreeSet::new();
        for obj in &self.objects {
            if !seen.insert(obj.id) {
                return Err(StudioError::validation(format!(
                    "duplicate object id {}",
                    obj.id
                )));
            }
        }
        Ok(())
    }
}
