use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    sync::Arc,
};

use anyhow::Context;

use crate::{
    catalog::TEXT_FONTS,
    foundation::{
        core::Rgba8,
        error::{StudioError, StudioResult},
    },
};

/// Family name glyph stickers resolve through.
pub const EMOJI_FAMILY: &str = "emoji";

const EMOJI_FACES: &[&str] = &[
    "Noto Color Emoji",
    "Apple Color Emoji",
    "Segoe UI Emoji",
    "Twemoji",
];

const SANS_FACES: &[&str] = &["DejaVu Sans", "Liberation Sans", "Noto Sans", "Helvetica"];

/// Brush carried through parley layout runs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Font bytes keyed by family name, plus an optional fallback face.
///
/// Family lookup is case-insensitive. Faces are registered from explicit bytes or from a
/// directory of `.ttf`/`.otf` files named after their family (`Fredoka.ttf` → `Fredoka`).
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: BTreeMap<String, Arc<Vec<u8>>>,
    fallback: Option<Arc<Vec<u8>>>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, family: &str, bytes: Vec<u8>) {
        let bytes = Arc::new(bytes);
        if self.fallback.is_none() {
            self.fallback = Some(bytes.clone());
        }
        self.faces.insert(family.to_ascii_lowercase(), bytes);
    }

    pub fn set_fallback(&mut self, bytes: Vec<u8>) {
        self.fallback = Some(Arc::new(bytes));
    }

    /// Faces for the catalog families, emoji and a sans-serif fallback from the system fonts.
    pub fn system() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        let book = Self::from_database(&db);
        tracing::debug!(faces = db.len(), families = book.len(), "system fonts");
        book
    }

    /// Pick the faces this book needs out of a loaded font database. Families the database
    /// lacks fall through to the fallback at resolve time.
    pub fn from_database(db: &usvg::fontdb::Database) -> Self {
        use usvg::fontdb::{Family, Query};

        let face_bytes = |families: &[Family<'_>]| {
            let id = db.query(&Query {
                families,
                ..Query::default()
            })?;
            // Faces inside a collection would need their index carried through layout.
            db.with_face_data(id, |data, index| (index == 0).then(|| data.to_vec()))
                .flatten()
        };

        let mut book = Self::new();
        let fallback = std::iter::once(Family::SansSerif)
            .chain(SANS_FACES.iter().map(|name| Family::Name(*name)))
            .find_map(|family| face_bytes(&[family]))
            .or_else(|| {
                let face = db.faces().find(|face| face.index == 0)?;
                db.with_face_data(face.id, |data, _index| data.to_vec())
            });
        if let Some(bytes) = fallback {
            book.set_fallback(bytes);
        }

        for family in TEXT_FONTS {
            if let Some(bytes) = face_bytes(&[Family::Name(*family)]) {
                book.insert(family, bytes);
            }
        }
        if let Some(bytes) = EMOJI_FACES
            .iter()
            .find_map(|name| face_bytes(&[Family::Name(*name)]))
        {
            book.insert(EMOJI_FAMILY, bytes);
        }
        book
    }

    pub fn load_dir(&mut self, dir: &Path) -> StudioResult<usize> {
        let entries =
            std::fs::read_dir(dir).with_context(|| format!("read font dir '{}'", dir.display()))?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry.context("read font dir entry")?.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_font {
                continue;
            }
            let bytes =
                std::fs::read(&path).with_context(|| format!("read font '{}'", path.display()))?;
            self.insert(stem, bytes);
            loaded += 1;
        }
        tracing::debug!(dir = %dir.display(), loaded, "fonts loaded");
        Ok(loaded)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.fallback.is_none()
    }

    /// Bytes for `family`, or the fallback face.
    pub fn resolve(&self, family: &str) -> Option<Arc<Vec<u8>>> {
        self.faces
            .get(&family.to_ascii_lowercase())
            .or(self.fallback.as_ref())
            .cloned()
    }
}

pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    // Registered family name per face, keyed by the face's allocation. The `Arc` is held so the
    // address cannot be reused by another face.
    families: HashMap<usize, (Arc<Vec<u8>>, String)>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine").finish_non_exhaustive()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Shape a single paragraph of text with the given face.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &Arc<Vec<u8>>,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StudioResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StudioError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.family_for(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Register `font_bytes` with parley on first use and return its family name.
    fn family_for(&mut self, font_bytes: &Arc<Vec<u8>>) -> StudioResult<String> {
        let key = Arc::as_ptr(font_bytes) as usize;
        if let Some((_, name)) = self.families.get(&key) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StudioError::validation("no font families registered from font bytes")
        })?;

        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StudioError::validation("registered font family has no name"))?
            .to_string();
        self.families
            .insert(key, (Arc::clone(font_bytes), name.clone()));
        Ok(name)
    }

    /// Number of faces registered with the layout context.
    pub fn registered_faces(&self) -> usize {
        self.families.len()
    }
}
