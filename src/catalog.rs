use chrono::{DateTime, SecondsFormat, Utc};
use glam::Vec3;

use self::AccessoryCategory::{Back, Face, Hand, Head};

use crate::{
    foundation::{
        core::{Point, Rgba8},
        error::StudioResult,
    },
    scene::model::{ObjectSpec, TextStyle},
};

pub const EXPORT_FILENAME: &str = "my-roblox-tshirt.png";
pub const TEXTURE_EXPORT_FILENAME: &str = "roblox-clothing-design.png";
pub const CONFIG_EXPORT_FILENAME: &str = "roblox-avatar-config.json";

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StickerDef {
    pub id: &'static str,
    pub name: &'static str,
    pub glyph: &'static str,
}

impl StickerDef {
    pub fn to_spec(&self, at: Point) -> ObjectSpec {
        ObjectSpec::glyph_sticker(self.glyph, at)
    }
}

pub const STICKERS: &[StickerDef] = &[
    sticker("wolf", "Wolf", "🐺"),
    sticker("shield", "Shield", "🛡️"),
    sticker("star", "Star", "⭐"),
    sticker("heart", "Heart", "❤️"),
    sticker("lightning", "Lightning", "⚡"),
    sticker("crown", "Crown", "👑"),
    sticker("fire", "Fire", "🔥"),
    sticker("rocket", "Rocket", "🚀"),
    sticker("diamond", "Diamond", "💎"),
    sticker("gamepad", "Gaming", "🎮"),
    sticker("sword", "Sword", "⚔️"),
    sticker("music", "Music", "🎵"),
];

const fn sticker(id: &'static str, name: &'static str, glyph: &'static str) -> StickerDef {
    StickerDef { id, name, glyph }
}

pub fn find_sticker(id: &str) -> Option<&'static StickerDef> {
    STICKERS.iter().find(|s| s.id == id)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct NamedColor {
    pub id: &'static str,
    pub name: &'static str,
    pub value: Rgba8,
}

pub const TEXT_COLORS: &[NamedColor] = &[
    named("black", "Black", Rgba8::rgb(0x00, 0x00, 0x00)),
    named("white", "White", Rgba8::rgb(0xFF, 0xFF, 0xFF)),
    named("red", "Red", Rgba8::rgb(0xEF, 0x44, 0x44)),
    named("blue", "Blue", Rgba8::rgb(0x3B, 0x82, 0xF6)),
    named("green", "Green", Rgba8::rgb(0x22, 0xC5, 0x5E)),
    named("purple", "Purple", Rgba8::rgb(0xA8, 0x55, 0xF7)),
    named("orange", "Orange", Rgba8::rgb(0xF9, 0x73, 0x16)),
    named("pink", "Pink", Rgba8::rgb(0xEC, 0x48, 0x99)),
];

const fn named(id: &'static str, name: &'static str, value: Rgba8) -> NamedColor {
    NamedColor { id, name, value }
}

pub const TEXT_FONTS: &[&str] = &["Fredoka", "Arial", "Impact"];

/// Texture brush palette; the first entry is the default brush color.
pub const BRUSH_COLORS: [Rgba8; 20] = [
    Rgba8::rgb(0xFF, 0x6B, 0x6B),
    Rgba8::rgb(0x4E, 0xCD, 0xC4),
    Rgba8::rgb(0x45, 0xB7, 0xD1),
    Rgba8::rgb(0x96, 0xCE, 0xB4),
    Rgba8::rgb(0xFF, 0xEA, 0xA7),
    Rgba8::rgb(0xDD, 0xA0, 0xDD),
    Rgba8::rgb(0x98, 0xD8, 0xC8),
    Rgba8::rgb(0xF7, 0xDC, 0x6F),
    Rgba8::rgb(0xBB, 0x8F, 0xCE),
    Rgba8::rgb(0x85, 0xC1, 0xE9),
    Rgba8::rgb(0xF8, 0xB5, 0x00),
    Rgba8::rgb(0x1A, 0xBC, 0x9C),
    Rgba8::rgb(0xE7, 0x4C, 0x3C),
    Rgba8::rgb(0x9B, 0x59, 0xB6),
    Rgba8::rgb(0x34, 0x98, 0xDB),
    Rgba8::rgb(0x2E, 0xCC, 0x71),
    Rgba8::rgb(0x00, 0x00, 0x00),
    Rgba8::rgb(0xFF, 0xFF, 0xFF),
    Rgba8::rgb(0x80, 0x80, 0x80),
    Rgba8::rgb(0xC0, 0x39, 0x2B),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl TextSize {
    pub fn px(self) -> f32 {
        match self {
            TextSize::Small => 16.0,
            TextSize::Medium => 24.0,
            TextSize::Large => 32.0,
        }
    }
}

pub const MAX_TEXT_LEN: usize = 30;

/// Build a text object from raw input: trimmed, capped at [`MAX_TEXT_LEN`] characters.
/// Blank input yields `None`.
pub fn text_spec(
    input: &str,
    color: Rgba8,
    size: TextSize,
    font_family: &str,
    at: Point,
) -> Option<ObjectSpec> {
    let text: String = input.trim().chars().take(MAX_TEXT_LEN).collect();
    let text = text.trim_end();
    if text.is_empty() {
        return None;
    }
    Some(ObjectSpec::text(
        TextStyle {
            text: text.to_owned(),
            color,
            font_family: font_family.to_owned(),
            size_px: size.px(),
        },
        at,
    ))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessoryCategory {
    Head,
    Face,
    Back,
    Hand,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryDef {
    pub id: &'static str,
    pub name: &'static str,
    pub category: AccessoryCategory,
    pub default_color: Rgba8,
    /// Anchor on the character, in character space.
    pub position: Vec3,
}

pub const ACCESSORIES: &[AccessoryDef] = &[
    accessory("crown", "Crown", Head, 0xFFD700, [0.0, 1.85, 0.0]),
    accessory("tophat", "Top Hat", Head, 0x1A1A1A, [0.0, 1.95, 0.0]),
    accessory("baseballcap", "Baseball Cap", Head, 0x2563EB, [0.0, 1.8, 0.0]),
    accessory("angelwings", "Angel Wings", Back, 0xFFFFFF, [0.0, 0.8, -0.3]),
    accessory("devilhorns", "Devil Horns", Head, 0x8B0000, [0.0, 1.85, 0.0]),
    accessory("halo", "Halo", Head, 0xFFD700, [0.0, 2.1, 0.0]),
    accessory("sunglasses", "Sunglasses", Face, 0x1A1A1A, [0.0, 1.45, 0.4]),
    accessory("headphones", "Headphones", Head, 0x1A1A1A, [0.0, 1.5, 0.0]),
    accessory("backpack", "Backpack", Back, 0x4ECDC4, [0.0, 0.6, -0.4]),
    accessory("sword", "Sword", Hand, 0xC0C0C0, [0.8, 0.3, 0.0]),
    accessory("shield", "Shield", Hand, 0x2563EB, [-0.7, 0.5, 0.1]),
];

const fn accessory(
    id: &'static str,
    name: &'static str,
    category: AccessoryCategory,
    rgb: u32,
    p: [f32; 3],
) -> AccessoryDef {
    AccessoryDef {
        id,
        name,
        category,
        default_color: Rgba8::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8),
        position: Vec3::new(p[0], p[1], p[2]),
    }
}

pub fn find_accessory(id: &str) -> Option<&'static AccessoryDef> {
    ACCESSORIES.iter().find(|a| a.id == id)
}

/// Catalog entries in `category`, or all of them for `None`.
pub fn accessories_in(
    category: Option<AccessoryCategory>,
) -> impl Iterator<Item = &'static AccessoryDef> {
    ACCESSORIES
        .iter()
        .filter(move |a| category.is_none_or(|c| a.category == c))
}

pub const DEFAULT_SKIN: Rgba8 = Rgba8::rgb(0xFF, 0xE4, 0xC4);

pub const SKIN_PRESETS: &[Rgba8] = &[
    DEFAULT_SKIN,
    Rgba8::rgb(0xDE, 0xB8, 0x87),
    Rgba8::rgb(0xD2, 0x69, 0x1E),
    Rgba8::rgb(0x8B, 0x45, 0x13),
    Rgba8::rgb(0xF5, 0xDE, 0xB3),
];

pub const MIN_ACCESSORY_SCALE: f32 = 0.5;
pub const MAX_ACCESSORY_SCALE: f32 = 2.0;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EquippedAccessory {
    pub id: String,
    pub color: Rgba8,
    pub scale: f32,
    pub position: Vec3,
}

#[derive(serde::Serialize)]
struct CharacterConfig {
    color: Rgba8,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigExport<'a> {
    character: CharacterConfig,
    accessories: &'a [EquippedAccessory],
    exported_at: String,
}

/// Character skin color plus the ordered list of equipped accessories.
///
/// The same catalog entry may be equipped more than once. Index-based operations ignore
/// out-of-range indices.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessoryLoadout {
    pub character_color: Rgba8,
    equipped: Vec<EquippedAccessory>,
}

impl Default for AccessoryLoadout {
    fn default() -> Self {
        Self {
            character_color: DEFAULT_SKIN,
            equipped: Vec::new(),
        }
    }
}

impl AccessoryLoadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equipped(&self) -> &[EquippedAccessory] {
        &self.equipped
    }

    /// Equip a catalog accessory with its default color, unit scale and anchor.
    pub fn equip(&mut self, id: &str) -> bool {
        let Some(def) = find_accessory(id) else {
            tracing::warn!(id, "unknown accessory");
            return false;
        };
        self.equipped.push(EquippedAccessory {
            id: def.id.to_owned(),
            color: def.default_color,
            scale: 1.0,
            position: def.position,
        });
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<EquippedAccessory> {
        (index < self.equipped.len()).then(|| self.equipped.remove(index))
    }

    pub fn set_color(&mut self, index: usize, color: Rgba8) -> bool {
        match self.equipped.get_mut(index) {
            Some(a) => {
                a.color = color;
                true
            }
            None => false,
        }
    }

    /// Scale is clamped to `0.5..=2.0`; non-finite values are ignored.
    pub fn set_scale(&mut self, index: usize, scale: f32) -> bool {
        match self.equipped.get_mut(index) {
            Some(a) if scale.is_finite() => {
                a.scale = scale.clamp(MIN_ACCESSORY_SCALE, MAX_ACCESSORY_SCALE);
                true
            }
            _ => false,
        }
    }

    pub fn filter(&self, category: Option<AccessoryCategory>) -> Vec<&EquippedAccessory> {
        self.equipped
            .iter()
            .filter(|a| {
                category.is_none_or(|c| find_accessory(&a.id).is_some_and(|d| d.category == c))
            })
            .collect()
    }

    pub fn export_config(&self) -> StudioResult<String> {
        self.export_config_at(Utc::now())
    }

    pub fn export_config_at(&self, at: DateTime<Utc>) -> StudioResult<String> {
        let doc = ConfigExport {
            character: CharacterConfig {
                color: self.character_color,
            },
            accessories: &self.equipped,
            exported_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}
