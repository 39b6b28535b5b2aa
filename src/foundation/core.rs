use crate::foundation::error::{StudioError, StudioResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Pixel dimensions of a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// T-shirt template canvas used by the 2D editor.
    pub const TSHIRT: Canvas = Canvas {
        width: 585,
        height: 559,
    };

    pub fn new(width: u32, height: u32) -> StudioResult<Self> {
        if width == 0 || height == 0 {
            return Err(StudioError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    pub fn contains(self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= f64::from(self.width) && p.y <= f64::from(self.height)
    }
}

/// Straight (non-premultiplied) RGBA8 color. Serialized as a `#rrggbb[aa]` hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::rgb(255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8::rgb(0, 0, 0);
    pub const TRANSPARENT: Rgba8 = Rgba8 {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> StudioResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || StudioError::validation(format!("invalid hex color '{s}'"));
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(bad());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16).ok_or_else(bad)? as u8;
                    out[i] = v * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(bad()),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                self.r, self.g, self.b, self.a
            )
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array(px: [u8; 4]) -> Self {
        Self::rgba(px[0], px[1], px[2], px[3])
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = StudioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgba8> for String {
    fn from(value: Rgba8) -> Self {
        value.to_hex()
    }
}

/// Position, rotation and scale of a placed object. Objects are drawn centered on `position`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    pub position: Point,
    #[serde(default)]
    pub rotation_deg: f64,
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
}

fn unit_scale() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            rotation_deg: 0.0,
            scale: unit_scale(),
        }
    }
}

impl Placement {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            ..Self::default()
        }
    }

    pub fn to_affine(self) -> Affine {
        // T(position) * R(rotation) * S(scale), local geometry is centered on the origin.
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parse_forms() {
        assert_eq!(Rgba8::from_hex("#FF6B6B").unwrap(), Rgba8::rgb(255, 107, 107));
        assert_eq!(Rgba8::from_hex("fff").unwrap(), Rgba8::WHITE);
        assert_eq!(
            Rgba8::from_hex("#00000080").unwrap(),
            Rgba8::rgba(0, 0, 0, 128)
        );
        assert!(Rgba8::from_hex("#12345").is_err());
        assert!(Rgba8::from_hex("#gggggg").is_err());
        assert!(Rgba8::from_hex("#ééé").is_err());
        assert!(Rgba8::from_hex("#+1+2+3").is_err());
        assert!(Rgba8::from_hex("+F+F+F").is_err());
    }

    #[test]
    fn hex_serde_is_string() {
        let json = serde_json::to_string(&Rgba8::rgb(0x1a, 0x1a, 0x1a)).unwrap();
        assert_eq!(json, "\"#1A1A1A\"");
        let back: Rgba8 = serde_json::from_str("\"#1a1a1a\"").unwrap();
        assert_eq!(back, Rgba8::rgb(0x1a, 0x1a, 0x1a));
    }

    #[test]
    fn placement_to_affine_identity_and_translation() {
        assert_eq!(Placement::default().to_affine(), Affine::IDENTITY);
        assert_eq!(
            Placement::at(10.0, -2.5).to_affine(),
            Affine::translate(Vec2::new(10.0, -2.5))
        );
    }

    #[test]
    fn canvas_rejects_zero() {
        assert!(Canvas::new(0, 10).is_err());
        assert_eq!(Canvas::new(585, 559).unwrap(), Canvas::TSHIRT);
    }
}
