use crate::{
    foundation::core::{Canvas, Placement, Rgba8},
    scene::model::{GuideShape, ObjectId, ObjectKind, Scene, SceneObject},
};

/// Initial content installed before the baseline snapshot is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneTemplate {
    #[default]
    Blank,
    /// Front/back shirt panels, design areas and labels.
    TShirt,
}

const PANEL_FILL: Rgba8 = Rgba8::rgb(0xf8, 0xfa, 0xfc);
const PANEL_STROKE: Rgba8 = Rgba8::rgb(0xe2, 0xe8, 0xf0);
const AREA_STROKE: Rgba8 = Rgba8::rgb(0xcb, 0xd5, 0xe1);
const LABEL_COLOR: Rgba8 = Rgba8::rgb(0x94, 0xa3, 0xb8);
const LABEL_FONT: &str = "Fredoka";

impl SceneTemplate {
    /// Guide objects for this template, numbered from `first_id`.
    ///
    /// Coordinates are laid out for [`Canvas::TSHIRT`] and scaled to other canvas sizes.
    pub fn guides(self, canvas: Canvas, first_id: u64) -> Vec<SceneObject> {
        let shapes = match self {
            SceneTemplate::Blank => return Vec::new(),
            SceneTemplate::TShirt => tshirt_guides(),
        };

        let sx = f64::from(canvas.width) / f64::from(Canvas::TSHIRT.width);
        let sy = f64::from(canvas.height) / f64::from(Canvas::TSHIRT.height);

        shapes
            .into_iter()
            .enumerate()
            .map(|(i, (x, y, shape))| SceneObject {
                id: ObjectId(first_id + i as u64),
                placement: Placement::at(x * sx, y * sy),
                selectable: false,
                deletable: false,
                kind: ObjectKind::Guide { shape },
            })
            .collect()
    }

    pub fn install(self, scene: &mut Scene, first_id: u64) -> u64 {
        let guides = self.guides(scene.canvas, first_id);
        let next = first_id + guides.len() as u64;
        scene.objects.extend(guides);
        next
    }
}

fn panel() -> GuideShape {
    GuideShape::Panel {
        width: 240.0,
        height: 280.0,
        corner_radius: 10.0,
        fill: Some(PANEL_FILL),
        stroke: PANEL_STROKE,
        stroke_width: 2.0,
        dash: vec![5.0, 5.0],
    }
}

fn design_area() -> GuideShape {
    GuideShape::Panel {
        width: 140.0,
        height: 140.0,
        corner_radius: 5.0,
        fill: None,
        stroke: AREA_STROKE,
        stroke_width: 1.0,
        dash: vec![3.0, 3.0],
    }
}

fn label(text: &str, size_px: f32) -> GuideShape {
    GuideShape::Label {
        text: text.to_string(),
        color: LABEL_COLOR,
        font_family: LABEL_FONT.to_string(),
        size_px,
    }
}

// Centers on the 585x559 canvas.
fn tshirt_guides() -> Vec<(f64, f64, GuideShape)> {
    vec![
        (150.0, 170.0, panel()),
        (430.0, 170.0, panel()),
        (150.0, 150.0, design_area()),
        (430.0, 150.0, design_area()),
        (150.0, 328.0, label("👕 FRONT", 16.0)),
        (430.0, 328.0, label("👕 BACK", 16.0)),
        (292.5, 527.0, label("Drag stickers here! ⬆️", 14.0)),
    ]
}
