use std::{collections::HashMap, sync::Arc};

use vello_cpu::kurbo::Shape as _;

use crate::{
    foundation::{
        core::{Affine, Rgba8},
        error::{StudioError, StudioResult},
    },
    render::{
        SceneRenderer,
        raster::RasterImage,
        svg_raster::{parse_svg, rasterize_svg_to_premul_rgba8, svg_raster_params},
        text::{EMOJI_FAMILY, FontBook, TextBrushRgba8, TextLayoutEngine},
    },
    scene::model::{GuideShape, ObjectKind, Scene, SceneObject, StickerSource},
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SvgRasterKey {
    source: String,
    width: u32,
    height: u32,
}

/// CPU scene rasterizer built on vello_cpu, parley and resvg.
///
/// Guides that cannot be drawn are skipped with a warning. A text or sticker object that cannot be
/// drawn fails the whole render, naming the objects, so an export never silently drops content.
pub struct CpuSceneRenderer {
    fonts: FontBook,
    layout: TextLayoutEngine,
    font_cache: HashMap<usize, vello_cpu::peniko::FontData>,
    svg_trees: HashMap<String, Arc<usvg::Tree>>,
    svg_cache: HashMap<SvgRasterKey, vello_cpu::Image>,
}

impl std::fmt::Debug for CpuSceneRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSceneRenderer")
            .field("fonts", &self.fonts.len())
            .field("svg_cache", &self.svg_cache.len())
            .finish()
    }
}

impl Default for CpuSceneRenderer {
    fn default() -> Self {
        Self::new(FontBook::new())
    }
}

impl CpuSceneRenderer {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            layout: TextLayoutEngine::new(),
            font_cache: HashMap::new(),
            svg_trees: HashMap::new(),
            svg_cache: HashMap::new(),
        }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }
}

impl SceneRenderer for CpuSceneRenderer {
    #[tracing::instrument(skip_all, fields(objects = scene.len()))]
    fn render(&mut self, scene: &Scene) -> StudioResult<RasterImage> {
        let width: u16 = scene
            .canvas
            .width
            .try_into()
            .map_err(|_| StudioError::render("canvas width exceeds u16"))?;
        let height: u16 = scene
            .canvas
            .height
            .try_into()
            .map_err(|_| StudioError::render("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(scene.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        let mut undrawn = Vec::new();
        for obj in &scene.objects {
            if let Err(err) = self.draw_object(&mut ctx, obj) {
                tracing::warn!(id = %obj.id, %err, "object skipped");
                if !matches!(obj.kind, ObjectKind::Guide { .. }) {
                    undrawn.push(obj.id.to_string());
                }
            }
        }
        if !undrawn.is_empty() {
            return Err(StudioError::render(format!(
                "objects could not be drawn: {}",
                undrawn.join(", ")
            )));
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        RasterImage::from_premul(
            scene.canvas.width,
            scene.canvas.height,
            pixmap.data_as_u8_slice().to_vec(),
        )
    }
}

impl CpuSceneRenderer {
    fn draw_object(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        obj: &SceneObject,
    ) -> StudioResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let transform = obj.placement.to_affine();

        match &obj.kind {
            ObjectKind::Guide {
                shape:
                    GuideShape::Panel {
                        width,
                        height,
                        corner_radius,
                        fill,
                        stroke,
                        stroke_width,
                        dash,
                    },
            } => {
                let rect = vello_cpu::kurbo::RoundedRect::new(
                    -width / 2.0,
                    -height / 2.0,
                    width / 2.0,
                    height / 2.0,
                    *corner_radius,
                );
                let path = rect.to_path(0.1);
                ctx.set_transform(affine_to_cpu(transform));
                if let Some(fill) = fill {
                    ctx.set_paint(color_to_cpu(*fill));
                    ctx.fill_path(&path);
                }
                if *stroke_width > 0.0 {
                    let mut style = vello_cpu::kurbo::Stroke::new(*stroke_width);
                    if !dash.is_empty() {
                        style = style.with_dashes(0.0, dash.iter().copied());
                    }
                    ctx.set_stroke(style);
                    ctx.set_paint(color_to_cpu(*stroke));
                    ctx.stroke_path(&path);
                }
                Ok(())
            }
            ObjectKind::Guide {
                shape:
                    GuideShape::Label {
                        text,
                        color,
                        font_family,
                        size_px,
                    },
            } => self.draw_text(ctx, text, font_family, *size_px, *color, transform),
            ObjectKind::Text(style) => self.draw_text(
                ctx,
                &style.text,
                &style.font_family,
                style.size_px,
                style.color,
                transform,
            ),
            ObjectKind::Sticker {
                source: StickerSource::Glyph { glyph, size_px },
            } => self.draw_text(ctx, glyph, EMOJI_FAMILY, *size_px, Rgba8::BLACK, transform),
            ObjectKind::Sticker {
                source: StickerSource::Svg { source, size_px },
            } => {
                let (paint, w, h, adjust) = self.svg_paint_for(source, *size_px, transform)?;
                ctx.set_transform(affine_to_cpu(adjust));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                Ok(())
            }
        }
    }

    /// Lay out `text` and draw it centered on the transform origin.
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        family: &str,
        size_px: f32,
        color: Rgba8,
        transform: Affine,
    ) -> StudioResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let bytes = self
            .fonts
            .resolve(family)
            .ok_or_else(|| StudioError::render(format!("no font for family '{family}'")))?;

        let layout = self
            .layout
            .layout_plain(text, &bytes, size_px, TextBrushRgba8::from(color))?;
        let font = self.font_for(bytes);

        let center = Affine::translate((
            -f64::from(layout.width()) / 2.0,
            -f64::from(layout.height()) / 2.0,
        ));
        ctx.set_transform(affine_to_cpu(transform * center));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn font_for(&mut self, bytes: Arc<Vec<u8>>) -> vello_cpu::peniko::FontData {
        let key = Arc::as_ptr(&bytes) as usize;
        self.font_cache
            .entry(key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
                    0,
                )
            })
            .clone()
    }

    fn svg_paint_for(
        &mut self,
        source: &str,
        size_px: f32,
        transform: Affine,
    ) -> StudioResult<(vello_cpu::Image, f64, f64, Affine)> {
        let tree = match self.svg_trees.get(source) {
            Some(tree) => tree.clone(),
            None => {
                let tree = Arc::new(parse_svg(source)?);
                self.svg_trees.insert(source.to_string(), tree.clone());
                tree
            }
        };

        let (w, h, transform_adjust) = svg_raster_params(&tree, size_px, transform)?;
        let key = SvgRasterKey {
            source: source.to_string(),
            width: w,
            height: h,
        };
        if let Some(paint) = self.svg_cache.get(&key) {
            return Ok((paint.clone(), f64::from(w), f64::from(h), transform_adjust));
        }

        let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
        let pixmap = premul_bytes_to_pixmap(&rgba8_premul, w, h)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.svg_cache.insert(key, paint.clone());
        Ok((paint, f64::from(w), f64::from(h), transform_adjust))
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StudioResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StudioError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StudioError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StudioError::render("premultiplied image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::core::Canvas,
        scene::{model::ObjectId, template::SceneTemplate},
    };

    #[test]
    fn empty_scene_is_background() {
        let scene = Scene::new(Canvas::new(8, 6).unwrap(), Rgba8::rgb(10, 20, 30));
        let img = CpuSceneRenderer::default().render(&scene).unwrap();
        assert_eq!((img.width, img.height), (8, 6));
        assert!(
            img.data
                .chunks_exact(4)
                .all(|px| px == [10, 20, 30, 255])
        );
    }

    #[test]
    fn template_panels_draw_without_fonts() {
        let mut scene = Scene::new(Canvas::TSHIRT, Rgba8::WHITE);
        SceneTemplate::TShirt.install(&mut scene, 1);
        let img = CpuSceneRenderer::default().render(&scene).unwrap();

        // Inside the front panel fill, away from dashes and design area.
        let px = img.pixel(60, 290).unwrap();
        assert_eq!(px, Rgba8::rgb(0xf8, 0xfa, 0xfc));
        // Outside every guide.
        assert_eq!(img.pixel(5, 5).unwrap(), Rgba8::WHITE);
    }

    #[test]
    fn svg_sticker_is_centered_on_placement() {
        let mut scene = Scene::new(Canvas::new(40, 40).unwrap(), Rgba8::WHITE);
        scene.push(SceneObject {
            id: ObjectId(1),
            placement: crate::foundation::core::Placement::at(20.0, 20.0),
            selectable: true,
            deletable: true,
            kind: ObjectKind::Sticker {
                source: StickerSource::Svg {
                    source: r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
                        <rect width="10" height="10" fill="#0000ff"/></svg>"##
                        .to_string(),
                    size_px: 20.0,
                },
            },
        });
        let img = CpuSceneRenderer::default().render(&scene).unwrap();
        assert_eq!(img.pixel(20, 20).unwrap(), Rgba8::rgb(0, 0, 255));
        assert_eq!(img.pixel(2, 2).unwrap(), Rgba8::WHITE);
    }

    fn text_scene(text: &str) -> Scene {
        let mut scene = Scene::new(Canvas::new(64, 32).unwrap(), Rgba8::WHITE);
        scene.push(SceneObject {
            id: ObjectId(7),
            placement: crate::foundation::core::Placement::at(32.0, 16.0),
            selectable: true,
            deletable: true,
            kind: ObjectKind::Text(crate::scene::model::TextStyle {
                text: text.to_string(),
                color: Rgba8::BLACK,
                size_px: 20.0,
                font_family: "Impact".to_string(),
            }),
        });
        scene
    }

    #[test]
    fn text_without_fonts_fails_the_render() {
        let err = CpuSceneRenderer::default()
            .render(&text_scene("HI"))
            .unwrap_err();
        assert!(err.to_string().contains("obj-7"), "{err}");
    }

    #[test]
    fn repeated_renders_register_each_face_once() {
        let mut renderer = CpuSceneRenderer::new(FontBook::system());
        if renderer.fonts().is_empty() {
            return;
        }
        let scene = text_scene("HI");
        let first = renderer.render(&scene).unwrap();
        renderer.render(&scene).unwrap();
        renderer.render(&text_scene("AGAIN")).unwrap();
        assert_eq!(renderer.layout.registered_faces(), 1);
        assert!(first.data.chunks_exact(4).any(|px| px != [255, 255, 255, 255]));
    }

    #[test]
    fn unresolvable_glyph_sticker_fails_the_render() {
        let mut scene = Scene::new(Canvas::new(16, 16).unwrap(), Rgba8::WHITE);
        scene.push(SceneObject {
            id: ObjectId(1),
            placement: crate::foundation::core::Placement::at(8.0, 8.0),
            selectable: true,
            deletable: true,
            kind: ObjectKind::Sticker {
                source: StickerSource::Glyph {
                    glyph: "⭐".to_string(),
                    size_px: 12.0,
                },
            },
        });
        assert!(CpuSceneRenderer::default().render(&scene).is_err());
    }
}
