use ugc_studio::{
    EditorSession, OrbitCamera, PointerEvent, PointerKind, PointerSurface, Rgba8, StudioConfig,
    Tool, Viewport, projector::character::PaintableScene,
};

fn painting_session() -> EditorSession {
    let config = StudioConfig {
        texture_size: 128,
        uv_viewport: Viewport::new(256.0, 256.0),
        ..StudioConfig::default()
    };
    let mut s = EditorSession::new(config).unwrap();
    s.set_tool(Tool::Paint);
    s.set_brush_color(Rgba8::rgb(255, 0, 0));
    s
}

fn ev(kind: PointerKind, x: f32, y: f32) -> PointerEvent {
    PointerEvent::new(kind, x, y)
}

#[test]
fn misses_leave_the_texture_byte_identical() {
    let mut s = painting_session();
    let before = s.export_texture_png().unwrap();
    let revision = s.bridge().revision();

    // Empty space, the (unpaintable) head, and outside the flat view.
    for (surface, x, y) in [
        (PointerSurface::Model, 5.0, 5.0),
        (PointerSurface::Model, 400.0, 119.0),
        (PointerSurface::UvView, -3.0, 40.0),
        (PointerSurface::UvView, 40.0, 300.0),
    ] {
        assert!(s.pointer(surface, ev(PointerKind::Down, x, y)).is_none());
        assert!(s.pointer(surface, ev(PointerKind::Move, x, y)).is_none());
        s.pointer(surface, ev(PointerKind::Up, x, y));
    }

    assert_eq!(s.bridge().revision(), revision);
    assert_eq!(s.export_texture_png().unwrap(), before);
}

#[test]
fn center_of_model_view_paints_torso_front() {
    let mut s = painting_session();
    let dirty = s
        .pointer(PointerSurface::Model, ev(PointerKind::Down, 400.0, 300.0))
        .unwrap();

    // Torso front face: u = 0.5, v ~ 0.389 on a 128px texture.
    let (x, y) = (64, ((1.0 - 0.38889) * 128.0) as u32);
    assert!(dirty.contains(x, y));
    assert_eq!(s.bridge().buffer().pixel(x, y), Some(Rgba8::rgb(255, 0, 0)));
}

#[test]
fn flat_view_scales_to_texture() {
    let mut s = painting_session();
    s.set_brush_size(5.0);
    // 256px view over a 128px texture halves coordinates.
    s.pointer(PointerSurface::UvView, ev(PointerKind::Down, 200.0, 100.0))
        .unwrap();
    assert_eq!(s.bridge().buffer().pixel(100, 50), Some(Rgba8::rgb(255, 0, 0)));
    assert_eq!(s.bridge().buffer().pixel(10, 10), Some(Rgba8::WHITE));
}

#[test]
fn leave_ends_the_stroke_but_keeps_paint() {
    let mut s = painting_session();
    s.pointer(PointerSurface::UvView, ev(PointerKind::Down, 20.0, 20.0));
    s.pointer(PointerSurface::UvView, ev(PointerKind::Move, 60.0, 20.0));
    s.pointer(PointerSurface::UvView, ev(PointerKind::Leave, 300.0, 20.0));
    let painted = s.bridge().buffer().clone();

    assert!(
        s.pointer(PointerSurface::UvView, ev(PointerKind::Move, 100.0, 100.0))
            .is_none()
    );
    assert_eq!(s.bridge().buffer(), &painted);
    assert_eq!(painted.pixel(30, 10), Some(Rgba8::rgb(255, 0, 0)));
}

#[test]
fn orbiting_moves_the_hit_to_a_side_face() {
    let scene = PaintableScene::character();
    let vp = Viewport::new(800.0, 600.0);
    let mut cam = OrbitCamera::new();

    let front = scene.pick(&cam.screen_ray(400.0, 300.0, vp)).unwrap();
    assert_eq!(front.mesh, "torso");
    assert!((front.point.z - 0.25).abs() < 1e-4);

    // Quarter turn to the +X side: the forearm in the way takes no paint, so the ray lands on
    // the torso's side face.
    cam.rotate(std::f32::consts::FRAC_PI_2, 0.0);
    let side = scene.pick(&cam.screen_ray(400.0, 300.0, vp)).unwrap();
    assert_eq!(side.mesh, "torso");
    assert!((side.point.x - 0.45).abs() < 1e-4);
}
