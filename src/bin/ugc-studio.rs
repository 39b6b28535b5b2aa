use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use ugc_studio::{
    CpuSceneRenderer, PaintBridge, Rgba8, Scene, SceneRenderer, SceneTemplate, StrokeEvent,
    StudioConfig, TextureTemplate, catalog, render::text::FontBook,
};

#[derive(Parser, Debug)]
#[command(name = "ugc-studio", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a saved 2D scene to a PNG.
    Render(RenderArgs),
    /// Replay stroke events onto a blank texture and write it as a PNG.
    Paint(PaintArgs),
    /// Print the sticker, text-style and accessory catalogs as JSON.
    Catalog,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Draw the T-shirt guides under the scene content.
    #[arg(long)]
    template: bool,

    /// Directory of `.ttf`/`.otf` files named after their family.
    #[arg(long)]
    fonts: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PaintArgs {
    /// JSON array of stroke events.
    #[arg(long)]
    strokes: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Texture side in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Background fill as a hex color.
    #[arg(long, default_value = "#FFFFFF")]
    fill: String,

    /// Start from the clothing guide template.
    #[arg(long)]
    guides: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Paint(args) => cmd_paint(args),
        Command::Catalog => cmd_catalog(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).with_context(|| format!("parse {what} JSON"))
}

fn write_png(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut scene: Scene = read_json(&args.in_path, "scene")?;
    scene.validate()?;

    if args.template {
        let mut base = Scene::new(scene.canvas, scene.background);
        let first_id = scene.max_id().map_or(1, |id| id.0 + 1);
        SceneTemplate::TShirt.install(&mut base, first_id);
        base.objects.append(&mut scene.objects);
        scene = base;
    }

    let config = StudioConfig::default().with_env_overrides();
    let mut fonts = FontBook::system();
    if let Some(dir) = args.fonts.as_ref().or(config.font_dir.as_ref()) {
        fonts.load_dir(dir)?;
    }

    let mut renderer = CpuSceneRenderer::new(fonts);
    let image = renderer.render(&scene)?;
    write_png(&args.out, &image.encode_png()?)
}

fn cmd_paint(args: PaintArgs) -> anyhow::Result<()> {
    let strokes: Vec<StrokeEvent> = read_json(&args.strokes, "strokes")?;
    let size = args
        .size
        .unwrap_or_else(|| StudioConfig::default().with_env_overrides().texture_size);
    let fill = Rgba8::from_hex(&args.fill)?;
    let template = if args.guides {
        TextureTemplate::ClothingGuides
    } else {
        TextureTemplate::Blank
    };

    let mut bridge = PaintBridge::initialize_with_template(size, size, fill, template)?;
    let painted = strokes
        .iter()
        .filter(|e| bridge.paint(e).is_some())
        .count();
    tracing::info!(events = strokes.len(), painted, "strokes applied");

    write_png(&args.out, &bridge.snapshot().encode_png()?)
}

fn cmd_catalog() -> anyhow::Result<()> {
    let doc = serde_json::json!({
        "stickers": catalog::STICKERS,
        "text_colors": catalog::TEXT_COLORS,
        "text_fonts": catalog::TEXT_FONTS,
        "brush_colors": catalog::BRUSH_COLORS,
        "accessories": catalog::ACCESSORIES,
        "skin_presets": catalog::SKIN_PRESETS,
        "exports": {
            "design": catalog::EXPORT_FILENAME,
            "texture": catalog::TEXTURE_EXPORT_FILENAME,
            "config": catalog::CONFIG_EXPORT_FILENAME,
        },
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
