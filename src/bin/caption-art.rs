use std::path::{Path, PathBuf};

use anyhow::Context as _;
use caption_art::{
    AdvancedTextLayer, AutoPlacement, CompositorConfig, Compositor, CpuCanvas,
    DEFAULT_MAX_DIMENSION, DirectorySink, ExportOptions, Exporter, FontBook, ImageSource,
    LoadOptions, PlacementOpts, Raster, RenderOutcome, TextLayer, Transform, load_image,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "caption-art", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a caption onto a photo and export it.
    Render(RenderArgs),
    /// Print the suggested caption transform for a photo as JSON.
    Place(PlaceArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Background photo.
    #[arg(long)]
    background: PathBuf,

    /// Subject mask (alpha marks the subject); enables text-behind-subject.
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Font file to register (repeatable). The first one is the fallback face.
    #[arg(long = "font", required = true)]
    fonts: Vec<PathBuf>,

    /// Job JSON describing the text layer and export options.
    #[arg(long)]
    job: PathBuf,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Longest side of the working surface [env: CAPTION_ART_MAX_DIMENSION].
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Ignore the job's transform and place the caption on the calmest region.
    #[arg(long, default_value_t = false)]
    auto_place: bool,

    /// Grid cell size for auto placement, in pixels.
    #[arg(long, default_value_t = 50)]
    grid_size: u32,

    /// Do not redraw the subject over the caption when a mask is given.
    #[arg(long, default_value_t = false)]
    no_subject_overlay: bool,
}

#[derive(Parser, Debug)]
struct PlaceArgs {
    /// Photo to analyze.
    #[arg(long)]
    background: PathBuf,

    /// Grid cell size, in pixels.
    #[arg(long, default_value_t = 50)]
    grid_size: u32,

    /// Score threshold (defaults to the median cell score).
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(serde::Deserialize, Debug)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum JobLayer {
    Basic(TextLayer),
    Advanced(AdvancedTextLayer),
}

impl JobLayer {
    fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Self::Basic(l) => &mut l.transform,
            Self::Advanced(l) => &mut l.transform,
        }
    }
}

#[derive(serde::Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct Job {
    layer: JobLayer,
    #[serde(default)]
    text_behind: bool,
    #[serde(default)]
    export: ExportOptions,
    #[serde(default)]
    load: LoadOptions,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Place(args) => cmd_place(args),
    }
}

fn max_dimension(arg: Option<u32>) -> u32 {
    arg.or_else(|| {
        std::env::var("CAPTION_ART_MAX_DIMENSION")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
    })
    .filter(|&n| n > 0)
    .unwrap_or(DEFAULT_MAX_DIMENSION)
}

fn read_job(path: &Path) -> anyhow::Result<Job> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read job '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse job '{}'", path.display()))
}

fn font_book(paths: &[PathBuf]) -> anyhow::Result<FontBook> {
    let mut fonts = FontBook::new();
    for path in paths {
        let family = fonts.register_file(path)?;
        tracing::debug!(font = %path.display(), %family, "font registered");
    }
    Ok(fonts)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut job = read_job(&args.job)?;

    let background = load_image(&ImageSource::Path(args.background.clone()), &job.load)?;
    let mask = args
        .mask
        .as_ref()
        .map(|p| load_image(&ImageSource::Path(p.clone()), &job.load))
        .transpose()?;

    let mut config = CompositorConfig::new(background.clone());
    config.mask = mask.clone();
    config.text_behind = job.text_behind && mask.is_some();
    config.max_dimension = max_dimension(args.max_dimension);
    let mut compositor = Compositor::new(config, CpuCanvas::new(font_book(&args.fonts)?))?;

    if args.auto_place {
        let placed = compositor.auto_place(args.grid_size);
        let t = job.layer.transform_mut();
        t.x = placed.x;
        t.y = placed.y;
    }

    let outcome = match &job.layer {
        JobLayer::Basic(l) => compositor.render(l)?,
        JobLayer::Advanced(l) => compositor.render_advanced(l)?,
    };
    if outcome == RenderOutcome::Superseded {
        anyhow::bail!("render was superseded");
    }

    let mut surface = compositor.target().clone();
    if let Some(mask) = mask
        .as_ref()
        .filter(|_| compositor.text_behind_enabled() && !args.no_subject_overlay)
    {
        let (w, h) = surface.dimensions();
        let subject: Raster = background.resized(w, h)?;
        surface.draw_masked_over(&subject, &mask.resized(w, h)?)?;
    }

    let mut exporter = Exporter::new(CpuCanvas::new(font_book(&args.fonts)?));
    let mut sink = DirectorySink::new(&args.out);
    let out = exporter.export(&surface, &job.export, &mut sink)?;
    tracing::info!(path = %args.out.join(&out.filename).display(), "wrote export");
    Ok(())
}

fn cmd_place(args: PlaceArgs) -> anyhow::Result<()> {
    let background = load_image(
        &ImageSource::Path(args.background.clone()),
        &LoadOptions::default(),
    )?;
    let placement = AutoPlacement::new(PlacementOpts {
        grid_size: args.grid_size,
        threshold: args.threshold,
    });
    let transform = placement.suggest(&background);
    println!("{}", serde_json::to_string_pretty(&transform)?);
    Ok(())
}
