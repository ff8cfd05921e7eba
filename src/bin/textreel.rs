use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use textreel::{
    AnimationConfig, Color, CpuSurface, RefreshClock, RefreshMode, Studio, StudioConfig, Surface,
    Variant,
};

#[derive(Parser, Debug)]
#[command(name = "textreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Animate for a duration while capturing a WebM video (requires `ffmpeg` on PATH).
    Record(RecordArgs),
}

#[derive(Parser, Debug)]
struct StudioArgs {
    /// Studio config JSON. Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Regular font file (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold font file; bold text falls back to the regular face without it.
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// Title text.
    #[arg(long)]
    text: Option<String>,

    /// bounce, spin or wave.
    #[arg(long)]
    variant: Option<Variant>,

    /// Background color, e.g. `#667eea`.
    #[arg(long)]
    background: Option<Color>,

    /// Text color, e.g. `#ffffff`.
    #[arg(long)]
    color: Option<Color>,
}

impl StudioArgs {
    fn load(&self) -> anyhow::Result<StudioConfig> {
        let mut cfg = match &self.config {
            Some(path) => StudioConfig::from_path(path)?,
            None => StudioConfig::default(),
        };
        if let Some(font) = &self.font {
            cfg.font_path = Some(font.clone());
        }
        if let Some(bold) = &self.bold_font {
            cfg.bold_font_path = Some(bold.clone());
        }
        let anim: &mut AnimationConfig = &mut cfg.animation;
        if let Some(text) = &self.text {
            anim.text = text.clone();
        }
        if let Some(variant) = self.variant {
            anim.variant = variant;
        }
        if let Some(bg) = self.background {
            anim.background_color = bg;
        }
        if let Some(color) = self.color {
            anim.text_color = color;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    studio: StudioArgs,

    /// Elapsed animation time in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    at_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[command(flatten)]
    studio: StudioArgs,

    /// Recording length in seconds.
    #[arg(long, default_value_t = 3.0)]
    seconds: f64,

    /// Output directory (overrides `out_dir` from the config).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output file name.
    #[arg(long, default_value = textreel::DEFAULT_FILENAME)]
    name: String,

    /// Pace ticks against the wall clock instead of rendering as fast as possible.
    #[arg(long, default_value_t = false)]
    realtime: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Record(args) => cmd_record(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.studio.load()?;
    let mut surface = CpuSurface::new(cfg.canvas, &cfg.fonts()?)?;
    textreel::draw_frame(&mut surface, &cfg.animation, args.at_ms.max(0.0))?;
    let frame = surface.read_frame()?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    if !args.seconds.is_finite() || args.seconds <= 0.0 {
        anyhow::bail!("--seconds must be a positive number");
    }
    let mut cfg = args.studio.load()?;
    if let Some(dir) = args.out_dir {
        cfg.out_dir = dir;
    }

    let mode = if args.realtime {
        RefreshMode::Realtime
    } else {
        RefreshMode::Offline
    };
    let mut clock = RefreshClock::new(cfg.refresh, mode)?;
    let mut studio = Studio::new(&cfg)?;

    let end = Duration::from_secs_f64(args.seconds);
    let mut now = clock.next_tick();
    studio.start_recording_webm(now)?;
    while now <= end {
        studio.advance(now)?;
        now = clock.next_tick();
    }

    let Some(location) = studio.stop_recording()? else {
        anyhow::bail!("capture did not start (surface unavailable)");
    };
    let written = studio.download(&location, Some(&args.name));
    studio.release(&location);
    let path = written?;

    eprintln!("wrote {}", path.display());
    Ok(())
}
