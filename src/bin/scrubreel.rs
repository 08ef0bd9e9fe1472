use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scrubreel::{
    AuxFrame, FrameCount, FsFrameSource, PinState, ScrubSection, SectionConfig, Viewport,
    index_for,
};

#[derive(Parser, Debug)]
#[command(name = "scrubreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the frame index for a progress value.
    Index(IndexArgs),
    /// Render the canvas at one scroll offset as a PNG.
    Frame(FrameArgs),
    /// Sweep scroll offsets and print one JSON line per sample.
    Trace(TraceArgs),
}

#[derive(Parser, Debug)]
struct IndexArgs {
    /// Scroll progress (clamped to [0, 1]).
    #[arg(long, allow_negative_numbers = true)]
    progress: f64,

    /// Number of frames in the sequence.
    #[arg(long)]
    count: u32,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input section JSON. Frame paths resolve relative to its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scroll offset in pixels.
    #[arg(long, allow_negative_numbers = true)]
    offset: f64,

    /// Viewport as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_viewport, default_value = "1920x1080")]
    viewport: Viewport,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Give up if frames have not settled after this many seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct TraceArgs {
    /// Input section JSON. Frame paths resolve relative to its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// First scroll offset.
    #[arg(long, allow_negative_numbers = true)]
    from: f64,

    /// Last scroll offset (inclusive; may be below `from` to scroll upwards).
    #[arg(long, allow_negative_numbers = true)]
    to: f64,

    /// Distance between samples in pixels.
    #[arg(long, default_value_t = 100.0)]
    step: f64,

    /// Seconds of smoothing applied after each sample.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Viewport as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_viewport, default_value = "1920x1080")]
    viewport: Viewport,

    /// Give up if frames have not settled after this many seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

#[derive(serde::Serialize)]
struct TraceLine<'a> {
    offset: f64,
    progress: f64,
    frame: u32,
    pin: PinState,
    aux: &'a AuxFrame,
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
        Command::Index(args) => cmd_index(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Trace(args) => cmd_trace(args),
    }
}

fn parse_viewport(s: &str) -> Result<Viewport, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: f64 = w
        .trim()
        .parse()
        .map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: f64 = h
        .trim()
        .parse()
        .map_err(|e| format!("bad height '{h}': {e}"))?;
    Viewport::new(w, h).map_err(|e| e.to_string())
}

fn cmd_index(args: IndexArgs) -> anyhow::Result<()> {
    let count = FrameCount::new(args.count)?;
    println!("{}", index_for(args.progress, count).0);
    Ok(())
}

fn mount_section(
    in_path: &Path,
    viewport: Viewport,
    offset: f64,
    timeout_secs: u64,
) -> anyhow::Result<ScrubSection> {
    let cfg = SectionConfig::from_path(in_path)?;
    let root = in_path.parent().unwrap_or_else(|| Path::new("."));
    let source = Arc::new(FsFrameSource::new(root));

    let mut section = ScrubSection::mount(&cfg, source, viewport, offset)?;
    for ev in section.wait_ready(Duration::from_secs(timeout_secs))? {
        eprintln!("{ev:?}");
    }
    Ok(section)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let section = mount_section(
        &args.in_path,
        args.viewport,
        args.offset,
        args.timeout_secs,
    )?;
    let frame = section
        .snapshot()
        .context("section has no canvas")?
        .into_straight();

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
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

    if let Some(idx) = section.frame_index() {
        eprintln!("frame {} -> wrote {}", idx.0, args.out.display());
    }
    Ok(())
}

fn cmd_trace(args: TraceArgs) -> anyhow::Result<()> {
    if !args.step.is_finite() || args.step <= 0.0 {
        anyhow::bail!("--step must be > 0");
    }
    let mut section = mount_section(
        &args.in_path,
        args.viewport,
        args.from,
        args.timeout_secs,
    )?;

    let dir = if args.to >= args.from { 1.0 } else { -1.0 };
    let samples = ((args.to - args.from).abs() / args.step).floor() as u64;
    for i in 0..=samples {
        let offset = args.from + dir * args.step * i as f64;
        section.on_scroll(offset);
        section.on_animation_frame(args.dt);

        let ctl = section.controller().context("section is not active")?;
        let line = TraceLine {
            offset,
            progress: ctl.progress(),
            frame: ctl.frame_index().0,
            pin: ctl.state(),
            aux: ctl.aux_frame(),
        };
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}
