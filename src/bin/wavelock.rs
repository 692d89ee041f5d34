use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wavelock", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default session config for a set of wav files.
    Init(InitArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// A directory to scan for `*.wav`, or the channel files in pane order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output config path. Defaults to `<master audio name>.json`, else `wavelock.json`,
    /// in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Audio track to mux into the video.
    #[arg(long)]
    master_audio: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Session config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Process channels on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker thread count (with `--parallel`).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Session config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let paths = match args.inputs.as_slice() {
        [dir] if dir.is_dir() => wavelock::discover_wav_paths(dir)?,
        files => files.to_vec(),
    };
    if paths.is_empty() {
        anyhow::bail!("no .wav files found");
    }
    let paths = paths
        .iter()
        .map(|p| {
            std::fs::canonicalize(p).with_context(|| format!("resolve '{}'", p.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_config_path(args.master_audio.as_deref()));
    let mut cfg = wavelock::SessionConfig::from_channel_paths(paths);
    cfg.master_audio = args
        .master_audio
        .map(|p| std::fs::canonicalize(&p).with_context(|| format!("resolve '{}'", p.display())))
        .transpose()?;
    cfg.save(&out)
        .with_context(|| format!("write config '{}'", out.display()))?;

    eprintln!("wrote {} ({} channels)", out.display(), cfg.channels.len());
    Ok(())
}

fn default_config_path(master_audio: Option<&Path>) -> PathBuf {
    master_audio
        .and_then(Path::file_stem)
        .map(|stem| {
            let mut name = stem.to_os_string();
            name.push(".json");
            PathBuf::from(name)
        })
        .unwrap_or_else(|| PathBuf::from("wavelock.json"))
}

/// Load a config and resolve relative audio paths against its directory.
fn read_config(path: &Path) -> anyhow::Result<wavelock::SessionConfig> {
    let mut cfg = wavelock::SessionConfig::load(path)
        .with_context(|| format!("load config '{}'", path.display()))?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    for ch in &mut cfg.channels {
        if ch.wav_path.is_relative() {
            ch.wav_path = root.join(&ch.wav_path);
        }
    }
    if let Some(audio) = cfg.master_audio.as_mut()
        && audio.is_relative()
    {
        *audio = root.join(&*audio);
    }
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.config)?;
    let session = wavelock::RenderSession::new(&cfg)?.with_threading(
        wavelock::RenderThreading {
            parallel: args.parallel,
            threads: args.threads,
        },
    )?;

    let mut sink = wavelock::FfmpegSink::new(wavelock::FfmpegSinkOpts::new(&args.out));
    let stats = session.render_to_sink(&mut sink, &wavelock::CancelToken::new())?;

    eprintln!(
        "wrote {} ({} frames)",
        args.out.display(),
        stats.frames_rendered
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.config)?;
    let mut session = wavelock::RenderSession::new(&cfg)?;
    let idx = wavelock::FrameIndex(args.frame);
    if !session.frames().contains(idx) {
        anyhow::bail!(
            "frame {} is outside the session (0..{})",
            args.frame,
            session.frames().end.0
        );
    }
    let frame = session.render_frame(idx)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
