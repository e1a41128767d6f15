use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "storyreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve assets and print the timeline as JSON.
    Plan(PlanArgs),
    /// Render a single preview frame as a PNG.
    Frame(FrameArgs),
    /// Render the final MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Project manifest JSON.
    #[arg(long)]
    project: PathBuf,

    /// Render config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the subtitles as SRT.
    #[arg(long)]
    srt: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Project manifest JSON.
    #[arg(long)]
    project: PathBuf,

    /// Timeline position in seconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Render config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Project manifest JSON.
    #[arg(long)]
    project: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Render config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_engine(config: Option<&Path>) -> anyhow::Result<storyreel::Engine> {
    let cfg = match config {
        Some(path) => storyreel::RenderConfig::from_json_file(path)?,
        None => storyreel::RenderConfig::default(),
    };
    Ok(storyreel::Engine::new(cfg)?)
}

fn load_project(path: &Path) -> anyhow::Result<storyreel::ProjectManifest> {
    storyreel::ProjectManifest::load(path)
        .with_context(|| format!("load project '{}'", path.display()))
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let engine = load_engine(args.config.as_deref())?;
    let project = load_project(&args.project)?;
    let plan = engine.plan(&project)?;

    if let Some(srt) = &args.srt {
        storyreel::encode::ensure_parent_dir(srt)?;
        std::fs::write(srt, plan.timeline.to_srt())
            .with_context(|| format!("write srt '{}'", srt.display()))?;
        eprintln!("wrote {}", srt.display());
    }

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let engine = load_engine(args.config.as_deref())?;
    let project = load_project(&args.project)?;
    let frame = engine.render_frame_at(&project, args.time)?;

    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let engine = load_engine(args.config.as_deref())?;
    let project = load_project(&args.project)?;
    let report = engine.render_to_file(&project, &args.out)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
