//! worktex - working texture pipeline CLI
//!
//! Drives the buffer cache end to end: load, inspect, resample and pack
//! textures through copy-on-write handles.

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "worktex")]
#[command(author, version, about = "Working texture pipeline CLI")]
#[command(long_about = "
Loads images into a shared, copy-on-write buffer cache and runs simple
texture pipeline steps on them.

Examples:
  worktex info albedo.png normal.tga        # Show texture info
  worktex resize albedo.png -w 256 -o small.png
  worktex resize albedo.png -w 512 -H 512 --fit -o thumb.png
  worktex resize decal.png --scale 0.5 --alpha-weighted -o half.png
  worktex atlas 'icons/*.png' -o atlas.png --columns 8 --cell-width 32 --cell-height 32
  worktex sample albedo.png 0.5 0.5         # Bilinear sample at (u, v)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Display texture information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Resize a texture with bilinear resampling
    #[command(visible_alias = "r")]
    Resize(ResizeArgs),

    /// Pack textures into a grid atlas
    Atlas(AtlasArgs),

    /// Print a bilinear sample at normalized coordinates
    Sample(SampleArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,
}

#[derive(Args)]
struct ResizeArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Target width
    #[arg(short, long)]
    width: Option<u32>,

    /// Target height
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Scale factor (alternative to width/height)
    #[arg(short, long)]
    scale: Option<f32>,

    /// Fit inside width x height, keeping the aspect ratio
    #[arg(long)]
    fit: bool,

    /// Weight colors by alpha while resampling
    #[arg(long)]
    alpha_weighted: bool,
}

#[derive(Args)]
struct AtlasArgs {
    /// Input images or glob patterns
    #[arg(required = true)]
    input: Vec<String>,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Cells per row
    #[arg(short, long, default_value = "4")]
    columns: u32,

    /// Cell width (default: first input's width)
    #[arg(long)]
    cell_width: Option<u32>,

    /// Cell height (default: first input's height)
    #[arg(long)]
    cell_height: Option<u32>,
}

#[derive(Args)]
struct SampleArgs {
    /// Input image
    input: PathBuf,

    /// Horizontal coordinate in [0, 1]
    u: f32,

    /// Vertical coordinate in [0, 1]
    v: f32,

    /// Weight colors by alpha
    #[arg(long)]
    alpha_weighted: bool,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Resize(args) => commands::resize::run(args, cli.verbose),
        Commands::Atlas(args) => commands::atlas::run(args, cli.verbose),
        Commands::Sample(args) => commands::sample::run(args, cli.verbose),
    }
}
