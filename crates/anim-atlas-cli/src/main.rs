use std::fs;
use std::path::{Path, PathBuf};

use anim_atlas_core::prelude::*;
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use serde::Deserialize;
use tracing::info;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "anim-atlas",
    about = "Merge a folder of animation frames into one atlas image",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Composite the frames into an atlas and save it
    Pack(PackArgs),
    /// Layout-only: print the grid plan and placements as JSON (no compositing)
    Plan(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Directory containing the source frames
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.png/.json)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// Container for the composite: png | tga
    #[arg(long, default_value = "png", value_parser = ["png", "tga"], help_heading = "Input/Output")]
    format: String,
    /// Descend into subdirectories
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    recursive: bool,
    /// YAML config file path (overrides layout/compositing options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Atlas edge length in pixels (the canvas is square)
    #[arg(long, default_value_t = 512, help_heading = "Layout")]
    size: u32,

    // Compositing
    /// Resampling filter: nearest | bilinear | catmullrom | lanczos3
    #[arg(long, default_value = "bilinear", help_heading = "Compositing")]
    filter: String,
    /// Canvas background and mask key color, "R,G,B"
    #[arg(long, default_value = "0,0,0", help_heading = "Compositing")]
    background: String,
    /// Per-channel tolerance for background matching in synthesized masks
    #[arg(long, default_value_t = 0, help_heading = "Compositing")]
    background_tolerance: u8,
    /// Prepare frames on worker threads (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Compositing")]
    parallel: bool,

    // Export
    /// Metadata format: none | json (writes a frame map next to the image)
    #[arg(long, default_value = "none", value_parser = ["none", "json"], help_heading = "Export")]
    metadata: String,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: composite and report stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Plan(args) => run_plan(args, cli.progress && !cli.quiet),
    }
}

fn build_config(cli: &PackArgs) -> anyhow::Result<AtlasConfig> {
    let filter: ResizeFilter = cli
        .filter
        .parse()
        .ok()
        .with_context(|| format!("unknown resize filter: {}", cli.filter))?;
    let background = parse_background(&cli.background)?;

    let mut cfg = AtlasConfig::builder()
        .atlas_size(cli.size)
        .background(background)
        .background_tolerance(cli.background_tolerance)
        .filter(filter)
        .parallel(cli.parallel)
        .build();

    // Config file sets compositing options en bloc
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        cfg = y.into_atlas_config(cfg);
    }
    Ok(cfg)
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude, cli.recursive)?;
    let images = load_images_with_progress(&paths, show_progress)?;
    info!(count = images.len(), "loaded input frames");

    let sources = SourceSet::from_images(images)
        .with_context(|| format!("no usable frames in {}", cli.input.display()))?;
    let out = build_atlas(sources, &cfg)?;

    info!(
        frames = out.frames.len(),
        columns = out.plan.columns,
        rows = out.plan.rows,
        alpha = out.alpha.is_some(),
        "atlas composited"
    );

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
        let image_path = cli.out_dir.join(format!("{}.{}", cli.name, cli.format));
        save_atlas(&out, &image_path)?;
        info!(?image_path, "atlas written");

        if cli.metadata == "json" {
            let json_path = cli.out_dir.join(format!("{}.json", cli.name));
            let json = serde_json::to_string_pretty(&to_json_array(&out))?;
            fs::write(&json_path, json)
                .with_context(|| format!("write {}", json_path.display()))?;
            info!(?json_path, "frame map written");
        }
    }
    Ok(())
}

fn run_plan(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude, cli.recursive)?;
    let images = load_images_with_progress(&paths, show_progress)?;
    let sources = SourceSet::from_images(images)
        .with_context(|| format!("no usable frames in {}", cli.input.display()))?;

    let plan = plan_grid(cfg.atlas_size, sources.len(), sources.sample().aspect_ratio())?;
    let alpha = needs_alpha(&sources);
    let placements: Vec<FramePlacement> = (0..sources.len()).map(|i| plan.placement(i)).collect();
    let value = serde_json::json!({
        "plan": plan,
        "needs_alpha": alpha,
        "placements": placements,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn parse_background(s: &str) -> anyhow::Result<[u8; 3]> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    anyhow::ensure!(parts.len() == 3, "background must be \"R,G,B\", got {s:?}");
    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .with_context(|| format!("bad background channel {part:?}"))?;
    }
    Ok(rgb)
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
    recursive: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let depth = if recursive { usize::MAX } else { 1 };
    let mut list: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(path)
        .max_depth(depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let p = entry.path();
        if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_supported(p) {
            list.push(p.to_path_buf());
        }
    }
    // Discovery order determines grid position; sort so runs are
    // deterministic across platforms.
    list.sort();
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_supported(p: &Path) -> bool {
    FormatTag::from_path(p).is_some()
}

fn load_images_with_progress(
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<SourceImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
            )
            .unwrap(),
        );
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        // One corrupt frame aborts the run; a partial atlas is never valid.
        list.push(SourceImage::from_path(p)?);
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    atlas_size: Option<u32>,
    background: Option<[u8; 3]>,
    background_tolerance: Option<u8>,
    filter: Option<String>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_atlas_config(self, mut cfg: AtlasConfig) -> AtlasConfig {
        if let Some(v) = self.atlas_size {
            cfg.atlas_size = v;
        }
        if let Some(v) = self.background {
            cfg.background = v;
        }
        if let Some(v) = self.background_tolerance {
            cfg.background_tolerance = v;
        }
        if let Some(v) = self.filter {
            cfg.filter = v.parse().unwrap_or(cfg.filter);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        cfg
    }
}
