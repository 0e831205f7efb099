use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{Rgb, RgbImage};
use serde::Serialize;
use sp_core::Image;
use sp_profile::{Baseline, HeightProfile, ProfileConfig, extract_profile};
use sp_segment::{MaskCleanup, SegmentConfig, mask_gray, mask_rgb};
use tracing::{info, warn};

const PLOT_WIDTH: u32 = 1000;
const PLOT_HEIGHT: u32 = 400;
const DASH_LEN: u32 = 6;

#[derive(Parser, Debug)]
#[command(name = "sp_batch")]
#[command(about = "Extract smoothed Z-X surface curves from edge photographs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process every png/jpg/jpeg image in a directory.
    #[command(name = "dir")]
    Dir(DirArgs),
    /// Process a single image.
    #[command(name = "image")]
    Image(ImageArgs),
}

#[derive(Args, Debug, Clone)]
struct DirArgs {
    /// Input directory containing the images.
    #[arg(long, required = true)]
    input: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
struct ImageArgs {
    /// Input image path.
    #[arg(long, required = true)]
    input: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Per-channel inclusive RGB range thresholding.
    Color,
    /// Strict minimum-intensity cutoff on the grayscale image.
    Intensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CleanupArg {
    None,
    Open,
    Close,
}

impl From<CleanupArg> for MaskCleanup {
    fn from(arg: CleanupArg) -> Self {
        match arg {
            CleanupArg::None => MaskCleanup::None,
            CleanupArg::Open => MaskCleanup::Open3x3,
            CleanupArg::Close => MaskCleanup::Close3x3,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Output directory (default: `output_results` beside the input).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Segmentation mode.
    #[arg(long, value_enum, default_value = "color")]
    mode: Mode,

    /// Inclusive RGB lower bound for color mode, as `r,g,b`.
    #[arg(long, default_value = "150,100,0", value_parser = parse_rgb)]
    color_low: [u8; 3],

    /// Inclusive RGB upper bound for color mode, as `r,g,b`.
    #[arg(long, default_value = "255,255,120", value_parser = parse_rgb)]
    color_high: [u8; 3],

    /// Intensity cutoff for intensity mode (foreground iff value > cutoff).
    #[arg(long, default_value_t = 0)]
    cutoff: u8,

    /// Mask cleanup applied after thresholding.
    #[arg(long, value_enum, default_value = "none")]
    cleanup: CleanupArg,

    /// Minimum usable edge-point count; images below the floor are skipped.
    #[arg(long, default_value_t = 10)]
    min_points: usize,

    /// Odd sliding-median window.
    #[arg(long, default_value_t = 5)]
    median_window: usize,

    /// Gradient magnitude above which a sample is rejected as a spike.
    #[arg(long, default_value_t = 100.0)]
    spike_threshold: f64,

    /// Requested smoothing window (shrinks adaptively on short profiles).
    #[arg(long, default_value_t = 31)]
    window: usize,

    /// Smoothing polynomial degree.
    #[arg(long, default_value_t = 3)]
    degree: usize,

    /// Measure heights from the image's last row instead of one row below it.
    #[arg(long, default_value_t = false)]
    baseline_bottom_row: bool,

    /// Explicit baseline row, overriding the computed baseline.
    #[arg(long)]
    baseline_row: Option<u32>,

    /// Plot x bounds, as `min:max` pixels.
    #[arg(long, default_value = "400:4000", value_parser = parse_range)]
    plot_x: (f64, f64),

    /// Plot z bounds, as `min:max` pixels.
    #[arg(long, default_value = "-10:1300", value_parser = parse_range)]
    plot_z: (f64, f64),
}

#[derive(Debug, Clone, Serialize)]
struct RunMeta {
    mode: &'static str,
    segmentation: SegmentConfig,
    profile: ProfileConfig,
    images: Vec<ImageOutcome>,
}

#[derive(Debug, Clone, Serialize)]
struct ImageOutcome {
    file: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Dir(args) => run_dir(args),
        Command::Image(args) => run_image(args),
    }
}

fn run_dir(args: DirArgs) -> Result<()> {
    if !args.input.is_dir() {
        bail!("input path is not a directory: {}", args.input.display());
    }

    let out_dir = output_dir(&args.input, &args.common)?;

    let mut files: Vec<PathBuf> = fs::read_dir(&args.input)
        .with_context(|| format!("reading directory {}", args.input.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_supported_image(p))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("no png/jpg/jpeg images found in {}", args.input.display());
    }
    info!("processing {} image(s) from {}", files.len(), args.input.display());

    let mut outcomes = Vec::with_capacity(files.len());
    for path in &files {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();

        match process_image(path, &out_dir, &args.common) {
            Ok(samples) => {
                info!("{name}: {samples} samples");
                outcomes.push(ImageOutcome {
                    file: name,
                    status: "ok",
                    reason: None,
                    samples: Some(samples),
                });
            }
            Err(err) => {
                warn!("skipping {name}: {err:#}");
                outcomes.push(ImageOutcome {
                    file: name,
                    status: "skipped",
                    reason: Some(format!("{err:#}")),
                    samples: None,
                });
            }
        }
    }

    let meta = RunMeta {
        mode: mode_name(args.common.mode),
        segmentation: segment_config(&args.common),
        profile: profile_config(&args.common),
        images: outcomes,
    };
    write_json(out_dir.join("run_meta.json"), &meta)?;

    info!("artifacts written to {}", out_dir.display());
    Ok(())
}

fn run_image(args: ImageArgs) -> Result<()> {
    let parent = args
        .input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let out_dir = output_dir(&parent, &args.common)?;

    let samples = process_image(&args.input, &out_dir, &args.common)?;
    info!(
        "{}: {samples} samples, artifacts in {}",
        args.input.display(),
        out_dir.display()
    );
    Ok(())
}

/// Runs the full pipeline for one image and writes its CSV + plot artifacts.
/// Nothing is written unless extraction succeeds.
fn process_image(path: &Path, out_dir: &Path, args: &CommonArgs) -> Result<usize> {
    let seg_cfg = segment_config(args);
    let mask = load_mask(path, args.mode, &seg_cfg)?;

    let cfg = profile_config(args);
    let profile = extract_profile(&mask.as_view(), &cfg)
        .with_context(|| format!("extracting profile from {}", path.display()))?;

    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    write_profile_csv(&out_dir.join(format!("{stem}_zx_curve.csv")), &profile)?;

    let plot = render_curve(&profile, args.plot_x, args.plot_z);
    let png_path = out_dir.join(format!("{stem}_zx_curve.png"));
    plot.save(&png_path)
        .with_context(|| format!("saving plot {}", png_path.display()))?;

    Ok(profile.len())
}

fn output_dir(base: &Path, args: &CommonArgs) -> Result<PathBuf> {
    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| base.join("output_results"));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    Ok(out_dir)
}

fn segment_config(args: &CommonArgs) -> SegmentConfig {
    SegmentConfig {
        color_low: args.color_low,
        color_high: args.color_high,
        intensity_cutoff: args.cutoff,
        cleanup: args.cleanup.into(),
    }
}

fn profile_config(args: &CommonArgs) -> ProfileConfig {
    let baseline = match (args.baseline_row, args.baseline_bottom_row) {
        (Some(row), _) => Baseline::Row(row),
        (None, true) => Baseline::BottomRow,
        (None, false) => Baseline::ImageHeight,
    };

    ProfileConfig {
        min_points: args.min_points,
        median_window: args.median_window,
        spike_threshold: args.spike_threshold,
        smooth_window: args.window,
        poly_degree: args.degree,
        baseline,
    }
}

fn load_mask(path: &Path, mode: Mode, seg: &SegmentConfig) -> Result<Image<u8>> {
    let decoded =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;

    match mode {
        Mode::Color => {
            let rgb = decoded.to_rgb8();
            let (w, h) = rgb.dimensions();
            let pixels: Vec<[u8; 3]> = rgb
                .as_raw()
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect();
            let grid = Image::from_vec(w as usize, h as usize, pixels)
                .with_context(|| format!("building RGB grid from {}", path.display()))?;
            Ok(mask_rgb(&grid.as_view(), seg))
        }
        Mode::Intensity => {
            let luma = decoded.to_luma8();
            let (w, h) = luma.dimensions();
            let grid = Image::from_vec(w as usize, h as usize, luma.into_raw())
                .with_context(|| format!("building intensity grid from {}", path.display()))?;
            Ok(mask_gray(&grid.as_view(), seg))
        }
    }
}

fn is_supported_image(path: &Path) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = ext.to_string_lossy().to_ascii_lowercase();
    matches!(ext.as_str(), "png" | "jpg" | "jpeg")
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Color => "color",
        Mode::Intensity => "intensity",
    }
}

fn write_profile_csv(path: &Path, profile: &HeightProfile) -> Result<()> {
    let mut file =
        fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "X_pixels,Z_pixels").context("writing csv header")?;
    for (x, z) in profile.iter() {
        writeln!(file, "{x},{z}").context("writing csv row")?;
    }
    Ok(())
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

/// Draws the smoothed curve in red over a white canvas with a gray dashed
/// z = 0 baseline, using fixed display bounds.
fn render_curve(profile: &HeightProfile, x_bounds: (f64, f64), z_bounds: (f64, f64)) -> RgbImage {
    let mut img = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, Rgb([255, 255, 255]));

    if let Some(y0) = map_y(0.0, z_bounds) {
        for x in 0..PLOT_WIDTH {
            if (x / DASH_LEN) % 2 == 0 {
                img.put_pixel(x, y0, Rgb([128, 128, 128]));
            }
        }
    }

    let points: Vec<(f64, f64)> = profile.iter().map(|(x, z)| (x as f64, z)).collect();
    for pair in points.windows(2) {
        let a = plot_coords(pair[0], x_bounds, z_bounds);
        let b = plot_coords(pair[1], x_bounds, z_bounds);
        draw_segment(&mut img, a, b, Rgb([220, 30, 30]));
    }

    img
}

/// Maps data coordinates to plot-pixel coordinates. Off-canvas positions are
/// returned as-is and clipped by the bounds-checked dot drawing.
fn plot_coords(p: (f64, f64), x_bounds: (f64, f64), z_bounds: (f64, f64)) -> (f64, f64) {
    let (x_min, x_max) = x_bounds;
    let (z_min, z_max) = z_bounds;
    let px = (p.0 - x_min) / (x_max - x_min) * f64::from(PLOT_WIDTH - 1);
    let py = f64::from(PLOT_HEIGHT - 1) - (p.1 - z_min) / (z_max - z_min) * f64::from(PLOT_HEIGHT - 1);
    (px, py)
}

fn map_y(z: f64, z_bounds: (f64, f64)) -> Option<u32> {
    let (z_min, z_max) = z_bounds;
    let py = f64::from(PLOT_HEIGHT - 1) - (z - z_min) / (z_max - z_min) * f64::from(PLOT_HEIGHT - 1);
    (py >= 0.0 && py <= f64::from(PLOT_HEIGHT - 1)).then(|| py.round() as u32)
}

fn draw_segment(img: &mut RgbImage, a: (f64, f64), b: (f64, f64), color: Rgb<u8>) {
    let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil() as usize + 1;
    for s in 0..=steps {
        let t = s as f64 / steps as f64;
        let x = a.0 + t * (b.0 - a.0);
        let y = a.1 + t * (b.1 - a.1);
        draw_dot(img, x, y, color);
    }
}

fn draw_dot(img: &mut RgbImage, x: f64, y: f64, color: Rgb<u8>) {
    let xi = x.round() as i64;
    let yi = y.round() as i64;
    if xi < 0 || yi < 0 {
        return;
    }
    let (ux, uy) = (xi as u32, yi as u32);
    if ux >= img.width() || uy >= img.height() {
        return;
    }
    img.put_pixel(ux, uy, color);
}

fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err("expected three comma-separated channel values `r,g,b`".to_string());
    }

    let mut out = [0u8; 3];
    for (dst, part) in out.iter_mut().zip(&parts) {
        *dst = part
            .trim()
            .parse()
            .map_err(|e| format!("bad channel value '{}': {e}", part.trim()))?;
    }
    Ok(out)
}

fn parse_range(s: &str) -> Result<(f64, f64), String> {
    let (lo, hi) = s
        .split_once(':')
        .ok_or_else(|| "expected `min:max`".to_string())?;
    let lo: f64 = lo
        .trim()
        .parse()
        .map_err(|e| format!("bad lower bound: {e}"))?;
    let hi: f64 = hi
        .trim()
        .parse()
        .map_err(|e| format!("bad upper bound: {e}"))?;
    if lo >= hi {
        return Err(format!("lower bound {lo} must be below upper bound {hi}"));
    }
    Ok((lo, hi))
}
