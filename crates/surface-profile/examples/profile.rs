//! Example: surface-curve extraction on a single edge image.
//!
//! Loads an image, thresholds it into a binary foreground mask, reduces the
//! mask to a bottom-edge height profile, and writes the smoothed curve as a
//! CSV table (`X_pixels,Z_pixels`) next to the input. Extraction timing is
//! printed to stdout.
//!
//! Run from the workspace root:
//!   cargo run -p surface-profile --example profile -- --help
//!   cargo run -p surface-profile --example profile -- --input data/edge_0.png

use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::ImageReader;
use surface_profile::{Image, ProfileConfig, SegmentConfig, extract_profile, mask_gray, mask_rgb};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Per-channel inclusive RGB range (default yellow-orange bounds).
    Color,
    /// Strict minimum-intensity cutoff on the grayscale image.
    Intensity,
}

#[derive(Parser, Debug)]
#[command(about = "Extract a smoothed Z-X surface curve from one edge image")]
struct Args {
    /// Path to the input image
    #[arg(long)]
    input: String,

    /// Segmentation mode
    #[arg(long, value_enum, default_value = "color")]
    mode: Mode,

    /// Intensity cutoff for `--mode intensity` (foreground iff value > cutoff)
    #[arg(long, default_value_t = 0)]
    cutoff: u8,

    /// Requested smoothing window (shrinks adaptively on short profiles)
    #[arg(long, default_value_t = 31)]
    window: usize,

    /// Smoothing polynomial degree
    #[arg(long, default_value_t = 3)]
    degree: usize,

    /// Output CSV path (default: <input stem>_zx_curve.csv next to input)
    #[arg(long)]
    out: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let img_path = &args.input;
    let out_path = args.out.unwrap_or_else(|| {
        let p = std::path::Path::new(img_path);
        let stem = p.file_stem().unwrap_or_default().to_string_lossy();
        let dir = p.parent().unwrap_or(std::path::Path::new("."));
        dir.join(format!("{stem}_zx_curve.csv"))
            .to_string_lossy()
            .into_owned()
    });

    let decoded = ImageReader::open(img_path)
        .with_context(|| format!("opening {img_path}"))?
        .decode()
        .with_context(|| format!("decoding {img_path}"))?;

    let seg_cfg = SegmentConfig {
        intensity_cutoff: args.cutoff,
        ..SegmentConfig::default()
    };

    let mask = match args.mode {
        Mode::Color => {
            let rgb = decoded.to_rgb8();
            let (w, h) = rgb.dimensions();
            let pixels: Vec<[u8; 3]> = rgb
                .as_raw()
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect();
            let grid = Image::from_vec(w as usize, h as usize, pixels)
                .context("building RGB pixel grid")?;
            mask_rgb(&grid.as_view(), &seg_cfg)
        }
        Mode::Intensity => {
            let luma = decoded.to_luma8();
            let (w, h) = luma.dimensions();
            let grid = Image::from_vec(w as usize, h as usize, luma.into_raw())
                .context("building intensity pixel grid")?;
            mask_gray(&grid.as_view(), &seg_cfg)
        }
    };

    println!(
        "loaded {img_path}: {}x{}, smoothing window {} degree {}",
        mask.width(),
        mask.height(),
        args.window,
        args.degree
    );

    let cfg = ProfileConfig {
        smooth_window: args.window,
        poly_degree: args.degree,
        ..ProfileConfig::default()
    };

    let t0 = Instant::now();
    let profile = extract_profile(&mask.as_view(), &cfg)
        .with_context(|| format!("extracting profile from {img_path}"))?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    let z_max = profile.z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    println!(
        "extracted {} samples in {elapsed_ms:.2} ms (peak height {z_max:.1} px)",
        profile.len()
    );

    let mut out_file = std::fs::File::create(&out_path)
        .with_context(|| format!("creating {out_path}"))?;
    writeln!(out_file, "X_pixels,Z_pixels").context("writing CSV header")?;
    for (x, z) in profile.iter() {
        writeln!(out_file, "{x},{z}").context("writing CSV row")?;
    }

    println!("curve written to {out_path}");
    Ok(())
}
