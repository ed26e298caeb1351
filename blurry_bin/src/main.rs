use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use blurry::{BlurConfig, BlurPipeline, Color, PixelBuffer};
use clap::Parser;
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

/// Blur images with a fast stack blur.
///
/// With a single input, OUTPUT is the output file. With several inputs,
/// OUTPUT is a directory and each result keeps its input's file name.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Images to blur
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file, or output directory when several inputs are given
    #[arg(short, long)]
    output: PathBuf,

    /// Blur radius in pixels of the downsampled image
    #[arg(short, long, default_value_t = BlurConfig::DEFAULT_RADIUS)]
    radius: i32,

    /// Downscale factor applied before blurring
    #[arg(short, long, default_value_t = BlurConfig::DEFAULT_SAMPLING)]
    sampling: u32,

    /// Tint composited over the image, as #RRGGBB or #RRGGBBAA
    #[arg(short, long, value_parser = parse_color)]
    tint: Option<Color>,

    /// Output width (defaults to the input width)
    #[arg(long)]
    width: Option<u32>,

    /// Output height (defaults to the input height)
    #[arg(long)]
    height: Option<u32>,

    /// Try the libblur backend first, falling back to stack blur
    #[cfg(feature = "libblur")]
    #[arg(long)]
    libblur: bool,

    /// Log every pipeline stage
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    if cli.inputs.len() == 1 {
        return blur_file(&cli, &cli.inputs[0], &cli.output);
    }

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;

    let progress = ProgressBar::new(cli.inputs.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    for input in &cli.inputs {
        let Some(name) = input.file_name() else {
            bail!("{} has no file name", input.display());
        };
        progress.set_message(name.to_string_lossy().into_owned());
        blur_file(&cli, input, &cli.output.join(name))?;
        progress.inc(1);
    }
    progress.finish_with_message("done");

    Ok(())
}

fn blur_file(cli: &Cli, input: &Path, output: &Path) -> Result<()> {
    let image = image::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    let source = PixelBuffer::from_raw(width, height, image.into_raw())?;

    let mut config = BlurConfig::new(cli.width.unwrap_or(width), cli.height.unwrap_or(height))
        .with_radius(cli.radius)
        .with_sampling(cli.sampling);
    if let Some(tint) = cli.tint {
        config = config.with_tint(tint);
    }
    debug!(?config, input = %input.display(), "blurring");

    let pipeline = BlurPipeline::new(config);
    #[cfg(feature = "libblur")]
    let pipeline = if cli.libblur {
        pipeline.with_provider(&blurry::LibBlurProvider)
    } else {
        pipeline
    };
    let blurred = pipeline
        .run(&source)
        .with_context(|| format!("Failed to blur {}", input.display()))?;

    let (out_width, out_height) = (blurred.width(), blurred.height());
    let Some(out) = RgbaImage::from_raw(out_width, out_height, blurred.into_raw()) else {
        bail!("Blurred buffer does not fill a {out_width}x{out_height} image");
    };
    out.save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(output = %output.display(), width = out_width, height = out_height, "saved");

    Ok(())
}

fn parse_color(s: &str) -> Result<Color> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    let value = u32::from_str_radix(hex, 16).with_context(|| format!("Invalid color {s:?}"))?;
    match hex.len() {
        6 => Ok(Color::from_argb(0xFF00_0000 | value)),
        8 => {
            let [r, g, b, a] = value.to_be_bytes();
            Ok(Color::rgba(r, g, b, a))
        }
        _ => bail!("Color {s:?} must be #RRGGBB or #RRGGBBAA"),
    }
}
