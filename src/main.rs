//! Command-line relief globe generator
//!
//! Decodes a DEM image, triangulates the dual shell for a planetary body
//! preset (with optional per-field overrides), and writes binary STL.

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relief_globe::{save_stl, Body, HeightField, ShellBuilder, SphereParameters};

/// Relief globe generator command-line arguments.
///
/// CLI values override the chosen body preset.
#[derive(Parser, Debug)]
#[command(
    name = "relief_globe",
    about = "Generate 3D-printable relief globes from DEM images"
)]
struct Args {
    /// Input DEM image (grayscale equirectangular, PNG or JPEG)
    #[arg(short, long)]
    input: PathBuf,

    /// Planetary body preset (Mercury, Venus, Earth, Mars, Jupiter,
    /// Saturn, Uranus, Neptune, Moon, Pluto)
    #[arg(short, long, default_value = "Mars")]
    body: String,

    /// Directory the STL files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Write one combined outer+inner STL instead of two files
    #[arg(long)]
    combined: bool,

    /// Subdivision floor override
    #[arg(long)]
    min_depth: Option<u32>,

    /// Subdivision ceiling override
    #[arg(long)]
    max_depth: Option<u32>,

    /// Error tolerance override, in meters
    #[arg(long)]
    tolerance: Option<f64>,

    /// Elevation exaggeration override
    #[arg(long)]
    exaggeration: Option<f64>,

    /// Output scale override
    #[arg(long)]
    scale: Option<f64>,

    /// Inner shell scale ratio override
    #[arg(long)]
    inner_shell_scale: Option<f64>,
}

impl Args {
    /// Apply CLI overrides to a body preset.
    fn apply_overrides(&self, params: &mut SphereParameters) {
        if let Some(d) = self.min_depth {
            params.min_depth = d;
        }
        if let Some(d) = self.max_depth {
            params.max_depth = d;
        }
        if let Some(t) = self.tolerance {
            params.tolerance = t;
        }
        if let Some(e) = self.exaggeration {
            params.exaggeration = e;
        }
        if let Some(s) = self.scale {
            params.scale = s;
        }
        if let Some(r) = self.inner_shell_scale {
            params.inner_shell_scale = r;
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let body = Body::from_name(&args.body).ok_or_else(|| {
        let known: Vec<&str> = Body::ALL.iter().map(|b| b.name()).collect();
        format!(
            "unknown body {:?}; known bodies: {}",
            args.body,
            known.join(", ")
        )
    })?;

    let mut params = body.parameters();
    args.apply_overrides(&mut params);
    params.validate()?;

    info!(
        "{}: depths {}..={}, tolerance {} m, exaggeration {}, scale {}",
        body.name(),
        params.min_depth,
        params.max_depth,
        params.tolerance,
        params.exaggeration,
        params.scale
    );

    let start = Instant::now();
    let image = image::open(&args.input)?;
    let field = HeightField::from_image(&image, params.min_elevation, params.max_elevation)?;
    drop(image);
    info!(
        "decoded {} ({}x{}) in {:.2?}",
        args.input.display(),
        field.width(),
        field.height(),
        start.elapsed()
    );

    let start = Instant::now();
    let shells = ShellBuilder::new(&field, params).build()?;
    info!(
        "triangulated {} triangles in {:.2?}",
        shells.triangle_count(),
        start.elapsed()
    );

    let start = Instant::now();
    if args.combined {
        let path = args.output_dir.join(params.output_file_name(body.name(), None));
        save_stl(&path, &shells.combined())?;
        info!("wrote {} in {:.2?}", path.display(), start.elapsed());
    } else {
        let outer_path = args
            .output_dir
            .join(params.output_file_name(body.name(), Some("outer")));
        save_stl(&outer_path, &shells.outer)?;
        let inner_path = args
            .output_dir
            .join(params.output_file_name(body.name(), Some("inner")));
        save_stl(&inner_path, &shells.inner)?;
        info!(
            "wrote {} and {} in {:.2?}",
            outer_path.display(),
            inner_path.display(),
            start.elapsed()
        );
    }

    Ok(())
}
