use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use prism_gpu::GpuRenderer;
use prism_renderer::{load_scene, render, Camera, NoProgress, Raster, Scene, Strategy};

/// Render a JSON scene description to a PNG.
#[derive(Parser, Debug)]
#[command(name = "prism", version)]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image path
    #[arg(short = 'o', long = "output", default_value = "render.png")]
    output: PathBuf,

    /// How pixels are scheduled
    #[arg(long, value_enum, default_value_t = StrategyArg::Parallel)]
    strategy: StrategyArg,

    /// Image height in pixels, overrides the scene
    #[arg(long)]
    height: Option<u32>,

    /// Anti-aliasing samples per pixel side, overrides the scene
    #[arg(long)]
    samples: Option<u32>,

    /// Reflection depth limit, overrides the scene
    #[arg(long)]
    depth: Option<u32>,

    /// Jitter seed, overrides the scene
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StrategyArg {
    Sequential,
    Parallel,
    Gpu,
}

impl Args {
    fn camera(&self, base: Camera) -> Camera {
        let mut camera = base;
        if let Some(height) = self.height {
            camera.height_px = height;
        }
        if let Some(samples) = self.samples {
            camera.samples_per_side = samples;
        }
        if let Some(depth) = self.depth {
            camera.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            camera.seed = seed;
        }
        camera
    }
}

fn render_with(strategy: StrategyArg, scene: &Scene, camera: &Camera) -> Result<Raster> {
    let raster = match strategy {
        StrategyArg::Sequential => render(scene, camera, Strategy::Sequential, &NoProgress)?,
        StrategyArg::Parallel => render(scene, camera, Strategy::Parallel, &NoProgress)?,
        StrategyArg::Gpu => {
            let gpu = GpuRenderer::new().context("GPU strategy requested but no device is usable")?;
            gpu.render(scene, camera, &NoProgress)?
        }
    };
    Ok(raster)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let (scene, camera_spec) =
        load_scene(&args.scene).with_context(|| format!("failed to load scene {}", args.scene.display()))?;
    let camera = args.camera(Camera::new().apply(&camera_spec));

    log::info!("Loaded {} ({:?} strategy)", args.scene.display(), args.strategy);

    let raster = render_with(args.strategy, &scene, &camera)?;
    raster
        .save_png(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!("Wrote {}", args.output.display());
    Ok(())
}
