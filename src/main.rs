//! fixraster: render a test scene through fixed-point triangle records
//!
//! Usage:
//!   fixraster [--out frame.png] [--width 640] [--height 480] [--bands N]
//!             [--triangles 24] [--seed 7] [--texture path/to/image.png]
//!
//! Set `RUST_LOG=fixraster=trace` to see why triangles are rejected.
//!
//! Every triangle is set up once. Each band of the screen is then rendered on
//! its own thread from records restricted to that band with `calc_line_increment`.

use anyhow::{Context, Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use fixraster::rectangle::{compute_band_count, split_into_bands};
use fixraster::screen::ScreenSpace;
use fixraster::texture::Texture;
use fixraster::{
    Color, CullMode, RasterizedTriangle, Rasterizer, RejectReason, Vec2, Vec3, Vec4, calc_line_increment,
};

struct Options {
    out_path: PathBuf,
    width: u16,
    height: u16,
    bands: Option<u32>,
    triangles: usize,
    seed: u64,
    texture: Option<PathBuf>,
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        out_path: PathBuf::from("frame.png"),
        width: 640,
        height: 480,
        bands: None,
        triangles: 24,
        seed: 7,
        texture: None,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = || args.next().with_context(|| format!("Missing {arg} argument"));
        match arg.as_str() {
            "--out" => options.out_path = PathBuf::from(value()?),
            "--width" => options.width = value()?.parse().context("Invalid --width")?,
            "--height" => options.height = value()?.parse().context("Invalid --height")?,
            "--bands" => options.bands = Some(value()?.parse().context("Invalid --bands")?),
            "--triangles" => options.triangles = value()?.parse().context("Invalid --triangles")?,
            "--seed" => options.seed = value()?.parse().context("Invalid --seed")?,
            "--texture" => options.texture = Some(PathBuf::from(value()?)),
            other => bail!("Unknown argument: {other}"),
        }
    }
    if options.width == 0 || options.height == 0 {
        bail!("--width and --height must be positive");
    }
    Ok(options)
}

/// One triangle as the transform stage would hand it over.
struct SceneTriangle {
    verts: [Vec4; 3],
    sts: [Vec2; 3],
    rasterizer: Rasterizer,
}

/// View space (x right, y up, z forward) to window coordinates, keeping w = z.
fn project(view: Vec3, focal: f32, width: f32, height: f32) -> Vec4 {
    let w = view.z;
    let x = view.x * focal / w * (height * 0.5) + width * 0.5;
    let y = -view.y * focal / w * (height * 0.5) + height * 0.5;
    Vec4::new(x, y, 0.0, w)
}

/// A textured floor seen in perspective, split into tiles.
fn floor_triangles(base: Rasterizer, width: f32, height: f32) -> Vec<SceneTriangle> {
    const TILES: usize = 12;
    const FOCAL: f32 = 1.5;
    let (min_x, max_x) = (-4.0, 4.0);
    let (near, far) = (1.5, 12.0);

    let corner = |i: usize, j: usize| -> (Vec4, Vec2) {
        let fx = i as f32 / TILES as f32;
        let fz = j as f32 / TILES as f32;
        let view = Vec3::new(min_x + (max_x - min_x) * fx, -1.0, near + (far - near) * fz);
        (project(view, FOCAL, width, height), Vec2::new(fx * 4.0, fz * 4.0))
    };

    let mut triangles = Vec::with_capacity(TILES * TILES * 2);
    for j in 0..TILES {
        for i in 0..TILES {
            let (p00, t00) = corner(i, j);
            let (p10, t10) = corner(i + 1, j);
            let (p11, t11) = corner(i + 1, j + 1);
            let (p01, t01) = corner(i, j + 1);
            // Counter-clockwise on screen (positive area)
            triangles.push(SceneTriangle { verts: [p00, p11, p10], sts: [t00, t11, t10], rasterizer: base });
            triangles.push(SceneTriangle { verts: [p00, p01, p11], sts: [t00, t01, t11], rasterizer: base });
        }
    }
    triangles
}

/// Flat colored triangles floating above the floor, in random winding.
fn random_triangles(base: Rasterizer, count: usize, seed: u64, width: f32, height: f32) -> Vec<SceneTriangle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let untextured = base.with_texturing(false).with_cull_mode(CullMode::None);
    (0..count)
        .map(|_| {
            let cx = rng.gen_range(0.0..width);
            let cy = rng.gen_range(0.0..height * 0.6);
            let radius = rng.gen_range(8.0..60.0);
            let w = rng.gen_range(1.0..3.0);
            let verts = [0, 1, 2].map(|_| {
                Vec4::new(
                    cx + rng.gen_range(-radius..radius),
                    cy + rng.gen_range(-radius..radius),
                    0.0,
                    w,
                )
            });
            let color = Color::new(
                rng.gen_range(64..=255),
                rng.gen_range(64..=255),
                rng.gen_range(64..=255),
            );
            SceneTriangle { verts, sts: [Vec2::ZERO; 3], rasterizer: untextured.with_static_color(color) }
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    println!("fixraster v{}", fixraster::VERSION);
    let options = parse_args()?;

    let cores = num_cpus::get();
    println!("Number of logical CPU cores: {}", cores);

    let width = options.width as u32;
    let height = options.height as u32;
    let band_count = options.bands.unwrap_or_else(|| compute_band_count(cores, height));
    let bands = split_into_bands(width, height, band_count);
    println!("Rendering {}x{} in {} bands", width, height, bands.len());

    let texture = match &options.texture {
        Some(path) => Texture::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => Texture::checkerboard(64, 8, Color::new(230, 230, 210), Color::new(60, 90, 140)),
    };

    let base = Rasterizer::new(options.width, options.height);
    let mut scene = floor_triangles(base, width as f32, height as f32);
    scene.extend(random_triangles(base, options.triangles, options.seed, width as f32, height as f32));

    // Triangle setup, once per triangle
    let setup_start = Instant::now();
    let results: Vec<Result<RasterizedTriangle, RejectReason>> = scene
        .par_iter()
        .map(|tri| {
            let [v0, v1, v2] = &tri.verts;
            let [st0, st1, st2] = &tri.sts;
            tri.rasterizer.rasterize(v0, st0, v1, st1, v2, st2)
        })
        .collect();
    let setup_time = setup_start.elapsed();

    let mut records = Vec::with_capacity(results.len());
    let mut rejected: BTreeMap<String, usize> = BTreeMap::new();
    for result in results {
        match result {
            Ok(record) => records.push(record),
            Err(reason) => *rejected.entry(reason.to_string()).or_default() += 1,
        }
    }
    println!("Set up {} triangles, rejected {}", records.len(), scene.len() - records.len());
    for (reason, count) in &rejected {
        println!("  {count:>5}  {reason}");
    }

    // Bands, each from records restricted to its lines
    let band_start = Instant::now();
    let rendered: Vec<ScreenSpace> = bands
        .par_iter()
        .map(|band| {
            let mut band_screen = ScreenSpace::for_rect(*band);
            band_screen.clear(Color::new(20, 20, 28));
            for record in &records {
                if let Ok(part) = calc_line_increment(record, band.min_y as u16, band.max_y as u16) {
                    band_screen.draw_triangle(&part, Some(&texture));
                }
            }
            band_screen
        })
        .collect();
    let band_time = band_start.elapsed();

    let merge_start = Instant::now();
    let mut screen = ScreenSpace::new(width, height);
    for band_screen in &rendered {
        screen.copy_from_band(band_screen);
    }
    let merge_time = merge_start.elapsed();

    screen.save_png(&options.out_path)?;
    println!(
        "Setup time: {:.2?}\nBand time: {:.2?}\nMerge time: {:.2?}",
        setup_time, band_time, merge_time
    );
    println!("Successfully saved {}", options.out_path.display());
    Ok(())
}
