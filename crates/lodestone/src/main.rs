//! # Lodestone Preview
//!
//! Generates a square of chunks around a center and reports what came out.
//!
//! ```bash
//! # 5 x 5 chunks around the origin, with a top-down map
//! lodestone-preview --seed 12345 --radius 2 --map
//!
//! # Hell, more logging
//! RUST_LOG=lodestone_procedural=debug lodestone-preview --dimension hell
//!
//! # Layer a TOML file over the preset
//! lodestone-preview --config crates/lodestone/configs/shallow_seas.toml --map
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use lodestone_procedural::{
    default_biome_source, BlockVolume, CarveStats, ChunkCoord, Dimension, GenerationResult, GeneratorConfig,
    GeneratorPool, Material, MaterialCounts, WorldSeed, CHUNK_SIZE,
};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "lodestone-preview", about = "Generate a square of chunks and summarize the terrain")]
struct Args {
    /// World seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// TOML config layered over the dimension preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preset to use when no config file is given.
    #[arg(long, value_enum)]
    dimension: Option<DimensionArg>,

    /// Center chunk X.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    center_x: i32,

    /// Center chunk Z.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    center_z: i32,

    /// Chunks on each side of the center.
    #[arg(long, default_value_t = 2)]
    radius: u16,

    /// Worker threads (defaults to available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Print a top-down map of the generated area.
    #[arg(long)]
    map: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DimensionArg {
    Overworld,
    Hell,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Overworld => Self::Overworld,
            DimensionArg::Hell => Self::Hell,
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise info.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(env_filter).with(fmt::layer()).init();
}

fn run(args: &Args) -> GenerationResult<()> {
    let config = load_config(args)?;
    let seed = WorldSeed::new(args.seed);
    let workers = args
        .workers
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, usize::from));

    let radius = i32::from(args.radius);
    let coords: Vec<ChunkCoord> = (-radius..=radius)
        .flat_map(|dz| (-radius..=radius).map(move |dx| ChunkCoord::new(args.center_x + dx, args.center_z + dz)))
        .collect();

    info!(
        "Generating {} chunks around [{}, {}] ({:?}, seed {}, {workers} workers)",
        coords.len(),
        args.center_x,
        args.center_z,
        config.dimension,
        args.seed
    );

    let biomes = default_biome_source(seed, config.dimension);
    let mut pool = GeneratorPool::new(seed, &config, &biomes, workers)?;

    let started = Instant::now();
    let outputs = pool.generate_all(coords.iter().copied())?;
    let elapsed = started.elapsed();

    let mut summary = Summary::default();
    let mut volumes = Vec::with_capacity(outputs.len());
    for output in outputs {
        let (volume, stats) = output.result?;
        summary.add(&stats.counts, &stats.carve);
        volumes.push(volume);
    }

    info!(
        "Done in {:.1} ms ({:.2} ms/chunk)",
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1000.0 / coords.len() as f64
    );
    info!(
        "Blocks: {} solid, {} liquid, {} air",
        summary.counts.solid, summary.counts.liquid, summary.counts.air
    );
    info!(
        "Carving: {} origins, {} segments, {} branches, {} liquid skips, {} voxels cut",
        summary.carve.origins,
        summary.carve.segments,
        summary.carve.branches,
        summary.carve.liquid_skips,
        summary.carve.carved
    );

    if args.map {
        volumes.sort_by_key(|volume| (volume.coord().z, volume.coord().x));
        let scan_from = map_scan_height(&config);
        print_map(&volumes, args.radius, scan_from);
    }

    Ok(())
}

fn load_config(args: &Args) -> GenerationResult<GeneratorConfig> {
    match (&args.config, args.dimension) {
        (Some(path), dimension) => {
            if dimension.is_some() {
                warn!("--dimension is ignored when --config is given; set `dimension` in the file");
            }
            info!("Loading config from {}", path.display());
            GeneratorConfig::from_toml_file(path)
        }
        (None, dimension) => Ok(GeneratorConfig::for_dimension(dimension.map_or(Dimension::Overworld, Dimension::from))),
    }
}

#[derive(Default)]
struct Summary {
    counts: MaterialCounts,
    carve: CarveStats,
}

impl Summary {
    fn add(&mut self, counts: &MaterialCounts, carve: &CarveStats) {
        self.counts.air += counts.air;
        self.counts.liquid += counts.liquid;
        self.counts.solid += counts.solid;
        self.carve.merge(carve);
    }
}

/// Hell has a roof, so its map looks down from just above the lava sea.
fn map_scan_height(config: &GeneratorConfig) -> usize {
    match config.dimension {
        Dimension::Overworld => config.world_height as usize - 1,
        Dimension::Hell => (config.liquid_level as usize + 16).min(config.world_height as usize - 1),
    }
}

fn print_map(volumes: &[BlockVolume], radius: u16, scan_from: usize) {
    let side = usize::from(radius) * 2 + 1;
    let mut out = String::with_capacity(side * CHUNK_SIZE * (side * CHUNK_SIZE + 1));

    for row in volumes.chunks(side) {
        for z in 0..CHUNK_SIZE {
            for volume in row {
                for x in 0..CHUNK_SIZE {
                    out.push(glyph(topmost(volume, x, z, scan_from)));
                }
            }
            out.push('\n');
        }
    }

    println!("{out}");
    println!("~ water  % lava  \" grass  # dirt  . sand  : gravel  ^ stone  _ ice  n netherrack  s soul sand  = bedrock");
}

fn topmost(volume: &BlockVolume, x: usize, z: usize, scan_from: usize) -> Material {
    let column = volume.column(x, z);
    let top = scan_from.min(column.len().saturating_sub(1));
    column[..=top]
        .iter()
        .rev()
        .copied()
        .find(|material| !material.is_air())
        .unwrap_or(Material::Air)
}

const fn glyph(material: Material) -> char {
    match material {
        Material::Air => ' ',
        Material::Water => '~',
        Material::Lava => '%',
        Material::Grass => '"',
        Material::Dirt => '#',
        Material::Sand => '.',
        Material::Gravel => ':',
        Material::Stone => '^',
        Material::Ice => '_',
        Material::Netherrack => 'n',
        Material::SoulSand => 's',
        Material::Bedrock => '=',
    }
}
