use std::error::Error;
use std::fs;

use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pcg_generator::ascii;
use pcg_generator::dungeon::generation::mst_connector;
use pcg_generator::dungeon::{
    generate_bsp_dungeon, generate_caves, generate_maze, generate_mst_dungeon, BspConfig,
    CaveConfig, CaveSimulator, MazeCarver, MazeConfig, MstConfig, RoomLayout,
};
use pcg_generator::explorer::run_explorer;
use pcg_generator::export;
use pcg_generator::heightmap::{generate_heightmap, TerrainConfig};
use pcg_generator::points::{distribute_points, Distribution, DistributionConfig};
use pcg_generator::seeds::{rng_from_seed, GeneratorSeeds};
use pcg_generator::tilemap::GridMap;
use pcg_generator::wave::{sample_wave, WaveConfig};

#[derive(Parser, Debug)]
#[command(name = "pcg_generator")]
#[command(about = "Generate dungeons, mazes, caves, point sets and terrain")]
struct Cli {
    /// Master seed (uses random seed if not specified)
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

/// Options every generator accepts
#[derive(Args, Debug)]
struct Common {
    /// JSON file with the generator's config record
    #[arg(short, long)]
    config: Option<String>,

    /// Width override (cells, or region units for points)
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height override (cells, or region units for points)
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Export a PNG image
    #[arg(long)]
    png: Option<String>,

    /// Pixels per cell in PNG exports
    #[arg(long, default_value = "8")]
    scale: u32,

    /// Export an ASCII report
    #[arg(long)]
    ascii: Option<String>,

    /// Export the result as JSON
    #[arg(long)]
    json: Option<String>,

    /// Print the grid with ANSI colors
    #[arg(long)]
    color: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// BSP rooms joined by L-shaped corridors
    Bsp {
        #[command(flatten)]
        common: Common,
    },
    /// Rooms joined along a minimum spanning tree
    Mst {
        #[command(flatten)]
        common: Common,
        #[arg(long, value_enum)]
        layout: Option<RoomLayout>,
        /// Step through the connection in a terminal viewer
        #[arg(long)]
        watch: bool,
    },
    /// Perfect maze carved depth-first
    Maze {
        #[command(flatten)]
        common: Common,
        /// Carve rooms over the finished maze
        #[arg(long)]
        rooms: bool,
        /// Also print the carve trail
        #[arg(long)]
        trail: bool,
        #[arg(long)]
        watch: bool,
    },
    /// Cellular automaton caves
    Caves {
        #[command(flatten)]
        common: Common,
        #[arg(long)]
        steps: Option<usize>,
        #[arg(long)]
        invert: bool,
        #[arg(long)]
        watch: bool,
    },
    /// Poisson disk or Halton point sets
    Points {
        #[command(flatten)]
        common: Common,
        #[arg(long, value_enum)]
        method: Option<Distribution>,
        #[arg(short = 'n', long)]
        count: Option<usize>,
        #[arg(long)]
        clustering: Option<f64>,
    },
    /// Fractal noise height field
    Terrain {
        #[command(flatten)]
        common: Common,
        /// Output resolution (2^n + 1)
        #[arg(short, long)]
        resolution: Option<usize>,
        /// Sample noise at this resolution and upsample bicubically
        #[arg(long)]
        noise_resolution: Option<usize>,
        /// Keep every Nth sample in ASCII output
        #[arg(long, default_value = "8")]
        stride: usize,
    },
    /// Noisy sine wave samples
    Wave {
        #[command(flatten)]
        common: Common,
        #[arg(short, long, default_value = "0")]
        time: f64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let seed = cli.seed.unwrap_or_else(rand::random);
    let seeds = GeneratorSeeds::from_master(seed);
    println!("Generating with seed: {}", seed);

    match cli.command {
        Command::Bsp { common } => {
            let mut config: BspConfig = load_config(&common)?;
            override_dims(&common, &mut config.map_width, &mut config.map_height);

            let dungeon = generate_bsp_dungeon(&config, &mut rng_from_seed(seeds.bsp))?;
            println!(
                "BSP dungeon {}x{}: {} rooms, {} corridors, depth {}",
                config.map_width,
                config.map_height,
                dungeon.rooms().len(),
                dungeon.corridors.len(),
                dungeon.tree.max_depth(),
            );
            write_grid_outputs(&dungeon.grid, "bsp", seed, &common)?;
            write_json(&common, &dungeon)?;
        }

        Command::Mst { common, layout, watch } => {
            let mut config: MstConfig = load_config(&common)?;
            override_dims(&common, &mut config.map_width, &mut config.map_height);
            if let Some(layout) = layout {
                config.layout = layout;
            }

            let mut rng = rng_from_seed(seeds.mst);
            let dungeon = if watch {
                run_explorer(mst_connector(&config, &mut rng)?, "mst")?
            } else {
                generate_mst_dungeon(&config, &mut rng)?
            };
            println!(
                "MST dungeon {}x{}: {} rooms, {} edges, total length {:.1}",
                config.map_width,
                config.map_height,
                dungeon.rooms.len(),
                dungeon.edges.len(),
                dungeon.total_weight(),
            );
            if let Some(path) = &common.png {
                export::export_mst(
                    &dungeon.grid,
                    &dungeon.rooms,
                    &dungeon.edges,
                    common.scale,
                    path,
                )?;
                println!("Exported MST overlay to {}", path);
            }
            if let Some(path) = &common.ascii {
                ascii::export_grid_file(&dungeon.grid, "mst", seed, path)?;
                println!("Exported ASCII report to {}", path);
            }
            if common.png.is_none() && common.ascii.is_none() && common.json.is_none() {
                print!("{}", ascii::render_rooms(&dungeon.grid, &dungeon.rooms));
            }
            write_json(&common, &dungeon)?;
        }

        Command::Maze { common, rooms, trail, watch } => {
            let mut config: MazeConfig = load_config(&common)?;
            override_dims(&common, &mut config.map_width, &mut config.map_height);
            config.generate_rooms |= rooms;

            let mut rng = rng_from_seed(seeds.maze);
            let maze = if watch {
                run_explorer(MazeCarver::new(&config, &mut rng)?, "maze")?
            } else {
                generate_maze(&config, &mut rng)?
            };
            println!(
                "Maze {}x{}: {} cells visited, {} rooms",
                config.map_width,
                config.map_height,
                maze.visited,
                maze.rooms.len(),
            );
            if trail {
                print!("{}", ascii::render_trail(&maze.trail));
            }
            write_grid_outputs(&maze.grid, "maze", seed, &common)?;
            write_json(&common, &maze)?;
        }

        Command::Caves { common, steps, invert, watch } => {
            let mut config: CaveConfig = load_config(&common)?;
            override_dims(&common, &mut config.map_width, &mut config.map_height);
            if let Some(steps) = steps {
                config.simulation_steps = steps;
            }
            config.invert |= invert;

            let mut rng = rng_from_seed(seeds.caves);
            let cave = if watch {
                run_explorer(CaveSimulator::new(&config, &mut rng)?, "caves")?
            } else {
                generate_caves(&config, &mut rng)?
            };
            println!(
                "Caves {}x{}: {} iterations, {} floor cells",
                config.map_width,
                config.map_height,
                cave.iterations,
                cave.grid.count(|c| c.is_open()),
            );
            write_grid_outputs(&cave.grid, "caves", seed, &common)?;
            write_json(&common, &cave)?;
        }

        Command::Points { common, method, count, clustering } => {
            let mut config: DistributionConfig = load_config(&common)?;
            if let Some(w) = common.width {
                config.width = w as f64;
            }
            if let Some(h) = common.height {
                config.height = h as f64;
            }
            if let Some(method) = method {
                config.method = method;
            }
            if let Some(count) = count {
                config.point_count = count;
            }
            if let Some(clustering) = clustering {
                config.clustering = clustering;
            }

            let points = distribute_points(&config, &mut rng_from_seed(seeds.points))?;
            println!(
                "{:?} points in {}x{}: {} placed",
                config.method, config.width, config.height, points.len()
            );
            if let Some(path) = &common.png {
                export::export_points(&points, config.width, config.height, 512, path)?;
                println!("Exported points to {}", path);
            }
            let canvas = ascii::render_points(&points, config.width, config.height, 64, 32);
            match &common.ascii {
                Some(path) => {
                    fs::write(path, canvas)?;
                    println!("Exported ASCII scatter to {}", path);
                }
                None if common.png.is_none() && common.json.is_none() => print!("{}", canvas),
                None => {}
            }
            write_json(&common, &points)?;
        }

        Command::Terrain { common, resolution, noise_resolution, stride } => {
            let mut config: TerrainConfig = load_config(&common)?;
            if let Some(res) = resolution.or(common.width) {
                config.resolution = res;
            }
            if noise_resolution.is_some() {
                config.noise_resolution = noise_resolution;
            }

            let heightmap = generate_heightmap(&config, &mut rng_from_seed(seeds.terrain))?;
            let (min_h, max_h) = heightmap.min_max();
            println!(
                "Heightmap {}x{}: range {:.3} to {:.3}",
                heightmap.width, heightmap.height, min_h, max_h
            );
            if let Some(path) = &common.png {
                export::export_heightmap(&heightmap, path)?;
                println!("Exported heightmap to {}", path);
            }
            match &common.ascii {
                Some(path) => {
                    ascii::export_heightmap_file(&heightmap, seed, stride, path)?;
                    println!("Exported ASCII report to {}", path);
                }
                None if common.png.is_none() && common.json.is_none() => {
                    print!("{}", ascii::render_heightmap(&heightmap, stride));
                }
                None => {}
            }
            write_json(&common, &heightmap)?;
        }

        Command::Wave { common, time } => {
            let config: WaveConfig = load_config(&common)?;

            let samples = sample_wave(&config, &mut rng_from_seed(seeds.wave), time)?;
            let (lo, hi) = samples
                .iter()
                .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
            println!("Wave at t={}: {} samples, y in [{:.3}, {:.3}]", time, samples.len(), lo, hi);
            if let Some(path) = &common.png {
                export::render_wave(&samples, 800, 200).save(path)?;
                println!("Exported wave plot to {}", path);
            }
            write_json(&common, &samples)?;
        }
    }

    Ok(())
}

/// Read the subcommand's config record, or fall back to its defaults.
fn load_config<T: DeserializeOwned + Default>(common: &Common) -> Result<T, Box<dyn Error>> {
    match &common.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(T::default()),
    }
}

fn override_dims(common: &Common, width: &mut usize, height: &mut usize) {
    if let Some(w) = common.width {
        *width = w;
    }
    if let Some(h) = common.height {
        *height = h;
    }
}

/// PNG, ASCII report, and stdout output for a finished grid
fn write_grid_outputs(
    grid: &GridMap,
    generator: &str,
    seed: u64,
    common: &Common,
) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &common.png {
        export::export_grid(grid, common.scale, path)?;
        println!("Exported PNG to {}", path);
    }
    if let Some(path) = &common.ascii {
        ascii::export_grid_file(grid, generator, seed, path)?;
        println!("Exported ASCII report to {}", path);
    }
    if common.color {
        ascii::print_colored_grid(grid);
    } else if common.png.is_none() && common.ascii.is_none() && common.json.is_none() {
        ascii::print_grid(grid);
    }
    Ok(())
}

fn write_json<T: Serialize>(common: &Common, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &common.json {
        fs::write(path, serde_json::to_string_pretty(value)?)?;
        println!("Exported JSON to {}", path);
    }
    Ok(())
}
