//! Debug tool for comparing dungeon generators visually
//! Renders BSP, MST, maze and cave grids for several seeds into one contact sheet

use std::error::Error;

use image::RgbImage;
use pcg_generator::dungeon::{
    generate_bsp_dungeon, generate_caves, generate_maze, generate_mst_dungeon, BspConfig,
    CaveConfig, MazeConfig, MstConfig, RoomLayout,
};
use pcg_generator::export::{compose_sheet, render_grid, render_mst, render_trail};
use pcg_generator::seeds::{rng_from_seed, GeneratorSeeds};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

const SEEDS: [u64; 4] = [1, 42, 1337, 90210];
const SCALE: u32 = 6;
const OUTPUT: &str = "dungeon_comparison.png";

#[derive(Clone, Copy, Debug)]
enum Kind {
    Bsp,
    MstRandom,
    MstBsp,
    Maze,
    Caves,
}

impl Kind {
    const ALL: [Kind; 5] = [Kind::Bsp, Kind::MstRandom, Kind::MstBsp, Kind::Maze, Kind::Caves];

    fn name(&self) -> &'static str {
        match self {
            Kind::Bsp => "BSP",
            Kind::MstRandom => "MST",
            Kind::MstBsp => "MST-BSP",
            Kind::Maze => "Maze",
            Kind::Caves => "Caves",
        }
    }

    fn render(&self, seed: u64) -> Result<RgbImage, String> {
        let seeds = GeneratorSeeds::from_master(seed);
        let image = match self {
            Kind::Bsp => {
                let dungeon =
                    generate_bsp_dungeon(&BspConfig::default(), &mut rng_from_seed(seeds.bsp))
                        .map_err(|e| e.to_string())?;
                render_grid(&dungeon.grid, SCALE)
            }
            Kind::MstRandom | Kind::MstBsp => {
                let layout = if matches!(self, Kind::MstBsp) {
                    RoomLayout::Bsp
                } else {
                    RoomLayout::Random
                };
                let config = MstConfig { layout, ..Default::default() };
                let dungeon = generate_mst_dungeon(&config, &mut rng_from_seed(seeds.mst))
                    .map_err(|e| e.to_string())?;
                render_mst(&dungeon.grid, &dungeon.rooms, &dungeon.edges, SCALE)
            }
            Kind::Maze => {
                let config = MazeConfig { map_width: 41, map_height: 41, ..Default::default() };
                let maze = generate_maze(&config, &mut rng_from_seed(seeds.maze))
                    .map_err(|e| e.to_string())?;
                render_trail(&maze.grid, &maze.trail, SCALE)
            }
            Kind::Caves => {
                let cave = generate_caves(&CaveConfig::default(), &mut rng_from_seed(seeds.caves))
                    .map_err(|e| e.to_string())?;
                render_grid(&cave.grid, SCALE)
            }
        };
        Ok(image)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("Generating dungeon comparison sheet...");

    // One row per seed, one column per generator
    let jobs: Vec<(u64, Kind)> = SEEDS
        .iter()
        .flat_map(|&seed| Kind::ALL.iter().map(move |&kind| (seed, kind)))
        .collect();

    let tiles: Vec<(String, RgbImage)> = jobs
        .par_iter()
        .map(|&(seed, kind)| {
            kind.render(seed)
                .map(|img| (format!("{} {}", kind.name(), seed), img))
        })
        .collect::<Result<_, _>>()?;

    let sheet = compose_sheet(&tiles, Kind::ALL.len() as u32);
    sheet.save(OUTPUT)?;

    println!("Saved {} tiles to {}", tiles.len(), OUTPUT);
    Ok(())
}
