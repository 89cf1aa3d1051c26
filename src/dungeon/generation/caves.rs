//! Cellular automaton caves
//!
//! Random interior noise smoothed by a birth/death rule over the Moore
//! neighborhood. Each iteration reads from a snapshot of the previous one,
//! and the outer border is rewritten as wall every time.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::dungeon::params::CaveConfig;
use crate::dungeon::{StepEvent, StepGenerator};
use crate::error::Result;
use crate::tilemap::{Cell, GridMap};

/// Finished cave map
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cave {
    pub grid: GridMap,
    pub iterations: usize,
}

/// Resumable simulator: seeding happens in `new`, each step is one iteration.
pub struct CaveSimulator {
    config: CaveConfig,
    grid: GridMap,
    iteration: usize,
}

impl CaveSimulator {
    pub fn new(config: &CaveConfig, rng: &mut ChaCha8Rng) -> Result<Self> {
        config.validate()?;

        let mut grid = GridMap::new(config.map_width, config.map_height);
        for (x, y, cell) in grid.iter_mut() {
            let border =
                x == 0 || y == 0 || x == config.map_width - 1 || y == config.map_height - 1;
            if !border && rng.gen::<f32>() < config.initial_floor_chance {
                *cell = Cell::Floor;
            }
        }

        if config.invert {
            invert_interior(&mut grid);
        }

        debug!(floors = grid.count(|c| c == Cell::Floor), "cave seeded");

        Ok(Self {
            config: config.clone(),
            grid,
            iteration: 0,
        })
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }
}

impl StepGenerator for CaveSimulator {
    type Output = Cave;

    fn step(&mut self) -> StepEvent {
        if self.is_finished() {
            return StepEvent::Finished;
        }

        self.grid = simulate_step(&self.grid, self.config.birth_limit, self.config.death_limit);
        if self.config.invert {
            invert_interior(&mut self.grid);
        }
        self.iteration += 1;

        debug!(
            iteration = self.iteration,
            floors = self.grid.count(|c| c == Cell::Floor),
            "cave iteration"
        );
        StepEvent::Simulated { iteration: self.iteration }
    }

    fn is_finished(&self) -> bool {
        self.iteration >= self.config.simulation_steps
    }

    fn grid(&self) -> &GridMap {
        &self.grid
    }

    fn finish(self) -> Cave {
        Cave {
            grid: self.grid,
            iterations: self.iteration,
        }
    }
}

/// One birth/death iteration. Returns the new grid; `previous` is untouched.
///
/// A floor with fewer than `death_limit` floor neighbors dies, a wall with
/// more than `birth_limit` floor neighbors becomes floor.
pub fn simulate_step(previous: &GridMap, birth_limit: usize, death_limit: usize) -> GridMap {
    let (width, height) = (previous.width, previous.height);
    let mut next = GridMap::new(width, height);

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let floors = previous.neighbor_count(x as i32, y as i32, 1, |c| c == Cell::Floor);
            let alive = match previous.get(x, y) {
                Cell::Floor => floors >= death_limit,
                _ => floors > birth_limit,
            };
            if alive {
                next.set(x, y, Cell::Floor);
            }
        }
    }

    next
}

/// Swap floor and wall for every cell inside the border.
pub fn invert_interior(grid: &mut GridMap) {
    let (width, height) = (grid.width, grid.height);
    for (x, y, cell) in grid.iter_mut() {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            continue;
        }
        *cell = match *cell {
            Cell::Floor => Cell::Wall,
            _ => Cell::Floor,
        };
    }
}

/// Seed and smooth a complete cave map.
pub fn generate_caves(config: &CaveConfig, rng: &mut ChaCha8Rng) -> Result<Cave> {
    let cave = CaveSimulator::new(config, rng)?.run();

    info!(
        width = config.map_width,
        height = config.map_height,
        iterations = cave.iterations,
        floors = cave.grid.count(|c| c == Cell::Floor),
        "caves generated"
    );

    Ok(cave)
}
