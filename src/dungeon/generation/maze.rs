//! Randomized depth-first maze carving (recursive backtracker)
//!
//! Maze cells live on odd coordinates; the even cell between two of them is
//! the wall that gets knocked out when the carver moves. The recursion is an
//! explicit stack of frames, so one carve can be executed per `step`.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::dungeon::params::MazeConfig;
use crate::dungeon::types::Room;
use crate::dungeon::{StepEvent, StepGenerator};
use crate::error::Result;
use crate::tilemap::{Cell, GridMap, Tilemap, CARDINALS};

/// First maze cell of every walk
pub const MAZE_START: (usize, usize) = (1, 1);

/// Diagnostic trail of the depth-first walk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Trail {
    #[default]
    Unvisited,
    /// Carved on the way forward
    Forward,
    /// Maze cell whose directions are all exhausted
    Backtracked,
}

/// Finished maze
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Maze {
    pub grid: GridMap,
    pub trail: Tilemap<Trail>,
    /// Rooms carved over the maze, if requested
    pub rooms: Vec<Room>,
    /// Maze cells reached by the walk
    pub visited: usize,
}

/// One pending recursion level
struct Frame {
    cell: (usize, usize),
    dirs: [(i32, i32); 4],
    next: usize,
}

/// Resumable depth-first carver.
pub struct MazeCarver<'a> {
    config: MazeConfig,
    rng: &'a mut ChaCha8Rng,
    grid: GridMap,
    trail: Tilemap<Trail>,
    stack: Vec<Frame>,
    rooms: Vec<Room>,
    rooms_done: bool,
    visited: usize,
}

impl<'a> MazeCarver<'a> {
    pub fn new(config: &MazeConfig, rng: &'a mut ChaCha8Rng) -> Result<Self> {
        config.validate()?;

        let mut grid = GridMap::new(config.map_width, config.map_height);
        let mut trail = Tilemap::new(config.map_width, config.map_height);
        let (sx, sy) = MAZE_START;
        grid.set(sx, sy, Cell::Floor);
        trail.set(sx, sy, Trail::Forward);

        let mut carver = Self {
            config: config.clone(),
            rng,
            grid,
            trail,
            stack: Vec::new(),
            rooms: Vec::new(),
            rooms_done: !config.generate_rooms,
            visited: 1,
        };
        carver.enter(MAZE_START);
        Ok(carver)
    }

    pub fn trail(&self) -> &Tilemap<Trail> {
        &self.trail
    }

    /// Push a frame with a fresh shuffle of the four directions.
    fn enter(&mut self, cell: (usize, usize)) {
        let mut dirs = CARDINALS;
        dirs.shuffle(&mut *self.rng);
        self.stack.push(Frame { cell, dirs, next: 0 });
    }

    /// Inside the outer border: `0 < x < width - 1`, same for y.
    fn is_interior(&self, x: i32, y: i32) -> bool {
        x > 0 && y > 0 && x < self.grid.width as i32 - 1 && y < self.grid.height as i32 - 1
    }
}

impl StepGenerator for MazeCarver<'_> {
    type Output = Maze;

    fn step(&mut self) -> StepEvent {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                if !self.rooms_done {
                    self.rooms_done = true;
                    self.rooms = inject_rooms(&mut self.grid, &self.config, &mut *self.rng);
                    return StepEvent::RoomsInjected { rooms: self.rooms.len() };
                }
                return StepEvent::Finished;
            };

            let cell = frame.cell;
            if frame.next == frame.dirs.len() {
                self.stack.pop();
                self.trail.set(cell.0, cell.1, Trail::Backtracked);
                return StepEvent::Backtracked { at: cell };
            }

            let (dx, dy) = frame.dirs[frame.next];
            frame.next += 1;

            let tx = cell.0 as i32 + dx * 2;
            let ty = cell.1 as i32 + dy * 2;
            if !self.is_interior(tx, ty) || self.grid.cell(tx, ty) != Cell::Wall {
                continue;
            }

            let between = ((cell.0 as i32 + dx) as usize, (cell.1 as i32 + dy) as usize);
            let target = (tx as usize, ty as usize);
            for (x, y) in [between, target] {
                self.grid.set(x, y, Cell::Floor);
                self.trail.set(x, y, Trail::Forward);
            }
            self.visited += 1;
            trace!(from = ?cell, to = ?target, depth = self.stack.len(), "maze carve");

            self.enter(target);
            return StepEvent::Carved { from: cell, to: target };
        }
    }

    fn is_finished(&self) -> bool {
        self.stack.is_empty() && self.rooms_done
    }

    fn grid(&self) -> &GridMap {
        &self.grid
    }

    fn finish(self) -> Maze {
        debug!(visited = self.visited, rooms = self.rooms.len(), "maze carving finished");
        Maze {
            grid: self.grid,
            trail: self.trail,
            rooms: self.rooms,
            visited: self.visited,
        }
    }
}

/// Carve rectangular rooms centered on random floor cells.
///
/// `max(1, floor / 20)` attempts; rooms are clamped inside the border and
/// only turn `Wall` cells into `Room`.
pub fn inject_rooms(grid: &mut GridMap, config: &MazeConfig, rng: &mut ChaCha8Rng) -> Vec<Room> {
    let floors = grid.open_cells();
    if floors.is_empty() {
        return Vec::new();
    }

    let attempts = (floors.len() / 20).max(1);
    let mut rooms = Vec::with_capacity(attempts);

    for _ in 0..attempts {
        let (cx, cy) = floors[rng.gen_range(0..floors.len())];
        let w = rng.gen_range(config.room_min_size..=config.room_max_size);
        let h = rng.gen_range(config.room_min_size..=config.room_max_size);

        let x = (cx as i64 - (w / 2) as i64).clamp(1, (grid.width - w - 1) as i64) as usize;
        let y = (cy as i64 - (h / 2) as i64).clamp(1, (grid.height - h - 1) as i64) as usize;

        for ry in y..y + h {
            for rx in x..x + w {
                if *grid.get(rx, ry) == Cell::Wall {
                    grid.set(rx, ry, Cell::Room);
                }
            }
        }
        rooms.push(Room::new(x, y, w, h));
    }

    debug!(rooms = rooms.len(), "maze rooms injected");
    rooms
}

/// Carve a complete maze.
pub fn generate_maze(config: &MazeConfig, rng: &mut ChaCha8Rng) -> Result<Maze> {
    let maze = MazeCarver::new(config, rng)?.run();

    info!(
        width = config.map_width,
        height = config.map_height,
        visited = maze.visited,
        rooms = maze.rooms.len(),
        "maze generated"
    );

    Ok(maze)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::rng_from_seed;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicBool;

    fn config(width: usize, height: usize) -> MazeConfig {
        MazeConfig {
            map_width: width,
            map_height: height,
            ..Default::default()
        }
    }

    fn reachable_open(grid: &GridMap, start: (usize, usize)) -> usize {
        let mut seen = Tilemap::new_with(grid.width, grid.height, false);
        seen.set(start.0, start.1, true);
        let mut queue = VecDeque::from([start]);
        let mut reached = 1;
        while let Some((x, y)) = queue.pop_front() {
            for (nx, ny) in grid.neighbors(x, y) {
                if grid.get(nx, ny).is_open() && !*seen.get(nx, ny) {
                    seen.set(nx, ny, true);
                    reached += 1;
                    queue.push_back((nx, ny));
                }
            }
        }
        reached
    }

    #[test]
    fn test_maze_is_perfect() {
        for (w, h, seed) in [(40, 40, 1), (21, 15, 2), (30, 11, 3)] {
            let maze = generate_maze(&config(w, h), &mut rng_from_seed(seed)).unwrap();
            let grid = &maze.grid;
            let carved = grid.count(|c| c == Cell::Floor);
            assert_eq!(carved, 2 * maze.visited - 1);

            // Every odd lattice cell inside the border is reached
            let lattice = ((w - 1) / 2) * ((h - 1) / 2);
            assert_eq!(maze.visited, lattice);

            // Connected with exactly V - 1 adjacencies: a tree
            let mut adjacencies = 0;
            for (x, y) in grid.open_cells() {
                if x + 1 < w && grid.get(x + 1, y).is_open() {
                    adjacencies += 1;
                }
                if y + 1 < h && grid.get(x, y + 1).is_open() {
                    adjacencies += 1;
                }
            }
            assert_eq!(adjacencies, carved - 1);
            assert_eq!(reachable_open(grid, MAZE_START), carved);
        }
    }

    #[test]
    fn test_border_stays_solid() {
        let maze = generate_maze(&config(25, 25), &mut rng_from_seed(4)).unwrap();
        for i in 0..25 {
            assert_eq!(*maze.grid.get(i, 0), Cell::Wall);
            assert_eq!(*maze.grid.get(i, 24), Cell::Wall);
            assert_eq!(*maze.grid.get(0, i), Cell::Wall);
            assert_eq!(*maze.grid.get(24, i), Cell::Wall);
        }
    }

    #[test]
    fn test_trail_marks_every_maze_cell_backtracked() {
        let maze = generate_maze(&config(15, 15), &mut rng_from_seed(6)).unwrap();
        for (x, y, &trail) in maze.trail.iter() {
            let floor = *maze.grid.get(x, y) == Cell::Floor;
            if x % 2 == 1 && y % 2 == 1 && floor {
                assert_eq!(trail, Trail::Backtracked);
            } else if floor {
                assert_eq!(trail, Trail::Forward);
            } else {
                assert_eq!(trail, Trail::Unvisited);
            }
        }
    }

    #[test]
    fn test_stepping_matches_full_run() {
        let cfg = config(31, 27);
        let full = generate_maze(&cfg, &mut rng_from_seed(12)).unwrap();

        let mut rng = rng_from_seed(12);
        let mut carver = MazeCarver::new(&cfg, &mut rng).unwrap();
        let (mut carves, mut backtracks) = (0, 0);
        while !carver.is_finished() {
            match carver.step() {
                StepEvent::Carved { .. } => carves += 1,
                StepEvent::Backtracked { .. } => backtracks += 1,
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(carver.step(), StepEvent::Finished);

        let stepped = carver.finish();
        assert_eq!(carves, full.visited - 1);
        assert_eq!(backtracks, full.visited);
        assert_eq!(stepped, full);
    }

    #[test]
    fn test_cancelled_run_leaves_consistent_grid() {
        let cfg = config(41, 41);
        let mut rng = rng_from_seed(13);
        let mut carver = MazeCarver::new(&cfg, &mut rng).unwrap();
        for _ in 0..25 {
            carver.step();
        }

        let cancel = AtomicBool::new(true);
        assert!(!carver.run_cancellable(&cancel));
        assert!(!carver.is_finished());

        // Partial maze is still a tree rooted at the start
        let carved = carver.grid().count(|c| c == Cell::Floor);
        assert_eq!(reachable_open(carver.grid(), MAZE_START), carved);

        let cancel = AtomicBool::new(false);
        assert!(carver.run_cancellable(&cancel));
        let resumed = carver.finish();
        let full = generate_maze(&cfg, &mut rng_from_seed(13)).unwrap();
        assert_eq!(resumed.grid, full.grid);
    }

    #[test]
    fn test_rooms_only_fill_walls() {
        let cfg = MazeConfig {
            generate_rooms: true,
            ..config(40, 40)
        };
        let maze = generate_maze(&cfg, &mut rng_from_seed(9)).unwrap();
        let plain = generate_maze(&config(40, 40), &mut rng_from_seed(9)).unwrap();

        assert_eq!(maze.rooms.len(), (2 * plain.visited - 1) / 20);
        for room in &maze.rooms {
            assert!(room.x >= 1 && room.y >= 1);
            assert!(room.x + room.width < 40 && room.y + room.height < 40);
        }
        // The maze itself is untouched: every corridor cell survives
        for (x, y, &cell) in plain.grid.iter() {
            if cell == Cell::Floor {
                assert_eq!(*maze.grid.get(x, y), Cell::Floor);
            }
        }
        assert!(maze.grid.count(|c| c == Cell::Room) > 0);
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = generate_maze(&config(33, 33), &mut rng_from_seed(77)).unwrap();
        let b = generate_maze(&config(33, 33), &mut rng_from_seed(77)).unwrap();
        let c = generate_maze(&config(33, 33), &mut rng_from_seed(78)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.grid, c.grid);
    }
}
