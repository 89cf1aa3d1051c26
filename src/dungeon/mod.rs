//! Dungeon generation
//!
//! Four grid generators sharing the `GridMap` contract:
//! - BSP room/corridor dungeons (recursive partition, L-shaped corridors)
//! - MST-connected rooms (Prim's algorithm, Manhattan corridors)
//! - DFS mazes (recursive backtracker on the odd lattice)
//! - Cellular automaton caves (birth/death smoothing)
//!
//! The maze carver, the cave simulator and the MST connector can also be
//! driven one step at a time through [`StepGenerator`]. Stepping to the end
//! produces exactly the grid a single call does.

pub mod generation;
pub mod params;
pub mod types;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::tilemap::GridMap;
use types::Edge;

pub use generation::{
    generate_bsp_dungeon, generate_caves, generate_maze, generate_mst_dungeon, BspDungeon, Cave,
    CaveSimulator, Maze, MazeCarver, MstConnector, MstDungeon, Trail,
};
pub use params::{BspConfig, CaveConfig, MazeConfig, MstConfig, RoomLayout};
pub use types::{BspTree, Rect, Room};

/// What a single generator step did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepEvent {
    /// Maze carver moved from one maze cell to the next
    Carved { from: (usize, usize), to: (usize, usize) },
    /// Maze carver exhausted a cell and returned to its parent
    Backtracked { at: (usize, usize) },
    /// Rooms were carved over the finished maze
    RoomsInjected { rooms: usize },
    /// Cave simulation finished an iteration (1-based)
    Simulated { iteration: usize },
    /// MST connector added an edge and carved its corridor
    Connected { edge: Edge },
    /// Nothing left to do
    Finished,
}

/// A generator that can be advanced one discrete step at a time.
///
/// Every step writes whole cells, so the grid is consistent between steps.
pub trait StepGenerator {
    type Output;

    /// Advance one step. Returns `StepEvent::Finished` once done.
    fn step(&mut self) -> StepEvent;

    fn is_finished(&self) -> bool;

    /// Grid as it stands after the last step
    fn grid(&self) -> &GridMap;

    /// Consume the generator and return its output in its current state.
    fn finish(self) -> Self::Output
    where
        Self: Sized;

    /// Step to completion and return the output.
    fn run(mut self) -> Self::Output
    where
        Self: Sized,
    {
        while !self.is_finished() {
            self.step();
        }
        self.finish()
    }

    /// Step until finished or until `cancel` is set between two steps.
    /// Returns `true` when the generator finished.
    fn run_cancellable(&mut self, cancel: &AtomicBool) -> bool {
        while !self.is_finished() {
            if cancel.load(Ordering::Relaxed) {
                return false;
            }
            self.step();
        }
        true
    }
}
