//! Dungeon generation algorithms

pub mod bsp;
pub mod caves;
pub mod corridors;
pub mod maze;
pub mod mst;
pub mod rooms;

pub use bsp::{generate_bsp_dungeon, BspDungeon};
pub use caves::{generate_caves, Cave, CaveSimulator};
pub use maze::{generate_maze, Maze, MazeCarver, Trail};
pub use mst::{generate_mst_dungeon, minimum_spanning_tree, mst_connector, MstConnector, MstDungeon};
pub use rooms::{place_random_rooms, RoomPlacement};
