//! Procedural content generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod ascii;
pub mod dungeon;
pub mod error;
pub mod explorer;
pub mod export;
pub mod heightmap;
pub mod points;
pub mod seeds;
pub mod tilemap;
pub mod wave;
