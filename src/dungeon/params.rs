//! Dungeon generator configuration records
//!
//! One flat record per generator. Defaults match the values the generators
//! were tuned with; `validate` runs before any generation work.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// Smallest room edge any generator will carve
pub const MIN_ROOM_EDGE: usize = 3;

/// BSP room/corridor dungeon parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspConfig {
    pub map_width: usize,
    pub map_height: usize,
    /// Smallest edge a partition may have after a split
    pub min_partition_size: usize,
    /// Upper bound for a room edge (further limited by its leaf)
    pub max_room_size: usize,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            map_width: 40,
            map_height: 40,
            min_partition_size: 6,
            max_room_size: 10,
        }
    }
}

impl BspConfig {
    pub fn validate(&self) -> Result<()> {
        validate_partitioning(
            "bsp",
            self.map_width,
            self.map_height,
            self.min_partition_size,
            self.max_room_size,
        )
    }
}

fn validate_partitioning(
    generator: &'static str,
    map_width: usize,
    map_height: usize,
    min_partition_size: usize,
    max_room_size: usize,
) -> Result<()> {
    if max_room_size < MIN_ROOM_EDGE {
        return Err(GenError::config(
            generator,
            format!(
                "max_room_size {} leaves no room of at least {} cells",
                max_room_size, MIN_ROOM_EDGE
            ),
        ));
    }
    if min_partition_size < MIN_ROOM_EDGE {
        return Err(GenError::config(
            generator,
            format!(
                "min_partition_size {} cannot hold a {}-cell room",
                min_partition_size, MIN_ROOM_EDGE
            ),
        ));
    }
    if map_width < min_partition_size || map_height < min_partition_size {
        return Err(GenError::config(
            generator,
            format!(
                "map {}x{} is smaller than min_partition_size {}",
                map_width, map_height, min_partition_size
            ),
        ));
    }
    Ok(())
}

/// How rooms are laid out before MST connection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RoomLayout {
    /// Independently placed, non-overlapping rectangles
    #[default]
    Random,
    /// One room per BSP leaf
    Bsp,
}

/// MST-connected dungeon parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MstConfig {
    pub map_width: usize,
    pub map_height: usize,
    pub layout: RoomLayout,
    /// Rooms requested from random placement
    pub room_count: usize,
    pub min_room_size: usize,
    pub max_room_size: usize,
    /// Position retries per room before it is skipped
    pub placement_attempts: usize,
    /// Used by `RoomLayout::Bsp` only
    pub min_partition_size: usize,
}

impl Default for MstConfig {
    fn default() -> Self {
        Self {
            map_width: 50,
            map_height: 50,
            layout: RoomLayout::Random,
            room_count: 10,
            min_room_size: 3,
            max_room_size: 8,
            placement_attempts: 50,
            min_partition_size: 8,
        }
    }
}

impl MstConfig {
    pub fn validate(&self) -> Result<()> {
        match self.layout {
            RoomLayout::Bsp => validate_partitioning(
                "mst",
                self.map_width,
                self.map_height,
                self.min_partition_size,
                self.max_room_size,
            ),
            RoomLayout::Random => {
                if self.room_count == 0 {
                    return Err(GenError::config("mst", "room_count must be at least 1"));
                }
                validate_room_range(
                    "mst",
                    self.min_room_size,
                    self.max_room_size,
                    self.map_width,
                    self.map_height,
                )?;
                if self.placement_attempts == 0 {
                    return Err(GenError::config("mst", "placement_attempts must be at least 1"));
                }
                Ok(())
            }
        }
    }
}

/// Rooms must fit strictly inside the one-cell border.
fn validate_room_range(
    generator: &'static str,
    min_size: usize,
    max_size: usize,
    map_width: usize,
    map_height: usize,
) -> Result<()> {
    if min_size == 0 {
        return Err(GenError::config(generator, "room sizes must be at least 1"));
    }
    if min_size > max_size {
        return Err(GenError::config(
            generator,
            format!("min room size {} exceeds max room size {}", min_size, max_size),
        ));
    }
    if max_size + 2 >= map_width || max_size + 2 >= map_height {
        return Err(GenError::config(
            generator,
            format!(
                "max room size {} does not fit inside a {}x{} map with a border",
                max_size, map_width, map_height
            ),
        ));
    }
    Ok(())
}

/// DFS maze parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub map_width: usize,
    pub map_height: usize,
    /// Carve rectangular rooms over the finished maze
    pub generate_rooms: bool,
    pub room_min_size: usize,
    pub room_max_size: usize,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            map_width: 40,
            map_height: 40,
            generate_rooms: false,
            room_min_size: 3,
            room_max_size: 6,
        }
    }
}

impl MazeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.map_width < 3 || self.map_height < 3 {
            return Err(GenError::config(
                "maze",
                format!("map {}x{} needs at least 3x3 cells", self.map_width, self.map_height),
            ));
        }
        if self.generate_rooms {
            validate_room_range(
                "maze",
                self.room_min_size,
                self.room_max_size,
                self.map_width,
                self.map_height,
            )?;
        }
        Ok(())
    }
}

/// Cellular automaton cave parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    pub map_width: usize,
    pub map_height: usize,
    /// Probability an interior cell starts as floor
    pub initial_floor_chance: f32,
    pub simulation_steps: usize,
    /// Walls with more floor neighbors than this become floor
    pub birth_limit: usize,
    /// Floors with fewer floor neighbors than this become wall
    pub death_limit: usize,
    /// Swap interior floors and walls after seeding and after every step
    pub invert: bool,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            map_width: 40,
            map_height: 40,
            initial_floor_chance: 0.45,
            simulation_steps: 5,
            birth_limit: 4,
            death_limit: 3,
            invert: false,
        }
    }
}

impl CaveConfig {
    pub fn validate(&self) -> Result<()> {
        if self.map_width < 3 || self.map_height < 3 {
            return Err(GenError::config(
                "caves",
                format!("map {}x{} has no interior", self.map_width, self.map_height),
            ));
        }
        if !(0.0..=1.0).contains(&self.initial_floor_chance) {
            return Err(GenError::config(
                "caves",
                format!("initial_floor_chance {} is outside [0, 1]", self.initial_floor_chance),
            ));
        }
        if self.birth_limit > 8 || self.death_limit > 8 {
            return Err(GenError::config(
                "caves",
                format!(
                    "birth_limit {} and death_limit {} must be within 0..=8",
                    self.birth_limit, self.death_limit
                ),
            ));
        }
        Ok(())
    }
}
