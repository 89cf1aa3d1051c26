//! Random rectangle room placement
//!
//! Rooms are placed one at a time at random positions inside the one-cell
//! border. A candidate touching an earlier room (one-cell margin included)
//! is retried; a room that never fits is skipped.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::corridors::stamp_room;
use crate::dungeon::types::Room;
use crate::tilemap::GridMap;

/// Room sizing for [`place_random_rooms`]
#[derive(Clone, Copy, Debug)]
pub struct RoomPlacement {
    pub room_count: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub attempts: usize,
}

/// Place up to `placement.room_count` non-overlapping rooms and stamp them
/// into `grid`. Returns the rooms that were placed, in placement order.
pub fn place_random_rooms(
    grid: &mut GridMap,
    placement: RoomPlacement,
    rng: &mut ChaCha8Rng,
) -> Vec<Room> {
    let mut rooms: Vec<Room> = Vec::with_capacity(placement.room_count);
    let mut skipped = 0;

    for _ in 0..placement.room_count {
        let mut placed = None;

        for _ in 0..placement.attempts {
            let candidate = random_room(grid.width, grid.height, placement, rng);
            let padded = candidate.rect().expanded(1);
            if rooms.iter().all(|r| !padded.intersects(&r.rect())) {
                placed = Some(candidate);
                break;
            }
        }

        match placed {
            Some(room) => {
                stamp_room(grid, &room);
                rooms.push(room);
            }
            None => skipped += 1,
        }
    }

    debug!(placed = rooms.len(), skipped, "random rooms placed");
    rooms
}

/// Sizes in `[min, max]`, position in `[1, map - size - 1)`
fn random_room(
    map_width: usize,
    map_height: usize,
    placement: RoomPlacement,
    rng: &mut ChaCha8Rng,
) -> Room {
    let w = rng.gen_range(placement.min_size..=placement.max_size);
    let h = rng.gen_range(placement.min_size..=placement.max_size);
    let x = rng.gen_range(1..map_width - w - 1);
    let y = rng.gen_range(1..map_height - h - 1);
    Room::new(x, y, w, h)
}
