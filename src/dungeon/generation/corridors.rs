//! Room stamping and corridor carving
//!
//! Corridors only ever turn `Wall` cells into `Corridor`; rooms and earlier
//! corridors they cross are left as they are.

use crate::dungeon::types::Room;
use crate::tilemap::{Cell, GridMap};

/// Fill a room's rectangle with `Cell::Room`. Returns cells written.
pub fn stamp_room(grid: &mut GridMap, room: &Room) -> usize {
    let mut written = 0;
    for y in room.y..room.y + room.height {
        for x in room.x..room.x + room.width {
            if grid.set(x, y, Cell::Room) {
                written += 1;
            }
        }
    }
    written
}

fn carve_cell(grid: &mut GridMap, x: usize, y: usize) -> bool {
    if x < grid.width && y < grid.height && *grid.get(x, y) == Cell::Wall {
        grid.set(x, y, Cell::Corridor)
    } else {
        false
    }
}

/// Carve row `y` between `x1` and `x2` inclusive. Returns cells carved.
pub fn carve_horizontal(grid: &mut GridMap, x1: usize, x2: usize, y: usize) -> usize {
    (x1.min(x2)..=x1.max(x2))
        .filter(|&x| carve_cell(grid, x, y))
        .count()
}

/// Carve column `x` between `y1` and `y2` inclusive. Returns cells carved.
pub fn carve_vertical(grid: &mut GridMap, y1: usize, y2: usize, x: usize) -> usize {
    (y1.min(y2)..=y1.max(y2))
        .filter(|&y| carve_cell(grid, x, y))
        .count()
}

/// L-shaped corridor between two points.
///
/// With `horizontal_first` the horizontal leg runs along `a`'s row and the
/// vertical leg along `b`'s column; otherwise the vertical leg runs along
/// `a`'s column and the horizontal leg along `b`'s row.
pub fn carve_l_corridor(
    grid: &mut GridMap,
    a: (usize, usize),
    b: (usize, usize),
    horizontal_first: bool,
) -> usize {
    let (x1, y1) = a;
    let (x2, y2) = b;

    if horizontal_first {
        carve_horizontal(grid, x1, x2, y1) + carve_vertical(grid, y1, y2, x2)
    } else {
        carve_vertical(grid, y1, y2, x1) + carve_horizontal(grid, x1, x2, y2)
    }
}

/// Manhattan corridor: horizontal run first, then vertical.
pub fn carve_manhattan(grid: &mut GridMap, a: (usize, usize), b: (usize, usize)) -> usize {
    carve_l_corridor(grid, a, b, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corridor_never_overwrites_rooms() {
        let mut grid = GridMap::new(10, 10);
        let room = Room::new(4, 0, 2, 10);
        stamp_room(&mut grid, &room);

        let carved = carve_horizontal(&mut grid, 0, 9, 5);
        assert_eq!(carved, 8);
        assert_eq!(*grid.get(4, 5), Cell::Room);
        assert_eq!(*grid.get(5, 5), Cell::Room);
        assert_eq!(*grid.get(0, 5), Cell::Corridor);
        assert_eq!(*grid.get(9, 5), Cell::Corridor);
    }

    #[test]
    fn test_l_corridor_legs() {
        let mut grid = GridMap::new(8, 8);
        carve_l_corridor(&mut grid, (1, 1), (5, 6), true);
        // Horizontal along y = 1, vertical along x = 5
        assert_eq!(*grid.get(3, 1), Cell::Corridor);
        assert_eq!(*grid.get(5, 4), Cell::Corridor);
        assert_eq!(*grid.get(1, 4), Cell::Wall);

        let mut grid = GridMap::new(8, 8);
        carve_l_corridor(&mut grid, (1, 1), (5, 6), false);
        // Vertical along x = 1, horizontal along y = 6
        assert_eq!(*grid.get(1, 4), Cell::Corridor);
        assert_eq!(*grid.get(3, 6), Cell::Corridor);
        assert_eq!(*grid.get(3, 1), Cell::Wall);
        // Corner shared by both legs counted once
        assert_eq!(grid.count(|c| c == Cell::Corridor), 6 + 4);
    }
}
