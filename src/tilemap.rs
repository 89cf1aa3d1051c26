//! Fixed-size 2D grids shared by all generators
//!
//! `Tilemap<T>` stores cells row-major over `[0, width) x [0, height)`.
//! The world is closed: nothing wraps, reads outside the grid are answered
//! by the caller-facing helpers instead of panicking, and writes outside the
//! grid are refused.

use serde::Serialize;

use crate::error::{GenError, Result};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Direct access for coordinates the caller already knows are inside.
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    /// Bounds-checked read with signed coordinates.
    pub fn get_checked(&self, x: i32, y: i32) -> Option<&T> {
        if self.in_bounds(x, y) {
            Some(self.get(x as usize, y as usize))
        } else {
            None
        }
    }

    /// Write a cell. Returns `false` (and leaves the map untouched) when the
    /// coordinate lies outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = self.index(x, y);
        self.data[idx] = value;
        true
    }

    /// Signed variant of [`Tilemap::set`].
    pub fn set_signed(&mut self, x: i32, y: i32, value: T) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.set(x as usize, y as usize, value)
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// 4-connected neighbors that exist inside the grid (N, E, S, W order).
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(4);
        for (dx, dy) in CARDINALS {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if self.in_bounds(nx, ny) {
                result.push((nx as usize, ny as usize));
            }
        }
        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

/// Cardinal offsets in N, E, S, W order. North is +y.
pub const CARDINALS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

// =============================================================================
// DUNGEON CELLS
// =============================================================================

/// State of a single dungeon cell. Generators use whichever subset they need.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Cell {
    #[default]
    Wall,
    Floor,
    Room,
    Corridor,
}

impl Cell {
    /// Anything a consumer would spawn a floor tile for.
    pub fn is_open(self) -> bool {
        !matches!(self, Cell::Wall)
    }
}

/// The cell-state grid every dungeon generator writes into.
pub type GridMap = Tilemap<Cell>;

/// Which sides of an open cell keep their wall.
///
/// A side keeps its wall when the 4-neighbor on that side is not open.
/// Computed from a finished grid alone, so renderers never need generator state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WallSides {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl WallSides {
    pub fn count(&self) -> usize {
        [self.north, self.south, self.east, self.west]
            .iter()
            .filter(|&&w| w)
            .count()
    }

    pub fn is_enclosed(&self) -> bool {
        self.count() == 4
    }
}

impl Tilemap<Cell> {
    /// Closed-world read: anything outside the grid is a wall.
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        self.get_checked(x, y).copied().unwrap_or(Cell::Wall)
    }

    /// Count cells matching `predicate` in the Moore neighborhood of the
    /// given radius (center excluded). Out-of-bounds cells are evaluated as
    /// `Cell::Wall`.
    pub fn neighbor_count(
        &self,
        x: i32,
        y: i32,
        radius: i32,
        predicate: impl Fn(Cell) -> bool,
    ) -> usize {
        let mut count = 0;
        for ny in (y - radius)..=(y + radius) {
            for nx in (x - radius)..=(x + radius) {
                if nx == x && ny == y {
                    continue;
                }
                if predicate(self.cell(nx, ny)) {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn count(&self, predicate: impl Fn(Cell) -> bool) -> usize {
        self.data.iter().filter(|&&c| predicate(c)).count()
    }

    /// Open cells in row-major order.
    pub fn open_cells(&self) -> Vec<(usize, usize)> {
        self.iter()
            .filter(|(_, _, c)| c.is_open())
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    /// Wall mask for the tile at `(x, y)`.
    pub fn wall_sides(&self, x: i32, y: i32) -> WallSides {
        WallSides {
            north: !self.cell(x, y + 1).is_open(),
            south: !self.cell(x, y - 1).is_open(),
            east: !self.cell(x + 1, y).is_open(),
            west: !self.cell(x - 1, y).is_open(),
        }
    }
}

// =============================================================================
// BICUBIC RESAMPLING
// =============================================================================

impl Tilemap<f32> {
    /// Resample to `target_width x target_height` with separable cubic
    /// convolution. Target pixel `i` maps to source position
    /// `i * (src - 1) / (target - 1)`, so corners line up exactly; the 4x4
    /// source neighborhood is clamped to the nearest edge index.
    pub fn resample_bicubic(&self, target_width: usize, target_height: usize) -> Result<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(GenError::InvalidResample {
                reason: "source field is empty".to_string(),
            });
        }
        if target_width < 2 || target_height < 2 {
            return Err(GenError::InvalidResample {
                reason: format!(
                    "target resolution {}x{} must be at least 2x2",
                    target_width, target_height
                ),
            });
        }

        let mut result = Tilemap::new_with(target_width, target_height, 0.0f32);
        let src_w = (self.width - 1) as f64;
        let src_h = (self.height - 1) as f64;
        let dst_w = (target_width - 1) as f64;
        let dst_h = (target_height - 1) as f64;

        for y in 0..target_height {
            let gy = y as f64 * src_h / dst_h;
            for x in 0..target_width {
                let gx = x as f64 * src_w / dst_w;
                result.set(x, y, self.sample_bicubic(gx, gy));
            }
        }

        Ok(result)
    }

    /// Sample at fractional source coordinates with clamp-to-edge borders.
    pub fn sample_bicubic(&self, x: f64, y: f64) -> f32 {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let fx = (x - x.floor()) as f32;
        let fy = (y - y.floor()) as f32;

        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;

        let mut values = [[0.0f32; 4]; 4];
        for j in 0..4 {
            for i in 0..4 {
                let sx = (x0 + i as i64 - 1).clamp(0, max_x) as usize;
                let sy = (y0 + j as i64 - 1).clamp(0, max_y) as usize;
                values[j][i] = *self.get(sx, sy);
            }
        }

        bicubic_interpolate(&values, fx, fy)
    }

    pub fn min_max(&self) -> (f32, f32) {
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        for &h in &self.data {
            min_h = min_h.min(h);
            max_h = max_h.max(h);
        }
        (min_h, max_h)
    }

    pub fn clamp_values(&mut self, min: f32, max: f32) {
        for h in self.data.iter_mut() {
            *h = h.clamp(min, max);
        }
    }
}

/// Rows first, then the resulting column
fn bicubic_interpolate(values: &[[f32; 4]; 4], fx: f32, fy: f32) -> f32 {
    let mut row_values = [0.0f32; 4];
    for j in 0..4 {
        row_values[j] = catmull_rom(values[j][0], values[j][1], values[j][2], values[j][3], fx);
    }

    catmull_rom(row_values[0], row_values[1], row_values[2], row_values[3], fy)
}

/// Catmull-Rom spline through p1 (t = 0) and p2 (t = 1)
fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_reads_are_walls() {
        let mut grid = GridMap::new_with(4, 3, Cell::Floor);
        assert_eq!(grid.cell(-1, 0), Cell::Wall);
        assert_eq!(grid.cell(0, 3), Cell::Wall);
        assert_eq!(grid.cell(4, 1), Cell::Wall);
        assert_eq!(grid.cell(3, 2), Cell::Floor);

        grid.set(1, 1, Cell::Room);
        assert_eq!(grid.cell(1, 1), Cell::Room);
    }

    #[test]
    fn test_out_of_bounds_writes_are_rejected() {
        let mut grid = GridMap::new(3, 3);
        assert!(!grid.set(3, 0, Cell::Floor));
        assert!(!grid.set(0, 3, Cell::Floor));
        assert!(!grid.set_signed(-1, 1, Cell::Floor));
        assert!(grid.set_signed(2, 2, Cell::Floor));
        assert_eq!(grid.count(|c| c == Cell::Floor), 1);
    }

    #[test]
    fn test_neighbor_count_treats_outside_as_wall() {
        let grid = GridMap::new_with(3, 3, Cell::Floor);

        // Corner: 3 in-bounds floors, 5 outside walls
        assert_eq!(grid.neighbor_count(0, 0, 1, |c| c == Cell::Floor), 3);
        assert_eq!(grid.neighbor_count(0, 0, 1, |c| c == Cell::Wall), 5);
        // Center sees all 8 floors
        assert_eq!(grid.neighbor_count(1, 1, 1, |c| c == Cell::Floor), 8);
        // Radius 2 around the center: 24 cells, 8 in bounds
        assert_eq!(grid.neighbor_count(1, 1, 2, |c| c == Cell::Floor), 8);
        assert_eq!(grid.neighbor_count(1, 1, 2, |c| c == Cell::Wall), 16);
    }

    #[test]
    fn test_wall_sides_follow_open_neighbors() {
        let mut grid = GridMap::new(5, 5);
        grid.set(2, 2, Cell::Room);
        grid.set(3, 2, Cell::Corridor);
        grid.set(2, 3, Cell::Floor);

        let sides = grid.wall_sides(2, 2);
        assert!(!sides.north);
        assert!(!sides.east);
        assert!(sides.south);
        assert!(sides.west);
        assert_eq!(sides.count(), 2);

        // Edge of the map keeps its outer wall
        let mut edge = GridMap::new_with(2, 1, Cell::Floor);
        edge.set(1, 0, Cell::Floor);
        let sides = edge.wall_sides(0, 0);
        assert!(sides.west && sides.north && sides.south);
        assert!(!sides.east);
    }

    #[test]
    fn test_bicubic_identity() {
        let mut src = Tilemap::new_with(7, 5, 0.0f32);
        for (x, y, v) in src.iter_mut() {
            *v = ((x * 13 + y * 7) % 11) as f32 / 11.0;
        }

        let same = src.resample_bicubic(7, 5).unwrap();
        for (x, y, &v) in same.iter() {
            assert!((v - *src.get(x, y)).abs() < 1e-6, "mismatch at ({}, {})", x, y);
        }
    }

    #[test]
    fn test_bicubic_upsample_keeps_corners_and_constants() {
        let mut src = Tilemap::new_with(4, 4, 0.0f32);
        for (x, y, v) in src.iter_mut() {
            *v = (x + y) as f32 * 0.1;
        }
        let up = src.resample_bicubic(13, 13).unwrap();
        assert!((*up.get(0, 0) - *src.get(0, 0)).abs() < 1e-6);
        assert!((*up.get(12, 12) - *src.get(3, 3)).abs() < 1e-6);
        assert!((*up.get(12, 0) - *src.get(3, 0)).abs() < 1e-6);
        // Grid-aligned target pixels hit source samples exactly (scale = 1/4)
        assert!((*up.get(4, 8) - *src.get(1, 2)).abs() < 1e-6);

        let flat = Tilemap::new_with(3, 3, 0.42f32).resample_bicubic(9, 17).unwrap();
        for (_, _, &v) in flat.iter() {
            assert!((v - 0.42).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bicubic_rejects_degenerate_targets() {
        let src = Tilemap::new_with(4, 4, 0.5f32);
        assert!(src.resample_bicubic(1, 8).is_err());
        let empty: Tilemap<f32> = Tilemap::new(0, 0);
        assert!(empty.resample_bicubic(8, 8).is_err());
    }
}
