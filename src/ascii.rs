//! ASCII rendering and export module for generator output
//!
//! Provides functions to render grids, height fields and point sets as ASCII
//! text and export them to files. Rows are printed with `y = 0` first.

use std::fs::File;
use std::io::{self, Write};
use chrono::Local;

use crate::dungeon::types::{room_letter, Room};
use crate::dungeon::Trail;
use crate::points::Point;
use crate::tilemap::{Cell, GridMap, Tilemap};

/// Get ASCII character for a dungeon cell
pub fn cell_char(cell: Cell) -> char {
    match cell {
        Cell::Wall => '#',
        Cell::Floor => '.',
        Cell::Room => 'R',
        Cell::Corridor => '+',
    }
}

/// Get ASCII character for a normalized height
pub fn height_char(height: f32) -> char {
    // 0.0 (low) to 1.0 (high)
    const CHARS: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
    let idx = (height.clamp(0.0, 1.0) * (CHARS.len() - 1) as f32) as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

/// Get ASCII character for a DFS trail state
pub fn trail_char(trail: Trail) -> char {
    match trail {
        Trail::Unvisited => ' ',
        Trail::Forward => 'o',
        Trail::Backtracked => 'x',
    }
}

/// Render a dungeon grid to ASCII string
pub fn render_grid(grid: &GridMap) -> String {
    let mut result = String::with_capacity((grid.width + 1) * grid.height);
    for y in 0..grid.height {
        for x in 0..grid.width {
            result.push(cell_char(*grid.get(x, y)));
        }
        result.push('\n');
    }
    result
}

/// Render a grid with each room's cells replaced by its letter
pub fn render_rooms(grid: &GridMap, rooms: &[Room]) -> String {
    let mut chars: Tilemap<char> = Tilemap::new_with(grid.width, grid.height, ' ');
    for (x, y, &cell) in grid.iter() {
        chars.set(x, y, cell_char(cell));
    }
    for (i, room) in rooms.iter().enumerate() {
        for y in room.y..room.y + room.height {
            for x in room.x..room.x + room.width {
                chars.set(x, y, room_letter(i));
            }
        }
    }
    render_chars(&chars)
}

/// Render the maze trail (forward carves vs backtracked cells)
pub fn render_trail(trail: &Tilemap<Trail>) -> String {
    let mut chars: Tilemap<char> = Tilemap::new_with(trail.width, trail.height, ' ');
    for (x, y, &t) in trail.iter() {
        chars.set(x, y, trail_char(t));
    }
    render_chars(&chars)
}

/// Render a height field, keeping every `stride`-th sample on both axes
pub fn render_heightmap(heightmap: &Tilemap<f32>, stride: usize) -> String {
    let stride = stride.max(1);
    let mut result = String::new();
    for y in (0..heightmap.height).step_by(stride) {
        for x in (0..heightmap.width).step_by(stride) {
            result.push(height_char(*heightmap.get(x, y)));
        }
        result.push('\n');
    }
    result
}

/// Scatter points onto a `cols x rows` character canvas covering `[0, width] x [0, height]`
pub fn render_points(
    points: &[Point],
    width: f64,
    height: f64,
    cols: usize,
    rows: usize,
) -> String {
    let mut chars: Tilemap<char> = Tilemap::new_with(cols, rows, '.');
    for p in points {
        let cx = ((p.x / width) * (cols - 1) as f64).round() as i32;
        let cy = ((p.y / height) * (rows - 1) as f64).round() as i32;
        chars.set_signed(cx, cy, '*');
    }
    render_chars(&chars)
}

fn render_chars(chars: &Tilemap<char>) -> String {
    let mut result = String::with_capacity((chars.width + 1) * chars.height);
    for y in 0..chars.height {
        for x in 0..chars.width {
            result.push(*chars.get(x, y));
        }
        result.push('\n');
    }
    result
}

/// Generate legend for cell characters
pub fn cell_legend() -> String {
    let mut legend = String::from("=== LEGEND ===\n");
    for (cell, name) in [
        (Cell::Wall, "Wall"),
        (Cell::Floor, "Floor"),
        (Cell::Room, "Room"),
        (Cell::Corridor, "Corridor"),
    ] {
        legend.push_str(&format!("  {} {}\n", cell_char(cell), name));
    }
    legend
}

/// Export a dungeon grid to an ASCII report file
pub fn export_grid_file(grid: &GridMap, generator: &str, seed: u64, path: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    let total = grid.width * grid.height;

    write_header(&mut file, generator, seed, grid.width, grid.height)?;

    writeln!(file, "=== MAP ===")?;
    write!(file, "{}", render_grid(grid))?;
    writeln!(file)?;

    write!(file, "{}", cell_legend())?;
    writeln!(file)?;

    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Total cells: {}", total)?;
    for (cell, name) in [
        (Cell::Wall, "Wall"),
        (Cell::Floor, "Floor"),
        (Cell::Room, "Room"),
        (Cell::Corridor, "Corridor"),
    ] {
        let count = grid.count(|c| c == cell);
        if count > 0 {
            let percent = 100.0 * count as f64 / total as f64;
            writeln!(file, "  {:10} {:>6} ({:>5.1}%)", name, count, percent)?;
        }
    }

    Ok(())
}

/// Export a height field to an ASCII report file
pub fn export_heightmap_file(
    heightmap: &Tilemap<f32>,
    seed: u64,
    stride: usize,
    path: &str,
) -> io::Result<()> {
    let mut file = File::create(path)?;

    write_header(&mut file, "terrain", seed, heightmap.width, heightmap.height)?;

    writeln!(file, "=== MAP (every {} samples) ===", stride.max(1))?;
    write!(file, "{}", render_heightmap(heightmap, stride))?;
    writeln!(file)?;

    let (min_h, max_h) = heightmap.min_max();
    let samples = heightmap.as_slice();
    let mean = samples.iter().map(|&h| h as f64).sum::<f64>() / samples.len().max(1) as f64;
    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Height: min {:.3}  max {:.3}  mean {:.3}", min_h, max_h, mean)?;

    Ok(())
}

fn write_header(
    file: &mut File,
    generator: &str,
    seed: u64,
    width: usize,
    height: usize,
) -> io::Result<()> {
    writeln!(file, "=== PCG GENERATOR OUTPUT ===")?;
    writeln!(file, "Generator: {}", generator)?;
    writeln!(file, "Seed: {}", seed)?;
    writeln!(file, "Size: {}x{}", width, height)?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)
}

/// Print a dungeon grid to stdout
pub fn print_grid(grid: &GridMap) {
    print!("{}", render_grid(grid));
}

// ============================================================================
// COLORIZED ASCII RENDERING
// ============================================================================

/// Get display color for a dungeon cell
pub fn cell_color(cell: Cell) -> (u8, u8, u8) {
    match cell {
        Cell::Wall => (40, 40, 48),
        Cell::Floor => (170, 150, 110),
        Cell::Room => (90, 140, 200),
        Cell::Corridor => (200, 170, 60),
    }
}

/// Format a character with ANSI true color (24-bit) foreground and background
pub fn ansi_colored_char(ch: char, fg: (u8, u8, u8), bg: (u8, u8, u8)) -> String {
    format!(
        "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{}\x1b[0m",
        fg.0, fg.1, fg.2,
        bg.0, bg.1, bg.2,
        ch
    )
}

/// Render a dungeon grid with ANSI colors
pub fn render_colored_grid(grid: &GridMap) -> String {
    let mut result = String::new();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let cell = *grid.get(x, y);
            result.push_str(&ansi_colored_char(cell_char(cell), (230, 230, 230), cell_color(cell)));
        }
        result.push('\n');
    }
    result
}

/// Print a colored dungeon grid to stdout
pub fn print_colored_grid(grid: &GridMap) {
    print!("{}", render_colored_grid(grid));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_rendering() {
        let mut grid = GridMap::new(4, 2);
        grid.set(1, 0, Cell::Floor);
        grid.set(2, 0, Cell::Room);
        grid.set(3, 1, Cell::Corridor);
        assert_eq!(render_grid(&grid), "#.R#\n###+\n");
    }

    #[test]
    fn test_rooms_show_letters() {
        let mut grid = GridMap::new(6, 3);
        let rooms = [Room::new(0, 0, 2, 1), Room::new(4, 2, 2, 1)];
        for room in &rooms {
            grid.set(room.x, room.y, Cell::Room);
        }
        assert_eq!(render_rooms(&grid, &rooms), "AA####\n######\n####BB\n");
    }

    #[test]
    fn test_height_ramp_endpoints() {
        assert_eq!(height_char(0.0), ' ');
        assert_eq!(height_char(1.0), '@');
        assert_eq!(height_char(-3.0), ' ');
        assert_eq!(height_char(0.5), '=');
    }

    #[test]
    fn test_heightmap_stride() {
        let map = Tilemap::new_with(5, 5, 1.0f32);
        assert_eq!(render_heightmap(&map, 2), "@@@\n@@@\n@@@\n");
    }

    #[test]
    fn test_points_canvas() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        assert_eq!(render_points(&points, 10.0, 10.0, 3, 2), "*..\n..*\n");
    }

    #[test]
    fn test_grid_report_has_header_and_stats() {
        let mut grid = GridMap::new(3, 3);
        grid.set(1, 1, Cell::Floor);
        let path = std::env::temp_dir().join("pcg_generator_ascii_report.txt");
        let path_str = path.to_string_lossy().to_string();

        export_grid_file(&grid, "caves", 42, &path_str).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Generator: caves"));
        assert!(text.contains("Seed: 42"));
        assert!(text.contains("Generated: "));
        assert!(text.contains("###\n#.#\n###\n"));
        assert!(text.contains("Floor"));
        let _ = std::fs::remove_file(path);
    }
}
