use image::{ImageBuffer, Rgb, RgbImage};

use crate::dungeon::types::Edge;
use crate::dungeon::{Room, Trail};
use crate::points::Point;
use crate::tilemap::{Cell, GridMap, Tilemap};

const BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);
const LABEL_BACKGROUND: Rgb<u8> = Rgb([50, 50, 50]);
const LABEL_HEIGHT: u32 = 20;

/// Pixel color for a dungeon cell
pub fn cell_color(cell: Cell) -> [u8; 3] {
    match cell {
        Cell::Wall => [25, 25, 32],
        Cell::Floor => [196, 180, 140],
        Cell::Room => [92, 142, 204],
        Cell::Corridor => [214, 176, 64],
    }
}

/// Render a dungeon grid, each cell as a `scale x scale` block.
pub fn render_grid(grid: &GridMap, scale: u32) -> RgbImage {
    let scale = scale.max(1);
    let mut img: RgbImage = ImageBuffer::new(grid.width as u32 * scale, grid.height as u32 * scale);

    for (x, y, &cell) in grid.iter() {
        fill_block(&mut img, x as u32 * scale, y as u32 * scale, scale, Rgb(cell_color(cell)));
    }

    img
}

/// Export a dungeon grid as PNG.
pub fn export_grid(grid: &GridMap, scale: u32, path: &str) -> Result<(), image::ImageError> {
    render_grid(grid, scale).save(path)
}

/// Render the maze trail over the grid: forward carves tinted blue,
/// backtracked maze cells tinted red.
pub fn render_trail(grid: &GridMap, trail: &Tilemap<Trail>, scale: u32) -> RgbImage {
    let scale = scale.max(1);
    let mut img = render_grid(grid, scale);

    for (x, y, &t) in trail.iter() {
        let tint = match t {
            Trail::Unvisited => continue,
            Trail::Forward => [0, 204, 255],
            Trail::Backtracked => [255, 51, 51],
        };
        let base = cell_color(*grid.get(x, y));
        let color = Rgb(lerp_color(base, tint, 0.35));
        fill_block(&mut img, x as u32 * scale, y as u32 * scale, scale, color);
    }

    img
}

/// Render a dungeon grid with MST edges drawn between room centers.
pub fn render_mst(grid: &GridMap, rooms: &[Room], edges: &[Edge], scale: u32) -> RgbImage {
    let scale = scale.max(1);
    let mut img = render_grid(grid, scale);
    let half = scale / 2;
    let to_px = |room: &Room| {
        let (cx, cy) = room.center();
        ((cx as u32 * scale + half) as i32, (cy as u32 * scale + half) as i32)
    };

    for edge in edges {
        draw_line(&mut img, to_px(&rooms[edge.a]), to_px(&rooms[edge.b]), Rgb([0, 255, 255]));
    }
    for room in rooms {
        let (px, py) = to_px(room);
        draw_dot(&mut img, px, py, (scale / 3).max(1) as i32, Rgb([255, 255, 0]));
    }

    img
}

/// Export a dungeon grid with its MST overlay as PNG.
pub fn export_mst(
    grid: &GridMap,
    rooms: &[Room],
    edges: &[Edge],
    scale: u32,
    path: &str,
) -> Result<(), image::ImageError> {
    render_mst(grid, rooms, edges, scale).save(path)
}

/// Render a height field using the spectral colormap.
/// Values are expected to be normalized (0.0-1.0).
pub fn render_heightmap(heightmap: &Tilemap<f32>) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(heightmap.width as u32, heightmap.height as u32);

    for (x, y, &val) in heightmap.iter() {
        img.put_pixel(x as u32, y as u32, Rgb(spectral_colormap(val.clamp(0.0, 1.0))));
    }

    img
}

/// Export a heightmap using spectral colormap.
pub fn export_heightmap(heightmap: &Tilemap<f32>, path: &str) -> Result<(), image::ImageError> {
    render_heightmap(heightmap).save(path)
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],  // Dark blue/purple (low)
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],  // Dark red (high)
    ];

    let t_scaled = t * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

/// Render points in `[0, width] x [0, height]` onto a `size x size` canvas.
pub fn render_points(points: &[Point], width: f64, height: f64, size: u32) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::from_pixel(size, size, BACKGROUND);
    let span = (size.max(2) - 1) as f64;
    let radius = (size / 128).max(1) as i32;

    for p in points {
        let px = (p.x / width * span).round() as i32;
        let py = (p.y / height * span).round() as i32;
        draw_dot(&mut img, px, py, radius, Rgb([0, 220, 255]));
    }

    img
}

/// Export a point set as PNG.
pub fn export_points(
    points: &[Point],
    width: f64,
    height: f64,
    size: u32,
    path: &str,
) -> Result<(), image::ImageError> {
    render_points(points, width, height, size).save(path)
}

/// Plot a sampled curve, auto-fitting its y range.
pub fn render_wave(samples: &[Point], width: u32, height: u32) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::from_pixel(width, height, BACKGROUND);
    if samples.len() < 2 {
        return img;
    }

    let (min_x, max_x) = (samples[0].x, samples[samples.len() - 1].x);
    let (min_y, max_y) = samples
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let x_span = (max_x - min_x).max(1e-9);
    let y_span = (max_y - min_y).max(1e-9);

    let to_px = |p: &Point| {
        let px = (p.x - min_x) / x_span * (width - 1) as f64;
        let py = (1.0 - (p.y - min_y) / y_span) * (height - 1) as f64;
        (px.round() as i32, py.round() as i32)
    };

    for pair in samples.windows(2) {
        draw_line(&mut img, to_px(&pair[0]), to_px(&pair[1]), Rgb([255, 200, 80]));
    }

    img
}

// =============================================================================
// CONTACT SHEETS
// =============================================================================

/// Lay labelled tiles out in a grid with `cols` columns.
/// Every cell of the sheet is as large as the largest tile.
pub fn compose_sheet(tiles: &[(String, RgbImage)], cols: u32) -> RgbImage {
    let cols = cols.max(1);
    let tile_w = tiles.iter().map(|(_, t)| t.width()).max().unwrap_or(1);
    let tile_h = tiles.iter().map(|(_, t)| t.height()).max().unwrap_or(1);
    let rows = (tiles.len() as u32).div_ceil(cols).max(1);

    let grid_w = tile_w * cols;
    let grid_h = (tile_h + LABEL_HEIGHT) * rows;
    let mut sheet: RgbImage = ImageBuffer::from_pixel(grid_w, grid_h, BACKGROUND);

    for (idx, (label, tile)) in tiles.iter().enumerate() {
        let col = (idx as u32) % cols;
        let row = (idx as u32) / cols;
        let offset_x = col * tile_w;
        let label_y = row * (tile_h + LABEL_HEIGHT);
        let offset_y = label_y + LABEL_HEIGHT;

        for (tx, ty, pixel) in tile.enumerate_pixels() {
            sheet.put_pixel(offset_x + tx, offset_y + ty, *pixel);
        }

        for ly in 0..LABEL_HEIGHT {
            for lx in 0..tile_w {
                sheet.put_pixel(offset_x + lx, label_y + ly, LABEL_BACKGROUND);
            }
        }
        draw_label(&mut sheet, label, offset_x + 4, label_y + 6);
    }

    sheet
}

// =============================================================================
// DRAWING PRIMITIVES
// =============================================================================

fn fill_block(img: &mut RgbImage, x: u32, y: u32, size: u32, color: Rgb<u8>) {
    for dy in 0..size {
        for dx in 0..size {
            img.put_pixel(x + dx, y + dy, color);
        }
    }
}

fn put_pixel_checked(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line
fn draw_line(img: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_checked(img, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_dot(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_checked(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn lerp_color(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t) as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t) as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t) as u8,
    ]
}

/// Simple pixel-based text drawing (5x7 font, 6 pixels per character).
/// Lowercase letters are drawn as uppercase.
pub fn draw_label(img: &mut RgbImage, text: &str, x: u32, y: u32) {
    let color = Rgb([220, 220, 220]);

    for (i, c) in text.chars().enumerate() {
        let cx = x + (i as u32) * 6;
        draw_char(img, c.to_ascii_uppercase(), cx, y, color);
    }
}

/// Draw a single character using a minimal 5x7 bitmap font
fn draw_char(img: &mut RgbImage, c: char, x: u32, y: u32, color: Rgb<u8>) {
    let bitmap = get_char_bitmap(c);
    for (row, bits) in bitmap.iter().enumerate() {
        for col in 0..5 {
            if (bits >> (4 - col)) & 1 == 1 {
                let px = x + col;
                let py = y + row as u32;
                if px < img.width() && py < img.height() {
                    img.put_pixel(px, py, color);
                }
            }
        }
    }
}

/// Get 5x7 bitmap for a character (returns 7 rows of 5-bit patterns)
fn get_char_bitmap(c: char) -> [u8; 7] {
    match c {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b10010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00000, 0b00100, 0b00000],
        '=' => [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ' ' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        _ => [0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111], // Unknown char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_scale() {
        let mut grid = GridMap::new(3, 2);
        grid.set(2, 1, Cell::Room);
        let img = render_grid(&grid, 4);
        assert_eq!(img.dimensions(), (12, 8));
        assert_eq!(img.get_pixel(0, 0).0, cell_color(Cell::Wall));
        assert_eq!(img.get_pixel(11, 7).0, cell_color(Cell::Room));
        assert_eq!(img.get_pixel(8, 4).0, cell_color(Cell::Room));
    }

    #[test]
    fn test_spectral_endpoints() {
        assert_eq!(spectral_colormap(0.0), [94, 79, 163]);
        let high = spectral_colormap(1.0);
        assert!(high[0] > 150 && high[1] < 10);
    }

    #[test]
    fn test_mst_overlay_marks_centers() {
        let mut grid = GridMap::new(10, 10);
        let rooms = [Room::new(1, 1, 3, 3), Room::new(6, 6, 3, 3)];
        for room in &rooms {
            grid.set(room.x, room.y, Cell::Room);
        }
        let edges = [Edge { a: 0, b: 1, weight: rooms[0].distance_to(&rooms[1]) }];
        let img = render_mst(&grid, &rooms, &edges, 3);
        // Center of room A at cell (2, 2) -> pixel (7, 7)
        assert_eq!(img.get_pixel(7, 7).0, [255, 255, 0]);
        // Midpoint of the diagonal edge
        assert_eq!(img.get_pixel(14, 14).0, [0, 255, 255]);
    }

    #[test]
    fn test_sheet_layout() {
        let tiles = vec![
            ("A".to_string(), ImageBuffer::from_pixel(8, 6, Rgb([255, 0, 0]))),
            ("B".to_string(), ImageBuffer::from_pixel(8, 6, Rgb([0, 255, 0]))),
            ("C".to_string(), ImageBuffer::from_pixel(4, 4, Rgb([0, 0, 255]))),
        ];
        let sheet = compose_sheet(&tiles, 2);
        assert_eq!(sheet.dimensions(), (16, 2 * (6 + LABEL_HEIGHT)));
        assert_eq!(sheet.get_pixel(9, LABEL_HEIGHT).0, [0, 255, 0]);
        assert_eq!(sheet.get_pixel(0, 2 * LABEL_HEIGHT + 6).0, [0, 0, 255]);
    }

    #[test]
    fn test_points_land_on_canvas() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        let img = render_points(&points, 10.0, 10.0, 64);
        assert_eq!(img.get_pixel(0, 0).0, [0, 220, 255]);
        assert_eq!(img.get_pixel(63, 63).0, [0, 220, 255]);
        assert_eq!(img.get_pixel(32, 32).0, BACKGROUND.0);
    }

    #[test]
    fn test_hyphen_label_draws_a_bar() {
        let mut img: RgbImage = ImageBuffer::from_pixel(42, 7, Rgb([0, 0, 0]));
        draw_label(&mut img, "MST-BSP", 0, 0);
        // '-' is the fourth glyph
        let x0 = 3 * 6;
        for col in x0..x0 + 5 {
            for row in 0..7 {
                let lit = img.get_pixel(col, row).0 != [0, 0, 0];
                assert_eq!(lit, row == 3, "pixel ({}, {})", col, row);
            }
        }
    }
}
