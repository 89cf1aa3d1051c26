//! Binary Space Partitioning (BSP) for room generation
//!
//! Three phases over an arena tree:
//! 1. Split: recursively partition the map until partitions are too small
//! 2. Create rooms: one random room per leaf
//! 3. Connect rooms: bottom-up, join a room of each left subtree to a room
//!    of its right sibling with an L-shaped corridor

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::corridors::{carve_l_corridor, stamp_room};
use crate::dungeon::params::{BspConfig, MIN_ROOM_EDGE};
use crate::dungeon::types::{BspTree, NodeId, Rect, Room};
use crate::error::Result;
use crate::tilemap::{Cell, GridMap, Tilemap};

/// Corridor endpoints (room centers) in carve order
pub type Corridor = ((usize, usize), (usize, usize));

/// Finished BSP dungeon
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BspDungeon {
    pub tree: BspTree,
    pub grid: GridMap,
    pub corridors: Vec<Corridor>,
}

impl BspDungeon {
    pub fn rooms(&self) -> Vec<Room> {
        self.tree.rooms()
    }

    /// Group open cells by the BSP node that owns them, in pre-order.
    ///
    /// A leaf owns its room's cells; every node also takes the corridor cells
    /// inside its rectangle that no earlier node claimed.
    pub fn cells_by_label(&self) -> Vec<(String, Vec<(usize, usize)>)> {
        let labels = self.tree.labels();
        let mut claimed = Tilemap::new_with(self.grid.width, self.grid.height, false);
        let mut groups = Vec::with_capacity(self.tree.len());

        for id in self.tree.preorder() {
            let node = self.tree.node(id);
            let mut cells = Vec::new();

            if let Some(room) = node.room.filter(|_| node.is_leaf()) {
                for y in room.y..room.y + room.height {
                    for x in room.x..room.x + room.width {
                        if !*claimed.get(x, y) {
                            claimed.set(x, y, true);
                            cells.push((x, y));
                        }
                    }
                }
            }

            let rect = node.rect;
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    if *self.grid.get(x, y) == Cell::Corridor && !*claimed.get(x, y) {
                        claimed.set(x, y, true);
                        cells.push((x, y));
                    }
                }
            }

            groups.push((labels[id].clone(), cells));
        }

        groups
    }
}

/// Generate a complete BSP dungeon.
pub fn generate_bsp_dungeon(config: &BspConfig, rng: &mut ChaCha8Rng) -> Result<BspDungeon> {
    config.validate()?;

    let mut tree =
        generate_bsp_tree(config.map_width, config.map_height, config.min_partition_size, rng);
    let mut grid = GridMap::new(config.map_width, config.map_height);
    create_rooms_in_bsp(&mut tree, &mut grid, config.max_room_size, rng);
    let corridors = connect_rooms_bsp(&tree, &mut grid, rng);

    info!(
        width = config.map_width,
        height = config.map_height,
        nodes = tree.len(),
        rooms = tree.leaves().len(),
        corridors = corridors.len(),
        "bsp dungeon generated"
    );

    Ok(BspDungeon { tree, grid, corridors })
}

/// Split phase: partition a `width x height` area.
pub fn generate_bsp_tree(
    width: usize,
    height: usize,
    min_size: usize,
    rng: &mut ChaCha8Rng,
) -> BspTree {
    let mut tree = BspTree::new(Rect::new(0, 0, width, height));
    split_node(&mut tree, BspTree::ROOT, min_size, rng);
    debug!(nodes = tree.len(), depth = tree.max_depth(), "bsp split complete");
    tree
}

/// Recursively split a BSP node
fn split_node(tree: &mut BspTree, id: NodeId, min_size: usize, rng: &mut ChaCha8Rng) {
    let Some((left, right)) = choose_split(tree.node(id).rect, min_size, rng) else {
        return;
    };

    let (left_id, right_id) = tree.split(id, left, right);
    split_node(tree, left_id, min_size, rng);
    split_node(tree, right_id, min_size, rng);
}

/// Pick a split for `rect`, or `None` if it is a leaf.
///
/// A coin decides the axis, but a horizontal cut (across the height) is only
/// taken when the height allows it, and is forced when the width does not.
fn choose_split(rect: Rect, min_size: usize, rng: &mut ChaCha8Rng) -> Option<(Rect, Rect)> {
    let limit = min_size * 2;
    if rect.width <= limit && rect.height <= limit {
        return None;
    }

    let split_h = rng.gen_bool(0.5);

    if (split_h && rect.height > limit) || rect.width <= limit {
        let split = rng.gen_range(min_size..rect.height - min_size);
        Some((
            Rect::new(rect.x, rect.y, rect.width, split),
            Rect::new(rect.x, rect.y + split, rect.width, rect.height - split),
        ))
    } else {
        let split = rng.gen_range(min_size..rect.width - min_size);
        Some((
            Rect::new(rect.x, rect.y, split, rect.height),
            Rect::new(rect.x + split, rect.y, rect.width - split, rect.height),
        ))
    }
}

/// Room phase: give every leaf a room and stamp it into the grid.
pub fn create_rooms_in_bsp(
    tree: &mut BspTree,
    grid: &mut GridMap,
    max_room_size: usize,
    rng: &mut ChaCha8Rng,
) {
    for id in tree.leaves() {
        let leaf = tree.node(id).rect;
        let room = random_room_in(leaf, max_room_size, rng);
        stamp_room(grid, &room);
        tree.node_mut(id).room = Some(room);
    }
    debug!(rooms = tree.leaves().len(), "bsp rooms created");
}

/// Room with edges in `[3, min(max_room_size, leaf edge)]` inside the leaf.
/// It keeps off the leaf boundary on every axis with space for a margin.
fn random_room_in(leaf: Rect, max_room_size: usize, rng: &mut ChaCha8Rng) -> Room {
    let room_w = rng.gen_range(MIN_ROOM_EDGE..=max_room_size.min(leaf.width).max(MIN_ROOM_EDGE));
    let room_h = rng.gen_range(MIN_ROOM_EDGE..=max_room_size.min(leaf.height).max(MIN_ROOM_EDGE));
    let room_x = leaf.x + room_offset(leaf.width, room_w, rng);
    let room_y = leaf.y + room_offset(leaf.height, room_h, rng);
    Room::new(room_x, room_y, room_w, room_h)
}

/// Offset of a room edge inside a leaf edge, one cell clear of both ends
/// when the leaf has room for it
fn room_offset(leaf_edge: usize, room_edge: usize, rng: &mut ChaCha8Rng) -> usize {
    if leaf_edge >= room_edge + 2 {
        rng.gen_range(1..=leaf_edge - room_edge - 1)
    } else {
        rng.gen_range(0..=leaf_edge.saturating_sub(room_edge))
    }
}

/// Connect phase: post-order over internal nodes, joining the first room of
/// the left subtree to the first room of the right subtree.
pub fn connect_rooms_bsp(
    tree: &BspTree,
    grid: &mut GridMap,
    rng: &mut ChaCha8Rng,
) -> Vec<Corridor> {
    let mut corridors = Vec::new();

    for id in tree.postorder() {
        let node = tree.node(id);
        let (Some(left), Some(right)) = (node.left, node.right) else {
            continue;
        };

        if let (Some(a), Some(b)) = (tree.first_room(left), tree.first_room(right)) {
            let horizontal_first = rng.gen_bool(0.5);
            carve_l_corridor(grid, a.center(), b.center(), horizontal_first);
            corridors.push((a.center(), b.center()));
        }
    }

    debug!(corridors = corridors.len(), "bsp rooms connected");
    corridors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::rng_from_seed;
    use std::collections::VecDeque;

    fn scenario() -> BspConfig {
        BspConfig {
            map_width: 40,
            map_height: 40,
            min_partition_size: 6,
            max_room_size: 10,
        }
    }

    #[test]
    fn test_same_seed_same_dungeon() {
        let a = generate_bsp_dungeon(&scenario(), &mut rng_from_seed(42)).unwrap();
        let b = generate_bsp_dungeon(&scenario(), &mut rng_from_seed(42)).unwrap();
        assert_eq!(a.rooms(), b.rooms());
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.corridors, b.corridors);
    }

    #[test]
    fn test_different_seed_moves_rooms() {
        let a = generate_bsp_dungeon(&scenario(), &mut rng_from_seed(42)).unwrap();
        let b = generate_bsp_dungeon(&scenario(), &mut rng_from_seed(43)).unwrap();
        assert_ne!(a.rooms(), b.rooms());
    }

    #[test]
    fn test_children_partition_parent() {
        for seed in 0..20 {
            let tree = generate_bsp_tree(40, 40, 6, &mut rng_from_seed(seed));
            for node in tree.nodes() {
                if node.is_leaf() {
                    assert!(node.rect.width >= 6 && node.rect.height >= 6);
                    assert!(node.rect.width <= 12 && node.rect.height <= 12);
                    continue;
                }
                let left = tree.node(node.left.unwrap()).rect;
                let right = tree.node(node.right.unwrap()).rect;
                assert!(node.rect.contains_rect(&left));
                assert!(node.rect.contains_rect(&right));
                assert!(!left.intersects(&right));
                assert_eq!(left.area() + right.area(), node.rect.area());
            }
        }
    }

    #[test]
    fn test_depth_is_bounded_by_partition_size() {
        for seed in 0..20 {
            let tree = generate_bsp_tree(40, 30, 5, &mut rng_from_seed(seed));
            // Every cut removes at least min_size from one axis
            assert!(tree.max_depth() <= 40 / 5 + 30 / 5);
        }
    }

    #[test]
    fn test_rooms_sit_inside_their_leaves() {
        let dungeon = generate_bsp_dungeon(&scenario(), &mut rng_from_seed(7)).unwrap();
        for id in dungeon.tree.leaves() {
            let node = dungeon.tree.node(id);
            let room = node.room.expect("every leaf gets a room");
            assert!(node.rect.contains_rect(&room.rect()));
            assert!(room.width >= 3 && room.width <= 10);
            assert!(room.height >= 3 && room.height <= 10);
            for y in room.y..room.y + room.height {
                for x in room.x..room.x + room.width {
                    assert_eq!(*dungeon.grid.get(x, y), Cell::Room);
                }
            }
        }
        // Only internal nodes own corridors
        assert_eq!(dungeon.corridors.len(), dungeon.tree.leaves().len() - 1);
    }

    #[test]
    fn test_rooms_keep_off_roomy_leaf_edges() {
        for seed in 0..20 {
            let dungeon = generate_bsp_dungeon(&scenario(), &mut rng_from_seed(seed)).unwrap();
            for id in dungeon.tree.leaves() {
                let node = dungeon.tree.node(id);
                let (leaf, room) = (node.rect, node.room.unwrap());
                if leaf.width >= room.width + 2 {
                    assert!(room.x > leaf.x && room.x + room.width < leaf.right());
                }
                if leaf.height >= room.height + 2 {
                    assert!(room.y > leaf.y && room.y + room.height < leaf.bottom());
                }
            }
        }
    }

    #[test]
    fn test_all_open_cells_connected() {
        let dungeon = generate_bsp_dungeon(&scenario(), &mut rng_from_seed(3)).unwrap();
        let grid = &dungeon.grid;
        let start = dungeon.rooms()[0].center();

        let mut seen = Tilemap::new_with(grid.width, grid.height, false);
        let mut queue = VecDeque::from([start]);
        seen.set(start.0, start.1, true);
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
        assert_eq!(reached, grid.count(Cell::is_open));
    }

    #[test]
    fn test_labels_group_every_open_cell_once() {
        let dungeon = generate_bsp_dungeon(&scenario(), &mut rng_from_seed(11)).unwrap();
        let groups = dungeon.cells_by_label();
        assert_eq!(groups[0].0, "A");
        let total: usize = groups.iter().map(|(_, cells)| cells.len()).sum();
        assert_eq!(total, dungeon.grid.count(Cell::is_open));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = BspConfig { max_room_size: 2, ..scenario() };
        assert!(generate_bsp_dungeon(&config, &mut rng_from_seed(1)).is_err());
    }
}
