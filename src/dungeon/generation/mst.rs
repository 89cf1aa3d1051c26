//! Minimum spanning tree room connection (Prim's algorithm)
//!
//! Every round scans all (connected, remaining) room pairs for the shortest
//! center-to-center distance; the first pair found wins ties. Each accepted
//! edge is carved as a Manhattan corridor, horizontal run first.

use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::bsp::{create_rooms_in_bsp, generate_bsp_tree};
use super::corridors::carve_manhattan;
use super::rooms::{place_random_rooms, RoomPlacement};
use crate::dungeon::params::{MstConfig, RoomLayout};
use crate::dungeon::types::{Edge, Room};
use crate::dungeon::{StepEvent, StepGenerator};
use crate::error::Result;
use crate::tilemap::GridMap;

/// Finished MST dungeon
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MstDungeon {
    pub grid: GridMap,
    pub rooms: Vec<Room>,
    /// Tree edges in the order they were added
    pub edges: Vec<Edge>,
}

impl MstDungeon {
    pub fn total_weight(&self) -> f32 {
        self.edges.iter().map(|e| e.weight).sum()
    }
}

/// Cheapest edge from the connected set to a remaining room.
///
/// Returns the edge and the position of the chosen room in `remaining`.
fn cheapest_edge(
    rooms: &[Room],
    connected: &[usize],
    remaining: &[usize],
) -> Option<(Edge, usize)> {
    let mut best: Option<(Edge, usize)> = None;

    for &a in connected {
        for (pos, &b) in remaining.iter().enumerate() {
            let weight = rooms[a].distance_to(&rooms[b]);
            if best.map_or(true, |(edge, _)| weight < edge.weight) {
                best = Some((Edge { a, b, weight }, pos));
            }
        }
    }

    best
}

/// Prim's MST over room centers, without touching any grid.
pub fn minimum_spanning_tree(rooms: &[Room]) -> Vec<Edge> {
    if rooms.is_empty() {
        return Vec::new();
    }

    let mut connected = vec![0];
    let mut remaining: Vec<usize> = (1..rooms.len()).collect();
    let mut edges = Vec::with_capacity(rooms.len() - 1);

    while let Some((edge, pos)) = cheapest_edge(rooms, &connected, &remaining) {
        connected.push(remaining.remove(pos));
        edges.push(edge);
    }

    edges
}

/// Resumable Prim connector: each step adds one edge and carves its corridor.
pub struct MstConnector {
    grid: GridMap,
    rooms: Vec<Room>,
    connected: Vec<usize>,
    remaining: Vec<usize>,
    edges: Vec<Edge>,
}

impl MstConnector {
    /// Rooms are expected to be stamped into `grid` already.
    pub fn new(grid: GridMap, rooms: Vec<Room>) -> Self {
        let (connected, remaining) = if rooms.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            (vec![0], (1..rooms.len()).collect())
        };

        Self {
            grid,
            edges: Vec::with_capacity(rooms.len().saturating_sub(1)),
            rooms,
            connected,
            remaining,
        }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

impl StepGenerator for MstConnector {
    type Output = MstDungeon;

    fn step(&mut self) -> StepEvent {
        let Some((edge, pos)) = cheapest_edge(&self.rooms, &self.connected, &self.remaining) else {
            return StepEvent::Finished;
        };

        let (from, to) = (self.rooms[edge.a].center(), self.rooms[edge.b].center());
        let carved = carve_manhattan(&mut self.grid, from, to);
        trace!(a = edge.a, b = edge.b, weight = edge.weight, carved, "mst edge");

        self.connected.push(self.remaining.remove(pos));
        self.edges.push(edge);
        StepEvent::Connected { edge }
    }

    fn is_finished(&self) -> bool {
        self.remaining.is_empty()
    }

    fn grid(&self) -> &GridMap {
        &self.grid
    }

    fn finish(self) -> MstDungeon {
        debug!(rooms = self.rooms.len(), edges = self.edges.len(), "mst connection finished");
        MstDungeon {
            grid: self.grid,
            rooms: self.rooms,
            edges: self.edges,
        }
    }
}

/// Connect already-stamped rooms in place. Returns the tree edges.
pub fn connect_rooms(grid: &mut GridMap, rooms: &[Room]) -> Vec<Edge> {
    let edges = minimum_spanning_tree(rooms);
    for edge in &edges {
        carve_manhattan(grid, rooms[edge.a].center(), rooms[edge.b].center());
    }
    edges
}

/// Lay out rooms per `config.layout` and return a connector ready to step.
pub fn mst_connector(config: &MstConfig, rng: &mut ChaCha8Rng) -> Result<MstConnector> {
    config.validate()?;

    let mut grid = GridMap::new(config.map_width, config.map_height);
    let rooms = match config.layout {
        RoomLayout::Random => place_random_rooms(
            &mut grid,
            RoomPlacement {
                room_count: config.room_count,
                min_size: config.min_room_size,
                max_size: config.max_room_size,
                attempts: config.placement_attempts,
            },
            rng,
        ),
        RoomLayout::Bsp => {
            let mut tree = generate_bsp_tree(
                config.map_width,
                config.map_height,
                config.min_partition_size,
                rng,
            );
            create_rooms_in_bsp(&mut tree, &mut grid, config.max_room_size, rng);
            tree.rooms()
        }
    };

    Ok(MstConnector::new(grid, rooms))
}

/// Generate a complete MST-connected dungeon.
pub fn generate_mst_dungeon(config: &MstConfig, rng: &mut ChaCha8Rng) -> Result<MstDungeon> {
    let dungeon = mst_connector(config, rng)?.run();

    info!(
        width = config.map_width,
        height = config.map_height,
        layout = ?config.layout,
        rooms = dungeon.rooms.len(),
        total_weight = dungeon.total_weight(),
        "mst dungeon generated"
    );

    Ok(dungeon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::rng_from_seed;
    use crate::tilemap::{Cell, Tilemap};
    use std::collections::VecDeque;

    fn find(parent: &mut [usize], i: usize) -> usize {
        let mut root = i;
        while parent[root] != root {
            root = parent[root];
        }
        root
    }

    /// Union-find check that `edges` connect all `n` rooms without a cycle
    fn is_spanning_tree(n: usize, edges: &[Edge]) -> bool {
        if edges.len() != n - 1 {
            return false;
        }
        let mut parent: Vec<usize> = (0..n).collect();
        for e in edges {
            let (ra, rb) = (find(&mut parent, e.a), find(&mut parent, e.b));
            if ra == rb {
                return false;
            }
            parent[ra] = rb;
        }
        true
    }

    fn scattered_rooms(n: usize, seed: u64) -> Vec<Room> {
        let mut grid = GridMap::new(60, 60);
        let placement = RoomPlacement {
            room_count: n,
            min_size: 3,
            max_size: 5,
            attempts: 100,
        };
        place_random_rooms(&mut grid, placement, &mut rng_from_seed(seed))
    }

    #[test]
    fn test_tree_spans_all_rooms() {
        for seed in 0..10 {
            let rooms = scattered_rooms(8, seed);
            let edges = minimum_spanning_tree(&rooms);
            assert_eq!(edges.len(), rooms.len() - 1);
            assert!(is_spanning_tree(rooms.len(), &edges));
        }
    }

    #[test]
    fn test_tree_weight_is_minimal() {
        for seed in 0..5 {
            let rooms = scattered_rooms(6, seed);
            let n = rooms.len();
            let all: Vec<Edge> = (0..n)
                .flat_map(|a| (a + 1..n).map(move |b| (a, b)))
                .map(|(a, b)| Edge { a, b, weight: rooms[a].distance_to(&rooms[b]) })
                .collect();

            // Brute force over every (n - 1)-subset of the complete graph
            let mut best = f32::MAX;
            for mask in 0u32..(1 << all.len()) {
                if mask.count_ones() as usize != n - 1 {
                    continue;
                }
                let subset: Vec<Edge> = (0..all.len())
                    .filter(|i| mask & (1 << i) != 0)
                    .map(|i| all[i])
                    .collect();
                if is_spanning_tree(n, &subset) {
                    best = best.min(subset.iter().map(|e| e.weight).sum());
                }
            }

            let prim: f32 = minimum_spanning_tree(&rooms).iter().map(|e| e.weight).sum();
            assert!(prim <= best + 1e-3, "prim {} vs brute force {}", prim, best);
        }
    }

    #[test]
    fn test_ties_go_to_first_found() {
        // B and C are equally far from A; B comes first
        let rooms = vec![Room::new(10, 10, 3, 3), Room::new(20, 10, 3, 3), Room::new(0, 10, 3, 3)];
        let edges = minimum_spanning_tree(&rooms);
        assert_eq!((edges[0].a, edges[0].b), (0, 1));
        assert_eq!((edges[1].a, edges[1].b), (0, 2));
    }

    #[test]
    fn test_degenerate_room_lists() {
        assert!(minimum_spanning_tree(&[]).is_empty());
        assert!(minimum_spanning_tree(&[Room::new(1, 1, 3, 3)]).is_empty());

        let connector = MstConnector::new(GridMap::new(5, 5), Vec::new());
        assert!(connector.is_finished());
        assert!(connector.run().edges.is_empty());
    }

    #[test]
    fn test_dungeon_is_one_region() {
        for layout in [RoomLayout::Random, RoomLayout::Bsp] {
            let config = MstConfig { layout, ..Default::default() };
            let dungeon = generate_mst_dungeon(&config, &mut rng_from_seed(21)).unwrap();
            let grid = &dungeon.grid;

            let start = dungeon.rooms[0].center();
            let mut seen = Tilemap::new_with(grid.width, grid.height, false);
            seen.set(start.0, start.1, true);
            let mut queue = VecDeque::from([start]);
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
            assert_eq!(reached, grid.count(Cell::is_open), "{:?} layout", layout);
        }
    }

    #[test]
    fn test_stepping_matches_full_run() {
        let config = MstConfig::default();
        let full = generate_mst_dungeon(&config, &mut rng_from_seed(8)).unwrap();

        let mut connector = mst_connector(&config, &mut rng_from_seed(8)).unwrap();
        let mut events = 0;
        while !connector.is_finished() {
            assert!(matches!(connector.step(), StepEvent::Connected { .. }));
            events += 1;
        }
        assert_eq!(connector.step(), StepEvent::Finished);
        let stepped = connector.finish();

        assert_eq!(events, full.rooms.len() - 1);
        assert_eq!(stepped, full);
    }

    #[test]
    fn test_same_seed_same_dungeon() {
        let config = MstConfig::default();
        let a = generate_mst_dungeon(&config, &mut rng_from_seed(99)).unwrap();
        let b = generate_mst_dungeon(&config, &mut rng_from_seed(99)).unwrap();
        assert_eq!(a, b);

        let mut grid = a.grid.clone();
        assert_eq!(connect_rooms(&mut grid, &a.rooms), a.edges);
    }
}
