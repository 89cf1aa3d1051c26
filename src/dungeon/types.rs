//! Dungeon data types
//!
//! Rooms, MST edges and the arena-backed BSP tree. Everything here is plain
//! data: generators own these values for one run and hand them to the caller.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle of cells, `[x, x + width) x [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    /// One past the last column
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the last row
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Grow by `margin` cells on every side (saturating at zero).
    pub fn expanded(&self, margin: usize) -> Rect {
        let x = self.x.saturating_sub(margin);
        let y = self.y.saturating_sub(margin);
        Rect {
            x,
            y,
            width: self.right() + margin - x,
            height: self.bottom() + margin - y,
        }
    }
}

/// A rectangular room. The center is derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Room {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Euclidean distance between room centers
    pub fn distance_to(&self, other: &Room) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        let dx = ax as f32 - bx as f32;
        let dy = ay as f32 - by as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Display letter for the room at `index` (A, B, ... wrapping after Z).
pub fn room_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// An MST edge between two rooms, by index into the room list.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    /// Euclidean distance between the two room centers
    pub weight: f32,
}

// =============================================================================
// BSP TREE
// =============================================================================

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BspNode {
    pub rect: Rect,
    pub depth: usize,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Room within this leaf node (if any)
    pub room: Option<Room>,
}

impl BspNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Arena of BSP nodes; node 0 is the root.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BspTree {
    nodes: Vec<BspNode>,
}

impl BspTree {
    pub fn new(root: Rect) -> Self {
        Self {
            nodes: vec![BspNode {
                rect: root,
                depth: 0,
                left: None,
                right: None,
                room: None,
            }],
        }
    }

    pub const ROOT: NodeId = 0;

    pub fn node(&self, id: NodeId) -> &BspNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut BspNode {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach two children to a leaf. The caller guarantees they partition
    /// the parent's rectangle.
    pub fn split(&mut self, id: NodeId, left: Rect, right: Rect) -> (NodeId, NodeId) {
        let depth = self.nodes[id].depth + 1;
        let left_id = self.nodes.len();
        let right_id = left_id + 1;
        for rect in [left, right] {
            self.nodes.push(BspNode {
                rect,
                depth,
                left: None,
                right: None,
                room: None,
            });
        }
        let node = &mut self.nodes[id];
        node.left = Some(left_id);
        node.right = Some(right_id);
        (left_id, right_id)
    }

    /// Node ids in pre-order (node, left subtree, right subtree).
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = &self.nodes[id];
            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
        }
        order
    }

    /// Node ids in post-order (left subtree, right subtree, node).
    pub fn postorder(&self) -> Vec<NodeId> {
        // Reverse of (node, right, left) pre-order
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = &self.nodes[id];
            if let Some(left) = node.left {
                stack.push(left);
            }
            if let Some(right) = node.right {
                stack.push(right);
            }
        }
        order.reverse();
        order
    }

    /// Leaf ids, left to right.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.nodes[id].is_leaf())
            .collect()
    }

    /// Rooms of all leaves, left to right.
    pub fn rooms(&self) -> Vec<Room> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.nodes[id].room)
            .collect()
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// First room found by a left-first walk of the subtree rooted at `id`.
    pub fn first_room(&self, id: NodeId) -> Option<Room> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            if let Some(room) = node.room {
                return Some(room);
            }
            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
        }
        None
    }

    /// Hierarchical labels indexed by node id.
    ///
    /// The root is `A`; every other node appends one letter to its parent's
    /// label, taken from a running pre-order counter (wrapping after `Z`).
    pub fn labels(&self) -> Vec<String> {
        let mut labels = vec![String::new(); self.nodes.len()];
        let mut counter = 0usize;
        let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(Self::ROOT, None)];

        while let Some((id, parent)) = stack.pop() {
            labels[id] = match parent {
                None => "A".to_string(),
                Some(p) => {
                    counter += 1;
                    let mut label = labels[p].clone();
                    label.push((b'A' + (counter % 26) as u8) as char);
                    label
                }
            };
            let node = &self.nodes[id];
            if let Some(right) = node.right {
                stack.push((right, Some(id)));
            }
            if let Some(left) = node.left {
                stack.push((left, Some(id)));
            }
        }

        labels
    }
}
