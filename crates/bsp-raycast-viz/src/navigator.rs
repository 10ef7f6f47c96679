//! BSP tree navigation utilities for interactive visualization.

use bsp_raycast::{BspNode, BspTree, NodeId};
use macroquad::prelude::*;

use crate::{draw_aabb, draw_triangles, triangle_color};

/// Child taken at each node in the navigation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Low,
    High,
}

/// Interactive BSP tree navigator for exploring tree structure.
pub struct TreeNavigator {
    path: Vec<Direction>,
}

impl Default for TreeNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeNavigator {
    /// Creates a new navigator starting at the root.
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    /// Returns the current navigation path.
    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    /// Returns the current depth in the tree.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Attempts to navigate to the low child. Returns true if successful.
    pub fn go_low(&mut self, tree: &BspTree<'_>) -> bool {
        self.descend(tree, Direction::Low)
    }

    /// Attempts to navigate to the high child. Returns true if successful.
    pub fn go_high(&mut self, tree: &BspTree<'_>) -> bool {
        self.descend(tree, Direction::High)
    }

    fn descend(&mut self, tree: &BspTree<'_>, direction: Direction) -> bool {
        if self.current_node(tree).is_leaf() {
            return false;
        }
        self.path.push(direction);
        true
    }

    /// Navigates to the parent node. Returns true if not already at root.
    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    /// Returns to the root node.
    pub fn go_root(&mut self) {
        self.path.clear();
    }

    /// Handles keyboard input for navigation.
    /// Returns true if navigation state changed.
    pub fn update(&mut self, tree: &BspTree<'_>) -> bool {
        let mut changed = false;

        if is_key_pressed(KeyCode::L) {
            changed = self.go_low(tree);
        }
        if is_key_pressed(KeyCode::H) {
            changed = self.go_high(tree);
        }
        if is_key_pressed(KeyCode::P) {
            changed = self.go_parent();
        }
        if is_key_pressed(KeyCode::R) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }

        changed
    }

    /// Returns the id of the current node.
    pub fn current_id(&self, tree: &BspTree<'_>) -> NodeId {
        node_at_path(tree, &self.path)
    }

    /// Returns the current node.
    pub fn current_node<'t>(&self, tree: &'t BspTree<'_>) -> &'t BspNode {
        tree.node(self.current_id(tree))
    }

    /// Draws the current node's box, its children's boxes and the triangles
    /// referenced by the leaves below it.
    pub fn render(&self, tree: &BspTree<'_>) {
        let id = self.current_id(tree);
        let node = tree.node(id);

        let mut members: Vec<usize> = Vec::new();
        collect_members(tree, id, &mut members);
        members.sort_unstable();
        members.dedup();
        draw_triangles(&tree.mesh(), members, triangle_color);

        draw_aabb(node.bounds(), YELLOW);
        if let Some([low, high]) = node.children() {
            draw_aabb(tree.node(low).bounds(), SKYBLUE);
            draw_aabb(tree.node(high).bounds(), PINK);
        }
    }

    /// Draws the navigation UI overlay.
    pub fn draw_ui(&self, tree: &BspTree<'_>, y_offset: f32) {
        let node = self.current_node(tree);

        let path_str = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|d| match d {
                    Direction::Low => "L",
                    Direction::High => "H",
                })
                .collect::<Vec<_>>()
                .join(" -> ")
        };

        let detail = match node.split() {
            Some(split) => format!("split {} at {:.3}", ["x", "y", "z"][node.axis()], split),
            None => format!("leaf, {} triangles", node.members().len()),
        };

        draw_text(&detail, 10.0, y_offset, 18.0, WHITE);
        draw_text(
            &format!("Path: {} (depth {})", path_str, self.path.len()),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        draw_text(
            if node.is_leaf() {
                "(leaf)"
            } else {
                "Children: [L]ow [H]igh"
            },
            10.0,
            y_offset + 40.0,
            18.0,
            if node.is_leaf() { ORANGE } else { GREEN },
        );
        draw_text("[P]arent | [R]oot", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}

/// Follows `path` from the root, stopping early at a leaf.
fn node_at_path(tree: &BspTree<'_>, path: &[Direction]) -> NodeId {
    let mut current = NodeId::ROOT;
    for dir in path {
        let Some([low, high]) = tree.node(current).children() else {
            break;
        };
        current = match dir {
            Direction::Low => low,
            Direction::High => high,
        };
    }
    current
}

/// Gathers the triangle indices of every leaf below `id`.
fn collect_members(tree: &BspTree<'_>, id: NodeId, out: &mut Vec<usize>) {
    let node = tree.node(id);
    match node.children() {
        Some([low, high]) => {
            collect_members(tree, low, out);
            collect_members(tree, high, out);
        }
        None => out.extend(node.members().iter().map(|&m| m as usize)),
    }
}
