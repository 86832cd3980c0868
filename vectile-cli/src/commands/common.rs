//! Shared helpers for command output.

use vectile::coord::Quadrant;
use vectile::quadtree::{NodeState, QuadNode};

/// Aggregate counts over a loaded tree.
#[derive(Debug, Default)]
pub struct TreeStats {
    pub nodes: usize,
    pub resolved: usize,
    pub split: usize,
    pub unloaded: usize,
    pub features: usize,
}

impl TreeStats {
    pub fn collect(root: &QuadNode) -> Self {
        let mut stats = TreeStats::default();
        stats.visit(root);
        stats
    }

    fn visit(&mut self, node: &QuadNode) {
        self.nodes += 1;
        match node.state() {
            NodeState::Leaf => {
                self.resolved += 1;
                self.features += node.data().map(|b| b.count()).unwrap_or(0);
            }
            NodeState::Split => self.split += 1,
            NodeState::Unloaded => self.unloaded += 1,
        }
        for quadrant in Quadrant::ALL {
            if let Some(child) = node.child(quadrant) {
                self.visit(child);
            }
        }
    }
}

/// Print the post-load tree report shared by all commands.
pub fn print_tree_report(root: &QuadNode) {
    let stats = TreeStats::collect(root);
    println!(
        "Nodes:      {} ({} resolved, {} split, {} unloaded)",
        stats.nodes, stats.resolved, stats.split, stats.unloaded
    );
    println!("Features:   {}", stats.features);
    println!("Resolution: zoom {} over the root extent", root.zoom(root.extent()));
}
