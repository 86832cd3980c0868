//! Quadrant tree nodes.
//!
//! A [`QuadNode`] owns up to four children (strict ownership tree, no back
//! references) and an optional batch of loaded features. Shape changes only
//! through [`QuadNode::split`]; data changes only through the loader.

use crate::connection::FeatureBatch;
use crate::coord::{Quadrant, TileCoord};
use crate::extent::Extent;

/// Resolution reported for regions nothing has been loaded for yet.
///
/// Read as "unknown, assume the maximum configured detail is still
/// required", so consumers keep requesting detail instead of mistaking
/// "no data yet" for "confirmed empty".
pub const UNKNOWN_RESOLUTION: u8 = 16;

/// Lifecycle state of a node, derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// No fetch has completed for this node's extent.
    Unloaded,
    /// A completed fetch resolved this node's extent. Children, if present,
    /// are inert placeholders left behind by a sparse collapse; the node's
    /// own data governs its resolution.
    Leaf,
    /// Resolution is delegated entirely to the four children.
    Split,
}

/// A node of the adaptive tile tree, addressed by its tile coordinates.
pub struct QuadNode {
    tile: TileCoord,
    extent: Extent,
    children: Option<Box<Children>>,
    data: Option<FeatureBatch>,
}

/// The four children of a split node.
pub struct Children {
    nw: QuadNode,
    ne: QuadNode,
    sw: QuadNode,
    se: QuadNode,
}

impl Children {
    fn new(tile: TileCoord) -> Self {
        Self {
            nw: QuadNode::new(tile.child(Quadrant::Nw)),
            ne: QuadNode::new(tile.child(Quadrant::Ne)),
            sw: QuadNode::new(tile.child(Quadrant::Sw)),
            se: QuadNode::new(tile.child(Quadrant::Se)),
        }
    }

    /// Child in the given quadrant.
    pub fn get(&self, quadrant: Quadrant) -> &QuadNode {
        match quadrant {
            Quadrant::Nw => &self.nw,
            Quadrant::Ne => &self.ne,
            Quadrant::Sw => &self.sw,
            Quadrant::Se => &self.se,
        }
    }

    pub(super) fn get_mut(&mut self, quadrant: Quadrant) -> &mut QuadNode {
        match quadrant {
            Quadrant::Nw => &mut self.nw,
            Quadrant::Ne => &mut self.ne,
            Quadrant::Sw => &mut self.sw,
            Quadrant::Se => &mut self.se,
        }
    }

    /// Iterate the children in canonical quadrant order.
    pub fn iter(&self) -> impl Iterator<Item = &QuadNode> {
        [&self.nw, &self.ne, &self.sw, &self.se].into_iter()
    }
}

impl QuadNode {
    pub(crate) fn new(tile: TileCoord) -> Self {
        Self {
            tile,
            extent: Extent::from_tile(tile),
            children: None,
            data: None,
        }
    }

    /// Tile coordinates addressing this node.
    #[inline]
    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    /// Cached bounding box of this node's tile.
    #[inline]
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Loaded feature batch, if a fetch has resolved this node.
    pub fn data(&self) -> Option<&FeatureBatch> {
        self.data.as_ref()
    }

    /// Child in the given quadrant, if this node has been split.
    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadNode> {
        self.children.as_deref().map(|c| c.get(quadrant))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> NodeState {
        if self.data.is_some() {
            NodeState::Leaf
        } else if self.children.is_some() {
            NodeState::Split
        } else {
            NodeState::Unloaded
        }
    }

    /// Whether the point falls inside this node's extent.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.extent.contains(lat, lon)
    }

    /// Splits the node into four unloaded children.
    ///
    /// Idempotent by state: an already-split node is untouched, children
    /// included. Otherwise any loaded batch is discarded (a stale coarse
    /// batch would shadow the children at zoom queries) and the four
    /// children are created unloaded. The only tree-shape mutator; no I/O.
    pub fn split(&mut self) -> &mut Children {
        let tile = self.tile;
        if self.children.is_none() {
            self.data = None;
        }
        self.children.get_or_insert_with(|| Box::new(Children::new(tile)))
    }

    pub(super) fn set_data(&mut self, batch: FeatureBatch) {
        self.data = Some(batch);
    }

    /// Finest zoom level at which loaded data covers any part of `query`.
    ///
    /// Pure and synchronous; callable while a load is in flight elsewhere in
    /// the program, in which case the answer reflects the partially-loaded
    /// tree. Regions the query does not reach contribute 0; resolved nodes
    /// report their tile zoom; split nodes report the finest of their
    /// children; unloaded regions report [`UNKNOWN_RESOLUTION`].
    pub fn zoom(&self, query: &Extent) -> u8 {
        if !self.extent.intersects(query) {
            return 0;
        }
        if self.data.is_some() {
            return self.tile.zoom();
        }
        match self.children {
            Some(ref children) => children.iter().map(|c| c.zoom(query)).max().unwrap_or(0),
            None => UNKNOWN_RESOLUTION,
        }
    }
}
