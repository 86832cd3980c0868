//! Adaptive density-probing tile tree.
//!
//! The tree progressively loads feature data at increasing resolution,
//! subdividing a region only where feature density justifies it, and
//! reports, for any queried region, the finest resolution data is currently
//! available at.
//!
//! # Loading
//!
//! [`Quadtree::load`] resolves the tree down to a requested depth. At each
//! level one designated child is probed first; a dense probe commits the
//! node to loading the remaining three children (recursively probed the
//! same way), a sparse probe collapses the node to a single coarse fetch of
//! its whole extent. Sparse regions therefore cost two fetches instead of
//! up to `4^depth`.
//!
//! # Querying
//!
//! [`Quadtree::zoom`] reports the finest tile zoom at which loaded data
//! overlaps a query extent, answering [`UNKNOWN_RESOLUTION`] for regions
//! not yet resolved so consumers keep requesting detail rather than
//! under-rendering.
//!
//! # Example
//!
//! ```ignore
//! use vectile::connection::{AsyncReqwestClient, HttpConnection};
//! use vectile::coord::TileCoord;
//! use vectile::quadtree::Quadtree;
//!
//! let client = AsyncReqwestClient::new()?;
//! let connection = HttpConnection::new(client, "https://example.com/features");
//! let root = TileCoord::new(0, 0, 0)?;
//! let mut tree = Quadtree::new(connection, root).with_density_threshold(2);
//!
//! let target = tree.extent().clone();
//! let density = tree.load(&target, 2).await?;
//! let achieved = tree.zoom(&target);
//! ```

mod loader;
mod node;

pub use loader::{Density, LoadError};
pub use node::{Children, NodeState, QuadNode, UNKNOWN_RESOLUTION};

use tracing::debug;

use crate::connection::Connection;
use crate::coord::{TileCoord, MAX_ZOOM};
use crate::extent::Extent;

/// Default feature count at which a fetched batch classifies as dense.
pub const DEFAULT_DENSITY_THRESHOLD: usize = 4;

/// Handle owning an adaptive tile tree and the connection feeding it.
///
/// Mutation (loading) requires exclusive access; queries borrow shared, so
/// the type system rules out observing a node mid-transition.
pub struct Quadtree<C> {
    connection: C,
    density_threshold: usize,
    root: QuadNode,
}

impl<C: Connection> Quadtree<C> {
    /// Create a tree rooted at the given tile.
    pub fn new(connection: C, tile: TileCoord) -> Self {
        Self {
            connection,
            density_threshold: DEFAULT_DENSITY_THRESHOLD,
            root: QuadNode::new(tile),
        }
    }

    /// Sets the feature count at which a batch classifies as dense.
    ///
    /// Fixed for the lifetime of the tree and shared by every node. Values
    /// below 1 are clamped to 1 (a zero threshold would classify empty
    /// batches dense and subdivide everywhere).
    pub fn with_density_threshold(mut self, density_threshold: usize) -> Self {
        self.density_threshold = density_threshold.max(1);
        self
    }

    /// The configured density threshold.
    pub fn density_threshold(&self) -> usize {
        self.density_threshold
    }

    /// The root node.
    pub fn root(&self) -> &QuadNode {
        &self.root
    }

    /// The connection feeding the tree.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Bounding box of the root tile.
    pub fn extent(&self) -> &Extent {
        self.root.extent()
    }

    /// Whether the point falls inside the root tile.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.root.contains(lat, lon)
    }

    /// Finest zoom level at which loaded data covers any part of `query`.
    ///
    /// See [`QuadNode::zoom`]; safe to call between loads, including on a
    /// tree whose last load failed partway.
    pub fn zoom(&self, query: &Extent) -> u8 {
        self.root.zoom(query)
    }

    /// Resolves data for the tree down to at most `depth` additional levels.
    ///
    /// `target` records the caller's region of interest for diagnostics;
    /// resolution always covers each visited node's full extent. Returns
    /// the root's density classification on success.
    ///
    /// # Errors
    ///
    /// [`LoadError::MaxZoomExceeded`] if `depth` would subdivide past
    /// [`MAX_ZOOM`]; [`LoadError::Fetch`] if the root's own resolution
    /// failed. Fetch failures deeper in the tree abort only their own
    /// subtree: the affected node stays unloaded (and keeps answering
    /// [`UNKNOWN_RESOLUTION`]) while siblings resolve independently, so a
    /// later identical `load` retries exactly the unresolved parts.
    pub async fn load(&mut self, target: &Extent, depth: u8) -> Result<Density, LoadError> {
        let zoom = self.root.tile().zoom();
        if u32::from(zoom) + u32::from(depth) > u32::from(MAX_ZOOM) {
            return Err(LoadError::MaxZoomExceeded { zoom, depth });
        }

        debug!(root = %self.root.tile(), target = %target, depth, "loading tile tree");
        loader::load_node(
            &mut self.root,
            &self.connection,
            self.density_threshold,
            depth,
        )
        .await
    }
}
