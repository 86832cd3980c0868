//! Vectile - adaptive streaming of vector map data
//!
//! This library provides an adaptive spatial index that loads geographic
//! feature data over a network-like connection at progressively finer
//! resolution, subdividing the tile grid only where feature density
//! justifies it. Consumers query the tree for the finest resolution data
//! is currently available at over any region.
//!
//! The core pieces:
//!
//! - [`coord`]: Web Mercator tile addressing and projection
//! - [`extent`]: geographic bounding boxes with exact tile equality
//! - [`connection`]: the fetch capability the tree consumes, plus the
//!   HTTP implementation
//! - [`quadtree`]: the density-probing tree itself

pub mod connection;
pub mod coord;
pub mod extent;
pub mod logging;
pub mod quadtree;

pub use connection::{Connection, Feature, FeatureBatch, FetchError};
pub use coord::{CoordError, Quadrant, TileCoord};
pub use extent::Extent;
pub use quadtree::{Density, LoadError, NodeState, QuadNode, Quadtree, UNKNOWN_RESOLUTION};

/// Crate version, exposed for CLI banners.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
