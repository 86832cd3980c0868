//! Density-probe load algorithm.
//!
//! Resolving a subtree naively costs up to `4^depth` fetches. The loader
//! instead probes one designated child per node first: a dense probe commits
//! the node to full subdivision, a sparse probe collapses the node to a
//! single coarse fetch of its own extent. Total fetch count then tracks the
//! actual feature distribution rather than the worst-case depth.

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, warn};

use super::node::QuadNode;
use crate::connection::{Connection, FetchError};
use crate::coord::{Quadrant, TileCoord, MAX_ZOOM};

/// Child probed first when estimating a subtree's density.
///
/// Together with [`REMAINING`] this fixes the fetch sequence tree-wide;
/// final tree state does not depend on the choice, only the observable
/// fetch order does.
pub(super) const PROBE: Quadrant = Quadrant::Se;

/// Visitation order of the other children once a probe came back dense.
pub(super) const REMAINING: [Quadrant; 3] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw];

/// Density classification of a resolved subtree.
///
/// The completion signal of a load: a batch whose count reaches the tree's
/// density threshold is `Dense`, anything smaller is `Sparse`. For split
/// subtrees the classification is the probed child's, propagated upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Dense,
    Sparse,
}

/// Errors surfaced by [`Quadtree::load`](super::Quadtree::load).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The connection failed fetching a tile's extent. The named node is
    /// left unloaded; a later load may retry it.
    #[error("fetch failed for tile {tile}: {source}")]
    Fetch {
        tile: TileCoord,
        #[source]
        source: FetchError,
    },
    /// The requested depth would subdivide past the deepest tile zoom.
    #[error("loading {depth} levels below zoom {zoom} exceeds maximum zoom {max}", max = MAX_ZOOM)]
    MaxZoomExceeded { zoom: u8, depth: u8 },
}

/// Resolves `node` down to at most `depth` additional levels.
///
/// Boxed because async recursion needs an indirection; every recursive call
/// is independently fallible and failures stay local to their subtree.
pub(super) fn load_node<'a, C: Connection>(
    node: &'a mut QuadNode,
    connection: &'a C,
    density_threshold: usize,
    depth: u8,
) -> BoxFuture<'a, Result<Density, LoadError>> {
    Box::pin(async move {
        if depth == 0 {
            return fetch_leaf(node, connection, density_threshold).await;
        }

        let tile = node.tile();
        let children = node.split();
        let probed = load_node(
            children.get_mut(PROBE),
            connection,
            density_threshold,
            depth - 1,
        )
        .await?;

        match probed {
            Density::Dense => {
                for quadrant in REMAINING {
                    let child = children.get_mut(quadrant);
                    if let Err(error) =
                        load_node(child, connection, density_threshold, depth - 1).await
                    {
                        // The subtree stays unresolved and keeps answering
                        // the unknown-resolution sentinel; its siblings are
                        // unaffected and a later load may retry it.
                        warn!(tile = %tile, subtree = ?quadrant, %error, "subtree load failed");
                    }
                }
                debug!(tile = %tile, depth, "subtree resolved dense");
                Ok(Density::Dense)
            }
            Density::Sparse => {
                // One coarse fetch for the node's own extent instead of
                // three more subtrees. The probe child keeps its batch; the
                // node's own data takes precedence at zoom queries.
                let extent = node.extent().clone();
                let batch = connection
                    .fetch_extent(&extent)
                    .await
                    .map_err(|source| LoadError::Fetch { tile, source })?;
                debug!(tile = %tile, depth, count = batch.count(), "subtree collapsed sparse");
                node.set_data(batch);
                Ok(Density::Sparse)
            }
        }
    })
}

/// Base case: one fetch for the node's own extent, classified against the
/// density threshold. The batch is stored either way; on failure the node
/// is left untouched.
async fn fetch_leaf<C: Connection>(
    node: &mut QuadNode,
    connection: &C,
    density_threshold: usize,
) -> Result<Density, LoadError> {
    let tile = node.tile();
    let extent = node.extent().clone();
    let batch = connection
        .fetch_extent(&extent)
        .await
        .map_err(|source| LoadError::Fetch { tile, source })?;

    let density = if batch.count() >= density_threshold {
        Density::Dense
    } else {
        Density::Sparse
    };
    debug!(tile = %tile, count = batch.count(), ?density, "tile resolved");
    node.set_data(batch);
    Ok(density)
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::super::Quadtree;
    use super::*;
    use crate::connection::{Feature, FeatureBatch};
    use crate::coord::TileCoord;
    use crate::extent::Extent;
    use crate::quadtree::NodeState;

    /// Connection driven by a closure, recording every fetched extent.
    struct ScriptedConnection<F> {
        respond: F,
        fetched: Mutex<Vec<Extent>>,
    }

    impl<F> ScriptedConnection<F>
    where
        F: Fn(&Extent) -> Result<FeatureBatch, FetchError> + Send + Sync,
    {
        fn new(respond: F) -> Self {
            Self {
                respond,
                fetched: Mutex::new(Vec::new()),
            }
        }
    }

    impl<F> Connection for ScriptedConnection<F>
    where
        F: Fn(&Extent) -> Result<FeatureBatch, FetchError> + Send + Sync,
    {
        async fn fetch_extent(&self, extent: &Extent) -> Result<FeatureBatch, FetchError> {
            self.fetched.lock().push(extent.clone());
            (self.respond)(extent)
        }
    }

    fn batch(count: usize) -> FeatureBatch {
        FeatureBatch::new(
            (0..count)
                .map(|i| Feature {
                    id: i as u64,
                    lon: 0.0,
                    lat: 0.0,
                })
                .collect(),
        )
    }

    fn tile(x: u32, y: u32, zoom: u8) -> TileCoord {
        TileCoord::new(x, y, zoom).unwrap()
    }

    fn tile_extent(x: u32, y: u32, zoom: u8) -> Extent {
        Extent::from_tile(tile(x, y, zoom))
    }

    fn world_tree<F>(respond: F, threshold: usize) -> Quadtree<ScriptedConnection<F>>
    where
        F: Fn(&Extent) -> Result<FeatureBatch, FetchError> + Send + Sync,
    {
        Quadtree::new(ScriptedConnection::new(respond), tile(0, 0, 0))
            .with_density_threshold(threshold)
    }

    #[tokio::test]
    async fn test_depth_zero_dense() {
        let mut tree = world_tree(|_| Ok(batch(3)), 2);
        let target = tree.extent().clone();

        let density = tree.load(&target, 0).await.unwrap();

        assert_eq!(density, Density::Dense);
        assert_eq!(tree.root().state(), NodeState::Leaf);
        assert_eq!(tree.root().data().unwrap().count(), 3);
        let fetched = tree.connection().fetched.lock();
        assert_eq!(*fetched, vec![target]);
    }

    #[tokio::test]
    async fn test_depth_zero_sparse() {
        let mut tree = world_tree(|_| Ok(batch(1)), 2);
        let target = tree.extent().clone();

        let density = tree.load(&target, 0).await.unwrap();

        assert_eq!(density, Density::Sparse);
        assert_eq!(tree.root().state(), NodeState::Leaf);
    }

    #[tokio::test]
    async fn test_depth_zero_failure_leaves_node_unloaded() {
        let mut tree = world_tree(
            |_| Err(FetchError::Http("connection reset".to_string())),
            2,
        );
        let target = tree.extent().clone();

        let result = tree.load(&target, 0).await;

        match result {
            Err(LoadError::Fetch { tile, .. }) => assert_eq!(tile, TileCoord::new(0, 0, 0).unwrap()),
            other => panic!("expected fetch error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(tree.root().state(), NodeState::Unloaded);
        assert_eq!(tree.zoom(&target), crate::quadtree::UNKNOWN_RESOLUTION);
        assert_eq!(tree.connection().fetched.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_depth_one_all_dense_fetches_each_child_probe_first() {
        let mut tree = world_tree(|_| Ok(batch(3)), 2);
        let target = tree.extent().clone();

        let density = tree.load(&target, 1).await.unwrap();

        assert_eq!(density, Density::Dense);
        let fetched = tree.connection().fetched.lock();
        assert_eq!(
            *fetched,
            vec![
                tile_extent(1, 1, 1), // probe (se)
                tile_extent(0, 0, 1), // nw
                tile_extent(1, 0, 1), // ne
                tile_extent(0, 1, 1), // sw
            ]
        );
        drop(fetched);

        assert_eq!(tree.root().state(), NodeState::Split);
        assert!(tree.root().data().is_none());
        for quadrant in Quadrant::ALL {
            assert_eq!(
                tree.root().child(quadrant).unwrap().state(),
                NodeState::Leaf
            );
        }
    }

    #[tokio::test]
    async fn test_depth_one_all_sparse_collapses_to_own_extent() {
        let mut tree = world_tree(|_| Ok(batch(1)), 2);
        let target = tree.extent().clone();

        let density = tree.load(&target, 1).await.unwrap();

        assert_eq!(density, Density::Sparse);
        let fetched = tree.connection().fetched.lock();
        assert_eq!(
            *fetched,
            vec![
                tile_extent(1, 1, 1), // probe (se)
                tile_extent(0, 0, 0), // the node's own extent
            ]
        );
        drop(fetched);

        // Resolved by its own data despite having been split
        assert_eq!(tree.root().state(), NodeState::Leaf);
        assert!(tree.root().data().is_some());
        assert!(tree.root().child(Quadrant::Se).is_some());
        assert_eq!(
            tree.root().child(Quadrant::Nw).unwrap().state(),
            NodeState::Unloaded
        );
    }

    #[tokio::test]
    async fn test_sparse_collapse_classification_ignores_own_count() {
        // The probe decides sparseness; the coarse batch for the node's own
        // extent may well reach the threshold on its own.
        let world = tile_extent(0, 0, 0);
        let mut tree = world_tree(
            move |extent| {
                if *extent == world {
                    Ok(batch(10))
                } else {
                    Ok(batch(1))
                }
            },
            2,
        );
        let target = tree.extent().clone();

        let density = tree.load(&target, 1).await.unwrap();

        assert_eq!(density, Density::Sparse);
        assert_eq!(tree.root().data().unwrap().count(), 10);
    }

    #[tokio::test]
    async fn test_probe_failure_aborts_node_and_skips_siblings() {
        let probe_extent = tile_extent(1, 1, 1);
        let mut tree = world_tree(
            move |extent| {
                if *extent == probe_extent {
                    Err(FetchError::Http("timeout".to_string()))
                } else {
                    Ok(batch(3))
                }
            },
            2,
        );
        let target = tree.extent().clone();

        let result = tree.load(&target, 1).await;

        assert!(matches!(result, Err(LoadError::Fetch { .. })));
        // Only the probe fetch was issued
        assert_eq!(tree.connection().fetched.lock().len(), 1);
        // The shape change stays, but nothing is resolved
        assert_eq!(tree.root().state(), NodeState::Split);
        assert_eq!(tree.zoom(&target), crate::quadtree::UNKNOWN_RESOLUTION);
    }

    #[tokio::test]
    async fn test_sibling_failure_does_not_abort_other_siblings() {
        let nw_extent = tile_extent(0, 0, 1);
        let mut tree = world_tree(
            move |extent| {
                if *extent == nw_extent {
                    Err(FetchError::Http("timeout".to_string()))
                } else {
                    Ok(batch(3))
                }
            },
            2,
        );
        let target = tree.extent().clone();

        // The node as a whole still resolves dense
        let density = tree.load(&target, 1).await.unwrap();
        assert_eq!(density, Density::Dense);

        // All four fetches were attempted
        assert_eq!(tree.connection().fetched.lock().len(), 4);

        assert_eq!(
            tree.root().child(Quadrant::Nw).unwrap().state(),
            NodeState::Unloaded
        );
        for quadrant in [Quadrant::Ne, Quadrant::Sw, Quadrant::Se] {
            assert_eq!(
                tree.root().child(quadrant).unwrap().state(),
                NodeState::Leaf
            );
        }
        // The unresolved quadrant keeps the query conservative
        assert_eq!(tree.zoom(&target), crate::quadtree::UNKNOWN_RESOLUTION);
    }

    #[tokio::test]
    async fn test_failed_node_is_retryable() {
        use std::sync::atomic::{AtomicBool, Ordering};

        static FAIL_NW: AtomicBool = AtomicBool::new(true);
        let nw_extent = tile_extent(0, 0, 1);
        let mut tree = world_tree(
            move |extent| {
                if *extent == nw_extent && FAIL_NW.load(Ordering::Relaxed) {
                    Err(FetchError::Http("timeout".to_string()))
                } else {
                    Ok(batch(3))
                }
            },
            2,
        );
        let target = tree.extent().clone();

        tree.load(&target, 1).await.unwrap();
        assert_eq!(
            tree.root().child(Quadrant::Nw).unwrap().state(),
            NodeState::Unloaded
        );

        FAIL_NW.store(false, Ordering::Relaxed);
        tree.load(&target, 1).await.unwrap();
        assert_eq!(
            tree.root().child(Quadrant::Nw).unwrap().state(),
            NodeState::Leaf
        );
        assert_eq!(tree.zoom(&target), 1);
    }

    #[tokio::test]
    async fn test_load_past_max_zoom_is_refused() {
        let connection = ScriptedConnection::new(|_| Ok(batch(1)));
        let mut tree = Quadtree::new(connection, tile(0, 0, 17)).with_density_threshold(2);
        let target = tree.extent().clone();

        let result = tree.load(&target, 2).await;

        assert!(matches!(
            result,
            Err(LoadError::MaxZoomExceeded { zoom: 17, depth: 2 })
        ));
        assert!(tree.connection().fetched.lock().is_empty());
    }
}
