//! Demo command - run the loader against a synthetic feature source.
//!
//! Generates a seeded cluster of features around a random hotspot so the
//! loader subdivides near the hotspot and collapses everywhere else, then
//! reports the resulting tree and fetch count against the exhaustive
//! worst case.

use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vectile::connection::{Connection, Feature, FeatureBatch, FetchError};
use vectile::coord::{self, TileCoord};
use vectile::extent::Extent;
use vectile::quadtree::Quadtree;

use super::common::print_tree_report;
use crate::error::CliError;

/// Arguments for the demo command.
#[derive(Args)]
pub struct DemoArgs {
    /// Levels to subdivide below the world root
    #[arg(long, default_value_t = 3)]
    pub depth: u8,
    /// Feature count at which a tile classifies as dense
    #[arg(long, default_value_t = 2)]
    pub threshold: usize,
    /// Seed for the synthetic feature distribution
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Number of synthetic features
    #[arg(long, default_value_t = 4000)]
    pub features: usize,
}

/// Connection serving a fixed synthetic feature set.
struct SyntheticConnection {
    features: Vec<Feature>,
    fetches: AtomicUsize,
}

impl SyntheticConnection {
    fn new(seed: u64, count: usize) -> (Self, f64, f64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let hotspot_lat = rng.random_range(-60.0..60.0);
        let hotspot_lon = rng.random_range(-150.0..150.0);
        let features = (0..count)
            .map(|i| Feature {
                id: i as u64,
                lat: hotspot_lat + rng.random_range(-4.0..4.0),
                lon: hotspot_lon + rng.random_range(-4.0..4.0),
            })
            .collect();
        (
            Self {
                features,
                fetches: AtomicUsize::new(0),
            },
            hotspot_lat,
            hotspot_lon,
        )
    }
}

impl Connection for SyntheticConnection {
    async fn fetch_extent(&self, extent: &Extent) -> Result<FeatureBatch, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let inside = self
            .features
            .iter()
            .filter(|f| extent.contains(f.lat, f.lon))
            .copied()
            .collect();
        Ok(FeatureBatch::new(inside))
    }
}

/// Run the demo command.
pub async fn run(args: DemoArgs) -> Result<(), CliError> {
    let root = TileCoord::new(0, 0, 0)?;
    let (connection, hotspot_lat, hotspot_lon) = SyntheticConnection::new(args.seed, args.features);
    let mut tree = Quadtree::new(connection, root).with_density_threshold(args.threshold);

    let finest = root.zoom() + args.depth;
    let hotspot_tile = coord::to_tile_coord(hotspot_lat, hotspot_lon, finest)?;

    println!("Vectile Demo v{}", vectile::VERSION);
    println!("===============");
    println!();
    println!("Features:   {} around ({:.3}, {:.3})", args.features, hotspot_lat, hotspot_lon);
    println!("Hotspot:    tile {}", hotspot_tile);
    println!("Depth:      {}", args.depth);
    println!("Threshold:  {}", args.threshold);
    println!();

    let target = tree.extent().clone();
    let density = tree.load(&target, args.depth).await?;

    let fetches = tree.connection().fetches.load(Ordering::Relaxed);
    let exhaustive = 4u64.pow(u32::from(args.depth));

    println!("Load completed: root classified {:?}", density);
    print_tree_report(tree.root());
    println!("Fetches:    {} (exhaustive subdivision would issue {})", fetches, exhaustive);
    println!(
        "Hotspot resolution: zoom {}",
        tree.zoom(&Extent::from_tile(hotspot_tile))
    );
    Ok(())
}
