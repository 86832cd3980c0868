//! Probe command - load features from a live bbox endpoint.

use clap::Args;

use vectile::connection::{AsyncReqwestClient, HttpConnection};
use vectile::coord::TileCoord;
use vectile::quadtree::{Quadtree, DEFAULT_DENSITY_THRESHOLD};

use super::common::print_tree_report;
use crate::error::CliError;

/// Arguments for the probe command.
#[derive(Args)]
pub struct ProbeArgs {
    /// Bbox-query endpoint, e.g. https://host/features
    #[arg(long)]
    pub url: String,
    /// Root tile x coordinate
    #[arg(long, default_value_t = 0)]
    pub x: u32,
    /// Root tile y coordinate
    #[arg(long, default_value_t = 0)]
    pub y: u32,
    /// Root tile zoom level
    #[arg(long, default_value_t = 0)]
    pub zoom: u8,
    /// Levels to subdivide below the root
    #[arg(long, default_value_t = 2)]
    pub depth: u8,
    /// Feature count at which a tile classifies as dense
    #[arg(long, default_value_t = DEFAULT_DENSITY_THRESHOLD)]
    pub threshold: usize,
    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Run the probe command.
pub async fn run(args: ProbeArgs) -> Result<(), CliError> {
    let tile = TileCoord::new(args.x, args.y, args.zoom)?;
    let client = match args.timeout {
        Some(secs) => AsyncReqwestClient::with_timeout(secs),
        None => AsyncReqwestClient::new(),
    }?;
    let connection = HttpConnection::new(client, args.url.clone());
    let mut tree = Quadtree::new(connection, tile).with_density_threshold(args.threshold);

    println!("Vectile Probe v{}", vectile::VERSION);
    println!("================");
    println!();
    println!("Endpoint:   {}", args.url);
    println!("Root tile:  {}", tile);
    println!("Depth:      {}", args.depth);
    println!("Threshold:  {}", args.threshold);
    println!();

    let target = tree.extent().clone();
    let density = tree.load(&target, args.depth).await?;

    println!("Load completed: root classified {:?}", density);
    print_tree_report(tree.root());
    Ok(())
}
