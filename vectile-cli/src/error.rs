//! CLI error type.

use thiserror::Error;

use vectile::connection::FetchError;
use vectile::coord::CoordError;
use vectile::quadtree::LoadError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("coordinate error: {0}")]
    Coord(#[from] CoordError),
    #[error("load failed: {0}")]
    Load(#[from] LoadError),
    #[error("connection error: {0}")]
    Fetch(#[from] FetchError),
}
