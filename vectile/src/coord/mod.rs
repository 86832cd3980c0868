//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates, the addressing scheme the tile tree
//! is built on.

mod types;

pub use types::{
    CoordError, Quadrant, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Longitude of the western edge of tile column `x` at `zoom`.
///
/// Accepts `x == 2^zoom` so the eastern edge of the last column can be
/// computed with `tile_lon(x + 1, zoom)`.
#[inline]
pub fn tile_lon(x: u32, zoom: u8) -> f64 {
    let n = 2.0_f64.powi(zoom as i32);
    x as f64 / n * 360.0 - 180.0
}

/// Latitude of the northern edge of tile row `y` at `zoom`.
///
/// Inverse Web Mercator; row edges shrink towards the poles. Accepts
/// `y == 2^zoom` for the southern edge of the last row.
#[inline]
pub fn tile_lat(y: u32, zoom: u8) -> f64 {
    let n = 2.0_f64.powi(zoom as i32);
    let lat_rad = (PI * (1.0 - 2.0 * (y as f64 / n))).sinh().atan();
    lat_rad.to_degrees()
}

/// Converts geographic coordinates to the tile containing them.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 18)
#[inline]
pub fn to_tile_coord(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let x = ((lon + 180.0) / 360.0 * n) as u32;
    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32;

    // The eastern/southern boundary maps onto the next tile over; clamp so
    // lon = 180.0 and lat = MIN_LAT stay addressable.
    let last = (n as u32).saturating_sub(1);
    TileCoord::new(x.min(last), y.min(last), zoom)
}
