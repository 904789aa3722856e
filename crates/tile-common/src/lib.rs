//! Common tile and bounding box types shared across the temporal grid crates.

pub mod bbox;
pub mod tile;

pub use bbox::{BboxParseError, BoundingBox};
pub use tile::{tile_to_latlon_bounds, TileCoord, TileCoordError, MAX_ZOOM};
