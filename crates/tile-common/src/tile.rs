//! Web map tile coordinates.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// Deepest zoom level accepted for a tile request.
pub const MAX_ZOOM: u32 = 30;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Generate a cache key string.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    /// Check that the zoom level is supported and x/y fall inside the matrix.
    pub fn validate(&self) -> Result<(), TileCoordError> {
        if self.z > MAX_ZOOM {
            return Err(TileCoordError::ZoomTooDeep(self.z));
        }
        let n = 1u64 << self.z;
        if u64::from(self.x) >= n || u64::from(self.y) >= n {
            return Err(TileCoordError::OutOfMatrix {
                coord: self.cache_key(),
                size: n,
            });
        }
        Ok(())
    }

    /// Lon/lat bounds of this tile in the Web Mercator tiling scheme.
    pub fn bbox(&self) -> BoundingBox {
        tile_to_latlon_bounds(self)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TileCoordError {
    #[error("Zoom level {0} exceeds the maximum of {MAX_ZOOM}")]
    ZoomTooDeep(u32),

    #[error("Tile {coord} is outside the {size}x{size} tile matrix")]
    OutOfMatrix { coord: String, size: u64 },
}

/// Convert Web Mercator tile coordinates to lat/lon bounds.
pub fn tile_to_latlon_bounds(coord: &TileCoord) -> BoundingBox {
    let n = (1u64 << coord.z) as f64;

    let lon_min = coord.x as f64 / n * 360.0 - 180.0;
    let lon_max = (coord.x as f64 + 1.0) / n * 360.0 - 180.0;

    let lat_max = (std::f64::consts::PI * (1.0 - 2.0 * coord.y as f64 / n))
        .sinh()
        .atan()
        .to_degrees();
    let lat_min = (std::f64::consts::PI * (1.0 - 2.0 * (coord.y as f64 + 1.0) / n))
        .sinh()
        .atan()
        .to_degrees();

    BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_zero_covers_world() {
        let bbox = TileCoord::new(0, 0, 0).bbox();
        assert!((bbox.min_x + 180.0).abs() < 1e-9);
        assert!((bbox.max_x - 180.0).abs() < 1e-9);
        assert!((bbox.max_y - 85.0511287798).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_out_of_matrix() {
        assert!(TileCoord::new(4, 15, 15).validate().is_ok());
        assert!(matches!(
            TileCoord::new(4, 16, 0).validate(),
            Err(TileCoordError::OutOfMatrix { size: 16, .. })
        ));
        assert_eq!(
            TileCoord::new(31, 0, 0).validate(),
            Err(TileCoordError::ZoomTooDeep(31))
        );
    }
}
