//! Cell geometries inside a tile's bounding box.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tile_common::BoundingBox;

use crate::error::ConfigError;

/// Shape emitted for each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeomType {
    /// Lower-left corner of the cell.
    #[default]
    #[serde(alias = "blob")]
    Point,
    /// Closed ring around the cell.
    #[serde(alias = "gridded", alias = "extruded")]
    Rectangle,
}

impl FromStr for GeomType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "point" | "blob" => Ok(Self::Point),
            "rectangle" | "gridded" | "extruded" => Ok(Self::Rectangle),
            _ => Err(ConfigError::UnknownGeomType(s.to_string())),
        }
    }
}

/// GeoJSON geometry of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        /// `[x, y]`
        coordinates: [f64; 2],
    },
    Polygon {
        /// Linear rings; cells only ever have the exterior one.
        coordinates: Vec<Vec<[f64; 2]>>,
    },
}

/// Row-major grid of cells laid over a tile, row 0 at the bbox's min y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellGrid {
    pub rows: u32,
    pub cols: u32,
    pub bbox: BoundingBox,
}

impl CellGrid {
    pub fn new(rows: u32, cols: u32, bbox: BoundingBox) -> Self {
        Self { rows, cols, bbox }
    }

    /// `(col, row)` of a linear cell index.
    pub fn cell_position(&self, cell: u32) -> (u32, u32) {
        (cell % self.cols, cell / self.cols)
    }

    fn x_at(&self, col: u32) -> f64 {
        self.bbox.min_x + (col as f64 / self.cols as f64) * self.bbox.width()
    }

    fn y_at(&self, row: u32) -> f64 {
        self.bbox.min_y + (row as f64 / self.rows as f64) * self.bbox.height()
    }

    /// Geometry of a cell. The grid must have non-zero rows and cols.
    pub fn geometry(&self, cell: u32, geom_type: GeomType) -> Geometry {
        let (col, row) = self.cell_position(cell);
        let min_x = self.x_at(col);
        let min_y = self.y_at(row);

        match geom_type {
            GeomType::Point => Geometry::Point {
                coordinates: [min_x, min_y],
            },
            GeomType::Rectangle => {
                let max_x = self.x_at(col + 1);
                let max_y = self.y_at(row + 1);
                Geometry::Polygon {
                    coordinates: vec![vec![
                        [min_x, min_y],
                        [max_x, min_y],
                        [max_x, max_y],
                        [min_x, max_y],
                        [min_x, min_y],
                    ]],
                }
            }
        }
    }
}
