//! Temporal Aggregation of Sparse Heatmap Tiles
//!
//! This crate turns the compact integer encoding served for one heatmap tile
//! into GeoJSON features ready for vector-tile encoding. It enables:
//!
//! - **Sliding windows**: per cell and dataset, O(1) trailing sums over a
//!   configurable number of time offsets, with the trailing drain
//! - **Combination modes**: add, compare, bivariate, literal and cumulative,
//!   with optional bucket classification
//! - **Interactive layer**: literal values and the raw record per cell, so a
//!   client can re-aggregate a picked cell (see [`inspect`])
//!
//! # Architecture
//!
//! ```text
//! &[u32] tile buffer
//!      │
//!      ▼
//! GridHeader::read ──► WindowedRecords / SingleFrameRecords
//!      │
//!      ├─► CellWindow per record (ring buffer + running sum per dataset)
//!      │
//!      ├─► Combinator (mask invisible datasets, apply mode and breaks)
//!      │
//!      └─► Feature per record (geometry, _col/_row, one property per time key)
//!               │
//!               ▼
//!          AggregatedTile { main, interactive }
//! ```
//!
//! # Example
//!
//! ```
//! use temporal_grid::{aggregate, AggregationConfig, AggregationParams};
//!
//! let params = AggregationParams {
//!     delta: 1,
//!     quantize_offset: 100,
//!     value_multiplier: 1.0,
//!     ..Default::default()
//! };
//! let config = AggregationConfig::try_from(params).unwrap();
//!
//! // 1x1 grid, cell 0 has values at offsets 100 and 101
//! let tile = aggregate(&[1, 1, 0, 100, 101, 7, 9], &config).unwrap();
//! let feature = &tile.main.features[0];
//! assert_eq!(feature.value_at(0).and_then(|v| v.as_i64()), Some(7));
//! assert_eq!(feature.value_at(1).and_then(|v| v.as_i64()), Some(9));
//! ```

pub mod aggregate;
pub mod combine;
pub mod config;
pub mod decoder;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod inspect;
pub mod window;

// Re-export commonly used types at crate root
pub use aggregate::{aggregate, AggregatedTile};
pub use combine::{bucket_index, BreakTable, CombinationKind, CombinationMode, Combinator};
pub use config::{AggregationConfig, AggregationParams, DEFAULT_DELTA, DEFAULT_VALUE_MULTIPLIER};
pub use decoder::{CellRecord, GridHeader, SingleFrameRecord};
pub use error::{AggregateError, ConfigError, FormatError, Result};
pub use feature::{feature_id, Feature, FeatureCollection, PropertyValue, Properties};
pub use geometry::{CellGrid, GeomType, Geometry};
pub use inspect::{aggregate_cell, CellValues};
pub use tile_common::{BoundingBox, TileCoord};
