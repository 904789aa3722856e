//! GeoJSON feature output types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tile_common::TileCoord;

use crate::geometry::Geometry;

/// Property holding the cell's column within the tile grid.
pub const COL_PROPERTY: &str = "_col";
/// Property holding the cell's row within the tile grid.
pub const ROW_PROPERTY: &str = "_row";
/// Interactive-layer property with the cell's raw record.
pub const RAW_VALUES_PROPERTY: &str = "rawValues";
/// Single-frame value property.
pub const VALUE_PROPERTY: &str = "value";

/// A property leaf: vector tiles only carry numbers and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    /// Largest magnitude below which every integral f64 is exact.
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    /// Wrap a real value, keeping integral values as integers.
    pub fn from_real(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() <= Self::MAX_SAFE_INTEGER {
            Self::Integer(value as i64)
        } else {
            Self::Number(value)
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<usize> for PropertyValue {
    fn from(value: usize) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Ordered property map, so equal inputs serialize identically.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A GeoJSON Feature for one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    pub id: u64,

    pub geometry: Geometry,

    pub properties: Properties,
}

impl Feature {
    /// Create a feature tagged with its cell's column and row.
    pub fn for_cell(id: u64, geometry: Geometry, col: u32, row: u32) -> Self {
        let mut properties = Properties::new();
        properties.insert(COL_PROPERTY.to_string(), col.into());
        properties.insert(ROW_PROPERTY.to_string(), row.into());
        Self {
            type_: "Feature".to_string(),
            id,
            geometry,
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Value written for a quantized time key, if any.
    pub fn value_at(&self, time_key: i64) -> Option<&PropertyValue> {
        self.properties.get(&time_key.to_string())
    }
}

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Compact feature id: last digit of x, last digit of y, then the
/// per-tile cell counter, read as one decimal number.
///
/// `x = 7, y = 8, counter = 12` gives `7812`. Ids are unique within a tile
/// but may repeat across tiles sharing the same last digits.
pub fn feature_id(tile: &TileCoord, counter: u64) -> u64 {
    let prefix = u64::from(tile.x % 10) * 10 + u64::from(tile.y % 10);
    let mut scale = 10u64;
    while scale <= counter {
        scale = scale.saturating_mul(10);
    }
    prefix.saturating_mul(scale).saturating_add(counter)
}
