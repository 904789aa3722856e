//! Common helpers for temporal-grid integration tests.
//!
//! Not every test file uses every helper.
#![allow(dead_code)]

use temporal_grid::{
    aggregate, AggregatedTile, AggregationConfig, AggregationParams, CombinationKind, Feature,
    GeomType, PropertyValue,
};
use test_utils::{bbox, breaks, tile};

/// Parameters most fixtures run with: one dataset, add mode with the
/// reference break table, delta 1, values taken at face value.
pub fn base_params() -> AggregationParams {
    let (z, x, y) = tile::REFERENCE;
    AggregationParams {
        quantize_offset: tile::QUANTIZE_OFFSET,
        delta: 1,
        geom_type: GeomType::Rectangle,
        num_datasets: 1,
        combination_mode: Some(CombinationKind::Add),
        breaks: Some(vec![breaks::ADD.to_vec()]),
        visible: Some(vec![true, true, true]),
        single_frame: false,
        interactive: false,
        x,
        y,
        z,
        tile_bbox: Some(bbox::REFERENCE_TILE),
        value_multiplier: 1.0,
    }
}

/// `base_params` without a break table, so values come out unbucketed.
pub fn raw_params() -> AggregationParams {
    AggregationParams {
        breaks: None,
        ..base_params()
    }
}

/// Validate params and aggregate, panicking on any error.
pub fn run(buffer: &[u32], params: AggregationParams) -> AggregatedTile {
    let config = AggregationConfig::try_from(params).expect("valid config");
    aggregate(buffer, &config).expect("aggregation succeeds")
}

/// Value of `feature` at quantized time key `key`.
pub fn get_at(feature: &Feature, key: i64) -> Option<&PropertyValue> {
    feature.value_at(key)
}

/// Integer value of the first feature at `key`.
pub fn int_at(tile: &AggregatedTile, key: i64) -> Option<i64> {
    tile.main
        .features
        .first()
        .and_then(|f| get_at(f, key))
        .and_then(PropertyValue::as_i64)
}

/// Text value of the first feature at `key`.
pub fn text_at(tile: &AggregatedTile, key: i64) -> Option<String> {
    tile.main
        .features
        .first()
        .and_then(|f| get_at(f, key))
        .and_then(|v| v.as_str().map(str::to_string))
}

/// Sorted numeric time keys of a feature.
pub fn time_keys(feature: &Feature) -> Vec<i64> {
    let mut keys: Vec<i64> = feature
        .properties
        .keys()
        .filter_map(|k| k.parse().ok())
        .collect();
    keys.sort_unstable();
    keys
}
