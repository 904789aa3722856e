//! Aggregation configuration.
//!
//! [`AggregationParams`] is the loose, request-shaped form (camelCase keys,
//! as carried by tile URLs). [`AggregationConfig`] is the validated form the
//! engine runs on; it can only be built through `TryFrom`, so a config that
//! exists is always consistent.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tile_common::{BoundingBox, TileCoord};

use crate::combine::{CombinationKind, CombinationMode};
use crate::error::ConfigError;
use crate::geometry::GeomType;

/// Fixed-point factor the tile API multiplies real values by.
pub const DEFAULT_VALUE_MULTIPLIER: f64 = 100.0;

/// Window width used when a request does not specify one.
pub const DEFAULT_DELTA: i64 = 10;

/// Aggregation parameters as received from a tile request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregationParams {
    /// Subtracted from absolute time offsets to build property keys.
    pub quantize_offset: i64,

    /// Width of the trailing window, in time units.
    pub delta: i64,

    pub geom_type: GeomType,

    pub num_datasets: i64,

    /// Defaults to `add` when absent.
    pub combination_mode: Option<CombinationKind>,

    /// Per-dataset ascending thresholds.
    pub breaks: Option<Vec<Vec<f64>>>,

    /// Per-dataset visibility mask.
    pub visible: Option<Vec<bool>>,

    /// Buffer holds `[cell, value]` pairs instead of windowed records.
    pub single_frame: bool,

    /// Also build the literal-valued interactive collection.
    pub interactive: bool,

    pub x: u32,
    pub y: u32,
    pub z: u32,

    /// `[west, south, east, north]`; derived from x/y/z when absent.
    #[serde(rename = "tileBBox")]
    pub tile_bbox: Option<[f64; 4]>,

    pub value_multiplier: f64,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            quantize_offset: 0,
            delta: DEFAULT_DELTA,
            geom_type: GeomType::default(),
            num_datasets: 1,
            combination_mode: None,
            breaks: None,
            visible: None,
            single_frame: false,
            interactive: false,
            x: 0,
            y: 0,
            z: 0,
            tile_bbox: None,
            value_multiplier: DEFAULT_VALUE_MULTIPLIER,
        }
    }
}

fn parse_param<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid_parameter(key, e.to_string()))
}

fn parse_json_param<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(value).map_err(|e| ConfigError::invalid_parameter(key, e.to_string()))
}

impl AggregationParams {
    /// Build params from already-decoded query pairs.
    ///
    /// `breaks` and `visible` carry JSON arrays, `tileBBox` a
    /// `west,south,east,north` list. Keys that only matter to the upstream
    /// fetch (interval, date-range, datasets, filters...) are ignored.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        params.apply_query_pairs(pairs)?;
        Ok(params)
    }

    /// Override fields with query pairs, keeping the rest as they are.
    pub fn apply_query_pairs<I, K, V>(&mut self, pairs: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "quantizeOffset" => self.quantize_offset = parse_param(key, value)?,
                "delta" => self.delta = parse_param(key, value)?,
                "geomType" => self.geom_type = value.parse()?,
                "numDatasets" => self.num_datasets = parse_param(key, value)?,
                "combinationMode" => self.combination_mode = Some(value.parse()?),
                "breaks" => self.breaks = Some(parse_json_param(key, value)?),
                "visible" => self.visible = Some(parse_json_param(key, value)?),
                "singleFrame" => self.single_frame = value == "true",
                "interactive" => self.interactive = value == "true",
                "x" => self.x = parse_param(key, value)?,
                "y" => self.y = parse_param(key, value)?,
                "z" => self.z = parse_param(key, value)?,
                "tileBBox" => {
                    let bbox = BoundingBox::parse(value)
                        .map_err(|e| ConfigError::invalid_parameter(key, e.to_string()))?;
                    self.tile_bbox = Some(bbox.to_array());
                }
                "valueMultiplier" => self.value_multiplier = parse_param(key, value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Parse params from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        parse_json_param("params", json)
    }
}

/// Validated configuration for one tile aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationConfig {
    quantize_offset: i64,
    delta: u32,
    geom_type: GeomType,
    num_datasets: usize,
    mode: CombinationMode,
    visible: Vec<bool>,
    single_frame: bool,
    interactive: bool,
    tile: TileCoord,
    tile_bbox: BoundingBox,
    value_multiplier: f64,
}

impl AggregationConfig {
    pub fn quantize_offset(&self) -> i64 {
        self.quantize_offset
    }

    pub fn delta(&self) -> u32 {
        self.delta
    }

    pub fn geom_type(&self) -> GeomType {
        self.geom_type
    }

    pub fn num_datasets(&self) -> usize {
        self.num_datasets
    }

    pub fn mode(&self) -> &CombinationMode {
        &self.mode
    }

    /// Visibility mask with exactly one entry per dataset.
    pub fn visible(&self) -> &[bool] {
        &self.visible
    }

    pub fn single_frame(&self) -> bool {
        self.single_frame
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    pub fn tile_bbox(&self) -> &BoundingBox {
        &self.tile_bbox
    }

    pub fn value_multiplier(&self) -> f64 {
        self.value_multiplier
    }
}

impl TryFrom<AggregationParams> for AggregationConfig {
    type Error = ConfigError;

    fn try_from(params: AggregationParams) -> Result<Self, Self::Error> {
        let delta = u32::try_from(params.delta)
            .ok()
            .filter(|d| *d >= 1)
            .ok_or(ConfigError::InvalidDelta(params.delta))?;

        let num_datasets = usize::try_from(params.num_datasets)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(ConfigError::InvalidDatasetCount(params.num_datasets))?;

        if !params.value_multiplier.is_finite() || params.value_multiplier <= 0.0 {
            return Err(ConfigError::InvalidMultiplier(params.value_multiplier));
        }

        let mode = CombinationMode::new(
            params.combination_mode.unwrap_or(CombinationKind::Add),
            params.breaks,
            num_datasets,
        )?;

        let tile = TileCoord::new(params.z, params.x, params.y);
        tile.validate()
            .map_err(|e| ConfigError::InvalidTile(e.to_string()))?;

        let tile_bbox = match params.tile_bbox {
            Some(coords) => {
                let bbox = BoundingBox::from_array(coords);
                if !bbox.is_valid() {
                    return Err(ConfigError::InvalidTile(format!(
                        "bounding box {:?} is not a valid extent",
                        coords
                    )));
                }
                bbox
            }
            None => tile.bbox(),
        };

        let mut visible = params.visible.unwrap_or_default();
        visible.resize(num_datasets, true);

        Ok(Self {
            quantize_offset: params.quantize_offset,
            delta,
            geom_type: params.geom_type,
            num_datasets,
            mode,
            visible,
            single_frame: params.single_frame,
            interactive: params.interactive,
            tile,
            tile_bbox,
            value_multiplier: params.value_multiplier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AggregationConfig::try_from(AggregationParams::default()).unwrap();
        assert_eq!(config.delta(), 10);
        assert_eq!(config.num_datasets(), 1);
        assert_eq!(config.visible(), &[true]);
        assert_eq!(config.mode(), &CombinationMode::Add { breaks: None });
        assert_eq!(config.value_multiplier(), 100.0);
        assert!((config.tile_bbox().min_x + 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_visible_is_normalised_to_dataset_count() {
        let params = AggregationParams {
            num_datasets: 2,
            visible: Some(vec![false, true, true]),
            ..Default::default()
        };
        let config = AggregationConfig::try_from(params).unwrap();
        assert_eq!(config.visible(), &[false, true]);

        let params = AggregationParams {
            num_datasets: 3,
            visible: Some(vec![false]),
            ..Default::default()
        };
        let config = AggregationConfig::try_from(params).unwrap();
        assert_eq!(config.visible(), &[false, true, true]);
    }

    #[test]
    fn test_rejects_bad_scalars() {
        let bad_delta = AggregationParams {
            delta: 0,
            ..Default::default()
        };
        assert_eq!(
            AggregationConfig::try_from(bad_delta),
            Err(ConfigError::InvalidDelta(0))
        );

        let bad_datasets = AggregationParams {
            num_datasets: -1,
            ..Default::default()
        };
        assert_eq!(
            AggregationConfig::try_from(bad_datasets),
            Err(ConfigError::InvalidDatasetCount(-1))
        );

        let bad_multiplier = AggregationParams {
            value_multiplier: 0.0,
            ..Default::default()
        };
        assert_eq!(
            AggregationConfig::try_from(bad_multiplier),
            Err(ConfigError::InvalidMultiplier(0.0))
        );
    }

    #[test]
    fn test_rejects_tile_outside_matrix() {
        let params = AggregationParams {
            x: 16,
            z: 4,
            ..Default::default()
        };
        assert!(matches!(
            AggregationConfig::try_from(params),
            Err(ConfigError::InvalidTile(_))
        ));
    }

    #[test]
    fn test_query_pairs() {
        let pairs = [
            ("quantizeOffset", "15340"),
            ("delta", "31"),
            ("geomType", "rectangle"),
            ("numDatasets", "2"),
            ("combinationMode", "compare"),
            ("breaks", "[[0,31,186],[0,31,186]]"),
            ("visible", "[true,false]"),
            ("singleFrame", "false"),
            ("interactive", "true"),
            ("x", "7"),
            ("y", "5"),
            ("z", "4"),
            ("interval", "day"),
        ];
        let params = AggregationParams::from_query_pairs(pairs).unwrap();
        assert_eq!(params.quantize_offset, 15340);
        assert_eq!(params.delta, 31);
        assert_eq!(params.geom_type, GeomType::Rectangle);
        assert_eq!(params.combination_mode, Some(CombinationKind::Compare));
        assert_eq!(
            params.breaks,
            Some(vec![vec![0.0, 31.0, 186.0], vec![0.0, 31.0, 186.0]])
        );
        assert_eq!(params.visible, Some(vec![true, false]));
        assert!(params.interactive);
        assert!(!params.single_frame);
        assert_eq!((params.x, params.y, params.z), (7, 5, 4));
    }

    #[test]
    fn test_query_pair_errors() {
        let err = AggregationParams::from_query_pairs([("delta", "ten")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { ref param, .. } if param == "delta"));

        let err = AggregationParams::from_query_pairs([("breaks", "[[0,1]")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { ref param, .. } if param == "breaks"));

        let err = AggregationParams::from_query_pairs([("combinationMode", "mean")]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownCombinationMode("mean".to_string()));
    }

    #[test]
    fn test_apply_query_pairs_keeps_other_fields() {
        let mut params = AggregationParams {
            delta: 7,
            interactive: true,
            ..Default::default()
        };
        params
            .apply_query_pairs([("numDatasets", "3"), ("interactive", "false")])
            .unwrap();
        assert_eq!(params.delta, 7);
        assert_eq!(params.num_datasets, 3);
        assert!(!params.interactive);
    }

    #[test]
    fn test_from_json_uses_camel_case() {
        let params = AggregationParams::from_json(
            r#"{"numDatasets":2,"combinationMode":"bivariate","geomType":"gridded","tileBBox":[-22.5,-21.9,0,0]}"#,
        )
        .unwrap();
        assert_eq!(params.num_datasets, 2);
        assert_eq!(params.combination_mode, Some(CombinationKind::Bivariate));
        assert_eq!(params.geom_type, GeomType::Rectangle);
        assert_eq!(params.tile_bbox, Some([-22.5, -21.9, 0.0, 0.0]));
        assert_eq!(params.delta, DEFAULT_DELTA);
    }
}
