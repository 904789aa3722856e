//! Request parameter translation and config validation.

use temporal_grid::{
    AggregationConfig, AggregationParams, CombinationKind, CombinationMode, ConfigError, GeomType,
};
use test_utils::{assert_bbox_approx_eq, bbox};

fn query(url_query: &str) -> Vec<(&str, &str)> {
    url_query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect()
}

// ============================================================================
// Query pairs
// ============================================================================

#[test]
fn test_tile_request_parameters() {
    let pairs = query(
        "x=7&y=8&z=4&quantizeOffset=15340&delta=31&geomType=gridded&numDatasets=2\
         &combinationMode=bivariate&breaks=[[0,100,500,1000],[0,100,500,1000]]\
         &interval=day&date-range=2017-01-01T00:00:00.000Z,2018-01-01T00:00:00.000Z",
    );
    let params = AggregationParams::from_query_pairs(pairs).unwrap();
    let config = AggregationConfig::try_from(params).unwrap();

    assert_eq!(config.delta(), 31);
    assert_eq!(config.quantize_offset(), 15340);
    assert_eq!(config.geom_type(), GeomType::Rectangle);
    assert_eq!(config.num_datasets(), 2);
    assert_eq!(config.mode().kind(), CombinationKind::Bivariate);
    assert_eq!(config.visible(), &[true, true]);
    assert!(!config.interactive());
    assert_bbox_approx_eq!(config.tile_bbox().to_array(), bbox::REFERENCE_TILE, 1e-9);
}

#[test]
fn test_defaults_when_absent() {
    let params = AggregationParams::from_query_pairs(query("x=0&y=0&z=0")).unwrap();
    assert_eq!(params, AggregationParams::default());

    let config = AggregationConfig::try_from(params).unwrap();
    assert_eq!(config.delta(), 10);
    assert_eq!(config.geom_type(), GeomType::Point);
    assert_eq!(config.mode(), &CombinationMode::Add { breaks: None });
    assert_bbox_approx_eq!(config.tile_bbox().to_array(), bbox::WORLD, 1e-9);
}

#[test]
fn test_explicit_bbox_wins_over_tile() {
    let pairs = query("x=7&y=8&z=4&tileBBox=0,0,1,1&singleFrame=true&interactive=true");
    let config = AggregationConfig::try_from(AggregationParams::from_query_pairs(pairs).unwrap())
        .unwrap();
    assert_eq!(config.tile_bbox().to_array(), bbox::UNIT_SQUARE);
    assert!(config.single_frame());
    assert!(config.interactive());
}

#[test]
fn test_boolean_flags_need_literal_true() {
    let params = AggregationParams::from_query_pairs(query("singleFrame=1&interactive=yes")).unwrap();
    assert!(!params.single_frame);
    assert!(!params.interactive);
}

#[test]
fn test_unparseable_values() {
    for raw in ["delta=-", "numDatasets=two", "visible=[true,", "tileBBox=1,2,3", "x=-1"] {
        let err = AggregationParams::from_query_pairs(query(raw)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidParameter { .. }),
            "{raw}: {err:?}"
        );
    }
    assert_eq!(
        AggregationParams::from_query_pairs(query("geomType=hexagon")).unwrap_err(),
        ConfigError::UnknownGeomType("hexagon".to_string())
    );
}

// ============================================================================
// Validation
// ============================================================================

fn validate(json: &str) -> Result<AggregationConfig, ConfigError> {
    AggregationConfig::try_from(AggregationParams::from_json(json)?)
}

#[test]
fn test_breaks_count_per_mode() {
    assert!(validate(r#"{"breaks":[[0,1]]}"#).is_ok());
    assert!(matches!(
        validate(r#"{"breaks":[[0,1],[0,1]]}"#),
        Err(ConfigError::BreaksCount { mode: "add", expected: 1, actual: 2 })
    ));
    assert!(validate(r#"{"combinationMode":"compare","numDatasets":3,"breaks":[[0],[0],[0]]}"#).is_ok());
    assert!(matches!(
        validate(r#"{"combinationMode":"literal","numDatasets":2,"breaks":[[0]]}"#),
        Err(ConfigError::BreaksCount { mode: "literal", expected: 2, actual: 1 })
    ));
    assert!(validate(r#"{"combinationMode":"cumulative","numDatasets":2,"breaks":[[0],[5]]}"#).is_ok());
}

#[test]
fn test_bivariate_rules() {
    assert_eq!(
        validate(r#"{"combinationMode":"bivariate"}"#).unwrap_err(),
        ConfigError::BivariateDatasets(1)
    );
    assert_eq!(
        validate(r#"{"combinationMode":"bivariate","numDatasets":2,"breaks":[[0,1],[0]]}"#)
            .unwrap_err(),
        ConfigError::BivariateBreakLengths(2, 1)
    );
    assert_eq!(
        validate(r#"{"combinationMode":"bivariate","numDatasets":2,"breaks":[[],[]]}"#)
            .unwrap_err(),
        ConfigError::EmptyBreaks(0)
    );
}

#[test]
fn test_break_tables_must_ascend() {
    assert_eq!(
        validate(r#"{"breaks":[[0,500,100]]}"#).unwrap_err(),
        ConfigError::UnsortedBreaks(0)
    );
}

#[test]
fn test_scalar_limits() {
    assert_eq!(validate(r#"{"delta":0}"#).unwrap_err(), ConfigError::InvalidDelta(0));
    assert_eq!(
        validate(r#"{"numDatasets":0}"#).unwrap_err(),
        ConfigError::InvalidDatasetCount(0)
    );
    assert_eq!(
        validate(r#"{"valueMultiplier":-100}"#).unwrap_err(),
        ConfigError::InvalidMultiplier(-100.0)
    );
    assert!(matches!(
        validate(r#"{"z":31}"#),
        Err(ConfigError::InvalidTile(_))
    ));
    assert!(matches!(
        validate(r#"{"tileBBox":[10,10,5,5]}"#),
        Err(ConfigError::InvalidTile(_))
    ));
}

#[test]
fn test_unknown_mode_in_json() {
    assert!(matches!(
        validate(r#"{"combinationMode":"average"}"#),
        Err(ConfigError::InvalidParameter { .. })
    ));
}
