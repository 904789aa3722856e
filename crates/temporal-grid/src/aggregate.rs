//! Tile aggregation: buffer in, feature collections out.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combine::Combinator;
use crate::config::AggregationConfig;
use crate::decoder::{CellRecord, GridHeader, SingleFrameRecord, SingleFrameRecords, WindowedRecords};
use crate::error::Result;
use crate::feature::{
    feature_id, Feature, FeatureCollection, PropertyValue, RAW_VALUES_PROPERTY, VALUE_PROPERTY,
};
use crate::geometry::CellGrid;
use crate::window::for_each_window;

/// Output of one tile aggregation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedTile {
    /// Features carrying the combined value per time key.
    pub main: FeatureCollection,

    /// Literal-valued twins of `main`, present when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<FeatureCollection>,
}

impl AggregatedTile {
    /// Number of cells that produced a feature.
    pub fn len(&self) -> usize {
        self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }
}

/// Builds the features of one tile, one record at a time.
struct TileAssembler<'a> {
    config: &'a AggregationConfig,
    grid: CellGrid,
    combinator: Combinator<'a>,
    main: Vec<Feature>,
    interactive: Option<Vec<Feature>>,
    counter: u64,
}

impl<'a> TileAssembler<'a> {
    fn new(config: &'a AggregationConfig, header: GridHeader) -> Self {
        Self {
            config,
            grid: CellGrid::new(header.rows, header.cols, *config.tile_bbox()),
            combinator: Combinator::new(config.mode(), config.visible(), config.value_multiplier()),
            main: Vec::new(),
            interactive: config.interactive().then(Vec::new),
            counter: 0,
        }
    }

    fn new_feature(&mut self, cell: u32) -> Feature {
        let id = feature_id(&self.config.tile(), self.counter);
        self.counter += 1;
        let (col, row) = self.grid.cell_position(cell);
        let geometry = self.grid.geometry(cell, self.config.geom_type());
        Feature::for_cell(id, geometry, col, row)
    }

    fn add_windowed(&mut self, record: &CellRecord<'_>) {
        let mut feature = self.new_feature(record.cell);
        let mut twin = self.interactive.is_some().then(|| {
            let mut twin = feature.clone();
            twin.set_property(RAW_VALUES_PROPERTY, record.raw_values_string());
            twin
        });

        let quantize_offset = self.config.quantize_offset();
        let combinator = &mut self.combinator;
        for_each_window(record, self.config.delta(), |tail, sums| {
            let key = tail - quantize_offset;
            if key < 0 {
                return;
            }
            let key = key.to_string();
            if let Some(value) = combinator.combine(sums) {
                feature.set_property(key.clone(), value);
            }
            if let Some(twin) = twin.as_mut() {
                if let Some(value) = combinator.literal(sums) {
                    twin.set_property(key, value);
                }
            }
        });

        self.push(feature, twin);
    }

    fn add_single_frame(&mut self, record: SingleFrameRecord) {
        let mut feature = self.new_feature(record.cell);
        let value = (record.value != 0).then(|| {
            PropertyValue::from_real(f64::from(record.value) / self.config.value_multiplier())
        });
        if let Some(value) = &value {
            feature.set_property(VALUE_PROPERTY, value.clone());
        }

        let twin = self.interactive.is_some().then(|| {
            let mut twin = feature.clone();
            twin.set_property(RAW_VALUES_PROPERTY, record.value.to_string());
            twin
        });

        self.push(feature, twin);
    }

    fn push(&mut self, feature: Feature, twin: Option<Feature>) {
        self.main.push(feature);
        if let (Some(features), Some(twin)) = (self.interactive.as_mut(), twin) {
            features.push(twin);
        }
    }

    fn finish(self) -> AggregatedTile {
        AggregatedTile {
            main: FeatureCollection::new(self.main),
            interactive: self.interactive.map(FeatureCollection::new),
        }
    }
}

/// Aggregate one tile buffer into GeoJSON features.
///
/// Any malformed record aborts the whole tile; no partial output is returned.
pub fn aggregate(buffer: &[u32], config: &AggregationConfig) -> Result<AggregatedTile> {
    let start = Instant::now();
    let header = GridHeader::read(buffer)?;
    let mut assembler = TileAssembler::new(config, header);
    let mut records = 0usize;

    if config.single_frame() {
        for record in SingleFrameRecords::new(buffer, header) {
            assembler.add_single_frame(record?);
            records += 1;
        }
    } else {
        for record in WindowedRecords::new(buffer, header, config.num_datasets()) {
            assembler.add_windowed(&record?);
            records += 1;
        }
    }

    let tile = assembler.finish();
    let t = config.tile();
    debug!(
        z = t.z,
        x = t.x,
        y = t.y,
        rows = header.rows,
        cols = header.cols,
        records = records,
        features = tile.len(),
        mode = %config.mode().kind(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Aggregated tile"
    );
    Ok(tile)
}
