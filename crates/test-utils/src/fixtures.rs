//! Common test fixtures for temporal grid tests.
//!
//! Buffers here have hand-checked aggregation results; tests assert against
//! them directly.

/// Reference tile coordinates.
pub mod tile {
    /// The tile most fixtures are laid over (z, x, y).
    pub const REFERENCE: (u32, u32, u32) = (4, 7, 8);

    /// A northern-hemisphere neighbour (z, x, y).
    pub const NORTHERN: (u32, u32, u32) = (4, 7, 5);

    /// Day offset the fixture records start at.
    pub const QUANTIZE_OFFSET: i64 = 15340;
}

/// Bounding boxes as `[west, south, east, north]`.
pub mod bbox {
    /// Lon/lat bounds of tile 4/7/8.
    pub const REFERENCE_TILE: [f64; 4] = [-22.5, -21.943045533438177, 0.0, 0.0];

    /// Lon/lat bounds of tile 4/7/5.
    pub const NORTHERN_TILE: [f64; 4] = [-22.5, 40.97989806962013, 0.0, 55.77657301866769];

    /// Whole Web Mercator world (tile 0/0/0).
    pub const WORLD: [f64; 4] = [-180.0, -85.0511287798066, 180.0, 85.0511287798066];

    /// Simple square used where exact vertex values matter.
    pub const UNIT_SQUARE: [f64; 4] = [0.0, 0.0, 1.0, 1.0];
}

/// Break tables.
pub mod breaks {
    /// Single add-mode table; buckets 0..=6.
    pub const ADD: [f64; 6] = [0.0, 100.0, 500.0, 1000.0, 1500.0, 3000.0];

    /// One axis of the 4x4 bivariate grid.
    pub const BIVARIATE_AXIS: [f64; 4] = [0.0, 100.0, 500.0, 1000.0];

    /// Day-count thresholds used for two-dataset compare.
    pub const COMPARE_DAYS: [f64; 3] = [0.0, 31.0, 186.0];
}

/// Integer tile buffers.
pub mod buffers {
    /// 1x1 grid, one cell spanning offsets 15340..=15355 with one dataset.
    ///
    /// With multiplier 1 and quantize offset 15340: delta 1 key 0 is 4200;
    /// delta 5 gives 4500 at key 0, 1500 at key 1 and 600 at key 10; delta 6
    /// and delta 7 both give 12900 at key 10.
    pub const WINDOW: [u32; 21] = [
        1, 1, 0, 15340, 15355, 4200, 200, 100, 0, 0, 1200, 0, 0, 0, 0, 300, 200, 100, 0, 0, 12300,
    ];

    /// Raw values of [`WINDOW`] by offset from its min.
    pub const WINDOW_VALUES: [u32; 16] = [
        4200, 200, 100, 0, 0, 1200, 0, 0, 0, 0, 300, 200, 100, 0, 0, 12300,
    ];

    /// 1x1 grid, two datasets at a single offset 15340: `[4300, 4200]`.
    pub const TWO_DATASETS: [u32; 7] = [1, 1, 0, 15340, 15340, 4300, 4200];

    /// 2x2 grid, single-frame pairs.
    pub const SINGLE_FRAME: [u32; 8] = [2, 2, 0, 4200, 3, 0, 1, 15];

    /// Header only: a grid with no populated cells.
    pub const EMPTY: [u32; 2] = [4, 4];
}
