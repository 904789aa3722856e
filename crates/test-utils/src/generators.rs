//! Tile buffer generators for creating synthetic heatmap tiles.
//!
//! These generators create predictable, verifiable buffers in the
//! `[rows, cols, record*]` layout that can be used across the test suite
//! and the benchmarks.

/// Incremental builder for an integer tile buffer.
///
/// # Example
///
/// ```
/// use test_utils::IntBufferBuilder;
///
/// let buffer = IntBufferBuilder::new(2, 2)
///     .record(3, 100, &[&[1, 2], &[3, 4]])
///     .build();
/// assert_eq!(buffer, vec![2, 2, 3, 100, 101, 1, 2, 3, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct IntBufferBuilder {
    data: Vec<u32>,
}

impl IntBufferBuilder {
    /// Start a buffer for a `rows` x `cols` grid.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            data: vec![rows, cols],
        }
    }

    /// Append a windowed record: one frame (one value per dataset) per
    /// offset, starting at `min_offset`.
    ///
    /// # Panics
    ///
    /// Panics if `frames` is empty.
    pub fn record(mut self, cell: u32, min_offset: u32, frames: &[&[u32]]) -> Self {
        assert!(!frames.is_empty(), "a record needs at least one frame");
        let max_offset = min_offset + frames.len() as u32 - 1;
        self.data.extend([cell, min_offset, max_offset]);
        for frame in frames {
            self.data.extend_from_slice(frame);
        }
        self
    }

    /// Append a single-dataset windowed record from a plain value series.
    pub fn series(self, cell: u32, min_offset: u32, values: &[u32]) -> Self {
        let frames: Vec<&[u32]> = values.chunks(1).collect();
        self.record(cell, min_offset, &frames)
    }

    /// Append a single-frame `[cell, value]` pair.
    pub fn pair(mut self, cell: u32, value: u32) -> Self {
        self.data.extend([cell, value]);
        self
    }

    /// Append arbitrary integers, e.g. to build malformed buffers.
    pub fn raw(mut self, values: &[u32]) -> Self {
        self.data.extend_from_slice(values);
        self
    }

    pub fn build(self) -> Vec<u32> {
        self.data
    }
}

/// Creates a densely populated windowed tile with deterministic values.
///
/// Every cell gets a record. Records start at `base_offset` plus a small
/// per-cell shift and span between `span / 2` and `span` offsets, so the
/// window sees records of uneven length. About a third of the raw values
/// are zero.
///
/// # Arguments
///
/// * `rows`, `cols` - Grid size
/// * `num_datasets` - Values per offset
/// * `base_offset` - Lowest possible min offset
/// * `span` - Longest record, in offsets (at least 1)
/// * `seed` - Seed value for deterministic generation
pub fn create_dense_tile(
    rows: u32,
    cols: u32,
    num_datasets: usize,
    base_offset: u32,
    span: u32,
    seed: u32,
) -> Vec<u32> {
    let span = span.max(1);
    let num_cells = rows * cols;
    let mut data = Vec::with_capacity(2 + num_cells as usize * (3 + span as usize * num_datasets));
    data.extend([rows, cols]);

    for cell in 0..num_cells {
        let shift = simple_hash(cell, 0, seed) % 8;
        let len = span / 2 + simple_hash(cell, 1, seed) % (span - span / 2 + 1);
        let len = len.max(1);
        let min_offset = base_offset + shift;
        data.extend([cell, min_offset, min_offset + len - 1]);
        for offset in 0..len {
            for dataset in 0..num_datasets as u32 {
                let hash = simple_hash(cell, offset * 31 + dataset + 2, seed);
                let value = if hash % 3 == 0 { 0 } else { hash % 5000 };
                data.push(value);
            }
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
