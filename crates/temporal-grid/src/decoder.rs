//! Decoding of the flat integer tile buffer.
//!
//! Layout: `[numRows, numCols, record*]`. In windowed mode every record is
//! `[cell, minOffset, maxOffset, values...]` where `values` holds
//! `numDatasets` integers per offset in `[minOffset, maxOffset]`. In
//! single-frame mode records are plain `[cell, value]` pairs.

use crate::error::FormatError;

/// Number of integers in the grid header.
pub const GRID_HEADER_LEN: usize = 2;

/// Number of integers in a windowed record header (cell, min, max).
pub const RECORD_HEADER_LEN: usize = 3;

/// Grid dimensions read from the start of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridHeader {
    pub rows: u32,
    pub cols: u32,
}

impl GridHeader {
    /// Read the header. A zero-sized grid is accepted only when no records follow.
    pub fn read(buf: &[u32]) -> Result<Self, FormatError> {
        if buf.len() < GRID_HEADER_LEN {
            return Err(FormatError::MissingHeader { len: buf.len() });
        }
        let header = Self {
            rows: buf[0],
            cols: buf[1],
        };
        if header.num_cells() == 0 && buf.len() > GRID_HEADER_LEN {
            return Err(FormatError::EmptyGrid {
                rows: header.rows,
                cols: header.cols,
            });
        }
        Ok(header)
    }

    /// Total number of cells in the grid.
    pub fn num_cells(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }

    fn check_cell(&self, cell: u32) -> Result<(), FormatError> {
        if u64::from(cell) >= self.num_cells() {
            return Err(FormatError::CellOutOfGrid {
                cell,
                cells: self.num_cells(),
            });
        }
        Ok(())
    }
}

/// One windowed cell record, borrowing its values from the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRecord<'a> {
    pub cell: u32,
    pub min_offset: u32,
    pub max_offset: u32,
    num_datasets: usize,
    values: &'a [u32],
}

impl<'a> CellRecord<'a> {
    /// Number of time offsets covered, `max - min + 1`.
    pub fn span(&self) -> usize {
        (self.max_offset - self.min_offset) as usize + 1
    }

    pub fn num_datasets(&self) -> usize {
        self.num_datasets
    }

    /// Raw values, dataset-interleaved.
    pub fn values(&self) -> &'a [u32] {
        self.values
    }

    /// One slice of `num_datasets` raw values per time offset, oldest first.
    pub fn frames(&self) -> std::slice::ChunksExact<'a, u32> {
        self.values.chunks_exact(self.num_datasets)
    }

    /// The record without its cell index, as `"min,max,v0,v1,..."`.
    pub fn raw_values_string(&self) -> String {
        let mut out = format!("{},{}", self.min_offset, self.max_offset);
        for value in self.values {
            out.push(',');
            out.push_str(&value.to_string());
        }
        out
    }
}

/// Decode the windowed record starting at `pos`.
///
/// Returns the position of the next record together with the decoded one.
/// A dataset count of zero is read as one.
pub fn next_record<'a>(
    buf: &'a [u32],
    pos: usize,
    header: &GridHeader,
    num_datasets: usize,
) -> Result<(usize, CellRecord<'a>), FormatError> {
    let num_datasets = num_datasets.max(1);
    let available = buf.len().saturating_sub(pos);
    if available < RECORD_HEADER_LEN {
        return Err(FormatError::Truncated {
            position: pos,
            needed: RECORD_HEADER_LEN,
            available,
        });
    }

    let cell = buf[pos];
    let min_offset = buf[pos + 1];
    let max_offset = buf[pos + 2];
    header.check_cell(cell)?;
    if max_offset < min_offset {
        return Err(FormatError::NegativeSpan {
            cell,
            min: min_offset,
            max: max_offset,
        });
    }

    let span = (max_offset - min_offset) as usize + 1;
    let needed = span
        .saturating_mul(num_datasets)
        .saturating_add(RECORD_HEADER_LEN);
    if available < needed {
        return Err(FormatError::Truncated {
            position: pos,
            needed,
            available,
        });
    }

    let record = CellRecord {
        cell,
        min_offset,
        max_offset,
        num_datasets,
        values: &buf[pos + RECORD_HEADER_LEN..pos + needed],
    };
    Ok((pos + needed, record))
}

/// Lazy, single-pass iterator over the windowed records of a buffer.
///
/// Yields at most one error, then stops.
#[derive(Debug, Clone)]
pub struct WindowedRecords<'a> {
    buf: &'a [u32],
    pos: usize,
    header: GridHeader,
    num_datasets: usize,
}

impl<'a> WindowedRecords<'a> {
    pub fn new(buf: &'a [u32], header: GridHeader, num_datasets: usize) -> Self {
        Self {
            buf,
            pos: GRID_HEADER_LEN,
            header,
            num_datasets,
        }
    }
}

impl<'a> Iterator for WindowedRecords<'a> {
    type Item = Result<CellRecord<'a>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buf.len() {
            return None;
        }
        match next_record(self.buf, self.pos, &self.header, self.num_datasets) {
            Ok((next, record)) => {
                self.pos = next;
                Some(Ok(record))
            }
            Err(e) => {
                self.pos = self.buf.len();
                Some(Err(e))
            }
        }
    }
}

/// A `[cell, value]` pair from a single-frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleFrameRecord {
    pub cell: u32,
    pub value: u32,
}

/// Iterator over the `[cell, value]` pairs of a single-frame buffer.
#[derive(Debug, Clone)]
pub struct SingleFrameRecords<'a> {
    buf: &'a [u32],
    pos: usize,
    header: GridHeader,
}

impl<'a> SingleFrameRecords<'a> {
    pub fn new(buf: &'a [u32], header: GridHeader) -> Self {
        Self {
            buf,
            pos: GRID_HEADER_LEN,
            header,
        }
    }

    fn read_pair(&self) -> Result<SingleFrameRecord, FormatError> {
        let available = self.buf.len() - self.pos;
        if available < 2 {
            return Err(FormatError::Truncated {
                position: self.pos,
                needed: 2,
                available,
            });
        }
        let record = SingleFrameRecord {
            cell: self.buf[self.pos],
            value: self.buf[self.pos + 1],
        };
        self.header.check_cell(record.cell)?;
        Ok(record)
    }
}

impl Iterator for SingleFrameRecords<'_> {
    type Item = Result<SingleFrameRecord, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buf.len() {
            return None;
        }
        let result = self.read_pair();
        self.pos = if result.is_ok() {
            self.pos + 2
        } else {
            self.buf.len()
        };
        Some(result)
    }
}
