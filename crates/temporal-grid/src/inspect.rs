//! Re-aggregation of a single cell from its `rawValues` property.
//!
//! Lets a client that picked a feature on the interactive layer recompute the
//! per-dataset values for any frame and window width without fetching the
//! tile again.

use std::str::FromStr;

use crate::error::FormatError;

/// A cell record parsed back from `"min,max,v0,v1,..."`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellValues {
    pub min_offset: u32,
    pub max_offset: u32,
    /// Raw values, dataset-interleaved, one group per offset.
    pub values: Vec<u32>,
}

impl CellValues {
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let malformed = |reason: &str| FormatError::MalformedCellValues(format!("{reason}: {raw:?}"));

        let numbers = raw
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed("expected comma-separated unsigned integers"))?;

        let [min_offset, max_offset, values @ ..] = numbers.as_slice() else {
            return Err(malformed("missing min/max offsets"));
        };
        if max_offset < min_offset {
            return Err(malformed("max offset precedes min offset"));
        }
        let span = (max_offset - min_offset) as usize + 1;
        if values.is_empty() || values.len() % span != 0 {
            return Err(malformed("value count is not a multiple of the span"));
        }

        Ok(Self {
            min_offset: *min_offset,
            max_offset: *max_offset,
            values: values.to_vec(),
        })
    }

    pub fn span(&self) -> usize {
        (self.max_offset - self.min_offset) as usize + 1
    }
}

impl FromStr for CellValues {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Per-dataset real sums over `[quantize_offset + frame, quantize_offset + frame + delta)`.
///
/// Only offsets inside the cell's `[min, max]` contribute. Returns `None`
/// when the window does not overlap the cell at all.
pub fn aggregate_cell(
    cell: &CellValues,
    frame: i64,
    delta: u32,
    quantize_offset: i64,
    num_datasets: usize,
    multiplier: f64,
) -> Option<Vec<f64>> {
    let num_datasets = num_datasets.max(1);
    let start = quantize_offset + frame;
    let end = start + i64::from(delta.max(1)) - 1;
    let lo = start.max(i64::from(cell.min_offset));
    let hi = end.min(i64::from(cell.max_offset));
    if lo > hi {
        return None;
    }

    let mut sums = vec![0i64; num_datasets];
    for offset in lo..=hi {
        let base = (offset - i64::from(cell.min_offset)) as usize * num_datasets;
        for (dataset, sum) in sums.iter_mut().enumerate() {
            *sum += cell.values.get(base + dataset).copied().map_or(0, i64::from);
        }
    }
    Some(sums.into_iter().map(|s| s as f64 / multiplier).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_record_string() {
        let cell: CellValues = "15340,15342,1,2,3,4,5,6".parse().unwrap();
        assert_eq!(cell.min_offset, 15340);
        assert_eq!(cell.max_offset, 15342);
        assert_eq!(cell.span(), 3);
        assert_eq!(cell.values, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["", "10", "10,x,1", "12,10,1", "10,11,1,2,3", "10,10"] {
            assert!(
                matches!(CellValues::parse(raw), Err(FormatError::MalformedCellValues(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_window_sums_per_dataset() {
        let cell = CellValues::parse("100,103,1,10,2,20,3,30,4,40").unwrap();
        assert_eq!(aggregate_cell(&cell, 1, 2, 100, 2, 1.0), Some(vec![5.0, 50.0]));
        assert_eq!(aggregate_cell(&cell, 0, 30, 90, 2, 10.0), Some(vec![1.0, 10.0]));
        assert_eq!(aggregate_cell(&cell, 5, 1, 100, 2, 1.0), None);
        assert_eq!(aggregate_cell(&cell, -10, 5, 100, 2, 1.0), None);
    }
}
