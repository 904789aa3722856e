//! Combination of per-dataset windowed sums into one property value.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::feature::PropertyValue;

/// Width of each zero-padded prefix sum in cumulative mode.
pub const CUMULATIVE_DIGITS: usize = 6;

/// Bucket index of `value`: the smallest `i` with `value <= breaks[i]`,
/// or `breaks.len()` when it exceeds every break.
pub fn bucket_index(breaks: &[f64], value: f64) -> usize {
    breaks
        .iter()
        .position(|&stop| value <= stop)
        .unwrap_or(breaks.len())
}

/// An ascending list of bucket thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakTable(Vec<f64>);

impl BreakTable {
    /// Validate one breaks array. `index` is its position in the request,
    /// used for error reporting.
    pub fn new(index: usize, values: Vec<f64>) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::EmptyBreaks(index));
        }
        let ascending = values.windows(2).all(|w| w[0] <= w[1]);
        if !ascending || values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::UnsortedBreaks(index));
        }
        Ok(Self(values))
    }

    pub fn bucket_index(&self, value: f64) -> usize {
        bucket_index(&self.0, value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Name of a combination mode as it appears in requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinationKind {
    Add,
    Compare,
    Bivariate,
    Literal,
    Cumulative,
}

impl CombinationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Compare => "compare",
            Self::Bivariate => "bivariate",
            Self::Literal => "literal",
            Self::Cumulative => "cumulative",
        }
    }
}

impl FromStr for CombinationKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "compare" => Ok(Self::Compare),
            "bivariate" => Ok(Self::Bivariate),
            "literal" => Ok(Self::Literal),
            "cumulative" => Ok(Self::Cumulative),
            _ => Err(ConfigError::UnknownCombinationMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for CombinationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated combination mode together with the break tables it uses.
#[derive(Debug, Clone, PartialEq)]
pub enum CombinationMode {
    /// Sum of all visible datasets, optionally bucketed.
    Add { breaks: Option<BreakTable> },
    /// The dominant visible dataset, optionally bucketed per dataset.
    Compare { breaks: Option<Vec<BreakTable>> },
    /// Two datasets classified on a grid of buckets.
    Bivariate { breaks: Option<[BreakTable; 2]> },
    /// Unclassified values for client-side combination.
    Literal,
    /// Zero-padded prefix sums, sliceable per dataset.
    Cumulative,
}

impl CombinationMode {
    /// Build a mode, checking the breaks and dataset count it requires.
    pub fn new(
        kind: CombinationKind,
        breaks: Option<Vec<Vec<f64>>>,
        num_datasets: usize,
    ) -> Result<Self, ConfigError> {
        let tables = breaks
            .map(|arrays| {
                arrays
                    .into_iter()
                    .enumerate()
                    .map(|(i, values)| BreakTable::new(i, values))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let expect_count = |tables: &Vec<BreakTable>, expected: usize| {
            if tables.len() != expected {
                return Err(ConfigError::BreaksCount {
                    mode: kind.as_str(),
                    expected,
                    actual: tables.len(),
                });
            }
            Ok(())
        };

        match kind {
            CombinationKind::Add => {
                let breaks = match tables {
                    Some(tables) => {
                        expect_count(&tables, 1)?;
                        tables.into_iter().next()
                    }
                    None => None,
                };
                Ok(Self::Add { breaks })
            }
            CombinationKind::Compare => {
                if let Some(tables) = &tables {
                    expect_count(tables, num_datasets)?;
                }
                Ok(Self::Compare { breaks: tables })
            }
            CombinationKind::Bivariate => {
                if num_datasets != 2 {
                    return Err(ConfigError::BivariateDatasets(num_datasets));
                }
                let breaks = match tables {
                    Some(tables) => {
                        expect_count(&tables, 2)?;
                        let [a, b]: [BreakTable; 2] = tables.try_into().map_err(
                            |t: Vec<BreakTable>| ConfigError::BreaksCount {
                                mode: kind.as_str(),
                                expected: 2,
                                actual: t.len(),
                            },
                        )?;
                        if a.len() != b.len() {
                            return Err(ConfigError::BivariateBreakLengths(a.len(), b.len()));
                        }
                        Some([a, b])
                    }
                    None => None,
                };
                Ok(Self::Bivariate { breaks })
            }
            CombinationKind::Literal | CombinationKind::Cumulative => {
                if let Some(tables) = &tables {
                    expect_count(tables, num_datasets)?;
                }
                Ok(if kind == CombinationKind::Literal {
                    Self::Literal
                } else {
                    Self::Cumulative
                })
            }
        }
    }

    pub fn kind(&self) -> CombinationKind {
        match self {
            Self::Add { .. } => CombinationKind::Add,
            Self::Compare { .. } => CombinationKind::Compare,
            Self::Bivariate { .. } => CombinationKind::Bivariate,
            Self::Literal => CombinationKind::Literal,
            Self::Cumulative => CombinationKind::Cumulative,
        }
    }
}

impl Default for CombinationMode {
    fn default() -> Self {
        Self::Add { breaks: None }
    }
}

/// Render a real value the way it appears inside text properties.
pub fn format_real(value: f64) -> String {
    format!("{}", value)
}

/// Turns windowed sums into property values for one configuration.
///
/// Invisible datasets are masked to zero before any mode runs.
#[derive(Debug, Clone)]
pub struct Combinator<'a> {
    mode: &'a CombinationMode,
    visible: &'a [bool],
    multiplier: f64,
    masked: Vec<i64>,
}

impl<'a> Combinator<'a> {
    pub fn new(mode: &'a CombinationMode, visible: &'a [bool], multiplier: f64) -> Self {
        Self {
            mode,
            visible,
            multiplier,
            masked: Vec::with_capacity(visible.len()),
        }
    }

    fn mask(&mut self, sums: &[i64]) {
        let visible = self.visible;
        self.masked.clear();
        self.masked.extend(sums.iter().enumerate().map(|(i, &sum)| {
            if visible.get(i).copied().unwrap_or(true) {
                sum
            } else {
                0
            }
        }));
    }

    fn is_visible(&self, dataset: usize) -> bool {
        self.visible.get(dataset).copied().unwrap_or(true)
    }

    fn real(&self, raw: i64) -> f64 {
        raw as f64 / self.multiplier
    }

    /// Combined value under the configured mode, `None` when it is all zero.
    pub fn combine(&mut self, sums: &[i64]) -> Option<PropertyValue> {
        self.mask(sums);
        match self.mode {
            CombinationMode::Add { breaks } => self.add(breaks.as_ref()),
            CombinationMode::Compare { breaks } => self.compare(breaks.as_deref()),
            CombinationMode::Bivariate { breaks } => self.bivariate(breaks.as_ref()),
            CombinationMode::Literal => self.literal_masked(),
            CombinationMode::Cumulative => self.cumulative(),
        }
    }

    /// Literal value regardless of the configured mode.
    pub fn literal(&mut self, sums: &[i64]) -> Option<PropertyValue> {
        self.mask(sums);
        self.literal_masked()
    }

    fn add(&self, breaks: Option<&BreakTable>) -> Option<PropertyValue> {
        let total: i64 = self.masked.iter().sum();
        if total <= 0 {
            return None;
        }
        let value = self.real(total);
        Some(match breaks {
            Some(table) => PropertyValue::from(table.bucket_index(value)),
            None => PropertyValue::from_real(value),
        })
    }

    fn compare(&self, breaks: Option<&[BreakTable]>) -> Option<PropertyValue> {
        let mut biggest: Option<(usize, i64)> = None;
        for (dataset, &sum) in self.masked.iter().enumerate() {
            if !self.is_visible(dataset) {
                continue;
            }
            if biggest.map_or(true, |(_, max)| sum > max) {
                biggest = Some((dataset, sum));
            }
        }

        let (dataset, max) = biggest?;
        if max <= 0 {
            return None;
        }
        let value = self.real(max);
        Some(match breaks {
            Some(tables) => {
                PropertyValue::from(dataset * 10 + tables[dataset].bucket_index(value))
            }
            None => PropertyValue::Text(format!("{};{}", dataset, format_real(value))),
        })
    }

    fn bivariate(&self, breaks: Option<&[BreakTable; 2]>) -> Option<PropertyValue> {
        let a = self.masked.first().copied().unwrap_or(0);
        let b = self.masked.get(1).copied().unwrap_or(0);
        if a == 0 && b == 0 {
            return None;
        }
        let (a, b) = (self.real(a), self.real(b));
        Some(match breaks {
            Some([table_a, table_b]) => {
                // Bucket 0 (at or below the first break) folds into the first
                // row/column; index 0 stays reserved for "no value".
                let col = table_a.bucket_index(a).max(1) - 1;
                let row = table_b.bucket_index(b).max(1) - 1;
                PropertyValue::from(row * table_a.len() + col + 1)
            }
            None => PropertyValue::Text(format!("{};{}", format_real(a), format_real(b))),
        })
    }

    fn literal_masked(&self) -> Option<PropertyValue> {
        if self.masked.iter().all(|&v| v == 0) {
            return None;
        }
        if let [single] = self.masked.as_slice() {
            return Some(PropertyValue::from_real(self.real(*single)));
        }
        let joined = self
            .masked
            .iter()
            .map(|&v| format_real(self.real(v)))
            .collect::<Vec<_>>()
            .join(",");
        Some(PropertyValue::Text(format!("[{}]", joined)))
    }

    fn cumulative(&self) -> Option<PropertyValue> {
        let total: i64 = self.masked.iter().sum();
        if total <= 0 {
            return None;
        }
        let mut out = String::with_capacity(self.masked.len() * CUMULATIVE_DIGITS);
        let mut running = 0i64;
        for &sum in &self.masked {
            running += sum;
            let _ = write!(out, "{:0width$}", running, width = CUMULATIVE_DIGITS);
        }
        Some(PropertyValue::Text(out))
    }
}
