//! Error types for temporal grid aggregation.

use thiserror::Error;

/// The integer buffer does not follow the header/record layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Fewer than the two header integers (rows, cols).
    #[error("buffer of length {len} is missing the rows/cols header")]
    MissingHeader { len: usize },

    /// The header declares a zero-sized grid but records follow.
    #[error("grid header declares {rows}x{cols} cells but the buffer holds records")]
    EmptyGrid { rows: u32, cols: u32 },

    /// A record needs more integers than the buffer has left.
    #[error("record at position {position} needs {needed} integers, only {available} left")]
    Truncated {
        position: usize,
        needed: usize,
        available: usize,
    },

    /// A record whose max offset precedes its min offset.
    #[error("cell {cell} declares max offset {max} before min offset {min}")]
    NegativeSpan { cell: u32, min: u32, max: u32 },

    /// A cell index outside the declared grid.
    #[error("cell {cell} is outside the {cells}-cell grid")]
    CellOutOfGrid { cell: u32, cells: u64 },

    /// A `rawValues` string that cannot be read back.
    #[error("malformed raw cell values: {0}")]
    MalformedCellValues(String),
}

/// The aggregation configuration is inconsistent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("delta must be at least 1, got {0}")]
    InvalidDelta(i64),

    #[error("numDatasets must be at least 1, got {0}")]
    InvalidDatasetCount(i64),

    #[error("value multiplier must be finite and positive, got {0}")]
    InvalidMultiplier(f64),

    #[error("{mode} combinationMode requires {expected} breaks arrays, got {actual}")]
    BreaksCount {
        mode: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("bivariate combinationMode requires exactly 2 datasets, got {0}")]
    BivariateDatasets(usize),

    #[error("bivariate breaks arrays must have the same length, got {0} and {1}")]
    BivariateBreakLengths(usize, usize),

    #[error("breaks array {0} is empty")]
    EmptyBreaks(usize),

    #[error("breaks array {0} must be finite and ascending")]
    UnsortedBreaks(usize),

    #[error("unknown combinationMode: {0}")]
    UnknownCombinationMode(String),

    #[error("unknown geomType: {0}")]
    UnknownGeomType(String),

    #[error("invalid tile: {0}")]
    InvalidTile(String),

    #[error("invalid value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

impl ConfigError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

/// Any failure of a tile aggregation. Both kinds abort the whole tile.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AggregateError {
    /// HTTP status a tile endpoint should answer with.
    ///
    /// Configuration errors come from the request itself; format errors
    /// mean the upstream API sent an unreadable payload.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AggregateError::Config(_) => 400,
            AggregateError::Format(_) => 502,
        }
    }
}

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregateError>;
