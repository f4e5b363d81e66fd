//! Error types for zonemark-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in zonemark-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// Color string that is not 6 or 8 hex digits
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Bounds with inverted or zero coordinates
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    /// The same color is used twice in a palette
    #[error("Color #{color} is used by both {first} and {second}")]
    DuplicatePaletteColor {
        color: String,
        first: String,
        second: String,
    },

    /// Session action before a palette was configured
    #[error("No palette configured")]
    NotConfigured,

    /// Zone id unknown to the session
    #[error("Zone {0} not found")]
    ZoneNotFound(u32),

    /// Pair index past the end of the palette
    #[error("Pair index {0} out of range (pairs: {1})")]
    PairOutOfRange(usize, usize),

    /// Label index past the end of a zone's label list
    #[error("Label index {index} out of range for zone {zone} ({count} labels)")]
    LabelOutOfRange { zone: u32, index: usize, count: usize },

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// File type the adapters cannot read
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
