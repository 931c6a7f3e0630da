//! Error types for landscape decoding, encoding and lookups
//!
//! Decode failures are scoped to the sector being parsed. [`crate::Landscape`]
//! records them in its assembly report and keeps going with the rest of the
//! grid; a caller working with a single [`crate::Sector`] decides whether the
//! failure is fatal.
//!
//! # Error Categories
//!
//! ## Per-sector data errors
//!
//! - [`LandscapeError::TruncatedInput`] - a record ended before all of its
//!   cells were produced
//! - [`LandscapeError::MalformedEntry`] - a run token overshot the 2304-cell
//!   grid
//!
//! ## Lookup errors (recoverable, "no tile here")
//!
//! - [`LandscapeError::OutOfBounds`] - sector coordinates outside the
//!   65x56x4 grid
//! - [`LandscapeError::InvalidWorldCoordinates`] - a world position that maps
//!   to no grid cell at all
//! - [`LandscapeError::SectorNotPopulated`] - an in-range sector that holds no
//!   data
//!
//! ## Contract violations
//!
//! - [`LandscapeError::UnencodableValue`] - a buffer value the target record
//!   format cannot represent
//! - [`LandscapeError::InvalidTileCount`] - authored tile data of the wrong
//!   shape
//! - [`LandscapeError::MixedSourceFormats`] - `.jm` and `.hei/.dat/.loc`
//!   sources registered on one landscape

use thiserror::Error;

/// Result type alias using [`LandscapeError`] as the error type.
pub type Result<T> = std::result::Result<T, LandscapeError>;

/// Errors that can occur while decoding, encoding or addressing landscape data
#[derive(Error, Debug)]
pub enum LandscapeError {
    /// A record ended before every cell of a field was decoded
    #[error("Truncated {field} data: needed {needed} bytes, only {available} available")]
    TruncatedInput {
        /// Field being decoded when the input ran out
        field: &'static str,
        /// Bytes required to make progress
        needed: usize,
        /// Length of the record
        available: usize,
    },

    /// A run-length stream described a different number of cells than a sector holds
    #[error("Malformed {field} data: run ends at cell {produced}, sector holds 2304 cells")]
    MalformedEntry {
        /// Field being decoded
        field: &'static str,
        /// Cell count reached by the offending run
        produced: usize,
    },

    /// Sector coordinates fall outside the landscape grid
    #[error("Sector ({x}, {y}) on plane {plane} is outside the landscape grid")]
    OutOfBounds {
        /// Sector X
        x: i64,
        /// Sector Y
        y: i64,
        /// Plane
        plane: i64,
    },

    /// World coordinates that do not map onto the grid
    #[error("World coordinates ({x}, {y}) are outside the landscape")]
    InvalidWorldCoordinates {
        /// World X
        x: i32,
        /// World Y
        y: i32,
    },

    /// The requested sector is in range but holds no data
    #[error("Sector ({x}, {y}) on plane {plane} is not populated")]
    SectorNotPopulated {
        /// Sector X
        x: usize,
        /// Sector Y
        y: usize,
        /// Plane
        plane: usize,
    },

    /// A buffer value cannot be represented in the target record format
    #[error("Cannot encode {field} value {value} at cell {index}")]
    UnencodableValue {
        /// Field being encoded
        field: &'static str,
        /// Cell index of the value
        index: usize,
        /// Offending value
        value: i64,
    },

    /// Authored tile data does not describe a full 48x48 sector
    #[error("Invalid tile count: expected {expected}, found {found}")]
    InvalidTileCount {
        /// Expected tile count
        expected: usize,
        /// Tile count provided
        found: usize,
    },

    /// `.jm` sources and `.hei/.dat/.loc` sources cannot be combined
    #[error("Cannot mix .jm sources with .hei/.dat/.loc sources in one landscape")]
    MixedSourceFormats,
}

impl LandscapeError {
    /// Whether this error describes bad record bytes rather than a bad request
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::TruncatedInput { .. } | Self::MalformedEntry { .. }
        )
    }
}
