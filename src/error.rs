use thiserror::Error;

use crate::dtype::Dtype;
use crate::pixel::SampleKind;
use crate::tile::TileGrid;

/// Errors produced by a decode capability while turning a plane into samples.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// Failure reported by the underlying decode library
    #[error("Decode backend error: {0}")]
    Backend(String),

    /// Requested window does not fit inside the plane
    #[error(
        "Window [{x0}, {y0}, {x1}, {y1}) out of bounds for {width}x{height} plane"
    )]
    WindowOutOfBounds {
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        width: u32,
        height: u32,
    },

    /// Decoded element count does not match the reported raster size
    #[error("Sample count mismatch: expected {expected} samples, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    /// Buffers that must share an element kind do not
    #[error("Sample kind mismatch: expected {expected}, got {actual}")]
    SampleKindMismatch {
        expected: SampleKind,
        actual: SampleKind,
    },

    /// No GPU-safe representation exists for this kind under this dtype
    #[error("Cannot represent {kind} samples as {dtype}")]
    UnsupportedConversion { dtype: Dtype, kind: SampleKind },

    /// Planar decode returned no bands
    #[error("Decoded raster has no bands")]
    MissingBand,

    /// Byte buffer length is not a multiple of the element width
    #[error("Byte length {len} is not a multiple of element width {width}")]
    Misaligned { len: usize, width: usize },
}

/// Errors surfaced by pixel source operations.
#[derive(Debug, Clone, Error)]
pub enum PixelSourceError {
    /// Selection keys or indices do not match the source's labels and shape
    #[error("Invalid selection: {reason}")]
    InvalidSelection { reason: String },

    /// Shape and labels cannot describe a pixel source
    #[error("Invalid shape: {reason}")]
    InvalidShape { reason: String },

    /// The indexer could not resolve a selection to a plane
    #[error("Plane not found: {0}")]
    NotFound(String),

    /// Sample type tag is not in the registry
    #[error("Unsupported dtype: {0}")]
    UnsupportedDtype(String),

    /// The request was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// Tile coordinates lie beyond the level's tile grid
    #[error("Tile ({x}, {y}) out of range: last tile is ({last_x}, {last_y})")]
    TileOutOfRange {
        x: u32,
        y: u32,
        last_x: u32,
        last_y: u32,
    },

    /// Zoom is not in `(min_zoom, 0]` (legacy adapter)
    #[error("Invalid zoom {zoom}: expected a value in ({min_zoom}, 0]")]
    InvalidZoom { zoom: i32, min_zoom: i32 },

    /// Pyramid level does not exist (legacy adapter)
    #[error("Invalid level {level}: pyramid has {level_count} levels")]
    InvalidLevel { level: usize, level_count: usize },

    /// Decode failure, propagated unchanged from the decode capability
    #[error("Decode failure: {0}")]
    Decode(#[from] DecodeError),
}

impl PixelSourceError {
    /// Whether this outcome is a cooperative abort rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PixelSourceError::Cancelled)
    }

    pub(crate) fn invalid_selection(reason: impl Into<String>) -> Self {
        PixelSourceError::InvalidSelection {
            reason: reason.into(),
        }
    }

    pub(crate) fn tile_out_of_range(x: u32, y: u32, grid: &TileGrid) -> Self {
        PixelSourceError::TileOutOfRange {
            x,
            y,
            last_x: grid.last_x(),
            last_y: grid.last_y(),
        }
    }

    pub(crate) fn invalid_shape(reason: impl Into<String>) -> Self {
        PixelSourceError::InvalidShape {
            reason: reason.into(),
        }
    }
}
