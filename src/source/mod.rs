//! Pixel source abstraction.
//!
//! This module provides uniform raster, tile and volume access to the
//! planes of a multi-dimensional, multi-resolution image.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     Rendering / volumetric viewer       │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │         PixelSource Trait               │
//! │  (get_raster / get_tile / get_volume)   │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          TiledPixelSource               │
//! │  TileGrid · normalize · assemble_volume │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │    Indexer      │    │   PlaneDecoder      │
//! │ (selection →    │    │ (plane → samples)   │
//! │  plane handle)  │    │                     │
//! └─────────────────┘    └─────────────────────┘
//! ```
//!
//! The indexer and decoder are supplied by the container-format layer;
//! [`MemoryPlanes`] and [`MemoryDecoder`] cover in-memory data.

mod contract;
mod memory;
mod report;
mod selection;
mod tiled;
mod volume;

pub use contract::{
    DecodeOptions, DecodedRaster, DecodedSamples, Indexer, PhysicalSize, PixelSource,
    PixelSourceMeta, PlaneDecoder, ProgressFn, RasterResult, VolumeResult,
};
pub use memory::{MemoryDecoder, MemoryPlane, MemoryPlanes, DEFAULT_MEMORY_TILE_SIZE};
pub use report::{fetch_tile, ErrorReporter, TracingErrorReporter};
pub use selection::{Dimensions, Selection, INTERLEAVE_LABEL, X_LABEL, Y_LABEL, Z_LABEL};
pub use tiled::TiledPixelSource;
pub use volume::{assemble_volume, downsampled_depth};
