//! # Pixel Pyramid
//!
//! Uniform access to the raw samples of multi-resolution, multi-channel
//! tiled image pyramids.
//!
//! Buffers returned by this crate are always in a representation a GPU can
//! upload directly: one of the registered [`Dtype`]s, with signed and
//! ambiguous decoder output reinterpreted accordingly.
//!
//! ## Features
//!
//! - **Exact edge tiles**: tiles on the right and bottom edges report their
//!   true, smaller extent
//! - **Type normalization**: decoder output is reinterpreted into a
//!   GPU-safe dtype without copying where possible
//! - **Volumes**: z-stacks are decoded concurrently into one flat buffer,
//!   with progress reporting
//! - **Cancellation**: tile requests race a [`CancellationToken`] and never
//!   expose partial results
//!
//! ## Architecture
//!
//! - [`dtype`] - Sample type registry and GPU texture formats
//! - [`pixel`] - Sample buffers, type normalizer and channel statistics
//! - [`tile`] - Tile extent calculator
//! - [`source`] - Selections, the pixel source contract and its tiled implementation
//! - [`legacy`] - Per-channel pyramid adapter kept for older callers
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust
//! use pixel_pyramid::{
//!     MemoryDecoder, MemoryPlane, MemoryPlanes, PixelSource, SampleBuffer, Selection,
//!     TiledPixelSource, Dtype,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut planes = MemoryPlanes::new();
//!     for z in 0..4 {
//!         let plane = MemoryPlane::single(8, 8, SampleBuffer::Int16(vec![z as i16 - 2; 64])).unwrap();
//!         planes.insert(Selection::from([("z", z)]), plane);
//!     }
//!
//!     let source =
//!         TiledPixelSource::new(planes, MemoryDecoder, Dtype::Uint16, 4, vec![4, 8, 8], ["z", "y", "x"])
//!             .unwrap();
//!
//!     let volume = source
//!         .get_volume(&Selection::from([("z", 0)]), &|_: f64| {}, 2)
//!         .await
//!         .unwrap();
//!     assert_eq!(volume.depth, 2);
//!     assert_eq!(volume.data.len(), 8 * 8 * 2);
//! }
//! ```
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod config;
pub mod dtype;
pub mod error;
pub mod legacy;
pub mod pixel;
pub mod source;
pub mod tile;

// Re-export commonly used types
pub use config::{Cli, Command, OutputFormat, TilesConfig, VolumeConfig};
pub use dtype::{lookup, registry, Dtype, DtypeDescriptor, GpuCapabilities, GpuFormat};
pub use error::{DecodeError, PixelSourceError};
pub use legacy::{infer_dtype, LegacyPyramid, LegacyViewerMeta, PyramidPlane, SampleFormat};
pub use pixel::{channel_stats, normalize, ChannelStats, PixelData, SampleBuffer, SampleKind};
pub use source::{
    fetch_tile, DecodeOptions, DecodedRaster, DecodedSamples, Dimensions, ErrorReporter,
    Indexer, MemoryDecoder, MemoryPlane, MemoryPlanes, PixelSource, PixelSourceMeta,
    PlaneDecoder, RasterResult, Selection, TiledPixelSource, TracingErrorReporter, VolumeResult,
};
pub use tile::{TileExtent, TileGrid, Window};
