//! Sample buffers and their normalization.
//!
//! - [`SampleBuffer`]: decoded samples tagged with their element kind
//! - [`PixelData`]: GPU-safe samples in one of the registered dtypes
//! - [`normalize`]: the reinterpretation rules between the two
//! - [`channel_stats`]: intensity statistics for display defaults

mod data;
mod normalize;
mod stats;

pub use data::{PixelData, Sample, SampleBuffer, SampleKind};
pub use normalize::{normalize, VolumeSample};
pub use stats::{channel_stats, ChannelStats};
