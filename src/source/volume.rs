//! Volume assembly.
//!
//! Every `downsample`-th z slice is decoded concurrently and written into a
//! single destination buffer. Assembled slice `k` (in selection order) lands
//! at depth position `depth' - 1 - k`, so the stack is stored in reverse z.
//! Each task owns a disjoint chunk of the destination, which makes the
//! result independent of completion order. On any failure the whole buffer
//! is dropped.

use std::future::Future;

use futures::future::try_join_all;
use tracing::trace;

use crate::error::PixelSourceError;
use crate::pixel::{SampleBuffer, VolumeSample};

use super::contract::ProgressFn;

/// Number of slices kept when taking every `factor`-th of `depth`.
#[inline]
pub fn downsampled_depth(depth: usize, factor: usize) -> usize {
    depth / factor
}

/// Decode and assemble a reversed, downsampled z-stack.
///
/// `read_slice(z)` decodes source slice `z` into `plane_len` samples.
/// `on_progress` receives `0.5 / depth'` before each decode and again after
/// each write; calls from different slices may interleave.
pub async fn assemble_volume<T, F, Fut>(
    depth: usize,
    downsample: usize,
    plane_len: usize,
    on_progress: &ProgressFn<'_>,
    read_slice: F,
) -> Result<Vec<T>, PixelSourceError>
where
    T: VolumeSample,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<SampleBuffer, PixelSourceError>>,
{
    if downsample == 0 {
        return Err(PixelSourceError::invalid_selection(
            "downsample factor must be at least 1",
        ));
    }

    let out_depth = downsampled_depth(depth, downsample);
    if out_depth == 0 || plane_len == 0 {
        return Ok(Vec::new());
    }

    let mut data = vec![T::zeroed(); plane_len * out_depth];
    let step = 0.5 / out_depth as f64;

    let tasks = data
        .chunks_mut(plane_len)
        .enumerate()
        .map(|(position, dest)| {
            let slice = (out_depth - 1 - position) * downsample;
            let decode = read_slice(slice);
            async move {
                on_progress(step);
                let samples = decode.await?;
                T::write_clamped(&samples, dest)?;
                trace!(slice, position, "volume slice written");
                on_progress(step);
                Ok::<(), PixelSourceError>(())
            }
        });
    try_join_all(tasks).await?;

    Ok(data)
}

// =============================================================================
// Tests
// =============================================================================
