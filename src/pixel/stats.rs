//! Per-channel intensity statistics.
//!
//! Used by viewers to seed contrast limits and slider domains from a
//! low-resolution raster.

use serde::Serialize;

use super::data::PixelData;

/// Fraction trimmed from each end of the positive samples for contrast limits.
const CONTRAST_CUTOFF: f64 = 0.0005;

/// Summary statistics of one channel's samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStats {
    pub mean: f64,
    pub sd: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,

    /// `[min, max]` over all samples
    pub domain: [f64; 2],

    /// Robust display range from the positive samples
    pub contrast_limits: [f64; 2],
}

/// Compute statistics for a channel, or `None` if it has no samples.
pub fn channel_stats(data: &PixelData) -> Option<ChannelStats> {
    let mut values = data.to_f64_vec();
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let (min, max, total) = values.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, total), &v| (min.min(v), max.max(v), total + v),
    );
    let mean = total / n;
    let sd = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

    values.sort_unstable_by(f64::total_cmp);
    let len = values.len();
    let median = values[len / 2];
    let q1 = values[len / 4];
    let q3 = values[3 * (len / 4)];

    // Sorted input keeps the positive tail sorted
    let positive = &values[values.partition_point(|&v| v <= 0.0)..];
    let top = (positive.len() as f64 * (1.0 - CONTRAST_CUTOFF)) as usize;
    let bottom = (positive.len() as f64 * CONTRAST_CUTOFF) as usize;
    let contrast_limits = [
        positive.get(bottom).copied().unwrap_or(0.0),
        positive.get(top).copied().unwrap_or(0.0),
    ];

    Some(ChannelStats {
        mean,
        sd,
        q1,
        median,
        q3,
        domain: [min, max],
        contrast_limits,
    })
}
