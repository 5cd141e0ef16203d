//! Reporting of per-tile failures.
//!
//! Renderers request many tiles and must not abort on one bad tile. The
//! failure goes to an [`ErrorReporter`] and the tile is simply skipped.
//! Cancellation is not a failure and is never reported.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::PixelSourceError;

use super::contract::{PixelSource, RasterResult};
use super::selection::Selection;

/// Receives tile failures on behalf of the rendering layer.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, x: u32, y: u32, selection: &Selection, error: &PixelSourceError);
}

/// Logs tile failures as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, x: u32, y: u32, selection: &Selection, error: &PixelSourceError) {
        warn!(x, y, %selection, %error, "tile failed");
    }
}

/// Fetch a tile, routing failures to `reporter`.
///
/// Returns `None` when the tile failed or was cancelled.
pub async fn fetch_tile<S: PixelSource + ?Sized>(
    source: &S,
    x: u32,
    y: u32,
    selection: &Selection,
    cancel: &CancellationToken,
    reporter: &dyn ErrorReporter,
) -> Option<RasterResult> {
    match source.get_tile(x, y, selection, cancel).await {
        Ok(tile) => Some(tile),
        Err(error) if error.is_cancelled() => {
            debug!(x, y, %selection, "tile cancelled");
            None
        }
        Err(error) => {
            reporter.report(x, y, selection, &error);
            None
        }
    }
}
