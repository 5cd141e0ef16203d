//! Tile extent arithmetic.
//!
//! A pyramid level of `width x height` pixels is cut into `tile_size` square
//! tiles. Tiles in the last column/row may be smaller; they are never padded.
//!
//! The last column is `floor(width / tile_size)`. When `width` divides
//! evenly the remainder is zero and that column keeps the full tile width,
//! so no empty remainder tile is ever produced.

use serde::Serialize;

// =============================================================================
// Window
// =============================================================================

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Window {
    /// Window covering a whole `width x height` plane.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Number of pixels covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the window lies inside a `width x height` plane.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x0 <= self.x1 && self.y0 <= self.y1 && self.x1 <= width && self.y1 <= height
    }
}

// =============================================================================
// Tile Extent
// =============================================================================

/// The true pixel extent of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileExtent {
    /// Tile column
    pub x: u32,

    /// Tile row
    pub y: u32,

    /// Actual tile width in pixels (smaller than tile size at the right edge)
    pub width: u32,

    /// Actual tile height in pixels (smaller than tile size at the bottom edge)
    pub height: u32,

    pub tile_size: u32,
}

impl TileExtent {
    /// The pixel window this tile covers in its level.
    ///
    /// `None` if the window does not fit in `u32` pixel coordinates.
    pub fn window(&self) -> Option<Window> {
        let x0 = self.x.checked_mul(self.tile_size)?;
        let y0 = self.y.checked_mul(self.tile_size)?;
        Some(Window {
            x0,
            y0,
            x1: x0.checked_add(self.width)?,
            y1: y0.checked_add(self.height)?,
        })
    }

    /// Whether the tile is cut short by a level edge.
    pub fn is_partial(&self) -> bool {
        self.width < self.tile_size || self.height < self.tile_size
    }
}

// =============================================================================
// Tile Grid
// =============================================================================

/// Tile layout of one pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
}

impl TileGrid {
    /// Returns `None` for a zero tile size.
    pub fn new(width: u32, height: u32, tile_size: u32) -> Option<Self> {
        if tile_size == 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            tile_size,
        })
    }

    /// Number of tile columns.
    pub fn tiles_x(&self) -> u32 {
        self.width.div_ceil(self.tile_size)
    }

    /// Number of tile rows.
    pub fn tiles_y(&self) -> u32 {
        self.height.div_ceil(self.tile_size)
    }

    /// Extent of the tile at `(x, y)`.
    pub fn extent(&self, x: u32, y: u32) -> TileExtent {
        TileExtent {
            x,
            y,
            width: edge_length(x, self.width, self.tile_size),
            height: edge_length(y, self.height, self.tile_size),
            tile_size: self.tile_size,
        }
    }

    /// Largest addressable tile column, `floor(width / tile_size)`.
    ///
    /// On an exact multiple this is one past the last real column; the
    /// extent rule still reports a full tile there.
    pub fn last_x(&self) -> u32 {
        self.width / self.tile_size
    }

    /// Largest addressable tile row, `floor(height / tile_size)`.
    pub fn last_y(&self) -> u32 {
        self.height / self.tile_size
    }

    /// Extent of the tile at `(x, y)`, or `None` past the last column or row.
    pub fn checked_extent(&self, x: u32, y: u32) -> Option<TileExtent> {
        if x > self.last_x() || y > self.last_y() {
            return None;
        }
        Some(self.extent(x, y))
    }

    /// Pixel window of tile `(x, y)`, or `None` when it is out of range.
    pub fn tile_window(&self, x: u32, y: u32) -> Option<Window> {
        self.checked_extent(x, y)?.window()
    }

    /// All tiles of the level in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileExtent> + '_ {
        (0..self.tiles_y()).flat_map(move |y| (0..self.tiles_x()).map(move |x| self.extent(x, y)))
    }
}

fn edge_length(index: u32, dimension: u32, tile_size: u32) -> u32 {
    if index == dimension / tile_size {
        match dimension % tile_size {
            0 => tile_size,
            remainder => remainder,
        }
    } else {
        tile_size
    }
}

// =============================================================================
// Tests
// =============================================================================
