//! Tile geometry.
//!
//! - [`TileGrid`]: tile layout of one pyramid level
//! - [`TileExtent`]: true pixel extent of one tile, shrunk at level edges
//! - [`Window`]: pixel rectangle handed to windowed decodes
//!
//! # Example
//!
//! ```
//! use pixel_pyramid::tile::TileGrid;
//!
//! let grid = TileGrid::new(1000, 800, 256).unwrap();
//! let edge = grid.extent(3, 3);
//! assert_eq!((edge.width, edge.height), (232, 32));
//! ```

mod extent;

pub use extent::{TileExtent, TileGrid, Window};
