//! Tile grid state: layers of cells and the coordinate types addressing them.
//!
//! Cells are readable by anyone holding the grid; terrain fields change only
//! through [`TerrainEngine`](crate::engine::TerrainEngine) so transition lists
//! never go stale.
mod cell;
mod flags;
mod grid;
mod types;

pub use cell::{Cell, SeenTile, TransitionTile};
pub use flags::{Channel, TileFlags};
pub use grid::{Layer, TileGrid};
pub use types::{Direction, Directions, LayerId, MapDimensions, Position, Region};
