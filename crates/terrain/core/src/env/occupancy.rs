use crate::env::TerrainType;
use crate::state::{LayerId, Position};

/// Answers whether painting a terrain under a tile's current occupants is legal.
///
/// Supplied by the unit/occupancy subsystem; generation consults it so that
/// unpassable terrain is never grown under existing units or buildings.
pub trait OccupancyOracle {
    fn is_occupant_compatible(&self, layer: LayerId, position: Position, terrain: &TerrainType)
    -> bool;
}

/// Oracle for maps without occupants: every terrain is compatible everywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOccupants;

impl OccupancyOracle for NoOccupants {
    fn is_occupant_compatible(&self, _: LayerId, _: Position, _: &TerrainType) -> bool {
        true
    }
}
