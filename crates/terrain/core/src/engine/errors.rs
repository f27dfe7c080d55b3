//! Error types raised by the terrain engine.

use crate::env::TerrainTypeId;
use crate::error::{ErrorSeverity, TerrainError};
use crate::state::{Channel, LayerId, Position, Region};

/// Errors surfaced by queries, mutations, correction, and generation.
///
/// Missing tile variants and exhausted generation budgets are not errors;
/// they degrade the result and are only logged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineError {
    /// Position outside the layer bounds.
    #[error("position {position} is outside {layer}")]
    OutOfBounds { layer: LayerId, position: Position },

    #[error("{0} does not exist")]
    UnknownLayer(LayerId),

    #[error("{0} is not in the terrain catalog")]
    UnknownTerrain(TerrainTypeId),

    /// Region empty or not fully inside the layer.
    #[error("region {region} is not a valid area of {layer}")]
    InvalidRegion { layer: LayerId, region: Region },

    /// The correction loop hit its pass cap: the catalog describes
    /// adjacency rules that cannot converge in this region.
    #[error(
        "{channel} terrain in {layer} region {region} did not converge after {passes} correction passes"
    )]
    TerrainIntegrity {
        layer: LayerId,
        region: Region,
        channel: Channel,
        passes: u32,
    },
}

impl TerrainError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        use EngineError::*;
        match self {
            OutOfBounds { .. } | UnknownLayer(_) | UnknownTerrain(_) | InvalidRegion { .. } => {
                ErrorSeverity::Validation
            }
            TerrainIntegrity { .. } => ErrorSeverity::Data,
        }
    }

    fn error_code(&self) -> &'static str {
        use EngineError::*;
        match self {
            OutOfBounds { .. } => "ENGINE_OUT_OF_BOUNDS",
            UnknownLayer(_) => "ENGINE_UNKNOWN_LAYER",
            UnknownTerrain(_) => "ENGINE_UNKNOWN_TERRAIN",
            InvalidRegion { .. } => "ENGINE_INVALID_REGION",
            TerrainIntegrity { .. } => "ENGINE_TERRAIN_INTEGRITY",
        }
    }
}
