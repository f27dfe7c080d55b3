//! Deterministic tile-terrain engine.
//!
//! `terrain-core` stores a layered grid of terrain, computes the transition
//! (autotile) variants each cell draws with, repairs illegal adjacency
//! patterns, and grows terrain blobs during map generation. Every terrain
//! change flows through [`engine::TerrainEngine`], which recomputes the
//! affected 3×3 window and notifies observers. Randomness comes exclusively
//! from a caller-owned [`env::SyncRand`] stream so that peers running in
//! lockstep stay bit-identical.
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use config::EngineConfig;
pub use engine::{
    CellObserver, ChangeRecorder, CorrectionReport, EngineError, GenerationParams,
    GenerationParamsBuilder, GenerationPlan, GenerationReport, GenerationStep, PlanReport,
    TerrainEngine, TransitionPattern,
};
pub use env::{
    CatalogError, NoOccupants, OccupancyOracle, PcgSyncRand, SyncRand, TerrainCatalog,
    TerrainEnv, TerrainType, TerrainTypeBuilder, TerrainTypeId, TileVariantId, TransitionKey,
};
pub use error::{ErrorSeverity, TerrainError};
pub use state::{
    Cell, Channel, Direction, Directions, Layer, LayerId, MapDimensions, Position, Region,
    SeenTile, TileFlags, TileGrid, TransitionTile,
};
