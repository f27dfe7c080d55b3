//! Read-only collaborators the engine consumes.
//!
//! The terrain catalog and the occupancy oracle are bundled in [`TerrainEnv`];
//! the random stream is lent separately because it is the one mutable input.
mod catalog;
mod occupancy;
mod rng;

pub use catalog::{
    CatalogError, TerrainCatalog, TerrainType, TerrainTypeBuilder, TerrainTypeId, TileVariantId,
    TransitionKey,
};
pub use occupancy::{NoOccupants, OccupancyOracle};
pub use rng::{PcgSyncRand, SyncRand, choose};

static NO_OCCUPANTS: NoOccupants = NoOccupants;

/// Aggregates the read-only oracles required by the engine.
#[derive(Clone, Copy)]
pub struct TerrainEnv<'a> {
    catalog: &'a TerrainCatalog,
    occupancy: &'a dyn OccupancyOracle,
}

impl<'a> TerrainEnv<'a> {
    pub fn new(catalog: &'a TerrainCatalog, occupancy: &'a dyn OccupancyOracle) -> Self {
        Self { catalog, occupancy }
    }

    /// Environment for maps without occupants.
    pub fn with_catalog(catalog: &'a TerrainCatalog) -> Self {
        Self::new(catalog, &NO_OCCUPANTS)
    }

    pub fn catalog(&self) -> &'a TerrainCatalog {
        self.catalog
    }

    pub fn occupancy(&self) -> &'a dyn OccupancyOracle {
        self.occupancy
    }
}

impl core::fmt::Debug for TerrainEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TerrainEnv")
            .field("terrains", &self.catalog.len())
            .finish_non_exhaustive()
    }
}
