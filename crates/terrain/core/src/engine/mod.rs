//! Terrain mutation, autotiling, correction and generation.
//!
//! [`TerrainEngine`] is the only writable view of terrain state. Every
//! mutation commits its change first, then recomputes transitions for the
//! 3x3 window around the edited cell, then notifies the observer once per
//! recomputed cell. Randomness comes exclusively from the lent [`SyncRand`],
//! consumed in a fixed order so peers running in lockstep stay identical.

mod correction;
mod errors;
mod generate;
mod mutation;
mod observer;
mod pattern;
mod plan;
mod transition;

pub use correction::CorrectionReport;
pub use errors::EngineError;
pub use generate::{GenerationParams, GenerationParamsBuilder, GenerationReport};
pub use observer::{CellObserver, ChangeRecorder};
pub use pattern::TransitionPattern;
pub use plan::{GenerationPlan, GenerationStep, PlanReport};

use crate::config::EngineConfig;
use crate::env::{SyncRand, TerrainEnv, TerrainType, TerrainTypeId};
use crate::state::{LayerId, Position, Region, TileGrid};

/// Borrowing facade over a [`TileGrid`] that keeps its cells consistent.
pub struct TerrainEngine<'a> {
    grid: &'a mut TileGrid,
    env: TerrainEnv<'a>,
    rng: &'a mut dyn SyncRand,
    observer: Option<&'a mut dyn CellObserver>,
    config: EngineConfig,
}

impl<'a> TerrainEngine<'a> {
    pub fn new(grid: &'a mut TileGrid, env: TerrainEnv<'a>, rng: &'a mut dyn SyncRand) -> Self {
        Self {
            grid,
            env,
            rng,
            observer: None,
            config: EngineConfig::default(),
        }
    }

    /// Attaches the collaborator notified for each recomputed cell.
    pub fn with_observer(mut self, observer: &'a mut dyn CellObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn grid(&self) -> &TileGrid {
        self.grid
    }

    pub fn env(&self) -> TerrainEnv<'a> {
        self.env
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn terrain(&self, id: TerrainTypeId) -> Result<&'a TerrainType, EngineError> {
        self.env
            .catalog()
            .get(id)
            .ok_or(EngineError::UnknownTerrain(id))
    }

    fn notify(&mut self, layer: LayerId, position: Position) {
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_cell_changed(layer, position);
        }
    }

    /// Validates that `region` is non-empty and lies fully inside `layer`.
    fn resolve_region(&self, layer: LayerId, region: Region) -> Result<Region, EngineError> {
        let dimensions = self.grid.layer(layer)?.dimensions();
        if region.is_empty() || !dimensions.contains(region.min) || !dimensions.contains(region.max)
        {
            return Err(EngineError::InvalidRegion { layer, region });
        }
        Ok(region)
    }
}

impl core::fmt::Debug for TerrainEngine<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TerrainEngine")
            .field("layers", &self.grid.layer_count())
            .field("env", &self.env)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
