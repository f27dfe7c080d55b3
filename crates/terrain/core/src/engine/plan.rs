//! Multi-step map generation.
//!
//! A plan runs several generation steps back to back and corrects the
//! touched area once at the end, the way a map script paints water, then
//! hills, then forests before cleaning up.

use crate::state::{LayerId, Position, Region};

use super::{CorrectionReport, EngineError, GenerationParams, GenerationReport, TerrainEngine};

/// One generation pass; `region: None` covers the whole layer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStep {
    #[cfg_attr(feature = "serde", serde(default))]
    pub region: Option<Region>,
    pub params: GenerationParams,
}

impl GenerationStep {
    pub fn new(region: Option<Region>, params: GenerationParams) -> Self {
        Self { region, params }
    }

    pub fn whole_layer(params: GenerationParams) -> Self {
        Self::new(None, params)
    }
}

/// Ordered list of generation steps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationPlan {
    pub steps: Vec<GenerationStep>,
}

impl GenerationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: GenerationStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: GenerationStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Outcome of [`TerrainEngine::apply_plan`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanReport {
    /// One report per step, in plan order.
    pub steps: Vec<GenerationReport>,
    pub correction: CorrectionReport,
    /// Area handed to the corrector: every painted region plus a one-tile
    /// margin, clipped to the layer. `None` when nothing was painted.
    pub corrected: Option<Region>,
}

impl PlanReport {
    pub fn tiles_painted(&self) -> usize {
        self.steps.iter().map(|step| step.tiles_painted).sum()
    }
}

impl TerrainEngine<'_> {
    /// Runs every step of `plan`, then [`correct_region`](Self::correct_region)
    /// over the union of the painted regions.
    ///
    /// # Errors
    ///
    /// Stops at the first step or correction error.
    pub fn apply_plan(
        &mut self,
        layer: LayerId,
        plan: &GenerationPlan,
    ) -> Result<PlanReport, EngineError> {
        let dimensions = self.grid.layer(layer)?.dimensions();
        let mut report = PlanReport::default();
        let mut touched: Option<Region> = None;

        for step in &plan.steps {
            let region = step
                .region
                .or_else(|| dimensions.full_region())
                .ok_or(EngineError::InvalidRegion {
                    layer,
                    region: Region::single(Position::ORIGIN),
                })?;
            let generated = self.generate(layer, region, &step.params)?;
            if generated.tiles_painted > 0 {
                touched = Some(touched.map_or(region, |area| area.union(&region)));
            }
            report.steps.push(generated);
        }

        report.corrected = touched.and_then(|area| area.expand(1).clamp_to(dimensions));
        if let Some(area) = report.corrected {
            report.correction = self.correct_region(layer, area)?;
        }
        tracing::debug!(
            "plan of {} steps on {}: {} tiles painted, {} corrected",
            plan.len(),
            layer,
            report.tiles_painted(),
            report.correction.changes
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{PcgSyncRand, TerrainCatalog, TerrainEnv, TerrainType, TerrainTypeId};
    use crate::state::{MapDimensions, TileFlags, TileGrid};

    const GRASS: TerrainTypeId = TerrainTypeId(0);
    const WATER: TerrainTypeId = TerrainTypeId(1);
    const FOREST: TerrainTypeId = TerrainTypeId(2);

    fn catalog() -> TerrainCatalog {
        TerrainCatalog::new(vec![
            TerrainType::builder(GRASS, "grass")
                .flags(TileFlags::LAND)
                .border(WATER)
                .build(),
            TerrainType::builder(WATER, "water")
                .flags(TileFlags::WATER)
                .border(GRASS)
                .inner_border(GRASS)
                .build(),
            TerrainType::builder(FOREST, "forest")
                .overlay(true)
                .base(GRASS)
                .build(),
        ])
        .unwrap()
    }

    fn plan() -> GenerationPlan {
        GenerationPlan::new()
            .with_step(GenerationStep::new(
                Some(Region::new(Position::new(1, 1), Position::new(6, 6))),
                GenerationParams::builder(WATER).seed_count(2).expansion_count(6).build(),
            ))
            .with_step(GenerationStep::whole_layer(
                GenerationParams::builder(FOREST).seed_count(3).expansion_count(10).build(),
            ))
    }

    fn run(seed: u64) -> (TileGrid, PlanReport) {
        let catalog = catalog();
        let mut grid = TileGrid::with_layer(MapDimensions::new(10, 10));
        let mut rng = PcgSyncRand::new(seed);
        let mut engine = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng);
        engine.fill_layer(LayerId::SURFACE, GRASS).unwrap();
        let report = engine.apply_plan(LayerId::SURFACE, &plan()).unwrap();
        (grid, report)
    }

    #[test]
    fn plan_reports_every_step_and_corrects_once() {
        let (_, report) = run(17);
        assert_eq!(report.steps.len(), 2);
        assert!(report.tiles_painted() > 0);
        // the forest step spans the layer, so the margin is clipped to it
        assert_eq!(
            report.corrected,
            Some(Region::new(Position::ORIGIN, Position::new(9, 9)))
        );
        assert!(report.correction.passes >= 4);
    }

    #[test]
    fn plans_are_reproducible() {
        let (first, _) = run(99);
        let (second, _) = run(99);
        assert_eq!(first.state_root(), second.state_root());
    }

    #[test]
    fn empty_plan_touches_nothing() {
        let catalog = catalog();
        let mut grid = TileGrid::with_layer(MapDimensions::new(3, 3));
        let mut rng = PcgSyncRand::new(1);
        let report = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng)
            .apply_plan(LayerId::SURFACE, &GenerationPlan::new())
            .unwrap();
        assert_eq!(report, PlanReport::default());
    }
}
