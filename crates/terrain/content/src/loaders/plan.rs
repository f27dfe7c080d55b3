//! Generation plan loader.

use std::path::Path;

use serde::Deserialize;
use terrain_core::{
    GenerationParams, GenerationPlan, GenerationStep, Position, Region, TerrainCatalog,
};

use crate::loaders::{LoadResult, read_file};

/// Plan file root: `(steps: [StepDef])`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanDef {
    steps: Vec<StepDef>,
}

/// One step; `region` is `(min_x, min_y, max_x, max_y)`, inclusive.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepDef {
    #[serde(default)]
    region: Option<(i32, i32, i32, i32)>,
    terrain: String,
    #[serde(default)]
    seeds: u32,
    #[serde(default)]
    expansions: u32,
    #[serde(default)]
    preserve_coastline: bool,
    #[serde(default = "grow_from_existing")]
    use_existing_as_seeds: bool,
    #[serde(default)]
    max_percent: u8,
}

fn grow_from_existing() -> bool {
    true
}

/// Loader for generation plans from RON files.
///
/// Terrains are referenced by identifier, so a plan is resolved against the
/// catalog it will run with.
pub struct PlanLoader;

impl PlanLoader {
    pub fn load(path: &Path, catalog: &TerrainCatalog) -> LoadResult<GenerationPlan> {
        let content = read_file(path)?;
        let plan = Self::parse(&content, catalog)
            .map_err(|e| anyhow::anyhow!("Failed to load plan {}: {}", path.display(), e))?;
        tracing::debug!("loaded {} generation steps from {}", plan.len(), path.display());
        Ok(plan)
    }

    pub fn parse(content: &str, catalog: &TerrainCatalog) -> LoadResult<GenerationPlan> {
        let def: PlanDef = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse generation plan RON: {}", e))?;

        def.steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| resolve_step(index, step, catalog))
            .collect::<LoadResult<Vec<_>>>()
            .map(|steps| GenerationPlan { steps })
    }
}

fn resolve_step(index: usize, step: StepDef, catalog: &TerrainCatalog) -> LoadResult<GenerationStep> {
    let terrain = catalog.by_ident(&step.terrain).ok_or_else(|| {
        anyhow::anyhow!("Step {} references unknown terrain '{}'", index, step.terrain)
    })?;

    if step.max_percent > 100 {
        anyhow::bail!(
            "Step {} has max_percent {}, expected 0..=100",
            index,
            step.max_percent
        );
    }

    let region = step
        .region
        .map(|(min_x, min_y, max_x, max_y)| {
            let region = Region::new(Position::new(min_x, min_y), Position::new(max_x, max_y));
            if region.is_empty() {
                anyhow::bail!("Step {} has an empty region {:?}", index, region);
            }
            Ok(region)
        })
        .transpose()?;

    let params = GenerationParams::builder(terrain.id)
        .seed_count(step.seeds)
        .expansion_count(step.expansions)
        .preserve_coastline(step.preserve_coastline)
        .use_existing_as_seeds(step.use_existing_as_seeds)
        .max_percent(step.max_percent)
        .build();

    Ok(GenerationStep::new(region, params))
}
