//! Stochastic region-growing terrain generator.
//!
//! Seeds 2x2 blocks of a terrain at random positions, then grows from a
//! frontier of painted cells plus cells that already carry the terrain or one
//! of its border terrains. Best effort: exhausted retry budgets yield a
//! sparser result, never an error. Correction is left to the caller so batch
//! generation can defer it until every step has run.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::env::{TerrainType, TerrainTypeId, choose};
use crate::state::{Cell, Channel, Direction, LayerId, Position, Region};

use super::{EngineError, TerrainEngine};

const DIAGONALS: [Direction; 4] = [
    Direction::Northwest,
    Direction::Northeast,
    Direction::Southwest,
    Direction::Southeast,
];

/// Parameters of one generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationParams {
    pub terrain: TerrainTypeId,
    pub seed_count: u32,
    pub expansion_count: u32,
    /// Cells on the coastline at the start of the run keep their water/land
    /// classification.
    pub preserve_coastline: bool,
    /// Grow from cells in the region that already carry the terrain or one of
    /// its border terrains, not only from new seeds. On by default.
    pub use_existing_as_seeds: bool,
    /// Stop once this percentage of the region carries the terrain; 0 disables the limit.
    pub max_percent: u8,
}

impl GenerationParams {
    pub fn builder(terrain: TerrainTypeId) -> GenerationParamsBuilder {
        GenerationParamsBuilder::new(terrain)
    }
}

/// Builder for [`GenerationParams`].
#[derive(Clone, Debug)]
pub struct GenerationParamsBuilder {
    params: GenerationParams,
}

impl GenerationParamsBuilder {
    pub fn new(terrain: TerrainTypeId) -> Self {
        Self {
            params: GenerationParams {
                terrain,
                seed_count: 0,
                expansion_count: 0,
                preserve_coastline: false,
                use_existing_as_seeds: true,
                max_percent: 0,
            },
        }
    }

    /// Set the number of 2x2 seed blocks to place
    pub fn seed_count(mut self, seed_count: u32) -> Self {
        self.params.seed_count = seed_count;
        self
    }

    /// Set the number of growth steps
    pub fn expansion_count(mut self, expansion_count: u32) -> Self {
        self.params.expansion_count = expansion_count;
        self
    }

    pub fn preserve_coastline(mut self, preserve: bool) -> Self {
        self.params.preserve_coastline = preserve;
        self
    }

    pub fn use_existing_as_seeds(mut self, use_existing: bool) -> Self {
        self.params.use_existing_as_seeds = use_existing;
        self
    }

    /// Set the coverage cap, clamped to 100
    pub fn max_percent(mut self, max_percent: u8) -> Self {
        self.params.max_percent = max_percent.min(100);
        self
    }

    pub fn build(self) -> GenerationParams {
        self.params
    }
}

/// Outcome of a generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationReport {
    pub seeds_placed: u32,
    pub expansions: u32,
    /// Cells whose terrain actually changed.
    pub tiles_painted: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Growth {
    /// Every block cell must be new.
    Seed,
    /// Block cells may already carry the terrain; at least one must be new.
    Expand,
}

/// Read-only inputs shared by every eligibility check of one run.
struct RunContext<'t> {
    layer: LayerId,
    region: Region,
    terrain: &'t TerrainType,
    channel: Channel,
    coastline: BTreeSet<Position>,
}

/// Expansion may start from the terrain itself or from a terrain it borders.
fn grows_from(terrain: &TerrainType, channel: Channel, cell: &Cell) -> bool {
    cell.effective_terrain(channel)
        .is_some_and(|id| id == terrain.id || terrain.borders(id))
}

/// The four cells of the 2x2 block spanned by a cell and one of its diagonals.
fn block_cells(origin: Position, diagonal: Position) -> [Position; 4] {
    [
        origin,
        diagonal,
        Position::new(diagonal.x, origin.y),
        Position::new(origin.x, diagonal.y),
    ]
}

impl<'a> TerrainEngine<'a> {
    /// Paints `params.terrain` into `region` through the mutation API.
    ///
    /// # Errors
    ///
    /// Only for an unknown layer or terrain or an invalid region. Running out
    /// of retries is not an error.
    pub fn generate(
        &mut self,
        layer: LayerId,
        region: Region,
        params: &GenerationParams,
    ) -> Result<GenerationReport, EngineError> {
        let region = self.resolve_region(layer, region)?;
        let terrain = self.terrain(params.terrain)?;
        let channel = Channel::from_overlay(terrain.is_overlay);

        let current = self.grid.layer(layer)?;
        let carrying = region
            .positions()
            .filter(|&position| {
                current
                    .cell(position)
                    .is_some_and(|cell| cell.effective_terrain(channel) == Some(terrain.id))
            })
            .count();
        let mut frontier: Vec<Position> = if params.use_existing_as_seeds {
            region
                .positions()
                .filter(|&position| {
                    current
                        .cell(position)
                        .is_some_and(|cell| grows_from(terrain, channel, cell))
                })
                .collect()
        } else {
            Vec::new()
        };
        let coastline = if params.preserve_coastline {
            region
                .positions()
                .filter(|&position| current.cell(position).is_some_and(|cell| cell.is_coastal()))
                .collect()
        } else {
            BTreeSet::new()
        };

        let ctx = RunContext {
            layer,
            region,
            terrain,
            channel,
            coastline,
        };
        let cap = match params.max_percent {
            0 => usize::MAX,
            percent => region.area() * usize::from(percent) / 100,
        };
        let mut covered = carrying;
        let mut report = GenerationReport::default();
        let retry_factor = self.config.retry_factor;

        for _ in 0..params.seed_count.saturating_mul(retry_factor) {
            if report.seeds_placed >= params.seed_count || covered >= cap {
                break;
            }
            let candidate = self.random_position(region);
            let blocks = self.growth_blocks(&ctx, candidate, Growth::Seed)?;
            let Some(&diagonal) = choose(&mut *self.rng, &blocks) else {
                continue;
            };
            let painted = self.paint_block(&ctx, block_cells(candidate, diagonal))?;
            covered += painted.len();
            report.tiles_painted += painted.len();
            frontier.extend(painted);
            report.seeds_placed += 1;
        }

        for _ in 0..params.expansion_count.saturating_mul(retry_factor) {
            if report.expansions >= params.expansion_count || covered >= cap || frontier.is_empty() {
                break;
            }
            let index = self.rng.next_random(frontier.len() as u32) as usize;
            let candidate = frontier[index];
            let blocks = if self.is_growth_candidate(&ctx, candidate)? {
                self.growth_blocks(&ctx, candidate, Growth::Expand)?
            } else {
                ArrayVec::new()
            };
            let Some(&diagonal) = choose(&mut *self.rng, &blocks) else {
                frontier.swap_remove(index);
                continue;
            };
            let painted = self.paint_block(&ctx, block_cells(candidate, diagonal))?;
            covered += painted.len();
            report.tiles_painted += painted.len();
            frontier.extend(painted);
            report.expansions += 1;
        }

        if report.seeds_placed < params.seed_count || report.expansions < params.expansion_count {
            tracing::debug!(
                "generation of {} in {} {} fell short: {}/{} seeds, {}/{} expansions",
                terrain.ident,
                layer,
                region,
                report.seeds_placed,
                params.seed_count,
                report.expansions,
                params.expansion_count
            );
        }
        Ok(report)
    }

    fn random_position(&mut self, region: Region) -> Position {
        let x = self.rng.next_random(region.width()) as i32;
        let y = self.rng.next_random(region.height()) as i32;
        region.min.offset(x, y)
    }

    fn carries(&self, ctx: &RunContext<'_>, position: Position) -> Result<bool, EngineError> {
        Ok(self
            .grid
            .layer(ctx.layer)?
            .cell(position)
            .is_some_and(|cell| cell.effective_terrain(ctx.channel) == Some(ctx.terrain.id)))
    }

    fn is_growth_candidate(&self, ctx: &RunContext<'_>, position: Position) -> Result<bool, EngineError> {
        Ok(self
            .grid
            .layer(ctx.layer)?
            .cell(position)
            .is_some_and(|cell| grows_from(ctx.terrain, ctx.channel, cell)))
    }

    /// Diagonal neighbours of `origin` whose 2x2 block may be painted.
    fn growth_blocks(
        &self,
        ctx: &RunContext<'_>,
        origin: Position,
        growth: Growth,
    ) -> Result<ArrayVec<Position, 4>, EngineError> {
        let mut blocks = ArrayVec::new();
        for direction in DIAGONALS {
            let diagonal = origin.step(direction);
            let mut fresh = 0;
            let mut eligible = true;
            for position in block_cells(origin, diagonal) {
                let carries = self.carries(ctx, position)?;
                if carries && growth == Growth::Expand {
                    continue;
                }
                if carries || !self.can_paint(ctx, position)? {
                    eligible = false;
                    break;
                }
                fresh += 1;
            }
            if eligible && fresh > 0 {
                blocks.push(diagonal);
            }
        }
        Ok(blocks)
    }

    fn can_paint(&self, ctx: &RunContext<'_>, position: Position) -> Result<bool, EngineError> {
        let current = self.grid.layer(ctx.layer)?;
        let Some(cell) = current.cell(position) else {
            return Ok(false);
        };
        if !ctx.region.contains(position)
            || current.is_protected(position)
            || !self
                .env
                .occupancy()
                .is_occupant_compatible(ctx.layer, position, ctx.terrain)
        {
            return Ok(false);
        }

        let catalog = self.env.catalog();
        let terrain = ctx.terrain;
        let fits = match ctx.channel {
            Channel::Overlay => {
                let base_ok = match cell.base_terrain() {
                    Some(base) => terrain.accepts_base(base),
                    None => terrain.base_terrains.is_empty(),
                };
                let free = cell
                    .effective_terrain(Channel::Overlay)
                    .is_none_or(|overlay| overlay == terrain.id);
                base_ok && free
            }
            Channel::Base => {
                let borders = |other: Option<TerrainTypeId>| {
                    other.is_none_or(|other| catalog.compatible(terrain.id, other))
                };
                let keeps_coast = !ctx.coastline.contains(&position)
                    || cell
                        .base_terrain()
                        .and_then(|id| catalog.get(id))
                        .is_some_and(|base| base.is_water())
                        == terrain.is_water();
                borders(cell.base_terrain())
                    && keeps_coast
                    && Direction::ALL.into_iter().all(|direction| {
                        borders(
                            current
                                .cell(position.step(direction))
                                .and_then(|neighbour| neighbour.base_terrain()),
                        )
                    })
            }
        };
        Ok(fits)
    }

    /// Paints the block through the mutation API; returns the cells that changed.
    fn paint_block(
        &mut self,
        ctx: &RunContext<'_>,
        cells: [Position; 4],
    ) -> Result<ArrayVec<Position, 4>, EngineError> {
        let mut painted = ArrayVec::new();
        for position in cells {
            if self.set_terrain(ctx.layer, position, ctx.terrain.id)? {
                painted.push(position);
            }
        }
        Ok(painted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{OccupancyOracle, PcgSyncRand, TerrainCatalog, TerrainEnv};
    use crate::state::{MapDimensions, TileFlags, TileGrid};

    const GRASS: TerrainTypeId = TerrainTypeId(0);
    const WATER: TerrainTypeId = TerrainTypeId(1);
    const FOREST: TerrainTypeId = TerrainTypeId(2);
    const LAVA: TerrainTypeId = TerrainTypeId(3);

    fn catalog() -> TerrainCatalog {
        TerrainCatalog::new(vec![
            TerrainType::builder(GRASS, "grass")
                .flags(TileFlags::LAND)
                .allow_single(true)
                .border(WATER)
                .build(),
            TerrainType::builder(WATER, "water")
                .flags(TileFlags::WATER)
                .border(GRASS)
                .build(),
            TerrainType::builder(FOREST, "forest")
                .overlay(true)
                .flags(TileFlags::FOREST)
                .base(GRASS)
                .resource_amount(100)
                .build(),
            TerrainType::builder(LAVA, "lava")
                .flags(TileFlags::UNPASSABLE)
                .build(),
        ])
        .unwrap()
    }

    fn grass_grid(catalog: &TerrainCatalog, size: u32) -> TileGrid {
        let mut grid = TileGrid::with_layer(MapDimensions::new(size, size));
        let mut rng = PcgSyncRand::new(0);
        TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(catalog), &mut rng)
            .fill_layer(LayerId::SURFACE, GRASS)
            .unwrap();
        grid
    }

    fn whole(size: i32) -> Region {
        Region::new(Position::ORIGIN, Position::new(size - 1, size - 1))
    }

    fn cells_with(grid: &TileGrid, channel: Channel, terrain: TerrainTypeId) -> Vec<Position> {
        grid.layer(LayerId::SURFACE)
            .unwrap()
            .cells()
            .filter(|(_, cell)| cell.terrain(channel) == Some(terrain))
            .map(|(position, _)| position)
            .collect()
    }

    #[test]
    fn builder_clamps_percentage() {
        let params = GenerationParams::builder(WATER)
            .seed_count(2)
            .expansion_count(5)
            .max_percent(150)
            .build();
        assert_eq!(params.terrain, WATER);
        assert_eq!(params.seed_count, 2);
        assert_eq!(params.expansion_count, 5);
        assert_eq!(params.max_percent, 100);
        assert!(!params.preserve_coastline);
        assert!(params.use_existing_as_seeds);
    }

    #[test]
    fn seed_paints_one_two_by_two_block() {
        let catalog = catalog();
        let mut grid = grass_grid(&catalog, 6);
        let mut rng = PcgSyncRand::new(11);
        let report = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng)
            .generate(
                LayerId::SURFACE,
                whole(6),
                &GenerationParams::builder(WATER).seed_count(1).build(),
            )
            .unwrap();
        assert_eq!(report.seeds_placed, 1);
        assert_eq!(report.tiles_painted, 4);

        let water = cells_with(&grid, Channel::Base, WATER);
        assert_eq!(water.len(), 4);
        let min_x = water.iter().map(|p| p.x).min().unwrap();
        let max_x = water.iter().map(|p| p.x).max().unwrap();
        let min_y = water.iter().map(|p| p.y).min().unwrap();
        let max_y = water.iter().map(|p| p.y).max().unwrap();
        assert_eq!((max_x - min_x, max_y - min_y), (1, 1));
    }

    #[test]
    fn incompatible_terrain_exhausts_budget_quietly() {
        let catalog = catalog();
        let mut grid = grass_grid(&catalog, 4);
        let before = grid.clone();
        let mut rng = PcgSyncRand::new(11);
        let report = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng)
            .generate(
                LayerId::SURFACE,
                whole(4),
                &GenerationParams::builder(LAVA).seed_count(2).expansion_count(2).build(),
            )
            .unwrap();
        assert_eq!(report, GenerationReport::default());
        assert_eq!(grid, before);
        // two coordinates per attempt, no block choice
        assert_eq!(rng.draws(), 2 * 2 * 100);
    }

    #[test]
    fn protected_cells_are_never_painted() {
        let catalog = catalog();
        let mut grid = grass_grid(&catalog, 6);
        let sanctuary = Region::new(Position::ORIGIN, Position::new(2, 5));
        grid.add_protected_area(LayerId::SURFACE, sanctuary).unwrap();
        let mut rng = PcgSyncRand::new(3);
        let report = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng)
            .generate(
                LayerId::SURFACE,
                whole(6),
                &GenerationParams::builder(WATER).seed_count(3).expansion_count(20).build(),
            )
            .unwrap();
        assert!(report.tiles_painted > 0);
        assert!(
            cells_with(&grid, Channel::Base, WATER)
                .iter()
                .all(|position| !sanctuary.contains(*position))
        );
    }

    struct Garrison;

    impl OccupancyOracle for Garrison {
        fn is_occupant_compatible(
            &self,
            _: LayerId,
            position: Position,
            terrain: &TerrainType,
        ) -> bool {
            position.y != 0 || !terrain.flags.contains(TileFlags::WATER)
        }
    }

    #[test]
    fn occupants_veto_cells() {
        let catalog = catalog();
        let mut grid = grass_grid(&catalog, 5);
        let mut rng = PcgSyncRand::new(8);
        let env = TerrainEnv::new(&catalog, &Garrison);
        TerrainEngine::new(&mut grid, env, &mut rng)
            .generate(
                LayerId::SURFACE,
                whole(5),
                &GenerationParams::builder(WATER).seed_count(2).expansion_count(10).build(),
            )
            .unwrap();
        assert!(
            cells_with(&grid, Channel::Base, WATER)
                .iter()
                .all(|position| position.y != 0)
        );
    }

    #[test]
    fn coverage_cap_stops_seeding() {
        let catalog = catalog();
        let mut grid = grass_grid(&catalog, 8);
        let mut rng = PcgSyncRand::new(21);
        let report = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng)
            .generate(
                LayerId::SURFACE,
                whole(8),
                &GenerationParams::builder(WATER).seed_count(10).max_percent(10).build(),
            )
            .unwrap();
        // cap is 6 of 64 cells: the second block crosses it
        assert_eq!(report.seeds_placed, 2);
        assert_eq!(report.tiles_painted, 8);
    }

    #[test]
    fn expansion_grows_existing_terrain() {
        let catalog = catalog();
        let mut grid = grass_grid(&catalog, 6);
        let mut rng = PcgSyncRand::new(4);
        let mut engine = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng);
        for position in Region::new(Position::ORIGIN, Position::new(1, 1)).positions() {
            engine.set_terrain(LayerId::SURFACE, position, FOREST).unwrap();
        }

        let isolated = GenerationParams::builder(FOREST)
            .expansion_count(3)
            .use_existing_as_seeds(false)
            .build();
        let report = engine.generate(LayerId::SURFACE, whole(6), &isolated).unwrap();
        assert_eq!(report.expansions, 0);

        let grow = GenerationParams::builder(FOREST).expansion_count(3).build();
        let report = engine.generate(LayerId::SURFACE, whole(6), &grow).unwrap();
        assert_eq!(report.seeds_placed, 0);
        assert_eq!(report.expansions, 3);
        assert!(report.tiles_painted >= 3);
        assert_eq!(
            cells_with(engine.grid(), Channel::Overlay, FOREST).len(),
            4 + report.tiles_painted
        );
    }

    #[test]
    fn expansion_starts_from_border_terrain() {
        let catalog = catalog();
        let mut grid = grass_grid(&catalog, 6);
        let mut rng = PcgSyncRand::new(6);
        let mut engine = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng);

        // no water anywhere yet; grass is one of its border terrains
        let params = GenerationParams::builder(WATER).expansion_count(2).build();
        let report = engine.generate(LayerId::SURFACE, whole(6), &params).unwrap();
        assert_eq!(report.seeds_placed, 0);
        assert_eq!(report.expansions, 2);
        assert!(report.tiles_painted >= 4);
        assert_eq!(
            cells_with(engine.grid(), Channel::Base, WATER).len(),
            report.tiles_painted
        );
    }

    #[test]
    fn overlays_only_grow_on_accepted_bases() {
        let catalog = catalog();
        let mut grid = grass_grid(&catalog, 6);
        let mut rng = PcgSyncRand::new(9);
        let mut engine = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng);
        for position in Region::new(Position::new(3, 0), Position::new(5, 5)).positions() {
            engine.set_terrain(LayerId::SURFACE, position, WATER).unwrap();
        }

        let params = GenerationParams::builder(FOREST).seed_count(2).expansion_count(8).build();
        let report = engine.generate(LayerId::SURFACE, whole(6), &params).unwrap();
        assert!(report.seeds_placed > 0);
        let forest = cells_with(engine.grid(), Channel::Overlay, FOREST);
        assert_eq!(forest.len(), report.tiles_painted);
        assert!(forest.iter().all(|position| position.x < 3));
    }

    #[test]
    fn preserved_coastline_keeps_its_classification() {
        let catalog = catalog();
        let mut grid = grass_grid(&catalog, 6);
        let mut rng = PcgSyncRand::new(2);
        let mut engine = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng);
        for position in Region::new(Position::new(3, 0), Position::new(5, 5)).positions() {
            engine.set_terrain(LayerId::SURFACE, position, WATER).unwrap();
        }
        let shore: Vec<Position> = (0..6).map(|y| Position::new(2, y)).collect();

        let params = GenerationParams::builder(WATER)
            .seed_count(3)
            .expansion_count(10)
            .preserve_coastline(true)
            .build();
        engine.generate(LayerId::SURFACE, whole(6), &params).unwrap();
        for position in shore {
            assert_eq!(engine.get_terrain(LayerId::SURFACE, position, false).unwrap(), Some(GRASS));
        }
    }
}
