//! Consistency corrector.
//!
//! Repairs illegal adjacency over an explicit region. Only cells inside the
//! region are ever rewritten. Irregularity checks read every in-layer
//! neighbour; the border-compatibility sweeps only pair cells within the
//! region. Every repair goes through the mutation API.

use crate::env::{TerrainType, TerrainTypeId};
use crate::state::{Channel, Direction, Directions, LayerId, Position, Region};

use super::{EngineError, TerrainEngine};

/// What a correction run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrectionReport {
    /// Full scans of the region, including the final no-op scan.
    pub passes: u32,
    /// Cells whose terrain was replaced or removed.
    pub changes: usize,
}

impl CorrectionReport {
    pub fn merge(&mut self, other: CorrectionReport) {
        self.passes += other.passes;
        self.changes += other.changes;
    }

    pub fn is_clean(&self) -> bool {
        self.changes == 0
    }
}

// Quadrant = three cells of one corner plus the opposite diagonal.
const QUADRANTS: [Directions; 4] = [
    Directions::WEST
        .union(Directions::NORTHWEST)
        .union(Directions::NORTH)
        .union(Directions::SOUTHEAST),
    Directions::EAST
        .union(Directions::NORTHEAST)
        .union(Directions::NORTH)
        .union(Directions::SOUTHWEST),
    Directions::WEST
        .union(Directions::SOUTHWEST)
        .union(Directions::SOUTH)
        .union(Directions::NORTHEAST),
    Directions::EAST
        .union(Directions::SOUTHEAST)
        .union(Directions::SOUTH)
        .union(Directions::NORTHWEST),
];
const HORIZONTAL: Directions = Directions::WEST.union(Directions::EAST);
const VERTICAL: Directions = Directions::NORTH.union(Directions::SOUTH);

fn is_irregular_shape(foreign: Directions) -> bool {
    let count = |set: Directions| foreign.intersection(set).bits().count_ones();
    count(HORIZONTAL) >= 2 || count(VERTICAL) >= 2 || QUADRANTS.iter().any(|&q| count(q) >= 4)
}

impl<'a> TerrainEngine<'a> {
    /// Scans `region` until a full pass changes nothing. Irregular overlays
    /// are removed; irregular bases are replaced by their first inner-border
    /// terrain (cells without one are left as they are).
    ///
    /// # Errors
    ///
    /// `TerrainIntegrity` once `max_correction_passes` scans still made
    /// changes; `InvalidRegion` for an empty or out-of-layer region.
    pub fn fix_irregularities(
        &mut self,
        layer: LayerId,
        overlay: bool,
        region: Region,
    ) -> Result<CorrectionReport, EngineError> {
        let region = self.resolve_region(layer, region)?;
        let channel = Channel::from_overlay(overlay);
        let mut report = CorrectionReport::default();

        loop {
            report.passes += 1;
            let mut changed = 0;
            for position in region.positions() {
                let Some(terrain) = self.irregular_terrain(layer, position, channel)? else {
                    continue;
                };
                if self.repair_irregularity(layer, position, channel, terrain)? {
                    changed += 1;
                }
            }
            report.changes += changed;

            if changed == 0 {
                break;
            }
            if report.passes >= self.config.max_correction_passes {
                tracing::warn!(
                    "{} terrain in {} {} still changing after {} passes",
                    channel,
                    layer,
                    region,
                    report.passes
                );
                return Err(EngineError::TerrainIntegrity {
                    layer,
                    region,
                    channel,
                    passes: report.passes,
                });
            }
        }

        tracing::debug!(
            "{} irregularities in {} {}: {} changes over {} passes",
            channel,
            layer,
            region,
            report.changes,
            report.passes
        );
        Ok(report)
    }

    /// Two sweeps over `region`. The first makes a cell adopt the base of an
    /// incompatible neighbour whose intact overlay could not sit on the cell's
    /// own base. The second replaces a cell's base with a bridge terrain that
    /// borders both sides of a remaining incompatible pair.
    pub fn fix_transitions(
        &mut self,
        layer: LayerId,
        region: Region,
    ) -> Result<CorrectionReport, EngineError> {
        let region = self.resolve_region(layer, region)?;
        let catalog = self.env.catalog();
        let mut report = CorrectionReport {
            passes: 2,
            changes: 0,
        };

        for position in region.positions() {
            let Some(base) = self.grid.cell(layer, position)?.base_terrain() else {
                continue;
            };
            let adopted = self
                .incompatible_neighbours(layer, region, position, base)?
                .into_iter()
                .find_map(|neighbour| {
                    let cell = self.grid.cell(layer, neighbour).ok()?;
                    let overlay = catalog.get(cell.effective_terrain(Channel::Overlay)?)?;
                    if overlay.accepts_base(base) {
                        None
                    } else {
                        cell.base_terrain()
                    }
                });
            if let Some(adopted) = adopted {
                if self.set_terrain(layer, position, adopted)? {
                    report.changes += 1;
                }
            }
        }

        for position in region.positions() {
            let Some(base) = self.grid.cell(layer, position)?.base_terrain() else {
                continue;
            };
            let bridge = self
                .incompatible_neighbours(layer, region, position, base)?
                .into_iter()
                .find_map(|neighbour| {
                    let other = self.grid.cell(layer, neighbour).ok()?.base_terrain()?;
                    catalog.bridge(base, other)
                });
            if let Some(bridge) = bridge {
                if self.set_terrain(layer, position, bridge)? {
                    report.changes += 1;
                }
            }
        }

        tracing::debug!(
            "border compatibility in {} {}: {} changes",
            layer,
            region,
            report.changes
        );
        Ok(report)
    }

    /// Irregularity, border-compatibility, irregularity again on the base
    /// channel, then irregularity on overlays. Run after bulk painting.
    pub fn correct_region(
        &mut self,
        layer: LayerId,
        region: Region,
    ) -> Result<CorrectionReport, EngineError> {
        let mut report = self.fix_irregularities(layer, false, region)?;
        report.merge(self.fix_transitions(layer, region)?);
        report.merge(self.fix_irregularities(layer, false, region)?);
        report.merge(self.fix_irregularities(layer, true, region)?);
        Ok(report)
    }

    /// Terrain of the cell if it violates the opposing-neighbour rule.
    fn irregular_terrain(
        &self,
        layer: LayerId,
        position: Position,
        channel: Channel,
    ) -> Result<Option<&'a TerrainType>, EngineError> {
        let current = self.grid.layer(layer)?;
        let Some(terrain) = current
            .cell(position)
            .and_then(|cell| cell.effective_terrain(channel))
            .and_then(|id| self.env.catalog().get(id))
        else {
            return Ok(None);
        };
        if terrain.allow_single {
            return Ok(None);
        }

        // Off-layer neighbours never count; an empty neighbour does.
        let foreign: Directions = Direction::ALL
            .into_iter()
            .filter(|&direction| match current.cell(position.step(direction)) {
                Some(cell) => match cell.effective_terrain(channel) {
                    Some(other) => other != terrain.id && !terrain.accepts_outer_border(other),
                    None => true,
                },
                None => false,
            })
            .collect();

        Ok(is_irregular_shape(foreign).then_some(terrain))
    }

    fn repair_irregularity(
        &mut self,
        layer: LayerId,
        position: Position,
        channel: Channel,
        terrain: &TerrainType,
    ) -> Result<bool, EngineError> {
        match channel {
            Channel::Overlay => self.remove_overlay(layer, position),
            Channel::Base => match terrain.inner_border_terrains.first() {
                Some(&replacement) => self.set_terrain(layer, position, replacement),
                None => Ok(false),
            },
        }
    }

    /// In-region neighbours whose base cannot directly abut `base`.
    fn incompatible_neighbours(
        &self,
        layer: LayerId,
        region: Region,
        position: Position,
        base: TerrainTypeId,
    ) -> Result<Vec<Position>, EngineError> {
        let catalog = self.env.catalog();
        let current = self.grid.layer(layer)?;
        Ok(Direction::ALL
            .into_iter()
            .map(|direction| position.step(direction))
            .filter(|&neighbour| region.contains(neighbour))
            .filter(|&neighbour| {
                current
                    .cell(neighbour)
                    .and_then(|cell| cell.base_terrain())
                    .is_some_and(|other| !catalog.compatible(base, other))
            })
            .collect())
    }
}
