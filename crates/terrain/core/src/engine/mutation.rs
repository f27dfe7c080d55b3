//! Mutation API: the only entry points that change a cell's terrain.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::env::{TerrainType, TerrainTypeId, choose};
use crate::state::{Channel, LayerId, Position, Region};

use super::{EngineError, TerrainEngine};

const OVERLAY_ONLY: &[Channel] = &[Channel::Overlay];
const BOTH_CHANNELS: &[Channel] = &Channel::BOTH;

type Window = ArrayVec<Position, { EngineConfig::NEIGHBOR_COUNT + 1 }>;

impl<'a> TerrainEngine<'a> {
    /// Places `terrain` on the channel matching its kind.
    ///
    /// Returns `Ok(false)` without touching the grid, the random stream or the
    /// observer when the cell already carries the terrain. An overlay whose
    /// base list excludes the current base resets the base to its first
    /// accepted base; a base the current overlay cannot sit on removes the
    /// overlay.
    ///
    /// # Errors
    ///
    /// `OutOfBounds`, `UnknownLayer` or `UnknownTerrain`.
    pub fn set_terrain(
        &mut self,
        layer: LayerId,
        position: Position,
        terrain: TerrainTypeId,
    ) -> Result<bool, EngineError> {
        let terrain = self.terrain(terrain)?;
        match self.commit_terrain(layer, position, terrain)? {
            Some(stale) => {
                self.refresh_window(layer, position, stale)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove_overlay(&mut self, layer: LayerId, position: Position) -> Result<bool, EngineError> {
        let cell = self.grid.cell_mut(layer, position)?;
        if cell.overlay_terrain().is_none() {
            return Ok(false);
        }
        cell.set_overlay_terrain(None);
        cell.set_value(0);
        self.refresh_window(layer, position, OVERLAY_ONLY)?;
        Ok(true)
    }

    /// Marks the overlay as cleared (e.g. a felled forest) or restores it.
    /// The overlay keeps its identity; neighbours see a destroyed overlay as
    /// absent. Cells without an overlay are left alone.
    pub fn set_overlay_destroyed(
        &mut self,
        layer: LayerId,
        position: Position,
        destroyed: bool,
    ) -> Result<bool, EngineError> {
        let Some(overlay) = self.current_overlay(layer, position)? else {
            return Ok(false);
        };
        if self.grid.cell(layer, position)?.overlay_destroyed() == destroyed {
            return Ok(false);
        }

        let tiles = if destroyed {
            &overlay.destroyed_tiles
        } else {
            &overlay.solid_tiles
        };
        let tile = choose(&mut *self.rng, tiles).copied();
        let cell = self.grid.cell_mut(layer, position)?;
        cell.set_overlay_destroyed(destroyed);
        cell.set_overlay_damaged(false);
        cell.set_solid_tile(Channel::Overlay, tile);
        cell.set_value(if destroyed { 0 } else { overlay.resource_amount });
        self.refresh_window(layer, position, OVERLAY_ONLY)?;
        Ok(true)
    }

    pub fn set_overlay_damaged(
        &mut self,
        layer: LayerId,
        position: Position,
        damaged: bool,
    ) -> Result<bool, EngineError> {
        let Some(overlay) = self.current_overlay(layer, position)? else {
            return Ok(false);
        };
        let cell = self.grid.cell(layer, position)?;
        if cell.overlay_destroyed() || cell.overlay_damaged() == damaged {
            return Ok(false);
        }

        let tiles = if damaged && !overlay.damaged_tiles.is_empty() {
            &overlay.damaged_tiles
        } else {
            &overlay.solid_tiles
        };
        let tile = choose(&mut *self.rng, tiles).copied();
        let cell = self.grid.cell_mut(layer, position)?;
        cell.set_overlay_damaged(damaged);
        cell.set_solid_tile(Channel::Overlay, tile);
        self.refresh_window(layer, position, OVERLAY_ONLY)?;
        Ok(true)
    }

    /// # Errors
    ///
    /// `OutOfBounds` for a position outside the layer.
    pub fn get_terrain(
        &self,
        layer: LayerId,
        position: Position,
        overlay: bool,
    ) -> Result<Option<TerrainTypeId>, EngineError> {
        Ok(self
            .grid
            .cell(layer, position)?
            .terrain(Channel::from_overlay(overlay)))
    }

    /// Intact overlay if present, else base. With `seen`, answers from the
    /// last-observed snapshot instead of live state.
    pub fn get_top_terrain(
        &self,
        layer: LayerId,
        position: Position,
        seen: bool,
    ) -> Result<Option<TerrainTypeId>, EngineError> {
        let cell = self.grid.cell(layer, position)?;
        Ok(if seen {
            cell.seen().top_terrain()
        } else {
            cell.top_terrain()
        })
    }

    /// Records the current terrain of a cell as observed.
    pub fn mark_seen(&mut self, layer: LayerId, position: Position) -> Result<(), EngineError> {
        self.grid.cell_mut(layer, position)?.mark_seen();
        self.notify(layer, position);
        Ok(())
    }

    /// Paints a whole layer, recomputing every cell once afterwards instead of
    /// once per edit. Returns the number of cells that changed.
    pub fn fill_layer(&mut self, layer: LayerId, terrain: TerrainTypeId) -> Result<usize, EngineError> {
        let terrain = self.terrain(terrain)?;
        let Some(region) = self.grid.layer(layer)?.dimensions().full_region() else {
            return Ok(0);
        };

        let mut changed = 0;
        for position in region.positions() {
            if self.commit_terrain(layer, position, terrain)?.is_some() {
                changed += 1;
            }
        }
        self.recompute_region(layer, region)?;
        tracing::debug!("filled {} with {} ({} cells changed)", layer, terrain.ident, changed);
        Ok(changed)
    }

    /// Recomputes both channels of every cell in `region`, row-major, then
    /// notifies each cell once.
    pub fn recompute_region(&mut self, layer: LayerId, region: Region) -> Result<(), EngineError> {
        let region = self.resolve_region(layer, region)?;
        for channel in Channel::BOTH {
            for position in region.positions() {
                self.recompute_transitions(layer, position, channel)?;
            }
        }
        for position in region.positions() {
            self.notify(layer, position);
        }
        Ok(())
    }

    fn current_overlay(
        &self,
        layer: LayerId,
        position: Position,
    ) -> Result<Option<&'a TerrainType>, EngineError> {
        self.grid
            .cell(layer, position)?
            .overlay_terrain()
            .map(|id| self.terrain(id))
            .transpose()
    }

    /// Writes `terrain` into one cell without recomputing anything. Returns
    /// the channels whose transitions went stale, or `None` if unchanged.
    fn commit_terrain(
        &mut self,
        layer: LayerId,
        position: Position,
        terrain: &'a TerrainType,
    ) -> Result<Option<&'static [Channel]>, EngineError> {
        let cell = self.grid.cell(layer, position)?;

        if terrain.is_overlay {
            if cell.overlay_terrain() == Some(terrain.id) && !cell.overlay_destroyed() {
                return Ok(None);
            }
            let required_base = match cell.base_terrain() {
                Some(base) if terrain.accepts_base(base) => None,
                None if terrain.base_terrains.is_empty() => None,
                _ => terrain.base_terrains.first().copied(),
            };

            let mut stale = OVERLAY_ONLY;
            if let Some(base) = required_base {
                let base = self.terrain(base)?;
                self.commit_base(layer, position, base)?;
                stale = BOTH_CHANNELS;
            }
            let tile = choose(&mut *self.rng, &terrain.solid_tiles).copied();
            let cell = self.grid.cell_mut(layer, position)?;
            cell.set_overlay_terrain(Some(terrain.id));
            cell.set_solid_tile(Channel::Overlay, tile);
            cell.set_value(terrain.resource_amount);
            return Ok(Some(stale));
        }

        if cell.base_terrain() == Some(terrain.id) {
            return Ok(None);
        }
        let overlay_rejects = cell
            .overlay_terrain()
            .and_then(|id| self.env.catalog().get(id))
            .is_some_and(|overlay| !overlay.accepts_base(terrain.id));

        self.commit_base(layer, position, terrain)?;
        if overlay_rejects {
            let cell = self.grid.cell_mut(layer, position)?;
            cell.set_overlay_terrain(None);
            cell.set_value(0);
        }
        Ok(Some(BOTH_CHANNELS))
    }

    fn commit_base(
        &mut self,
        layer: LayerId,
        position: Position,
        terrain: &TerrainType,
    ) -> Result<(), EngineError> {
        let tile = choose(&mut *self.rng, &terrain.solid_tiles).copied();
        let cell = self.grid.cell_mut(layer, position)?;
        cell.set_base_terrain(Some(terrain.id));
        cell.set_solid_tile(Channel::Base, tile);
        Ok(())
    }

    /// Recomputes `channels` for the in-layer part of the 3x3 window around
    /// `center`, channel-major and row-major, then notifies each cell once.
    fn refresh_window(
        &mut self,
        layer: LayerId,
        center: Position,
        channels: &[Channel],
    ) -> Result<(), EngineError> {
        let window: Window = Region::around(center, 1)
            .positions()
            .filter(|&position| self.grid.contains(layer, position))
            .collect();

        let mut pending = VecDeque::with_capacity(EngineConfig::MAX_RECOMPUTE_PER_EDIT);
        for &channel in channels {
            pending.extend(window.iter().map(|&position| (position, channel)));
        }
        while let Some((position, channel)) = pending.pop_front() {
            self.recompute_transitions(layer, position, channel)?;
        }

        for position in window {
            self.notify(layer, position);
        }
        Ok(())
    }
}
