use crate::env::{TerrainType, TerrainTypeId, TileVariantId};

use super::{Channel, TileFlags};

/// One entry of a cell's transition list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionTile {
    /// Terrain whose tile sheet supplies the graphic.
    pub terrain: TerrainTypeId,
    /// Terrain the transition blends towards (the bucket key); `None` when
    /// the neighbours carry no terrain on this channel.
    pub adjacent: Option<TerrainTypeId>,
    pub tile: TileVariantId,
}

/// Terrain state as last observed, used for fog-of-war rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeenTile {
    pub base_terrain: Option<TerrainTypeId>,
    pub overlay_terrain: Option<TerrainTypeId>,
    pub overlay_destroyed: bool,
}

impl SeenTile {
    pub fn top_terrain(&self) -> Option<TerrainTypeId> {
        match self.overlay_terrain {
            Some(overlay) if !self.overlay_destroyed => Some(overlay),
            _ => self.base_terrain,
        }
    }
}

/// A single map tile. Owned by its [`Layer`](super::Layer); terrain fields
/// change only through the engine's mutation API.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    base_terrain: Option<TerrainTypeId>,
    overlay_terrain: Option<TerrainTypeId>,
    overlay_destroyed: bool,
    overlay_damaged: bool,
    flags: TileFlags,
    value: u32,
    solid_tile: Option<TileVariantId>,
    overlay_solid_tile: Option<TileVariantId>,
    transition_tiles: Vec<TransitionTile>,
    overlay_transition_tiles: Vec<TransitionTile>,
    base_coastal: bool,
    overlay_coastal: bool,
    seen: SeenTile,
}

impl Cell {
    pub fn base_terrain(&self) -> Option<TerrainTypeId> {
        self.base_terrain
    }

    pub fn overlay_terrain(&self) -> Option<TerrainTypeId> {
        self.overlay_terrain
    }

    pub fn terrain(&self, channel: Channel) -> Option<TerrainTypeId> {
        match channel {
            Channel::Base => self.base_terrain,
            Channel::Overlay => self.overlay_terrain,
        }
    }

    /// Terrain as neighbours see it: a destroyed overlay counts as absent.
    pub fn effective_terrain(&self, channel: Channel) -> Option<TerrainTypeId> {
        match channel {
            Channel::Base => self.base_terrain,
            Channel::Overlay if self.overlay_destroyed => None,
            Channel::Overlay => self.overlay_terrain,
        }
    }

    /// Intact overlay if any, else the base terrain.
    pub fn top_terrain(&self) -> Option<TerrainTypeId> {
        self.effective_terrain(Channel::Overlay)
            .or(self.base_terrain)
    }

    pub fn overlay_destroyed(&self) -> bool {
        self.overlay_destroyed
    }

    pub fn overlay_damaged(&self) -> bool {
        self.overlay_damaged
    }

    pub fn flags(&self) -> TileFlags {
        self.flags
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn solid_tile(&self) -> Option<TileVariantId> {
        self.solid_tile
    }

    pub fn overlay_solid_tile(&self) -> Option<TileVariantId> {
        self.overlay_solid_tile
    }

    pub fn transition_tiles(&self) -> &[TransitionTile] {
        &self.transition_tiles
    }

    pub fn overlay_transition_tiles(&self) -> &[TransitionTile] {
        &self.overlay_transition_tiles
    }

    pub fn transitions(&self, channel: Channel) -> &[TransitionTile] {
        match channel {
            Channel::Base => &self.transition_tiles,
            Channel::Overlay => &self.overlay_transition_tiles,
        }
    }

    pub fn seen(&self) -> &SeenTile {
        &self.seen
    }

    pub fn is_coastal(&self) -> bool {
        self.base_coastal || self.overlay_coastal
    }

    pub(crate) fn set_base_terrain(&mut self, terrain: Option<TerrainTypeId>) {
        self.base_terrain = terrain;
    }

    /// Places an overlay, clearing any destroyed/damaged state of the previous one.
    pub(crate) fn set_overlay_terrain(&mut self, terrain: Option<TerrainTypeId>) {
        self.overlay_terrain = terrain;
        self.overlay_destroyed = false;
        self.overlay_damaged = false;
        if terrain.is_none() {
            self.overlay_solid_tile = None;
            self.overlay_transition_tiles.clear();
            self.overlay_coastal = false;
        }
    }

    pub(crate) fn set_overlay_destroyed(&mut self, destroyed: bool) {
        self.overlay_destroyed = destroyed;
    }

    pub(crate) fn set_overlay_damaged(&mut self, damaged: bool) {
        self.overlay_damaged = damaged;
    }

    pub(crate) fn set_solid_tile(&mut self, channel: Channel, tile: Option<TileVariantId>) {
        match channel {
            Channel::Base => self.solid_tile = tile,
            Channel::Overlay => self.overlay_solid_tile = tile,
        }
    }

    pub(crate) fn set_value(&mut self, value: u32) {
        self.value = value;
    }

    pub(crate) fn transitions_mut(&mut self, channel: Channel) -> &mut Vec<TransitionTile> {
        match channel {
            Channel::Base => &mut self.transition_tiles,
            Channel::Overlay => &mut self.overlay_transition_tiles,
        }
    }

    pub(crate) fn set_coastal(&mut self, channel: Channel, coastal: bool) {
        match channel {
            Channel::Base => self.base_coastal = coastal,
            Channel::Overlay => self.overlay_coastal = coastal,
        }
    }

    pub(crate) fn set_occupant_flags(&mut self, occupants: TileFlags) {
        self.flags = self.flags.terrain_bits() | occupants.occupant_bits();
    }

    pub(crate) fn mark_seen(&mut self) {
        self.seen = SeenTile {
            base_terrain: self.base_terrain,
            overlay_terrain: self.overlay_terrain,
            overlay_destroyed: self.overlay_destroyed,
        };
    }

    /// Re-derives the terrain bits of `flags` from the current terrain types.
    ///
    /// `base` and `overlay` must be the catalog entries of this cell's
    /// current base and overlay terrain.
    pub(crate) fn refresh_flags(&mut self, base: Option<&TerrainType>, overlay: Option<&TerrainType>) {
        let mut flags = self.flags.occupant_bits();
        if let Some(base) = base {
            flags |= base.flags;
        }
        if let Some(overlay) = overlay {
            if self.overlay_destroyed {
                flags |= overlay.destroyed_flags;
            } else {
                if overlay.flags.intersects(TileFlags::WATER | TileFlags::SPACE) {
                    flags.remove(TileFlags::LAND);
                }
                if overlay.flags.contains(TileFlags::LAND) {
                    flags.remove(TileFlags::WATER);
                }
                flags |= overlay.flags;
            }
        }
        if self.is_coastal() {
            if flags.is_water_only() {
                flags.remove(TileFlags::WATER);
            }
            flags.insert(TileFlags::COAST);
        }
        self.flags = flags;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::TerrainType;

    fn terrain(id: u16, flags: TileFlags) -> TerrainType {
        TerrainType::builder(TerrainTypeId(id), format!("t{id}"))
            .flags(flags)
            .build()
    }

    #[test]
    fn occupant_bits_survive_flag_refresh() {
        let grass = terrain(0, TileFlags::LAND);
        let mut cell = Cell::default();
        cell.set_base_terrain(Some(grass.id));
        cell.set_occupant_flags(TileFlags::LAND_UNIT | TileFlags::FOREST);
        cell.refresh_flags(Some(&grass), None);

        assert_eq!(cell.flags(), TileFlags::LAND | TileFlags::LAND_UNIT);
    }

    #[test]
    fn destroyed_overlay_contributes_destroyed_flags() {
        let grass = terrain(0, TileFlags::LAND);
        let forest = TerrainType::builder(TerrainTypeId(1), "forest")
            .overlay(true)
            .flags(TileFlags::FOREST | TileFlags::UNPASSABLE)
            .destroyed_flags(TileFlags::STUMPS)
            .build();
        let mut cell = Cell::default();
        cell.set_base_terrain(Some(grass.id));
        cell.set_overlay_terrain(Some(forest.id));
        cell.refresh_flags(Some(&grass), Some(&forest));
        assert!(cell.flags().contains(TileFlags::UNPASSABLE));

        cell.set_overlay_destroyed(true);
        cell.refresh_flags(Some(&grass), Some(&forest));
        assert_eq!(cell.flags(), TileFlags::LAND | TileFlags::STUMPS);
        assert_eq!(cell.top_terrain(), Some(grass.id));
    }

    #[test]
    fn coastal_water_trades_water_for_coast() {
        let water = terrain(0, TileFlags::WATER);
        let mut cell = Cell::default();
        cell.set_base_terrain(Some(water.id));
        cell.set_coastal(Channel::Base, true);
        cell.refresh_flags(Some(&water), None);

        assert_eq!(cell.flags(), TileFlags::COAST);
    }

    #[test]
    fn seen_snapshot_lags_until_marked() {
        let mut cell = Cell::default();
        cell.set_base_terrain(Some(TerrainTypeId(0)));
        assert_eq!(cell.seen().top_terrain(), None);

        cell.mark_seen();
        cell.set_overlay_terrain(Some(TerrainTypeId(1)));
        assert_eq!(cell.seen().top_terrain(), Some(TerrainTypeId(0)));
        assert_eq!(cell.top_terrain(), Some(TerrainTypeId(1)));
    }
}
