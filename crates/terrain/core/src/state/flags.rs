use bitflags::bitflags;

bitflags! {
    /// Per-cell classification bits.
    ///
    /// Terrain bits are derived from the cell's base and overlay terrain types
    /// and recomputed by the engine after every change. Occupant bits belong to
    /// the unit/occupancy subsystem and survive terrain recomputation untouched.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TileFlags: u16 {
        const LAND        = 1 << 0;
        const WATER       = 1 << 1;
        const COAST       = 1 << 2;
        const NO_BUILDING = 1 << 3;
        const UNPASSABLE  = 1 << 4;
        const WALL        = 1 << 5;
        const ROCK        = 1 << 6;
        const FOREST      = 1 << 7;
        const STUMPS      = 1 << 8;
        const GRAVEL      = 1 << 9;
        const SPACE       = 1 << 10;

        const BUILDING    = 1 << 12;
        const LAND_UNIT   = 1 << 13;
        const SEA_UNIT    = 1 << 14;
        const AIR_UNIT    = 1 << 15;

        const OCCUPANT = Self::BUILDING.bits()
            | Self::LAND_UNIT.bits()
            | Self::SEA_UNIT.bits()
            | Self::AIR_UNIT.bits();
    }
}

impl TileFlags {
    /// Water without any land classification.
    pub fn is_water_only(self) -> bool {
        self.contains(TileFlags::WATER) && !self.contains(TileFlags::LAND)
    }

    /// Land without any water classification.
    pub fn is_land_only(self) -> bool {
        self.contains(TileFlags::LAND) && !self.contains(TileFlags::WATER)
    }

    pub fn terrain_bits(self) -> TileFlags {
        self.difference(TileFlags::OCCUPANT)
    }

    pub fn occupant_bits(self) -> TileFlags {
        self.intersection(TileFlags::OCCUPANT)
    }
}

/// Which of the two terrain planes of a cell an operation addresses.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    Base,
    Overlay,
}

impl Channel {
    pub const BOTH: [Channel; 2] = [Channel::Base, Channel::Overlay];

    pub const fn from_overlay(overlay: bool) -> Self {
        if overlay {
            Channel::Overlay
        } else {
            Channel::Base
        }
    }

    pub const fn is_overlay(self) -> bool {
        matches!(self, Channel::Overlay)
    }
}
