//! Terrain type definitions and the immutable catalog that owns them.
//!
//! The catalog is an arena: a [`TerrainTypeId`] is the index of its entry, so
//! cells refer to terrain by a small copyable id and never hold references
//! into the catalog. Catalogs are validated once when built and are
//! read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::engine::TransitionPattern;
use crate::error::{ErrorSeverity, TerrainError};
use crate::state::TileFlags;

/// Dense identifier of a terrain type inside a [`TerrainCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainTypeId(pub u16);

impl TerrainTypeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TerrainTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terrain#{}", self.0)
    }
}

/// Index of a tile graphic within a terrain type's tile sheet.
pub type TileVariantId = u32;

/// Lookup key of the transition tables: the adjacent terrain (or `None` for
/// the catch-all entry) and the classified pattern.
pub type TransitionKey = (Option<TerrainTypeId>, TransitionPattern);

/// Immutable definition of one kind of ground cover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainType {
    pub id: TerrainTypeId,
    /// Stable textual identifier, e.g. `"grass"`.
    pub ident: String,
    pub is_overlay: bool,
    /// Whether a tile with no same-type cardinal neighbour is legal.
    pub allow_single: bool,
    pub flags: TileFlags,
    /// Flags contributed while this overlay is destroyed (stumps, gravel).
    pub destroyed_flags: TileFlags,
    pub border_terrains: Vec<TerrainTypeId>,
    pub inner_border_terrains: Vec<TerrainTypeId>,
    pub outer_border_terrains: Vec<TerrainTypeId>,
    pub base_terrains: Vec<TerrainTypeId>,
    pub transition_tiles: BTreeMap<TransitionKey, Vec<TileVariantId>>,
    pub adjacent_transition_tiles: BTreeMap<TransitionKey, Vec<TileVariantId>>,
    pub solid_tiles: Vec<TileVariantId>,
    pub destroyed_tiles: Vec<TileVariantId>,
    pub damaged_tiles: Vec<TileVariantId>,
    /// Initial cell value when this overlay is placed (e.g. lumber in a forest).
    pub resource_amount: u32,
}

impl TerrainType {
    pub fn builder(id: TerrainTypeId, ident: impl Into<String>) -> TerrainTypeBuilder {
        TerrainTypeBuilder::new(id, ident)
    }

    pub fn borders(&self, other: TerrainTypeId) -> bool {
        self.border_terrains.contains(&other)
    }

    pub fn has_inner_border(&self, other: TerrainTypeId) -> bool {
        self.inner_border_terrains.contains(&other)
    }

    pub fn accepts_outer_border(&self, other: TerrainTypeId) -> bool {
        self.outer_border_terrains.contains(&other)
    }

    /// Whether this overlay may sit on `base`. Overlays without a base list accept any base.
    pub fn accepts_base(&self, base: TerrainTypeId) -> bool {
        self.base_terrains.is_empty() || self.base_terrains.contains(&base)
    }

    pub fn transition_tiles_for(&self, key: TransitionKey) -> &[TileVariantId] {
        self.transition_tiles
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn adjacent_transition_tiles_for(&self, key: TransitionKey) -> &[TileVariantId] {
        self.adjacent_transition_tiles
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_water(&self) -> bool {
        self.flags.contains(TileFlags::WATER)
    }
}

/// Builder for constructing terrain types.
#[derive(Clone, Debug)]
pub struct TerrainTypeBuilder {
    terrain: TerrainType,
}

impl TerrainTypeBuilder {
    pub fn new(id: TerrainTypeId, ident: impl Into<String>) -> Self {
        Self {
            terrain: TerrainType {
                id,
                ident: ident.into(),
                is_overlay: false,
                allow_single: false,
                flags: TileFlags::empty(),
                destroyed_flags: TileFlags::empty(),
                border_terrains: Vec::new(),
                inner_border_terrains: Vec::new(),
                outer_border_terrains: Vec::new(),
                base_terrains: Vec::new(),
                transition_tiles: BTreeMap::new(),
                adjacent_transition_tiles: BTreeMap::new(),
                solid_tiles: Vec::new(),
                destroyed_tiles: Vec::new(),
                damaged_tiles: Vec::new(),
                resource_amount: 0,
            },
        }
    }

    pub fn overlay(mut self, is_overlay: bool) -> Self {
        self.terrain.is_overlay = is_overlay;
        self
    }

    pub fn allow_single(mut self, allow_single: bool) -> Self {
        self.terrain.allow_single = allow_single;
        self
    }

    pub fn flags(mut self, flags: TileFlags) -> Self {
        self.terrain.flags = flags;
        self
    }

    pub fn destroyed_flags(mut self, flags: TileFlags) -> Self {
        self.terrain.destroyed_flags = flags;
        self
    }

    pub fn border(mut self, terrain: TerrainTypeId) -> Self {
        self.terrain.border_terrains.push(terrain);
        self
    }

    pub fn inner_border(mut self, terrain: TerrainTypeId) -> Self {
        self.terrain.inner_border_terrains.push(terrain);
        self
    }

    pub fn outer_border(mut self, terrain: TerrainTypeId) -> Self {
        self.terrain.outer_border_terrains.push(terrain);
        self
    }

    pub fn base(mut self, terrain: TerrainTypeId) -> Self {
        self.terrain.base_terrains.push(terrain);
        self
    }

    pub fn transition(
        mut self,
        adjacent: Option<TerrainTypeId>,
        pattern: TransitionPattern,
        tiles: impl IntoIterator<Item = TileVariantId>,
    ) -> Self {
        self.terrain
            .transition_tiles
            .entry((adjacent, pattern))
            .or_default()
            .extend(tiles);
        self
    }

    pub fn adjacent_transition(
        mut self,
        adjacent: Option<TerrainTypeId>,
        pattern: TransitionPattern,
        tiles: impl IntoIterator<Item = TileVariantId>,
    ) -> Self {
        self.terrain
            .adjacent_transition_tiles
            .entry((adjacent, pattern))
            .or_default()
            .extend(tiles);
        self
    }

    pub fn solid_tiles(mut self, tiles: impl IntoIterator<Item = TileVariantId>) -> Self {
        self.terrain.solid_tiles.extend(tiles);
        self
    }

    pub fn destroyed_tiles(mut self, tiles: impl IntoIterator<Item = TileVariantId>) -> Self {
        self.terrain.destroyed_tiles.extend(tiles);
        self
    }

    pub fn damaged_tiles(mut self, tiles: impl IntoIterator<Item = TileVariantId>) -> Self {
        self.terrain.damaged_tiles.extend(tiles);
        self
    }

    pub fn resource_amount(mut self, amount: u32) -> Self {
        self.terrain.resource_amount = amount;
        self
    }

    pub fn build(self) -> TerrainType {
        self.terrain
    }
}

/// Errors raised while assembling a [`TerrainCatalog`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("terrain catalog is empty")]
    EmptyCatalog,

    #[error("terrain '{ident}' has id {found} but sits at index {expected}")]
    NonDenseId {
        ident: String,
        expected: u16,
        found: TerrainTypeId,
    },

    #[error("terrain identifier '{0}' is defined more than once")]
    DuplicateIdent(String),

    #[error("terrain '{ident}' references unknown terrain {reference} in {field}")]
    UnknownReference {
        ident: String,
        field: &'static str,
        reference: TerrainTypeId,
    },

    #[error("too many terrain types ({0}), ids are limited to u16")]
    TooManyTerrains(usize),
}

impl TerrainError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Data
    }

    fn error_code(&self) -> &'static str {
        match self {
            CatalogError::EmptyCatalog => "CATALOG_EMPTY",
            CatalogError::NonDenseId { .. } => "CATALOG_NON_DENSE_ID",
            CatalogError::DuplicateIdent(_) => "CATALOG_DUPLICATE_IDENT",
            CatalogError::UnknownReference { .. } => "CATALOG_UNKNOWN_REFERENCE",
            CatalogError::TooManyTerrains(_) => "CATALOG_TOO_MANY_TERRAINS",
        }
    }
}

/// Read-only arena of terrain types addressed by [`TerrainTypeId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainCatalog {
    terrains: Vec<TerrainType>,
}

impl TerrainCatalog {
    /// Validates and freezes a list of terrain types.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when ids are not `0..n` in order, identifiers
    /// collide, or any reference list or transition key names an id outside
    /// the catalog.
    pub fn new(terrains: Vec<TerrainType>) -> Result<Self, CatalogError> {
        if terrains.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        if terrains.len() > u16::MAX as usize {
            return Err(CatalogError::TooManyTerrains(terrains.len()));
        }

        let mut idents = BTreeSet::new();
        for (index, terrain) in terrains.iter().enumerate() {
            if terrain.id.index() != index {
                return Err(CatalogError::NonDenseId {
                    ident: terrain.ident.clone(),
                    expected: index as u16,
                    found: terrain.id,
                });
            }
            if !idents.insert(terrain.ident.as_str()) {
                return Err(CatalogError::DuplicateIdent(terrain.ident.clone()));
            }
        }

        let count = terrains.len();
        for terrain in &terrains {
            check_references(terrain, count, "border_terrains", terrain.border_terrains.iter().copied())?;
            check_references(
                terrain,
                count,
                "inner_border_terrains",
                terrain.inner_border_terrains.iter().copied(),
            )?;
            check_references(
                terrain,
                count,
                "outer_border_terrains",
                terrain.outer_border_terrains.iter().copied(),
            )?;
            check_references(terrain, count, "base_terrains", terrain.base_terrains.iter().copied())?;
            check_references(
                terrain,
                count,
                "transition_tiles",
                terrain.transition_tiles.keys().filter_map(|(id, _)| *id),
            )?;
            check_references(
                terrain,
                count,
                "adjacent_transition_tiles",
                terrain.adjacent_transition_tiles.keys().filter_map(|(id, _)| *id),
            )?;
        }

        Ok(Self { terrains })
    }

    pub fn get(&self, id: TerrainTypeId) -> Option<&TerrainType> {
        self.terrains.get(id.index())
    }

    pub fn by_ident(&self, ident: &str) -> Option<&TerrainType> {
        self.terrains.iter().find(|terrain| terrain.ident == ident)
    }

    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerrainType> {
        self.terrains.iter()
    }

    /// Whether two terrains may directly abut: either side lists the other as a border.
    pub fn compatible(&self, a: TerrainTypeId, b: TerrainTypeId) -> bool {
        if a == b {
            return true;
        }
        let a_borders = self.get(a).is_some_and(|terrain| terrain.borders(b));
        let b_borders = self.get(b).is_some_and(|terrain| terrain.borders(a));
        a_borders || b_borders
    }

    /// First terrain in `from`'s border list that can in turn abut `to`.
    pub fn bridge(&self, from: TerrainTypeId, to: TerrainTypeId) -> Option<TerrainTypeId> {
        let from = self.get(from)?;
        from.border_terrains
            .iter()
            .copied()
            .find(|&candidate| candidate != to && self.compatible(candidate, to))
    }
}

fn check_references(
    terrain: &TerrainType,
    count: usize,
    field: &'static str,
    ids: impl IntoIterator<Item = TerrainTypeId>,
) -> Result<(), CatalogError> {
    match ids.into_iter().find(|id| id.index() >= count) {
        Some(reference) => Err(CatalogError::UnknownReference {
            ident: terrain.ident.clone(),
            field,
            reference,
        }),
        None => Ok(()),
    }
}
