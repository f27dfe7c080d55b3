//! Terrain catalog loader.
//!
//! Terrain definitions reference one another by `ident`; ids are assigned in
//! definition order, so the first terrain in the file becomes `terrain#0`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use terrain_core::{
    TerrainCatalog, TerrainType, TerrainTypeBuilder, TerrainTypeId, TileFlags, TileVariantId,
    TransitionPattern,
};

use crate::loaders::{LoadResult, read_file};

/// One terrain definition as written in RON.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TerrainDef {
    ident: String,
    #[serde(default)]
    overlay: bool,
    #[serde(default)]
    allow_single: bool,
    #[serde(default)]
    flags: TileFlags,
    #[serde(default)]
    destroyed_flags: TileFlags,
    #[serde(default)]
    borders: Vec<String>,
    #[serde(default)]
    inner_borders: Vec<String>,
    #[serde(default)]
    outer_borders: Vec<String>,
    #[serde(default)]
    bases: Vec<String>,
    #[serde(default)]
    transitions: Vec<TileTableDef>,
    #[serde(default)]
    adjacent_transitions: Vec<TileTableDef>,
    #[serde(default)]
    solid_tiles: Vec<TileVariantId>,
    #[serde(default)]
    destroyed_tiles: Vec<TileVariantId>,
    #[serde(default)]
    damaged_tiles: Vec<TileVariantId>,
    #[serde(default)]
    resource_amount: u32,
}

/// Tile variants for one `(adjacent, pattern)` key; `adjacent: None` is the
/// fallback used for any neighbour.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TileTableDef {
    #[serde(default)]
    adjacent: Option<String>,
    pattern: TransitionPattern,
    tiles: Vec<TileVariantId>,
}

/// Loader for terrain catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load and validate a catalog from a RON file.
    ///
    /// RON format: `[TerrainDef]`, see `data/terrain.ron`.
    pub fn load(path: &Path) -> LoadResult<TerrainCatalog> {
        let content = read_file(path)?;
        let catalog = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load catalog {}: {}", path.display(), e))?;
        tracing::debug!("loaded {} terrain types from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// The temperate catalog shipped with this crate.
    pub fn builtin() -> LoadResult<TerrainCatalog> {
        Self::parse(include_str!("../../data/terrain.ron"))
    }

    pub fn parse(content: &str) -> LoadResult<TerrainCatalog> {
        let defs: Vec<TerrainDef> = ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::UNWRAP_NEWTYPES)
            .from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse terrain catalog RON: {}", e))?;

        let mut ids: HashMap<&str, TerrainTypeId> = HashMap::with_capacity(defs.len());
        for (index, def) in defs.iter().enumerate() {
            let id = u16::try_from(index)
                .map(TerrainTypeId)
                .map_err(|_| anyhow::anyhow!("Too many terrain types ({})", defs.len()))?;
            if ids.insert(def.ident.as_str(), id).is_some() {
                anyhow::bail!("Duplicate terrain ident '{}'", def.ident);
            }
        }

        let terrains = defs
            .iter()
            .map(|def| build_terrain(def, &ids))
            .collect::<LoadResult<Vec<TerrainType>>>()?;

        TerrainCatalog::new(terrains).map_err(|e| anyhow::anyhow!("Invalid terrain catalog: {}", e))
    }
}

fn build_terrain(def: &TerrainDef, ids: &HashMap<&str, TerrainTypeId>) -> LoadResult<TerrainType> {
    let lookup = |field: &str, ident: &str| -> LoadResult<TerrainTypeId> {
        ids.get(ident).copied().ok_or_else(|| {
            anyhow::anyhow!(
                "Terrain '{}' references unknown terrain '{}' in {}",
                def.ident,
                ident,
                field
            )
        })
    };

    let mut builder: TerrainTypeBuilder = TerrainType::builder(ids[def.ident.as_str()], &def.ident)
        .overlay(def.overlay)
        .allow_single(def.allow_single)
        .flags(def.flags)
        .destroyed_flags(def.destroyed_flags)
        .solid_tiles(def.solid_tiles.iter().copied())
        .destroyed_tiles(def.destroyed_tiles.iter().copied())
        .damaged_tiles(def.damaged_tiles.iter().copied())
        .resource_amount(def.resource_amount);

    for ident in &def.borders {
        builder = builder.border(lookup("borders", ident)?);
    }
    for ident in &def.inner_borders {
        builder = builder.inner_border(lookup("inner_borders", ident)?);
    }
    for ident in &def.outer_borders {
        builder = builder.outer_border(lookup("outer_borders", ident)?);
    }
    for ident in &def.bases {
        builder = builder.base(lookup("bases", ident)?);
    }
    for table in &def.transitions {
        let adjacent = table
            .adjacent
            .as_deref()
            .map(|ident| lookup("transitions", ident))
            .transpose()?;
        builder = builder.transition(adjacent, table.pattern, table.tiles.iter().copied());
    }
    for table in &def.adjacent_transitions {
        let adjacent = table
            .adjacent
            .as_deref()
            .map(|ident| lookup("adjacent_transitions", ident))
            .transpose()?;
        builder = builder.adjacent_transition(adjacent, table.pattern, table.tiles.iter().copied());
    }
    Ok(builder.build())
}
