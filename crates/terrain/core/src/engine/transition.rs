//! Transition calculator (autotiling).
//!
//! For one channel of one cell, groups the differing neighbours by the
//! terrain they present, classifies each group into a [`TransitionPattern`],
//! and picks a tile variant for it. Reads only committed grid state.

use std::collections::BTreeMap;

use crate::env::{SyncRand, TerrainCatalog, TerrainType, TerrainTypeId, TileVariantId, choose};
use crate::state::{Channel, Direction, Directions, Layer, LayerId, Position, TransitionTile};

use super::{EngineError, TerrainEngine, TransitionPattern};

/// Result of recomputing one channel of a cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ComputedTransitions {
    pub tiles: Vec<TransitionTile>,
    /// Water meets land on this channel.
    pub coastal: bool,
}

/// Computes the transition list of `position` on `channel` from its current
/// neighbourhood. Consumes one draw per bucket that resolves to a tile list.
pub(crate) fn compute_transitions(
    catalog: &TerrainCatalog,
    layer: &Layer,
    position: Position,
    channel: Channel,
    rng: &mut dyn SyncRand,
) -> ComputedTransitions {
    let Some(terrain) = layer
        .cell(position)
        .and_then(|cell| cell.effective_terrain(channel))
        .and_then(|id| catalog.get(id))
    else {
        return ComputedTransitions::default();
    };

    let mut buckets: BTreeMap<Option<TerrainTypeId>, Directions> = BTreeMap::new();
    let mut coastal = false;

    for direction in Direction::ALL {
        let Some(neighbour) = layer.cell(position.step(direction)) else {
            continue;
        };
        let adjacent = neighbour.effective_terrain(channel);
        if adjacent == Some(terrain.id) {
            continue;
        }

        let surface = match channel {
            Channel::Base => neighbour.base_terrain(),
            Channel::Overlay => neighbour.top_terrain(),
        };
        if let Some(other) = surface.and_then(|id| catalog.get(id)) {
            coastal |= meets_coast(terrain, other);
        }

        let bucket = match adjacent {
            None => None,
            Some(other) if catalog.compatible(terrain.id, other) => Some(other),
            Some(other) => match catalog.bridge(terrain.id, other) {
                Some(bridge) => Some(bridge),
                None => {
                    tracing::debug!(
                        "no bridge between {} and {} at {}",
                        terrain.ident,
                        other,
                        position
                    );
                    continue;
                }
            },
        };
        *buckets.entry(bucket).or_default() |= direction.bit();
    }

    let mut tiles = Vec::with_capacity(buckets.len());
    for (bucket, directions) in buckets {
        let Some(pattern) = TransitionPattern::classify(directions, terrain.allow_single) else {
            continue;
        };
        let bucket_terrain = bucket.and_then(|id| catalog.get(id));
        let Some((owner, variants)) = lookup_tiles(terrain, bucket, bucket_terrain, pattern) else {
            tracing::debug!(
                "{} has no {} tiles towards {:?} at {}",
                terrain.ident,
                pattern,
                bucket,
                position
            );
            continue;
        };
        if let Some(&tile) = choose(rng, variants) {
            tiles.push(TransitionTile {
                terrain: owner,
                adjacent: bucket,
                tile,
            });
        }
    }

    order_inner_borders(catalog, &mut tiles);
    ComputedTransitions { tiles, coastal }
}

/// Water against land, on either side.
fn meets_coast(terrain: &TerrainType, other: &TerrainType) -> bool {
    (terrain.flags.is_water_only() && other.flags.is_land_only())
        || (terrain.flags.is_land_only() && other.flags.is_water_only())
}

/// Resolves the tile list for a bucket: the terrain's own table first, then
/// the adjacent terrain's table, then the NONE key on either side.
fn lookup_tiles<'c>(
    terrain: &'c TerrainType,
    bucket: Option<TerrainTypeId>,
    bucket_terrain: Option<&'c TerrainType>,
    pattern: TransitionPattern,
) -> Option<(TerrainTypeId, &'c [TileVariantId])> {
    let own = terrain.transition_tiles_for((bucket, pattern));
    if !own.is_empty() {
        return Some((terrain.id, own));
    }
    if let Some(adjacent) = bucket_terrain {
        let borrowed = adjacent.adjacent_transition_tiles_for((Some(terrain.id), pattern));
        if !borrowed.is_empty() {
            return Some((adjacent.id, borrowed));
        }
    }
    let own = terrain.transition_tiles_for((None, pattern));
    if !own.is_empty() {
        return Some((terrain.id, own));
    }
    let adjacent = bucket_terrain?;
    let borrowed = adjacent.adjacent_transition_tiles_for((None, pattern));
    (!borrowed.is_empty()).then_some((adjacent.id, borrowed))
}

/// Moves every entry after the later entries its terrain lists as inner
/// borders, so inner borders draw on top. Stable for unrelated entries.
fn order_inner_borders(catalog: &TerrainCatalog, tiles: &mut Vec<TransitionTile>) {
    let key = |tile: &TransitionTile| tile.adjacent.unwrap_or(tile.terrain);
    let draws_under = |earlier: &TransitionTile, later: &TransitionTile| {
        catalog
            .get(key(earlier))
            .is_some_and(|terrain| terrain.has_inner_border(key(later)))
    };

    // Cyclic inner-border data would never settle.
    let limit = tiles.len() * tiles.len();
    for _ in 0..limit {
        let swap = (0..tiles.len()).find_map(|i| {
            (i + 1..tiles.len())
                .rev()
                .find(|&j| draws_under(&tiles[i], &tiles[j]))
                .map(|j| (i, j))
        });
        let Some((from, to)) = swap else {
            return;
        };
        let tile = tiles.remove(from);
        tiles.insert(to, tile);
    }
}

impl TerrainEngine<'_> {
    /// Recomputes one channel of a cell and re-derives its flags.
    pub(crate) fn recompute_transitions(
        &mut self,
        layer: LayerId,
        position: Position,
        channel: Channel,
    ) -> Result<(), EngineError> {
        let catalog = self.env.catalog();
        let computed = compute_transitions(
            catalog,
            self.grid.layer(layer)?,
            position,
            channel,
            &mut *self.rng,
        );

        let cell = self.grid.cell_mut(layer, position)?;
        *cell.transitions_mut(channel) = computed.tiles;
        cell.set_coastal(channel, computed.coastal);
        let base = cell.base_terrain().and_then(|id| catalog.get(id));
        let overlay = cell.overlay_terrain().and_then(|id| catalog.get(id));
        cell.refresh_flags(base, overlay);
        Ok(())
    }
}
