use sha2::{Digest, Sha256};

use crate::engine::EngineError;
use crate::env::TerrainTypeId;

use super::{Cell, LayerId, MapDimensions, Position, Region, TileFlags, TransitionTile};

/// One planar grid of cells with fixed bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layer {
    dimensions: MapDimensions,
    cells: Vec<Cell>,
    /// Sub-areas that generation must leave untouched.
    protected: Vec<Region>,
}

impl Layer {
    pub fn new(dimensions: MapDimensions) -> Self {
        Self {
            dimensions,
            cells: vec![Cell::default(); dimensions.area()],
            protected: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    pub fn contains(&self, position: Position) -> bool {
        self.dimensions.contains(position)
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.dimensions.width as usize + position.x as usize)
    }

    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.index(position).map(|index| &self.cells[index])
    }

    pub(crate) fn cell_mut(&mut self, position: Position) -> Option<&mut Cell> {
        self.index(position).map(|index| &mut self.cells[index])
    }

    /// Cells with their positions, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        let width = self.dimensions.width.max(1) as usize;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            (
                Position::new((index % width) as i32, (index / width) as i32),
                cell,
            )
        })
    }

    pub fn protected_areas(&self) -> &[Region] {
        &self.protected
    }

    pub fn is_protected(&self, position: Position) -> bool {
        self.protected.iter().any(|area| area.contains(position))
    }
}

/// All layers of a map. The grid exclusively owns every cell; terrain
/// changes go through [`TerrainEngine`](crate::engine::TerrainEngine).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid {
    layers: Vec<Layer>,
}

impl TileGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a grid with a single empty layer.
    pub fn with_layer(dimensions: MapDimensions) -> Self {
        let mut grid = Self::new();
        grid.add_layer(dimensions);
        grid
    }

    /// Appends a layer; its bounds are fixed for the lifetime of the grid.
    pub fn add_layer(&mut self, dimensions: MapDimensions) -> LayerId {
        let id = LayerId(self.layers.len() as u16);
        self.layers.push(Layer::new(dimensions));
        tracing::debug!(
            "added {} ({}x{})",
            id,
            dimensions.width,
            dimensions.height
        );
        id
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> + '_ {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| (LayerId(index as u16), layer))
    }

    /// # Errors
    ///
    /// Returns `EngineError::UnknownLayer` if the layer does not exist.
    pub fn layer(&self, layer: LayerId) -> Result<&Layer, EngineError> {
        self.layers
            .get(layer.index())
            .ok_or(EngineError::UnknownLayer(layer))
    }

    pub(crate) fn layer_mut(&mut self, layer: LayerId) -> Result<&mut Layer, EngineError> {
        self.layers
            .get_mut(layer.index())
            .ok_or(EngineError::UnknownLayer(layer))
    }

    pub fn contains(&self, layer: LayerId, position: Position) -> bool {
        self.layers
            .get(layer.index())
            .is_some_and(|l| l.contains(position))
    }

    /// # Errors
    ///
    /// Returns `EngineError::OutOfBounds` for positions outside the layer and
    /// `EngineError::UnknownLayer` for a missing layer.
    pub fn cell(&self, layer: LayerId, position: Position) -> Result<&Cell, EngineError> {
        self.layer(layer)?
            .cell(position)
            .ok_or(EngineError::OutOfBounds { layer, position })
    }

    pub(crate) fn cell_mut(
        &mut self,
        layer: LayerId,
        position: Position,
    ) -> Result<&mut Cell, EngineError> {
        self.layer_mut(layer)?
            .cell_mut(position)
            .ok_or(EngineError::OutOfBounds { layer, position })
    }

    /// Excludes a sub-area from terrain generation.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidRegion` if the area does not overlap the layer.
    pub fn add_protected_area(&mut self, layer: LayerId, area: Region) -> Result<(), EngineError> {
        let target = self.layer_mut(layer)?;
        let clamped = area
            .clamp_to(target.dimensions)
            .ok_or(EngineError::InvalidRegion { layer, region: area })?;
        target.protected.push(clamped);
        Ok(())
    }

    /// Replaces the occupant bits of a cell; terrain bits are left alone.
    pub fn set_occupant_flags(
        &mut self,
        layer: LayerId,
        position: Position,
        occupants: TileFlags,
    ) -> Result<(), EngineError> {
        self.cell_mut(layer, position)?.set_occupant_flags(occupants);
        Ok(())
    }

    /// Updates the remaining resource amount of a cell (e.g. after harvesting).
    pub fn set_value(&mut self, layer: LayerId, position: Position, value: u32) -> Result<(), EngineError> {
        self.cell_mut(layer, position)?.set_value(value);
        Ok(())
    }

    /// SHA-256 over every layer and cell in canonical order.
    ///
    /// Peers running in lockstep compare roots to detect desyncs.
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.layers.len() as u32).to_le_bytes());
        for layer in &self.layers {
            hasher.update(layer.dimensions.width.to_le_bytes());
            hasher.update(layer.dimensions.height.to_le_bytes());
            for cell in &layer.cells {
                hash_cell(&mut hasher, cell);
            }
        }
        hasher.finalize().into()
    }
}

fn hash_terrain(hasher: &mut Sha256, terrain: Option<TerrainTypeId>) {
    // 0 encodes "no terrain"
    let encoded = terrain.map_or(0u32, |id| id.0 as u32 + 1);
    hasher.update(encoded.to_le_bytes());
}

fn hash_transitions(hasher: &mut Sha256, tiles: &[TransitionTile]) {
    hasher.update((tiles.len() as u32).to_le_bytes());
    for tile in tiles {
        hash_terrain(hasher, Some(tile.terrain));
        hash_terrain(hasher, tile.adjacent);
        hasher.update(tile.tile.to_le_bytes());
    }
}

fn hash_cell(hasher: &mut Sha256, cell: &Cell) {
    hash_terrain(hasher, cell.base_terrain());
    hash_terrain(hasher, cell.overlay_terrain());
    hasher.update([cell.overlay_destroyed() as u8, cell.overlay_damaged() as u8]);
    hasher.update(cell.flags().bits().to_le_bytes());
    hasher.update(cell.value().to_le_bytes());
    hasher.update(cell.solid_tile().map_or(u64::MAX, u64::from).to_le_bytes());
    hasher.update(
        cell.overlay_solid_tile()
            .map_or(u64::MAX, u64::from)
            .to_le_bytes(),
    );
    hash_transitions(hasher, cell.transition_tiles());
    hash_transitions(hasher, cell.overlay_transition_tiles());
    let seen = cell.seen();
    hash_terrain(hasher, seen.base_terrain);
    hash_terrain(hasher, seen.overlay_terrain);
    hasher.update([seen.overlay_destroyed as u8]);
}
