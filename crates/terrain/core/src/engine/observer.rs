use crate::state::{LayerId, Position};

/// Receives one notification per recomputed cell.
///
/// Minimap, fog-of-war and renderers implement this to refresh their view of
/// a tile without the engine knowing about them. Notifications arrive after
/// the whole 3×3 window has been recomputed, so the grid is consistent when
/// the observer reads it back.
pub trait CellObserver {
    fn on_cell_changed(&mut self, layer: LayerId, position: Position);
}

/// Observer that records notifications in arrival order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeRecorder {
    changes: Vec<(LayerId, Position)>,
}

impl ChangeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[(LayerId, Position)] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Drains the recorded notifications.
    pub fn take(&mut self) -> Vec<(LayerId, Position)> {
        std::mem::take(&mut self.changes)
    }
}

impl CellObserver for ChangeRecorder {
    fn on_cell_changed(&mut self, layer: LayerId, position: Position) {
        self.changes.push((layer, position));
    }
}
