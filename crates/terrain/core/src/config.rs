/// Engine configuration: safety caps and retry budgets.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Maximum number of full scans a correction pass may run before the
    /// region is declared non-convergent.
    pub max_correction_passes: u32,

    /// Random draws allowed per requested seed or expansion during generation.
    pub retry_factor: u32,
}

impl EngineConfig {
    // ===== compile-time constants =====
    /// Neighbour offsets examined around a cell (the 3×3 window minus the centre).
    pub const NEIGHBOR_COUNT: usize = 8;
    /// Cells recomputed by a single mutation: the 3×3 window, both channels.
    pub const MAX_RECOMPUTE_PER_EDIT: usize = 18;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_CORRECTION_PASSES: u32 = 1024;
    pub const DEFAULT_RETRY_FACTOR: u32 = 100;

    pub fn new() -> Self {
        Self {
            max_correction_passes: Self::DEFAULT_MAX_CORRECTION_PASSES,
            retry_factor: Self::DEFAULT_RETRY_FACTOR,
        }
    }

    pub fn with_max_correction_passes(mut self, max_correction_passes: u32) -> Self {
        self.max_correction_passes = max_correction_passes;
        self
    }

    pub fn with_retry_factor(mut self, retry_factor: u32) -> Self {
        self.retry_factor = retry_factor;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
