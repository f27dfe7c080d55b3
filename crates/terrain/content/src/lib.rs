//! Data-driven terrain content and loaders.
//!
//! This crate turns data files into the plain values `terrain-core` consumes:
//! - Terrain catalogs (RON, terrains reference each other by identifier)
//! - Engine configuration (TOML)
//! - Generation plans (RON, terrains referenced by identifier)
//!
//! Content is loaded once before play and is immutable afterwards; nothing
//! here is consulted while the engine runs.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CatalogLoader, ConfigLoader, ContentFactory, PlanLoader};
