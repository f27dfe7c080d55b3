//! Content loaders for reading terrain data from files.
//!
//! Every loader has a `load(path)` entry point plus a `parse` variant so
//! callers can embed data with `include_str!`.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod plan;

pub use catalog::CatalogLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use plan::PlanLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
