//! Content factory for loading terrain data from a directory.

use std::path::{Path, PathBuf};

use terrain_core::{EngineConfig, GenerationPlan, TerrainCatalog};

use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult, PlanLoader};

/// Content factory that loads all terrain content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── terrain.ron
/// └── plans/
///     └── continent.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
    }

    /// Load engine configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load the terrain catalog from `terrain.ron`.
    pub fn load_catalog(&self) -> LoadResult<TerrainCatalog> {
        let path = self.data_dir.join("terrain.ron");
        CatalogLoader::load(&path)
    }

    /// Load a plan from `plans/{plan_name}.ron`, resolved against `catalog`.
    pub fn load_plan(&self, plan_name: &str, catalog: &TerrainCatalog) -> LoadResult<GenerationPlan> {
        let path = self.data_dir.join("plans").join(format!("{}.ron", plan_name));
        PlanLoader::load(&path, catalog)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_plan_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        let catalog = CatalogLoader::builtin().unwrap();
        let err = factory.load_plan("islands", &catalog).unwrap_err();
        assert!(err.to_string().contains("islands.ron"));
    }
}
