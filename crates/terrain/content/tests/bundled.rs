//! Loads the shipped data directory and runs its plans end to end.

use terrain_content::{CatalogLoader, ContentFactory};
use terrain_core::{
    EngineError, LayerId, MapDimensions, PcgSyncRand, TerrainEngine, TerrainEnv, TileGrid,
};

fn run_continent(seed: u64) -> (TileGrid, Result<usize, EngineError>) {
    let factory = ContentFactory::bundled();
    let config = factory.load_config().unwrap();
    let catalog = factory.load_catalog().unwrap();
    let plan = factory.load_plan("continent", &catalog).unwrap();
    let grass = catalog.by_ident("grass").unwrap().id;

    let mut grid = TileGrid::with_layer(MapDimensions::new(24, 24));
    let mut rng = PcgSyncRand::new(seed);
    let mut engine = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng)
        .with_config(config);
    engine.fill_layer(LayerId::SURFACE, grass).unwrap();
    let result = engine
        .apply_plan(LayerId::SURFACE, &plan)
        .map(|report| report.tiles_painted());
    (grid, result)
}

#[test]
fn bundled_content_loads() {
    let factory = ContentFactory::bundled();
    let catalog = factory.load_catalog().unwrap();
    assert_eq!(catalog, CatalogLoader::builtin().unwrap());

    let plan = factory.load_plan("continent", &catalog).unwrap();
    assert_eq!(plan.len(), 4);
    assert_eq!(factory.load_config().unwrap(), Default::default());
}

#[test]
fn continent_plan_is_reproducible() {
    let (first, first_result) = run_continent(7);
    let (second, second_result) = run_continent(7);

    assert_eq!(first.state_root(), second.state_root());
    match (first_result, second_result) {
        (Ok(a), Ok(b)) => {
            assert_eq!(a, b);
            assert!(a > 0);
        }
        (Err(a), Err(b)) => {
            assert_eq!(a, b);
            assert!(matches!(a, EngineError::TerrainIntegrity { .. }));
        }
        (a, b) => panic!("runs diverged: {a:?} vs {b:?}"),
    }
}
