use terrain_core::{
    Channel, Direction, LayerId, MapDimensions, PcgSyncRand, Position, Region, TerrainCatalog,
    TerrainEngine, TerrainEnv, TerrainType, TerrainTypeId, TileFlags, TileGrid, TransitionPattern,
};

const SURFACE: LayerId = LayerId::SURFACE;

fn filled(catalog: &TerrainCatalog, size: u32, terrain: TerrainTypeId) -> TileGrid {
    let mut grid = TileGrid::with_layer(MapDimensions::new(size, size));
    let mut rng = PcgSyncRand::new(0);
    TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(catalog), &mut rng)
        .fill_layer(SURFACE, terrain)
        .unwrap();
    grid
}

#[test]
fn incompatible_neighbours_transition_through_bridge() {
    let grass = TerrainTypeId(0);
    let water = TerrainTypeId(1);
    let mud = TerrainTypeId(2);
    let catalog = TerrainCatalog::new(vec![
        TerrainType::builder(grass, "grass")
            .flags(TileFlags::LAND)
            .allow_single(true)
            .solid_tiles([0])
            .build(),
        TerrainType::builder(water, "water")
            .flags(TileFlags::WATER)
            .allow_single(true)
            .border(mud)
            .transition(Some(mud), TransitionPattern::Single, [40, 41])
            .build(),
        TerrainType::builder(mud, "mud")
            .flags(TileFlags::LAND)
            .border(grass)
            .border(water)
            .build(),
    ])
    .unwrap();
    let mut grid = filled(&catalog, 5, grass);
    let mut rng = PcgSyncRand::new(1);
    let center = Position::new(2, 2);

    TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng)
        .set_terrain(SURFACE, center, water)
        .unwrap();

    let tiles = grid.cell(SURFACE, center).unwrap().transition_tiles();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].adjacent, Some(mud));
    assert_eq!(tiles[0].terrain, water);
    assert!([40, 41].contains(&tiles[0].tile));
}

#[test]
fn surrounded_cell_uses_single_pattern_tiles() {
    let tower = TerrainTypeId(0);
    let bog = TerrainTypeId(1);
    let catalog = TerrainCatalog::new(vec![
        TerrainType::builder(tower, "tower")
            .allow_single(true)
            .border(bog)
            .transition(Some(bog), TransitionPattern::Single, [7, 8, 9])
            .transition(Some(bog), TransitionPattern::North, [100])
            .transition(None, TransitionPattern::Single, [200])
            .build(),
        TerrainType::builder(bog, "bog").allow_single(true).build(),
    ])
    .unwrap();

    for seed in 0..16 {
        let mut grid = filled(&catalog, 3, bog);
        let mut rng = PcgSyncRand::new(seed);
        TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng)
            .set_terrain(SURFACE, Position::new(1, 1), tower)
            .unwrap();

        let tiles = grid.cell(SURFACE, Position::new(1, 1)).unwrap().transition_tiles();
        assert_eq!(tiles.len(), 1, "seed {seed}");
        assert_eq!(tiles[0].adjacent, Some(bog));
        assert!([7, 8, 9].contains(&tiles[0].tile), "seed {seed}: {:?}", tiles[0]);
    }
}

#[test]
fn seeded_water_block_gets_a_flagged_coast() {
    let grass = TerrainTypeId(0);
    let water = TerrainTypeId(1);
    let catalog = TerrainCatalog::new(vec![
        TerrainType::builder(grass, "grass")
            .flags(TileFlags::LAND)
            .allow_single(true)
            .border(water)
            .build(),
        TerrainType::builder(water, "water")
            .flags(TileFlags::WATER)
            .border(grass)
            .build(),
    ])
    .unwrap();
    let mut grid = filled(&catalog, 6, grass);
    let mut rng = PcgSyncRand::new(42);
    let mut engine = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng);

    let params = terrain_core::GenerationParams::builder(water)
        .seed_count(1)
        .expansion_count(0)
        .preserve_coastline(true)
        .build();
    let report = engine
        .generate(SURFACE, Region::new(Position::ORIGIN, Position::new(3, 3)), &params)
        .unwrap();
    assert_eq!(report.seeds_placed, 1);
    assert_eq!(report.tiles_painted, 4);

    let whole = Region::new(Position::ORIGIN, Position::new(5, 5));
    engine.fix_transitions(SURFACE, whole).unwrap();

    let layer = grid.layer(SURFACE).unwrap();
    let water_cells: Vec<Position> = layer
        .cells()
        .filter(|(_, cell)| cell.base_terrain() == Some(water))
        .map(|(position, _)| position)
        .collect();
    assert_eq!(water_cells.len(), 4);
    let min = water_cells[0];
    let expected: Vec<Position> = Region::new(min, min.offset(1, 1)).positions().collect();
    assert_eq!(water_cells, expected);

    for (position, cell) in layer.cells() {
        let touches_water = Direction::ALL
            .into_iter()
            .any(|direction| water_cells.contains(&position.step(direction)));
        if cell.base_terrain() == Some(grass) && touches_water {
            assert!(
                cell.flags().contains(TileFlags::COAST | TileFlags::LAND),
                "{position} not flagged as coast"
            );
        }
        if cell.base_terrain() == Some(grass) && !touches_water {
            assert!(!cell.flags().contains(TileFlags::COAST), "{position} flagged as coast");
        }
    }
}

#[test]
fn single_cell_region_needs_one_pass() {
    let rock = TerrainTypeId(0);
    let catalog = TerrainCatalog::new(vec![TerrainType::builder(rock, "rock").build()]).unwrap();
    let mut grid = filled(&catalog, 4, rock);
    let mut rng = PcgSyncRand::new(0);
    let mut engine = TerrainEngine::new(&mut grid, TerrainEnv::with_catalog(&catalog), &mut rng);

    for channel in Channel::BOTH {
        let report = engine
            .fix_irregularities(SURFACE, channel.is_overlay(), Region::single(Position::new(2, 1)))
            .unwrap();
        assert_eq!(report.passes, 1);
        assert_eq!(report.changes, 0);
    }
}
