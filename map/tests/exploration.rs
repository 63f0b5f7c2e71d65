use maze_explorer_core::{Direction, Distance, MoveOracle, RouteClass};
use maze_explorer_map::{RouteCache, SpatialMap};
use maze_explorer_simulation::{generate_maze, SimulatedOracle};

/// Explores a generated maze by always stepping toward the nearest frontier.
fn explore(seed: u64) {
    let layout = generate_maze(7, 6, seed);
    let info = layout.info();
    let mut oracle = SimulatedOracle::single(layout);
    let mut map = SpatialMap::new();
    let mut routes = RouteCache::new();

    let mut observation = oracle.enter(&info.name).expect("generated maze is served");
    routes.notify(map.register(&observation));

    loop {
        assert!(!map.is_invalid(), "seed {seed}: map invalidated");
        let before = routes.distance(&map, RouteClass::Frontier, map.location());
        if !before.is_known() {
            break;
        }

        let (direction, chosen) = observation
            .possible_move_actions
            .iter()
            .map(|action| {
                let distance = routes.distance_via(&map, RouteClass::Frontier, action.direction);
                (action.direction, distance)
            })
            .min_by_key(|(direction, distance)| (*distance, 3 - direction.index()))
            .expect("visited tiles offer moves");
        assert!(chosen < before, "seed {seed}: no step toward the frontier");

        observation = oracle.move_to(direction).expect("offered moves are passable");
        map.move_to(direction);
        routes.notify(map.register(&observation));

        if chosen != Distance::ZERO {
            let after = routes.distance(&map, RouteClass::Frontier, map.location());
            assert!(after <= before, "seed {seed}: frontier moved away");
            assert_eq!(after, chosen, "seed {seed}: route promised {chosen}");
        }
    }

    let visited = map.tiles().filter(|(_, tile)| tile.is_visited()).count();
    assert_eq!(visited as u32, info.total_tiles, "seed {seed}: maze not fully explored");
    assert_eq!(map.portal_count(), 0);
}

#[test]
fn euclidean_mazes_never_invalidate_the_map() {
    for seed in 0..16 {
        explore(seed);
    }
}

#[test]
fn every_move_offered_from_a_visited_tile_is_linked() {
    let layout = generate_maze(4, 4, 99);
    let info = layout.info();
    let mut oracle = SimulatedOracle::single(layout);
    let mut map = SpatialMap::new();
    let observation = oracle.enter(&info.name).expect("generated maze is served");
    let _ = map.register(&observation);

    for direction in Direction::ALL {
        let offered = observation.move_action(direction).is_some();
        assert_eq!(map.link(map.location(), direction).is_some(), offered);
    }
}
