//! Seeded random maze generation.

use std::collections::{BTreeMap, BTreeSet};

use maze_explorer_core::{Coord, Direction};
use rand::{seq::SliceRandom, Rng};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use tracing::debug;

use crate::layout::{MazeLayout, TileKind};

/// Generates a `width` x `height` room maze carved by a recursive backtracker.
///
/// Rooms sit on every other tile with carved corridors between them, so the
/// layout spans `2 * width - 1` by `2 * height - 1` tiles. A few extra walls
/// are knocked out to create loops. The start is the bottom-left room; the
/// exit and one collection point are placed on other rooms and roughly one
/// room in five carries a reward. The same seed always yields the same maze.
#[must_use]
pub fn generate_maze(width: u32, height: u32, seed: u64) -> MazeLayout {
    let width = width.max(2);
    let height = height.max(2);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let rooms: Vec<Coord> = (0..width)
        .flat_map(|x| (0..height).map(move |y| room(x, y)))
        .collect();
    let mut tiles: BTreeMap<Coord, TileKind> =
        rooms.iter().map(|coord| (*coord, TileKind::Open)).collect();

    carve(&mut tiles, &mut rng, width, height);
    knock_out_walls(&mut tiles, &mut rng, &rooms);

    let mut candidates: Vec<Coord> = rooms
        .iter()
        .copied()
        .filter(|coord| *coord != Coord::ORIGIN)
        .collect();
    candidates.shuffle(&mut rng);
    let mut picks = candidates.into_iter();
    if let Some(exit) = picks.next() {
        let _ = tiles.insert(exit, TileKind::Exit);
    }
    if let Some(collection_point) = picks.next() {
        let _ = tiles.insert(collection_point, TileKind::CollectionPoint);
    }

    let name = format!("generated-{width}x{height}-{seed}");
    let mut layout = MazeLayout::from_tiles(name, tiles);
    let reward_spots: Vec<Coord> = layout
        .open_tiles()
        .filter(|coord| *coord != Coord::ORIGIN && rng.gen_ratio(1, 5))
        .collect();
    for spot in reward_spots {
        layout.place_reward(spot, rng.gen_range(1..=9));
    }

    let info = layout.info();
    debug!(
        maze = %info.name,
        tiles = info.total_tiles,
        potential = info.potential_reward,
        "generated maze"
    );
    layout
}

fn room(x: u32, y: u32) -> Coord {
    let x = i32::try_from(x * 2).unwrap_or(i32::MAX);
    let y = i32::try_from(y * 2).unwrap_or(i32::MAX);
    Coord::new(x, y)
}

fn in_bounds(coord: Coord, width: u32, height: u32) -> bool {
    let max_x = i32::try_from(width * 2).unwrap_or(i32::MAX);
    let max_y = i32::try_from(height * 2).unwrap_or(i32::MAX);
    (0..max_x).contains(&coord.x()) && (0..max_y).contains(&coord.y())
}

fn room_beyond(coord: Coord, direction: Direction) -> Coord {
    coord.step(direction).step(direction)
}

fn carve(tiles: &mut BTreeMap<Coord, TileKind>, rng: &mut ChaCha8Rng, width: u32, height: u32) {
    let mut reached = BTreeSet::from([Coord::ORIGIN]);
    let mut stack = vec![Coord::ORIGIN];

    while let Some(current) = stack.last().copied() {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);

        let next = directions.into_iter().find(|direction| {
            let beyond = room_beyond(current, *direction);
            in_bounds(beyond, width, height) && !reached.contains(&beyond)
        });

        match next {
            Some(direction) => {
                let beyond = room_beyond(current, direction);
                let _ = tiles.insert(current.step(direction), TileKind::Open);
                let _ = reached.insert(beyond);
                stack.push(beyond);
            }
            None => {
                let _ = stack.pop();
            }
        }
    }
}

fn knock_out_walls(tiles: &mut BTreeMap<Coord, TileKind>, rng: &mut ChaCha8Rng, rooms: &[Coord]) {
    let extra = rooms.len() / 10;
    for _ in 0..extra {
        let Some(room) = rooms.choose(rng).copied() else {
            return;
        };
        let direction = Direction::ALL[rng.gen_range(0..4)];
        if tiles.contains_key(&room_beyond(room, direction)) {
            let _ = tiles.insert(room.step(direction), TileKind::Open);
        }
    }
}
