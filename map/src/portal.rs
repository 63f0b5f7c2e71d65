//! Best-effort placement of tiles reached through non-planar passages.
//!
//! When the service reports that a neighbour was already visited but the map
//! holds no visited tile at that coordinate, the step crossed a portal. The
//! heuristic below guesses where the tile really sits. It has no correctness
//! proof: it assumes portals wrap straight lines, as wrap-around edges do, and
//! falls back to the nearest plausible tile otherwise.

use std::collections::BTreeMap;

use maze_explorer_core::{Coord, Direction, MoveAction};

use crate::tile::{Slot, Tile};

/// Aliases proposed for a detected portal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Portal {
    /// Coordinate the agent was about to enter.
    pub(crate) entrance: Coord,
    /// Coordinate of the visited tile the entrance stands for.
    pub(crate) target: Coord,
    /// Dangling coordinate beside the target that leads back to the agent.
    pub(crate) return_entrance: Option<Coord>,
}

/// Locates the visited tile hidden behind `entrance`.
///
/// `here` must hold the visited tile the agent stands on and `action` the
/// move that reported the already-visited destination.
pub(crate) fn locate(
    slots: &BTreeMap<Coord, Slot>,
    here: Coord,
    entrance: Coord,
    action: &MoveAction,
) -> Option<Portal> {
    let back = action.direction.reversed();
    let plausible = |coord: Coord| {
        visited_tile(slots, coord).is_some_and(|tile| {
            tile.agrees_with(action.allows_exit, action.allows_score_collection)
                && tile.exits().allows(back)
                && visited_tile(slots, coord.step(back)).is_none()
        })
    };

    let target = farthest_on_line(slots, here, back, &plausible).or_else(|| {
        slots
            .iter()
            .filter(|(coord, _)| plausible(**coord))
            .map(|(coord, _)| *coord)
            .min_by_key(|coord| (coord.manhattan_distance(entrance), *coord))
    })?;

    let here_tile = visited_tile(slots, here)?;
    let dangling = target.step(back);
    let return_entrance = match slots.get(&dangling) {
        _ if dangling == here || dangling == entrance => None,
        None => Some(dangling),
        Some(Slot::Tile(tile))
            if !tile.is_visited()
                && tile.agrees_with(here_tile.is_exit(), here_tile.is_collection_point()) =>
        {
            Some(dangling)
        }
        Some(_) => None,
    };

    Some(Portal {
        entrance,
        target,
        return_entrance,
    })
}

/// Walks the unbroken line of visited tiles from `start` toward `direction`.
fn farthest_on_line<F>(
    slots: &BTreeMap<Coord, Slot>,
    start: Coord,
    direction: Direction,
    plausible: &F,
) -> Option<Coord>
where
    F: Fn(Coord) -> bool,
{
    let mut best = None;
    let mut cursor = start;

    for _ in 0..slots.len() {
        if visited_tile(slots, cursor).is_none() {
            break;
        }
        if plausible(cursor) {
            best = Some(cursor);
        }
        cursor = cursor.step(direction);
    }

    best
}

fn visited_tile(slots: &BTreeMap<Coord, Slot>, coord: Coord) -> Option<&Tile> {
    slots
        .get(&coord)
        .and_then(Slot::tile)
        .filter(|tile| tile.is_visited())
}
