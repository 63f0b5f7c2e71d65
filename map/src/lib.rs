#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Incremental spatial map maintained by the Maze Explorer agent.
//!
//! The map starts empty and grows as observations arrive. Each mutation
//! returns a [`MapChanges`] signal naming the facts that moved so that
//! derived route tables (see [`navigation`]) can drop exactly what went
//! stale. Contradicting observations flip the map into a sticky invalid state
//! in which every distance query degrades to unknown.

pub mod navigation;
mod portal;
mod tile;

use std::collections::BTreeMap;

use bitflags::bitflags;
use maze_explorer_core::{Coord, Direction, Exits, MoveAction, Observation, RouteClass};
use tracing::{debug, info, warn};

pub use navigation::{Route, RouteCache};
pub use tile::{Slot, Tile};

bitflags! {
    /// Facts changed by a single map mutation.
    ///
    /// Route tables subscribe to the flags their search depends on and are
    /// discarded whenever a mutation reports one of them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MapChanges: u8 {
        /// The set of known exit tiles changed.
        const EXITS = 1 << 0;
        /// The set of known collection points changed.
        const COLLECTION_POINTS = 1 << 1;
        /// The set of tiles known to carry reward changed.
        const REWARDS = 1 << 2;
        /// A tile was discovered or stood on for the first time.
        const FRONTIER = 1 << 3;
        /// A passage or portal was learned.
        const TOPOLOGY = 1 << 4;
        /// The map became invalid during this mutation.
        const INVALIDATED = 1 << 5;
    }
}

impl MapChanges {
    /// Flag signalling that the seeds of `class` changed.
    #[must_use]
    pub const fn seeds_of(class: RouteClass) -> Self {
        match class {
            RouteClass::Exit => Self::EXITS,
            RouteClass::CollectionPoint => Self::COLLECTION_POINTS,
            RouteClass::Reward => Self::REWARDS,
            RouteClass::Frontier => Self::FRONTIER,
        }
    }

    fn seeds_of_tile(tile: &Tile) -> Self {
        RouteClass::ALL
            .into_iter()
            .filter(|class| tile.satisfies(*class))
            .fold(Self::empty(), |changes, class| changes | Self::seeds_of(class))
    }
}

/// Partially observed picture of the maze built from the agent's point of view.
#[derive(Clone, Debug, Default)]
pub struct SpatialMap {
    slots: BTreeMap<Coord, Slot>,
    location: Coord,
    invalid: bool,
    portals: usize,
}

impl SpatialMap {
    /// Creates an empty map with the agent at [`Coord::ORIGIN`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinate of the tile the agent stands on.
    #[must_use]
    pub const fn location(&self) -> Coord {
        self.location
    }

    /// Whether contradicting observations were detected.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// Number of portals resolved so far.
    #[must_use]
    pub const fn portal_count(&self) -> usize {
        self.portals
    }

    /// Follows portal aliases until a coordinate that is not an alias.
    #[must_use]
    pub fn resolve(&self, coord: Coord) -> Coord {
        let mut current = coord;
        for _ in 0..=self.slots.len() {
            match self.slots.get(&current) {
                Some(Slot::Alias(target)) => current = *target,
                _ => break,
            }
        }
        current
    }

    /// Coordinate reached by stepping from `coord` toward `direction`.
    #[must_use]
    pub fn neighbor(&self, coord: Coord, direction: Direction) -> Coord {
        self.resolve(coord.step(direction))
    }

    /// Tile known at `coord`, looked up through portal aliases.
    #[must_use]
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.slots.get(&self.resolve(coord)).and_then(Slot::tile)
    }

    /// Tile the agent stands on, once observed.
    #[must_use]
    pub fn current_tile(&self) -> Option<&Tile> {
        self.tile(self.location)
    }

    /// Whether anything is known about `coord`.
    #[must_use]
    pub fn is_known(&self, coord: Coord) -> bool {
        self.tile(coord).is_some()
    }

    /// Whether the agent stood on the tile at `coord`.
    #[must_use]
    pub fn is_visited(&self, coord: Coord) -> bool {
        self.tile(coord).is_some_and(Tile::is_visited)
    }

    /// Every stored slot, tiles and aliases alike, in coordinate order.
    pub fn slots(&self) -> impl Iterator<Item = (Coord, &Slot)> {
        self.slots.iter().map(|(coord, slot)| (*coord, slot))
    }

    /// Every stored tile in coordinate order, skipping aliases.
    pub fn tiles(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        self.slots
            .iter()
            .filter_map(|(coord, slot)| slot.tile().map(|tile| (*coord, tile)))
    }

    /// Coordinates of every tile satisfying `class`, in coordinate order.
    pub fn seeds(&self, class: RouteClass) -> impl Iterator<Item = Coord> + '_ {
        self.tiles()
            .filter(move |(_, tile)| tile.satisfies(class))
            .map(|(coord, _)| coord)
    }

    /// Passage leaving `from` toward `direction`, if one is known.
    ///
    /// Returns the tile reached and the direction leading back from it.
    /// Passages are mutual: either end reporting it is enough.
    #[must_use]
    pub fn link(&self, from: Coord, direction: Direction) -> Option<(Coord, Direction)> {
        let from = self.resolve(from);
        let origin = self.tile(from)?;
        let to = self.neighbor(from, direction);
        if to == from {
            return None;
        }
        let destination = self.tile(to)?;
        let back = self.direction_between(to, from, direction.reversed())?;

        if origin.exits().allows(direction) || destination.exits().allows(back) {
            Some((to, back))
        } else {
            None
        }
    }

    fn direction_between(&self, from: Coord, to: Coord, preferred: Direction) -> Option<Direction> {
        if self.neighbor(from, preferred) == to {
            return Some(preferred);
        }
        Direction::ALL
            .into_iter()
            .find(|direction| self.neighbor(from, *direction) == to)
    }

    /// Folds a full observation of the current tile and its neighbours into the map.
    pub fn register(&mut self, observation: &Observation) -> MapChanges {
        let mut changes = self.observe_current(observation);
        for action in &observation.possible_move_actions {
            if self.invalid {
                break;
            }
            changes |= self.observe_neighbor(action);
        }
        changes
    }

    /// Merges the ground truth for the tile under the agent.
    pub fn observe_current(&mut self, observation: &Observation) -> MapChanges {
        if self.invalid {
            return MapChanges::empty();
        }

        let here = self.location;
        let observed = Tile::observed(observation);

        match self.slots.get(&here).copied() {
            None => {
                let _ = self.slots.insert(here, Slot::Tile(observed));
                MapChanges::TOPOLOGY | MapChanges::seeds_of_tile(&observed)
            }
            Some(Slot::Alias(_)) => self.invalidate(here, "agent stands on a portal entrance"),
            Some(Slot::Tile(previous)) => {
                if !previous.agrees_with(observed.is_exit(), observed.is_collection_point()) {
                    return self.invalidate(here, "exit or collection flags changed");
                }

                if previous.is_visited() {
                    if previous.exits() != observed.exits() {
                        return self.invalidate(here, "exits of a visited tile changed");
                    }
                    return MapChanges::empty();
                }

                if !observed.exits().contains(previous.exits()) {
                    return self.invalidate(here, "reported passage is missing");
                }

                let mut changes = MapChanges::FRONTIER;
                if observed.exits() != previous.exits() {
                    changes |= MapChanges::TOPOLOGY;
                }
                if previous.has_reward() {
                    changes |= MapChanges::REWARDS;
                }
                let _ = self.slots.insert(here, Slot::Tile(observed));
                changes
            }
        }
    }

    /// Merges what a move candidate reveals about a neighbouring tile.
    pub fn observe_neighbor(&mut self, action: &MoveAction) -> MapChanges {
        if self.invalid {
            return MapChanges::empty();
        }

        let target = self.neighbor(self.location, action.direction);
        let back = action.direction.reversed();

        match self.slots.get(&target).copied() {
            None if action.has_been_visited => self.resolve_portal(target, action),
            None => {
                let tile = Tile::reported(action);
                let _ = self.slots.insert(target, Slot::Tile(tile));
                MapChanges::TOPOLOGY | MapChanges::FRONTIER | MapChanges::seeds_of_tile(&tile)
            }
            Some(Slot::Alias(_)) => self.invalidate(target, "unresolvable portal chain"),
            Some(Slot::Tile(known)) => match (known.is_visited(), action.has_been_visited) {
                (false, true) => self.resolve_portal(target, action),
                (true, false) => self.invalidate(target, "visited tile reported as unvisited"),
                (true, true) => {
                    if !known.agrees_with(action.allows_exit, action.allows_score_collection)
                        || !known.exits().allows(back)
                    {
                        return self.invalidate(target, "visited neighbour disagrees");
                    }
                    MapChanges::empty()
                }
                (false, false) => {
                    if !known.agrees_with(action.allows_exit, action.allows_score_collection) {
                        return self.invalidate(target, "neighbour flags changed");
                    }

                    let mut changes = MapChanges::empty();
                    let mut merged = known;
                    if !known.exits().allows(back) {
                        merged = merged.with_exits(known.exits() | Exits::of(back));
                        changes |= MapChanges::TOPOLOGY;
                    }
                    let has_reward = action.reward_on_destination > 0;
                    if has_reward != known.has_reward() {
                        merged = merged.with_reward(has_reward);
                        changes |= MapChanges::REWARDS;
                    }
                    if !changes.is_empty() {
                        let _ = self.slots.insert(target, Slot::Tile(merged));
                    }
                    changes
                }
            },
        }
    }

    /// Advances the agent's recorded location, passing through portals.
    pub fn move_to(&mut self, direction: Direction) {
        self.location = self.neighbor(self.location, direction);
    }

    /// Whether the destination toward `direction` borders an isolated unknown pocket.
    ///
    /// A pocket is a tile other than the agent's own that was never stood on
    /// and whose four neighbours are all known.
    #[must_use]
    pub fn has_island_neighbor(&self, direction: Direction) -> bool {
        let here = self.location;
        let destination = self.neighbor(here, direction);
        destination
            .neighbors()
            .into_iter()
            .map(|coord| self.resolve(coord))
            .filter(|coord| *coord != here && *coord != destination)
            .any(|coord| {
                !self.is_visited(coord)
                    && coord
                        .neighbors()
                        .into_iter()
                        .all(|neighbor| self.is_known(neighbor))
            })
    }

    /// Largest number of unknown tiles around any neighbour of the destination.
    #[must_use]
    pub fn unvisited_potential(&self, direction: Direction) -> u8 {
        let destination = self.neighbor(self.location, direction);
        destination
            .neighbors()
            .into_iter()
            .map(|coord| self.resolve(coord))
            .map(|coord| {
                coord
                    .neighbors()
                    .into_iter()
                    .filter(|neighbor| !self.is_known(*neighbor))
                    .fold(0u8, |count, _| count + 1)
            })
            .max()
            .unwrap_or(0)
    }

    fn resolve_portal(&mut self, entrance: Coord, action: &MoveAction) -> MapChanges {
        let here = self.location;
        let Some(portal) = portal::locate(&self.slots, here, entrance, action) else {
            return self.invalidate(entrance, "already visited tile has no plausible location");
        };

        let _ = self.slots.insert(portal.entrance, Slot::Alias(portal.target));
        if let Some(return_entrance) = portal.return_entrance {
            let _ = self.slots.insert(return_entrance, Slot::Alias(here));
        }
        self.portals += 1;

        info!(
            entrance = %portal.entrance,
            target = %portal.target,
            return_entrance = ?portal.return_entrance,
            direction = %action.direction,
            "resolved portal"
        );

        MapChanges::all().difference(MapChanges::INVALIDATED)
    }

    fn invalidate(&mut self, at: Coord, reason: &str) -> MapChanges {
        self.invalid = true;
        warn!(
            location = %self.location,
            conflict = %at,
            reason,
            "XY-incompatible maze detected; shortest-path routing disabled"
        );
        debug!(tiles = self.slots.len(), "map frozen");
        MapChanges::INVALIDATED
    }
}
