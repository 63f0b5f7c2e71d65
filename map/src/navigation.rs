//! Lazily maintained multi-source route tables built over the spatial map.
//!
//! One table exists per [`RouteClass`]. A table is a reverse breadth-first
//! search seeded from every tile of its class; each reached coordinate stores
//! its distance to the nearest seed and the direction of the first step
//! toward it. Searches stop as soon as the queried coordinate and its
//! neighbours are settled and resume from the stored queue on later lookups.

use std::collections::{HashMap, VecDeque};

use maze_explorer_core::{Coord, Direction, Distance, RouteClass};
use tracing::debug;

use crate::{MapChanges, SpatialMap};

/// Entry recorded for one coordinate of a route table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    distance: Distance,
    direction: Option<Direction>,
}

impl Route {
    /// Steps to the nearest tile of the class.
    #[must_use]
    pub const fn distance(&self) -> Distance {
        self.distance
    }

    /// First step toward the nearest tile; `None` on the tile itself.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        self.direction
    }
}

#[derive(Clone, Debug)]
struct RouteTable {
    class: RouteClass,
    routes: HashMap<Coord, Route>,
    queue: VecDeque<Coord>,
    stale: bool,
}

impl RouteTable {
    fn new(class: RouteClass) -> Self {
        Self {
            class,
            routes: HashMap::new(),
            queue: VecDeque::new(),
            stale: true,
        }
    }

    fn subscriptions(&self) -> MapChanges {
        MapChanges::seeds_of(self.class) | MapChanges::TOPOLOGY | MapChanges::INVALIDATED
    }

    fn rebuild(&mut self, map: &SpatialMap) {
        self.routes.clear();
        self.queue.clear();

        for seed in map.seeds(self.class) {
            let route = Route {
                distance: Distance::ZERO,
                direction: None,
            };
            if self.routes.insert(seed, route).is_none() {
                self.queue.push_back(seed);
            }
        }

        self.stale = false;
        debug!(class = %self.class, seeds = self.queue.len(), "rebuilt route table");
    }

    /// Expands the search until `origin` and every coordinate one step past it is settled.
    fn lookup(&mut self, map: &SpatialMap, origin: Coord) -> Option<Route> {
        if self.stale {
            self.rebuild(map);
        }

        loop {
            if let Some(found) = self.routes.get(&origin).copied() {
                let horizon = found.distance.key().saturating_add(1);
                let settled = self
                    .queue
                    .front()
                    .and_then(|front| self.routes.get(front))
                    .map_or(true, |front| front.distance.key() > horizon);
                if settled {
                    return Some(found);
                }
            }

            let Some(cell) = self.queue.pop_front() else {
                return self.routes.get(&origin).copied();
            };
            let Some(current) = self.routes.get(&cell).copied() else {
                continue;
            };
            let next = current.distance.successor();

            for direction in Direction::ALL {
                let Some((neighbor, back)) = map.link(cell, direction) else {
                    continue;
                };
                if self.routes.contains_key(&neighbor) {
                    continue;
                }

                let _ = self.routes.insert(
                    neighbor,
                    Route {
                        distance: next,
                        direction: Some(back),
                    },
                );
                self.queue.push_back(neighbor);
            }
        }
    }
}

/// Route tables for every class, invalidated by [`MapChanges`] notifications.
#[derive(Clone, Debug)]
pub struct RouteCache {
    tables: [RouteTable; 4],
}

impl Default for RouteCache {
    fn default() -> Self {
        Self {
            tables: RouteClass::ALL.map(RouteTable::new),
        }
    }
}

impl RouteCache {
    /// Creates a cache whose tables are built on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every table whose inputs were touched by `changes`.
    pub fn notify(&mut self, changes: MapChanges) {
        if changes.is_empty() {
            return;
        }

        for table in &mut self.tables {
            if !table.stale && changes.intersects(table.subscriptions()) {
                table.stale = true;
                debug!(class = %table.class, ?changes, "route table discarded");
            }
        }
    }

    /// Whether the table for `class` is built and still matches the map.
    #[must_use]
    pub fn is_fresh(&self, class: RouteClass) -> bool {
        !self.tables[class.index()].stale
    }

    /// Route recorded for `coord`, searching further if needed.
    pub fn route(&mut self, map: &SpatialMap, class: RouteClass, coord: Coord) -> Option<Route> {
        if map.is_invalid() {
            return None;
        }

        let origin = map.resolve(coord);
        self.tables[class.index()].lookup(map, origin)
    }

    /// Distance from `coord` to the nearest tile of `class`.
    pub fn distance(&mut self, map: &SpatialMap, class: RouteClass, coord: Coord) -> Distance {
        self.route(map, class, coord)
            .map_or(Distance::UNKNOWN, |route| route.distance())
    }

    /// Distance to `class` after stepping from the agent's tile toward `direction`.
    ///
    /// A destination that is itself of the class scores zero.
    pub fn distance_via(
        &mut self,
        map: &SpatialMap,
        class: RouteClass,
        direction: Direction,
    ) -> Distance {
        if map.is_invalid() {
            return Distance::UNKNOWN;
        }

        let destination = map.neighbor(map.location(), direction);
        match map.tile(destination) {
            Some(tile) if tile.satisfies(class) => Distance::ZERO,
            Some(_) => self.distance(map, class, destination),
            None => Distance::UNKNOWN,
        }
    }

    /// First step of the shortest known route from the agent to `class`.
    pub fn next_step(&mut self, map: &SpatialMap, class: RouteClass) -> Option<Direction> {
        self.route(map, class, map.location())
            .and_then(|route| route.direction())
    }
}
