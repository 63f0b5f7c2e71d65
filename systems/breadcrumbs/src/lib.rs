#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadcrumb trails recording literal paths back to points of interest.
//!
//! Trails need no map at all: they keep working after the spatial map has
//! been invalidated and serve as the navigator's fallback routes.

use maze_explorer_core::{Direction, Observation, RouteClass};
use tracing::debug;

/// Stack of moves leading away from a point of interest.
///
/// Replaying the reversed moves from the top walks back to the point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trail {
    steps: Vec<Direction>,
}

impl Trail {
    /// Creates an empty trail anchored at the agent's tile.
    #[must_use]
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Trail to a neighbour that lies toward `direction`.
    #[must_use]
    pub fn toward(direction: Direction) -> Self {
        Self {
            steps: vec![direction.reversed()],
        }
    }

    /// Records a successful move, cancelling an immediate return.
    pub fn push(&mut self, direction: Direction) {
        if self.steps.last() == Some(&direction.reversed()) {
            let _ = self.steps.pop();
        } else {
            self.steps.push(direction);
        }
    }

    /// Number of steps back to the point.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the agent stands on the point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Next step back toward the point.
    #[must_use]
    pub fn next_step(&self) -> Option<Direction> {
        self.steps.last().map(|direction| direction.reversed())
    }
}

/// Every trail kept during one maze attempt.
#[derive(Clone, Debug, Default)]
pub struct Trails {
    exits: Vec<Trail>,
    collection_points: Vec<Trail>,
    crawl: Trail,
}

impl Trails {
    /// Creates an empty set of trails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts trails toward exits and collection points adjacent to the agent.
    pub fn track(&mut self, observation: &Observation) {
        for action in &observation.possible_move_actions {
            if action.allows_exit {
                Self::start(&mut self.exits, action.direction, RouteClass::Exit);
            }
            if action.allows_score_collection {
                Self::start(
                    &mut self.collection_points,
                    action.direction,
                    RouteClass::CollectionPoint,
                );
            }
        }
    }

    fn start(trails: &mut Vec<Trail>, direction: Direction, class: RouteClass) {
        let trail = Trail::toward(direction);
        if trails.contains(&trail) {
            return;
        }
        debug!(%class, %direction, known = trails.len(), "breadcrumb trail started");
        trails.push(trail);
    }

    /// Records a successful move on every trail.
    pub fn record_move(&mut self, direction: Direction) {
        self.exits
            .iter_mut()
            .chain(self.collection_points.iter_mut())
            .chain(std::iter::once(&mut self.crawl))
            .for_each(|trail| trail.push(direction));
    }

    /// Shortest trail toward `class`; the earliest discovered wins ties.
    ///
    /// Only exits and collection points leave trails.
    #[must_use]
    pub fn shortest(&self, class: RouteClass) -> Option<&Trail> {
        let trails = match class {
            RouteClass::Exit => &self.exits,
            RouteClass::CollectionPoint => &self.collection_points,
            RouteClass::Reward | RouteClass::Frontier => return None,
        };
        trails
            .iter()
            .filter(|trail| !trail.is_empty())
            .min_by_key(|trail| trail.len())
    }

    /// Step retracing the agent's path one move back.
    #[must_use]
    pub fn backtrack(&self) -> Option<Direction> {
        self.crawl.next_step()
    }

    /// Path the agent walked since entering the maze, with dead ends folded away.
    #[must_use]
    pub const fn crawl(&self) -> &Trail {
        &self.crawl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_explorer_core::MoveAction;

    fn observation(actions: &[(Direction, bool, bool)]) -> Observation {
        Observation {
            possible_move_actions: actions
                .iter()
                .map(|(direction, exit, collect)| MoveAction {
                    direction: *direction,
                    has_been_visited: false,
                    allows_exit: *exit,
                    allows_score_collection: *collect,
                    reward_on_destination: 0,
                })
                .collect(),
            ..Observation::default()
        }
    }

    #[test]
    fn pushing_then_reversing_restores_the_trail() {
        for first in Direction::ALL {
            for second in Direction::ALL {
                let mut trail = Trail::new();
                trail.push(first);
                let before = trail.clone();

                trail.push(second);
                trail.push(second.reversed());

                assert_eq!(trail, before, "{first} then {second}");
            }
        }
    }

    #[test]
    fn trail_leads_back_to_adjacent_point() {
        let mut trails = Trails::new();
        trails.track(&observation(&[(Direction::Up, true, false)]));

        let trail = trails.shortest(RouteClass::Exit).expect("exit trail");
        assert_eq!(trail.next_step(), Some(Direction::Up));

        trails.record_move(Direction::Right);
        trails.record_move(Direction::Right);
        let trail = trails.shortest(RouteClass::Exit).expect("exit trail");
        assert_eq!(trail.len(), 3);
        assert_eq!(trail.next_step(), Some(Direction::Left));
        assert_eq!(trails.backtrack(), Some(Direction::Left));
    }

    #[test]
    fn crawl_folds_dead_ends_away() {
        let mut trails = Trails::new();
        for direction in [Direction::Right, Direction::Up, Direction::Down, Direction::Right] {
            trails.record_move(direction);
        }

        assert_eq!(trails.crawl().len(), 2);
        assert_eq!(trails.backtrack(), Some(Direction::Left));

        trails.record_move(Direction::Left);
        trails.record_move(Direction::Left);
        assert!(trails.crawl().is_empty());
        assert_eq!(trails.backtrack(), None);
    }

    #[test]
    fn identical_trails_are_not_duplicated() {
        let mut trails = Trails::new();
        let report = observation(&[(Direction::Left, false, true)]);
        trails.track(&report);
        trails.track(&report);
        trails.record_move(Direction::Down);
        trails.record_move(Direction::Up);
        trails.track(&report);

        assert_eq!(trails.collection_points.len(), 1);
        assert!(trails.shortest(RouteClass::Exit).is_none());
    }

    #[test]
    fn shortest_prefers_earliest_on_ties_and_skips_reached_points() {
        let mut trails = Trails::new();
        trails.track(&observation(&[
            (Direction::Up, true, false),
            (Direction::Down, true, false),
        ]));
        let first = trails.shortest(RouteClass::Exit).expect("exit trail");
        assert_eq!(first.next_step(), Some(Direction::Up));

        trails.record_move(Direction::Up);
        let remaining = trails.shortest(RouteClass::Exit).expect("exit trail");
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining.next_step(), Some(Direction::Down));
    }
}
