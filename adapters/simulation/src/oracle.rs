//! In-process implementations of the move oracle.

use std::collections::{BTreeMap, BTreeSet};

use maze_explorer_core::{Coord, Direction, MoveAction, MoveOracle, Observation, OracleError};
use tracing::trace;

use crate::layout::{MazeLayout, TileKind};

#[derive(Clone, Debug)]
struct Session {
    maze: String,
    position: Coord,
    visited: BTreeSet<Coord>,
    picked_up: BTreeSet<Coord>,
    hand: u32,
    bag: u32,
}

/// Oracle answering from known layouts, following the maze service rules.
///
/// Rewards are picked up on the first visit, collecting moves the hand into
/// the bag, and exiting ends the attempt.
#[derive(Clone, Debug, Default)]
pub struct SimulatedOracle {
    mazes: BTreeMap<String, MazeLayout>,
    session: Option<Session>,
}

impl SimulatedOracle {
    /// Creates an oracle serving the provided layouts by name.
    #[must_use]
    pub fn new(layouts: impl IntoIterator<Item = MazeLayout>) -> Self {
        Self {
            mazes: layouts
                .into_iter()
                .map(|layout| (layout.name().to_owned(), layout))
                .collect(),
            session: None,
        }
    }

    /// Creates an oracle serving a single layout.
    #[must_use]
    pub fn single(layout: MazeLayout) -> Self {
        Self::new([layout])
    }

    /// Tile the agent stands on in maze coordinates, while an attempt runs.
    #[must_use]
    pub fn position(&self) -> Option<Coord> {
        self.session.as_ref().map(|session| session.position)
    }

    fn active(&mut self) -> Result<(&MazeLayout, &mut Session), OracleError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| OracleError::Rejected("no maze entered".to_owned()))?;
        let layout = self
            .mazes
            .get(&session.maze)
            .ok_or_else(|| OracleError::UnknownMaze(session.maze.clone()))?;
        Ok((layout, session))
    }

    fn observation(&self) -> Result<Observation, OracleError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| OracleError::Rejected("no maze entered".to_owned()))?;
        let layout = self
            .mazes
            .get(&session.maze)
            .ok_or_else(|| OracleError::UnknownMaze(session.maze.clone()))?;
        let here = layout.kind(session.position);

        let possible_move_actions = Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                let destination = layout.destination(session.position, direction)?;
                let kind = layout.kind(destination)?;
                let reward = if session.picked_up.contains(&destination) {
                    0
                } else {
                    layout.reward(destination)
                };
                Some(MoveAction {
                    direction,
                    has_been_visited: session.visited.contains(&destination),
                    allows_exit: kind == TileKind::Exit,
                    allows_score_collection: kind == TileKind::CollectionPoint,
                    reward_on_destination: reward,
                })
            })
            .collect();

        Ok(Observation {
            current_score_in_hand: session.hand,
            current_score_in_bag: session.bag,
            can_collect_score_here: here == Some(TileKind::CollectionPoint),
            can_exit_maze_here: here == Some(TileKind::Exit),
            possible_move_actions,
        })
    }
}

impl MoveOracle for SimulatedOracle {
    fn enter(&mut self, maze: &str) -> Result<Observation, OracleError> {
        if !self.mazes.contains_key(maze) {
            return Err(OracleError::UnknownMaze(maze.to_owned()));
        }

        self.session = Some(Session {
            maze: maze.to_owned(),
            position: Coord::ORIGIN,
            visited: BTreeSet::from([Coord::ORIGIN]),
            picked_up: BTreeSet::new(),
            hand: 0,
            bag: 0,
        });
        trace!(maze, "entered maze");
        self.observation()
    }

    fn move_to(&mut self, direction: Direction) -> Result<Observation, OracleError> {
        let (layout, session) = self.active()?;
        let destination = layout
            .destination(session.position, direction)
            .ok_or_else(|| {
                OracleError::Rejected(format!("no passage {direction} from {}", session.position))
            })?;

        session.position = destination;
        let _ = session.visited.insert(destination);
        if session.picked_up.insert(destination) {
            session.hand = session.hand.saturating_add(layout.reward(destination));
        }
        trace!(%direction, %destination, hand = session.hand, "moved");
        self.observation()
    }

    fn collect(&mut self) -> Result<Observation, OracleError> {
        let (layout, session) = self.active()?;
        if layout.kind(session.position) != Some(TileKind::CollectionPoint) {
            return Err(OracleError::Rejected(format!(
                "{} is not a collection point",
                session.position
            )));
        }

        session.bag = session.bag.saturating_add(session.hand);
        session.hand = 0;
        self.observation()
    }

    fn exit(&mut self) -> Result<(), OracleError> {
        let (layout, session) = self.active()?;
        if layout.kind(session.position) != Some(TileKind::Exit) {
            return Err(OracleError::Rejected(format!(
                "{} is not an exit",
                session.position
            )));
        }

        trace!(maze = %session.maze, bag = session.bag, "left maze");
        self.session = None;
        Ok(())
    }
}

/// Number of requests of each kind forwarded by a [`CountingOracle`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OracleCalls {
    /// Calls to [`MoveOracle::enter`].
    pub enter: u32,
    /// Calls to [`MoveOracle::move_to`].
    pub moves: u32,
    /// Calls to [`MoveOracle::collect`].
    pub collects: u32,
    /// Calls to [`MoveOracle::exit`].
    pub exits: u32,
}

impl OracleCalls {
    /// Sum of every request kind.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.enter + self.moves + self.collects + self.exits
    }
}

/// Decorator counting every request forwarded to the wrapped oracle.
#[derive(Clone, Debug, Default)]
pub struct CountingOracle<O> {
    inner: O,
    calls: OracleCalls,
}

impl<O> CountingOracle<O> {
    /// Wraps `inner` with zeroed counters.
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            calls: OracleCalls::default(),
        }
    }

    /// Counters accumulated so far, failed requests included.
    #[must_use]
    pub const fn calls(&self) -> OracleCalls {
        self.calls
    }

    /// Unwraps the decorated oracle.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: MoveOracle> MoveOracle for CountingOracle<O> {
    fn enter(&mut self, maze: &str) -> Result<Observation, OracleError> {
        self.calls.enter += 1;
        self.inner.enter(maze)
    }

    fn move_to(&mut self, direction: Direction) -> Result<Observation, OracleError> {
        self.calls.moves += 1;
        self.inner.move_to(direction)
    }

    fn collect(&mut self) -> Result<Observation, OracleError> {
        self.calls.collects += 1;
        self.inner.collect()
    }

    fn exit(&mut self) -> Result<(), OracleError> {
        self.calls.exits += 1;
        self.inner.exit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plus() -> MazeLayout {
        MazeLayout::parse("plus", &["#C#", ".S.", "#E#"])
            .and_then(|layout| layout.with_reward(Coord::new(0, 1), 5))
            .expect("valid layout")
    }

    #[test]
    fn entering_reports_neighbours() {
        let mut oracle = SimulatedOracle::single(plus());
        let observation = oracle.enter("plus").expect("maze exists");

        assert_eq!(observation.possible_move_actions.len(), 4);
        let up = observation.move_action(Direction::Up).expect("up is open");
        assert!(up.allows_score_collection);
        assert_eq!(up.reward_on_destination, 5);
        let down = observation.move_action(Direction::Down).expect("down is open");
        assert!(down.allows_exit);
        assert!(!observation.can_exit_maze_here);
    }

    #[test]
    fn rewards_are_picked_up_once_and_banked_on_collection() {
        let mut oracle = SimulatedOracle::single(plus());
        let _ = oracle.enter("plus").expect("maze exists");

        let observation = oracle.move_to(Direction::Up).expect("open passage");
        assert_eq!(observation.current_score_in_hand, 5);
        assert!(observation.can_collect_score_here);

        let observation = oracle.collect().expect("collection point");
        assert_eq!(observation.current_score_in_hand, 0);
        assert_eq!(observation.current_score_in_bag, 5);

        let observation = oracle.move_to(Direction::Down).expect("open passage");
        let up = observation.move_action(Direction::Up).expect("up is open");
        assert!(up.has_been_visited);
        assert_eq!(up.reward_on_destination, 0);

        let observation = oracle.move_to(Direction::Up).expect("open passage");
        assert_eq!(observation.current_score_in_hand, 0);
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let mut oracle = SimulatedOracle::single(plus());
        assert_eq!(
            oracle.enter("missing"),
            Err(OracleError::UnknownMaze("missing".to_owned()))
        );
        assert!(matches!(
            oracle.move_to(Direction::Up),
            Err(OracleError::Rejected(_))
        ));

        let _ = oracle.enter("plus").expect("maze exists");
        assert!(matches!(oracle.collect(), Err(OracleError::Rejected(_))));
        assert!(matches!(oracle.exit(), Err(OracleError::Rejected(_))));

        let _ = oracle.move_to(Direction::Down).expect("open passage");
        assert!(oracle.move_to(Direction::Down).is_err());
        oracle.exit().expect("standing on the exit");
        assert_eq!(oracle.position(), None);
    }

    #[test]
    fn counting_oracle_counts_failures_too() {
        let mut oracle = CountingOracle::new(SimulatedOracle::single(plus()));
        let _ = oracle.enter("plus").expect("maze exists");
        let _ = oracle.move_to(Direction::Left).expect("open passage");
        assert!(oracle.move_to(Direction::Left).is_err());
        assert!(oracle.exit().is_err());

        assert_eq!(
            oracle.calls(),
            OracleCalls {
                enter: 1,
                moves: 2,
                collects: 0,
                exits: 1,
            }
        );
        assert_eq!(oracle.calls().total(), 4);
    }
}
