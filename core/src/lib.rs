#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Explorer engine.
//!
//! This crate defines the vocabulary that connects the oracle adapters, the
//! spatial map, and the pure navigation systems. Adapters implement
//! [`MoveOracle`] and answer every request with an [`Observation`] of the
//! tile the agent stands on. The map folds observations into its picture of
//! the maze, the route cache derives [`Distance`] values per [`RouteClass`],
//! and the navigator turns those into the next [`Direction`] to request.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Cardinal movement directions understood by the maze service.
///
/// Variants are declared clockwise starting at `Up`; [`Direction::index`]
/// exposes that order for rotation arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing `y`.
    Up,
    /// Movement toward increasing `x`.
    Right,
    /// Movement toward decreasing `y`.
    Down,
    /// Movement toward decreasing `x`.
    Left,
}

impl Direction {
    /// Every direction in clockwise order starting at [`Direction::Up`].
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Direction that undoes a step taken in `self`.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Clockwise position of the direction, `Up` being zero.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Offset applied to a coordinate when stepping in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Right => (1, 0),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        };
        f.write_str(name)
    }
}

/// Location of a maze tile relative to the tile where the agent entered.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    /// Coordinate assigned to the tile the agent enters the maze on.
    pub const ORIGIN: Coord = Coord::new(0, 0);

    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component, growing to the right.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component, growing upward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Coordinate reached by taking a single step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbours in [`Direction::ALL`] order.
    #[must_use]
    pub const fn neighbors(self) -> [Coord; 4] {
        [
            self.step(Direction::Up),
            self.step(Direction::Right),
            self.step(Direction::Down),
            self.step(Direction::Left),
        ]
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

bitflags! {
    /// Set of directions that can be taken out of a tile.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Exits: u8 {
        /// A step toward increasing `y` is possible.
        const UP = 1 << 0;
        /// A step toward increasing `x` is possible.
        const RIGHT = 1 << 1;
        /// A step toward decreasing `y` is possible.
        const DOWN = 1 << 2;
        /// A step toward decreasing `x` is possible.
        const LEFT = 1 << 3;
    }
}

impl Exits {
    /// Set containing only `direction`.
    #[must_use]
    pub const fn of(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::UP,
            Direction::Right => Self::RIGHT,
            Direction::Down => Self::DOWN,
            Direction::Left => Self::LEFT,
        }
    }

    /// Reports whether `direction` belongs to the set.
    #[must_use]
    pub const fn allows(self, direction: Direction) -> bool {
        self.contains(Self::of(direction))
    }

    /// Iterates the contained directions in [`Direction::ALL`] order.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.allows(*direction))
    }
}

impl FromIterator<Direction> for Exits {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Exits::empty(), |exits, direction| exits | Exits::of(direction))
    }
}

/// A single move the service offers from the agent's current tile.
///
/// Everything except `direction` describes the *destination* tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveAction {
    /// Direction of travel for the move.
    pub direction: Direction,
    /// Whether the agent already stood on the destination during this attempt.
    pub has_been_visited: bool,
    /// Whether the maze can be exited from the destination.
    pub allows_exit: bool,
    /// Whether score in hand can be banked on the destination.
    pub allows_score_collection: bool,
    /// Reward picked up by stepping onto the destination.
    pub reward_on_destination: u32,
}

/// Everything the service reports about the tile the agent stands on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Reward collected but not yet banked.
    pub current_score_in_hand: u32,
    /// Reward already banked at a collection point.
    pub current_score_in_bag: u32,
    /// Whether the current tile is a collection point.
    pub can_collect_score_here: bool,
    /// Whether the current tile is an exit.
    pub can_exit_maze_here: bool,
    /// Moves available from the current tile.
    pub possible_move_actions: Vec<MoveAction>,
}

impl Observation {
    /// Combined reward in hand and in the bag.
    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.current_score_in_hand
            .saturating_add(self.current_score_in_bag)
    }

    /// Directions of every offered move.
    #[must_use]
    pub fn exits(&self) -> Exits {
        self.possible_move_actions
            .iter()
            .map(|action| action.direction)
            .collect()
    }

    /// Looks up the offered move in `direction`, if any.
    #[must_use]
    pub fn move_action(&self, direction: Direction) -> Option<&MoveAction> {
        self.possible_move_actions
            .iter()
            .find(|action| action.direction == direction)
    }
}

/// Summary of a maze the service offers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MazeInfo {
    /// Name used to enter the maze.
    pub name: String,
    /// Number of reachable tiles in the maze.
    pub total_tiles: u32,
    /// Sum of every reward that can be collected.
    pub potential_reward: u32,
}

/// Classes of points of interest a route can lead to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteClass {
    /// Tiles from which the maze can be exited.
    Exit,
    /// Tiles on which score in hand can be banked.
    CollectionPoint,
    /// Tiles still carrying an uncollected reward.
    Reward,
    /// Known tiles that have not been stood on yet.
    Frontier,
}

impl RouteClass {
    /// Every route class in declaration order.
    pub const ALL: [RouteClass; 4] = [
        RouteClass::Exit,
        RouteClass::CollectionPoint,
        RouteClass::Reward,
        RouteClass::Frontier,
    ];

    /// Dense index of the class, usable for per-class arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Exit => 0,
            Self::CollectionPoint => 1,
            Self::Reward => 2,
            Self::Frontier => 3,
        }
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exit => "exit",
            Self::CollectionPoint => "collection point",
            Self::Reward => "reward",
            Self::Frontier => "frontier",
        };
        f.write_str(name)
    }
}

/// Number of steps along known passages, or [`Distance::UNKNOWN`].
///
/// Unknown orders after every known distance so that minimising comparisons
/// naturally push unroutable candidates to the back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Distance(u32);

impl Distance {
    /// Sentinel reported when no route is known.
    pub const UNKNOWN: Distance = Distance(u32::MAX);
    /// Distance of a tile that already satisfies the route class.
    pub const ZERO: Distance = Distance(0);

    /// Wraps a known step count, saturating just below the sentinel.
    #[must_use]
    pub const fn new(steps: u32) -> Self {
        if steps == u32::MAX {
            Self(u32::MAX - 1)
        } else {
            Self(steps)
        }
    }

    /// Reports whether a route is known.
    #[must_use]
    pub const fn is_known(self) -> bool {
        self.0 != u32::MAX
    }

    /// Number of steps, if known.
    #[must_use]
    pub const fn steps(self) -> Option<u32> {
        if self.is_known() {
            Some(self.0)
        } else {
            None
        }
    }

    /// Raw comparison key; unknown maps to `u32::MAX`.
    #[must_use]
    pub const fn key(self) -> u32 {
        self.0
    }

    /// Distance one step further away; unknown stays unknown.
    #[must_use]
    pub const fn successor(self) -> Self {
        if self.is_known() {
            Self::new(self.0 + 1)
        } else {
            self
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.steps() {
            Some(steps) => write!(f, "{steps}"),
            None => f.write_str("unknown"),
        }
    }
}

/// Mission phases the navigator moves through during a maze attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Exploring until enough reward is held or banked.
    Gather,
    /// Carrying score in hand to a collection point.
    Bank,
    /// Heading for an exit.
    Exit,
    /// The maze was exited.
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gather => "gather",
            Self::Bank => "bank",
            Self::Exit => "exit",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Failures reported by a [`MoveOracle`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The request did not reach the service or no answer came back.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The service refused the request in the current state.
    #[error("request rejected: {0}")]
    Rejected(String),
    /// No maze with the provided name is offered.
    #[error("unknown maze `{0}`")]
    UnknownMaze(String),
}

/// Move/observe interface of the maze service.
///
/// Every call is a blocking round trip. Implementations answer successful
/// requests with the observation of the tile the agent stands on afterward.
pub trait MoveOracle {
    /// Begins an attempt on the named maze.
    fn enter(&mut self, maze: &str) -> Result<Observation, OracleError>;

    /// Attempts a single step.
    fn move_to(&mut self, direction: Direction) -> Result<Observation, OracleError>;

    /// Banks the score in hand; valid only on a collection point.
    fn collect(&mut self) -> Result<Observation, OracleError>;

    /// Leaves the maze; valid only on an exit. Ends the attempt.
    fn exit(&mut self) -> Result<(), OracleError>;
}

impl<O: MoveOracle + ?Sized> MoveOracle for &mut O {
    fn enter(&mut self, maze: &str) -> Result<Observation, OracleError> {
        (**self).enter(maze)
    }

    fn move_to(&mut self, direction: Direction) -> Result<Observation, OracleError> {
        (**self).move_to(direction)
    }

    fn collect(&mut self) -> Result<Observation, OracleError> {
        (**self).collect()
    }

    fn exit(&mut self) -> Result<(), OracleError> {
        (**self).exit()
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, Direction, Distance, Exits, Observation};

    #[test]
    fn reversal_is_an_involution() {
        for direction in Direction::ALL {
            assert_ne!(direction.reversed(), direction);
            assert_eq!(direction.reversed().reversed(), direction);
        }
    }

    #[test]
    fn stepping_back_returns_to_origin() {
        let origin = Coord::new(3, -2);
        for direction in Direction::ALL {
            let moved = origin.step(direction);
            assert_eq!(origin.manhattan_distance(moved), 1);
            assert_eq!(moved.step(direction.reversed()), origin);
        }
    }

    #[test]
    fn up_increases_y() {
        assert_eq!(Coord::ORIGIN.step(Direction::Up), Coord::new(0, 1));
        assert_eq!(Coord::ORIGIN.step(Direction::Left), Coord::new(-1, 0));
    }

    #[test]
    fn exits_collect_directions() {
        let exits: Exits = [Direction::Left, Direction::Up].into_iter().collect();
        assert!(exits.allows(Direction::Up));
        assert!(exits.allows(Direction::Left));
        assert!(!exits.allows(Direction::Down));
        assert_eq!(
            exits.directions().collect::<Vec<_>>(),
            vec![Direction::Up, Direction::Left]
        );
    }

    #[test]
    fn unknown_distance_orders_last() {
        assert!(Distance::new(1_000) < Distance::UNKNOWN);
        assert!(!Distance::UNKNOWN.is_known());
        assert_eq!(Distance::UNKNOWN.successor(), Distance::UNKNOWN);
        assert_eq!(Distance::ZERO.successor(), Distance::new(1));
        assert_eq!(Distance::new(u32::MAX).steps(), Some(u32::MAX - 1));
    }

    #[test]
    fn observation_reads_service_wire_format() {
        let payload = r#"{
            "possibleMoveActions": [
                {
                    "direction": "Up",
                    "isStart": false,
                    "allowsExit": true,
                    "allowsScoreCollection": false,
                    "hasBeenVisited": false,
                    "rewardOnDestination": 0
                },
                {
                    "direction": "Left",
                    "isStart": true,
                    "allowsExit": false,
                    "allowsScoreCollection": true,
                    "hasBeenVisited": true,
                    "rewardOnDestination": 5
                }
            ],
            "reward": 0,
            "canCollectScoreHere": false,
            "canExitMazeHere": true,
            "currentScoreInHand": 7,
            "currentScoreInBag": 3
        }"#;

        let observation: Observation = serde_json::from_str(payload).expect("deserialize");

        assert_eq!(observation.total_score(), 10);
        assert!(observation.can_exit_maze_here);
        assert_eq!(
            observation.exits(),
            Exits::of(Direction::Up) | Exits::of(Direction::Left)
        );
        let left = observation
            .move_action(Direction::Left)
            .expect("left move offered");
        assert!(left.has_been_visited);
        assert!(left.allows_score_collection);
        assert_eq!(left.reward_on_destination, 5);
    }
}
