//! Per-coordinate records stored inside the spatial map.

use maze_explorer_core::{Coord, Exits, MoveAction, Observation, RouteClass};

/// Everything the agent knows about a single maze tile.
///
/// Visited tiles were stood on and carry the full exit set reported by the
/// service. Tentative tiles were only described by a neighbour, so their exit
/// set holds just the passages seen so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    is_exit: bool,
    is_collection_point: bool,
    is_visited: bool,
    has_reward: bool,
    exits: Exits,
}

impl Tile {
    /// Captures the ground truth for the tile under the agent.
    pub(crate) fn observed(observation: &Observation) -> Self {
        Self {
            is_exit: observation.can_exit_maze_here,
            is_collection_point: observation.can_collect_score_here,
            is_visited: true,
            has_reward: false,
            exits: observation.exits(),
        }
    }

    /// Captures what a move candidate reveals about its destination.
    pub(crate) fn reported(action: &MoveAction) -> Self {
        Self {
            is_exit: action.allows_exit,
            is_collection_point: action.allows_score_collection,
            is_visited: false,
            has_reward: action.reward_on_destination > 0,
            exits: Exits::of(action.direction.reversed()),
        }
    }

    /// Whether the maze can be exited from this tile.
    #[must_use]
    pub const fn is_exit(&self) -> bool {
        self.is_exit
    }

    /// Whether score can be banked on this tile.
    #[must_use]
    pub const fn is_collection_point(&self) -> bool {
        self.is_collection_point
    }

    /// Whether the agent has stood on this tile.
    #[must_use]
    pub const fn is_visited(&self) -> bool {
        self.is_visited
    }

    /// Whether stepping onto this tile is known to yield reward.
    #[must_use]
    pub const fn has_reward(&self) -> bool {
        self.has_reward
    }

    /// Passages known to leave this tile.
    #[must_use]
    pub const fn exits(&self) -> Exits {
        self.exits
    }

    /// Reports whether the tile is a target of the provided route class.
    #[must_use]
    pub const fn satisfies(&self, class: RouteClass) -> bool {
        match class {
            RouteClass::Exit => self.is_exit,
            RouteClass::CollectionPoint => self.is_collection_point,
            RouteClass::Reward => self.has_reward,
            RouteClass::Frontier => !self.is_visited,
        }
    }

    /// Reports whether the immutable flags match another description.
    pub(crate) const fn agrees_with(&self, is_exit: bool, is_collection_point: bool) -> bool {
        self.is_exit == is_exit && self.is_collection_point == is_collection_point
    }

    pub(crate) fn with_exits(self, exits: Exits) -> Self {
        Self { exits, ..self }
    }

    pub(crate) fn with_reward(self, has_reward: bool) -> Self {
        Self { has_reward, ..self }
    }
}

/// Content stored for one map coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// A tile record owned by this coordinate.
    Tile(Tile),
    /// A portal entrance that stands for the tile at another coordinate.
    Alias(Coord),
}

impl Slot {
    /// Tile stored directly in the slot, ignoring aliases.
    #[must_use]
    pub const fn tile(&self) -> Option<&Tile> {
        match self {
            Self::Tile(tile) => Some(tile),
            Self::Alias(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Tile;
    use maze_explorer_core::{Direction, MoveAction, Observation, RouteClass};

    fn action(direction: Direction, reward: u32) -> MoveAction {
        MoveAction {
            direction,
            has_been_visited: false,
            allows_exit: false,
            allows_score_collection: true,
            reward_on_destination: reward,
        }
    }

    #[test]
    fn reported_tile_knows_the_way_back() {
        let tile = Tile::reported(&action(Direction::Right, 3));
        assert!(!tile.is_visited());
        assert!(tile.has_reward());
        assert!(tile.exits().allows(Direction::Left));
        assert_eq!(tile.exits().directions().count(), 1);
        assert!(tile.satisfies(RouteClass::Frontier));
        assert!(tile.satisfies(RouteClass::CollectionPoint));
        assert!(!tile.satisfies(RouteClass::Exit));
    }

    #[test]
    fn observed_tile_holds_every_offered_exit() {
        let observation = Observation {
            can_exit_maze_here: true,
            possible_move_actions: vec![action(Direction::Up, 0), action(Direction::Down, 0)],
            ..Observation::default()
        };
        let tile = Tile::observed(&observation);
        assert!(tile.is_visited());
        assert!(!tile.has_reward());
        assert!(tile.satisfies(RouteClass::Exit));
        assert!(!tile.satisfies(RouteClass::Frontier));
        assert_eq!(tile.exits(), observation.exits());
    }
}
