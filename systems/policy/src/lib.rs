#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic move selection expressed as ordered lists of criteria.
//!
//! Each phase owns a [`Policy`]: a slice of [`Criterion`] values compared
//! lexicographically, followed by a fixed direction order that breaks any
//! remaining tie. Policies only see [`CandidateFacts`], so they can be tested
//! without a map or an oracle.

use std::cmp::Ordering;

use maze_explorer_core::{Direction, Distance, MoveAction, Phase, RouteClass};

/// What the navigator knows about one move candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateFacts {
    direction: Direction,
    visited: bool,
    reward: u32,
    distances: [Distance; 4],
    island_neighbor: bool,
    unvisited_potential: u8,
}

impl CandidateFacts {
    /// Facts reported by the service; map-derived facts start out unknown.
    #[must_use]
    pub const fn new(action: &MoveAction) -> Self {
        Self {
            direction: action.direction,
            visited: action.has_been_visited,
            reward: action.reward_on_destination,
            distances: [Distance::UNKNOWN; 4],
            island_neighbor: false,
            unvisited_potential: 0,
        }
    }

    /// Records the distance from the destination to `class`.
    #[must_use]
    pub fn with_distance(mut self, class: RouteClass, distance: Distance) -> Self {
        self.distances[class.index()] = distance;
        self
    }

    /// Records whether the destination borders an isolated unknown pocket.
    #[must_use]
    pub const fn with_island_neighbor(mut self, island_neighbor: bool) -> Self {
        self.island_neighbor = island_neighbor;
        self
    }

    /// Records how much unknown ground surrounds the destination.
    #[must_use]
    pub const fn with_unvisited_potential(mut self, potential: u8) -> Self {
        self.unvisited_potential = potential;
        self
    }

    /// Direction of the move.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the destination was visited before.
    #[must_use]
    pub const fn is_visited(&self) -> bool {
        self.visited
    }

    /// Reward picked up by entering the destination.
    #[must_use]
    pub const fn reward(&self) -> u32 {
        self.reward
    }

    /// Distance from the destination to `class`.
    #[must_use]
    pub const fn distance(&self, class: RouteClass) -> Distance {
        self.distances[class.index()]
    }
}

/// A single comparison key; smaller keys win.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Criterion {
    /// Unvisited destinations before visited ones.
    PreferUnvisited,
    /// Destinations carrying reward before empty ones.
    PreferReward,
    /// Shortest known distance to the class.
    Nearest(RouteClass),
    /// Destinations next to an isolated unknown pocket; reward counts as one.
    PreferIslandNeighbor,
    /// Most unknown tiles around the destination; reward scores nothing.
    MostUnvisitedPotential,
    /// Turn left when possible, then straight, right and back.
    HugLeftWall,
    /// Turn right when possible, then straight, left and back.
    HugRightWall,
}

impl Criterion {
    /// Comparison key of `candidate` given the previous move.
    #[must_use]
    pub fn key(self, candidate: &CandidateFacts, last: Option<Direction>) -> u32 {
        match self {
            Self::PreferUnvisited => u32::from(candidate.visited),
            Self::PreferReward => u32::from(candidate.reward == 0),
            Self::Nearest(class) => candidate.distance(class).key(),
            Self::PreferIslandNeighbor => {
                u32::from(candidate.reward == 0 && !candidate.island_neighbor)
            }
            Self::MostUnvisitedPotential => {
                let potential = if candidate.reward == 0 {
                    u32::from(candidate.unvisited_potential)
                } else {
                    0
                };
                u32::from(u8::MAX) - potential
            }
            Self::HugLeftWall => last.map_or(0, |last| {
                (5 + u32::from(candidate.direction.index()) - u32::from(last.index())) % 4
            }),
            Self::HugRightWall => last.map_or(0, |last| {
                (5 + u32::from(last.index()) - u32::from(candidate.direction.index())) % 4
            }),
        }
    }
}

const GATHER_CRITERIA: &[Criterion] = &[
    Criterion::PreferUnvisited,
    Criterion::PreferReward,
    Criterion::Nearest(RouteClass::Reward),
    Criterion::Nearest(RouteClass::Frontier),
    Criterion::PreferIslandNeighbor,
    Criterion::MostUnvisitedPotential,
    Criterion::HugLeftWall,
];

const BANK_CRITERIA: &[Criterion] = &[
    Criterion::Nearest(RouteClass::CollectionPoint),
    Criterion::Nearest(RouteClass::Frontier),
    Criterion::HugRightWall,
];

const EXIT_CRITERIA: &[Criterion] = &[
    Criterion::Nearest(RouteClass::Exit),
    Criterion::Nearest(RouteClass::Frontier),
    Criterion::HugRightWall,
];

/// Ordered criteria used to pick moves during one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Policy {
    criteria: &'static [Criterion],
}

impl Policy {
    /// Exploration while reward is still missing.
    pub const GATHER: Self = Self { criteria: GATHER_CRITERIA };
    /// Carrying score in hand to a collection point.
    pub const BANK: Self = Self { criteria: BANK_CRITERIA };
    /// Heading for an exit.
    pub const EXIT: Self = Self { criteria: EXIT_CRITERIA };

    /// Policy driving `phase`; finished attempts have none.
    #[must_use]
    pub const fn for_phase(phase: Phase) -> Option<Self> {
        match phase {
            Phase::Gather => Some(Self::GATHER),
            Phase::Bank => Some(Self::BANK),
            Phase::Exit => Some(Self::EXIT),
            Phase::Done => None,
        }
    }

    /// Criteria in comparison order.
    #[must_use]
    pub const fn criteria(&self) -> &'static [Criterion] {
        self.criteria
    }

    /// Route classes whose distances the criteria consult.
    pub fn required_classes(&self) -> impl Iterator<Item = RouteClass> {
        self.criteria.iter().filter_map(|criterion| match criterion {
            Criterion::Nearest(class) => Some(*class),
            _ => None,
        })
    }

    /// Orders two candidates; `Less` means `a` is the better move.
    #[must_use]
    pub fn compare(
        &self,
        a: &CandidateFacts,
        b: &CandidateFacts,
        last: Option<Direction>,
    ) -> Ordering {
        self.criteria
            .iter()
            .map(|criterion| criterion.key(a, last).cmp(&criterion.key(b, last)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| tie_rank(a.direction).cmp(&tie_rank(b.direction)))
    }

    /// Best candidate, or `None` when there is nothing to choose from.
    #[must_use]
    pub fn choose(&self, candidates: &[CandidateFacts], last: Option<Direction>) -> Option<Direction> {
        candidates
            .iter()
            .min_by(|a, b| self.compare(a, b, last))
            .map(CandidateFacts::direction)
    }

    /// Whether the criteria have real information to act on.
    ///
    /// A choice is informed when some candidate has a known distance for one
    /// of the consulted classes or, for policies preferring unvisited ground,
    /// when some candidate leads somewhere new.
    #[must_use]
    pub fn is_informed(&self, candidates: &[CandidateFacts]) -> bool {
        let explores = self.criteria.contains(&Criterion::PreferUnvisited);
        candidates.iter().any(|candidate| {
            (explores && !candidate.visited)
                || self
                    .required_classes()
                    .any(|class| candidate.distance(class).is_known())
        })
    }
}

/// Final tie-break: Left, Down, Right, Up.
const fn tie_rank(direction: Direction) -> u8 {
    3 - direction.index()
}
