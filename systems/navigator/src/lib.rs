#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Phase-driven navigation engine that solves one maze attempt at a time.
//!
//! The [`Navigator`] owns the oracle connection and, per attempt, a fresh
//! spatial map, route cache and set of breadcrumb trails. Each loop iteration
//! either performs the current phase's action (collecting or exiting) or picks
//! a move through the phase [`Policy`] and its fallbacks, then folds the
//! oracle's answer back into the map.

mod config;

use maze_explorer_core::{
    Coord, Direction, MazeInfo, MoveOracle, Observation, OracleError, Phase, RouteClass,
};
use maze_explorer_map::{RouteCache, SpatialMap};
use maze_explorer_system_breadcrumbs::{Trail, Trails};
use maze_explorer_system_policy::{CandidateFacts, Criterion, Policy};
use tracing::{debug, info, warn};

pub use config::{ConfigError, NavigatorConfig};

/// Failures that end a maze attempt.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// An oracle request kept failing.
    #[error("{request} request failed after {attempts} attempts")]
    Oracle {
        /// Request that failed.
        request: &'static str,
        /// Attempts made, including the first.
        attempts: u32,
        /// Error returned by the final attempt.
        #[source]
        source: OracleError,
    },
    /// Neither the policy nor any fallback produced a move.
    #[error("no move available during the {phase} phase at {location}")]
    Stuck {
        /// Phase the engine was in.
        phase: Phase,
        /// Agent location in map coordinates.
        location: Coord,
    },
    /// The configured number of moves was spent without leaving the maze.
    #[error("move budget exhausted after {moves} moves")]
    MoveBudgetExhausted {
        /// Moves made during the attempt.
        moves: u32,
    },
}

/// Result of a completed maze attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeOutcome {
    /// Name of the maze.
    pub maze: String,
    /// Successful moves.
    pub moves: u32,
    /// Successful collect requests.
    pub collections: u32,
    /// Score banked when the maze was left.
    pub score_in_bag: u32,
    /// Whether the map detected contradicting observations.
    pub map_invalidated: bool,
    /// Portals resolved by the map.
    pub portals: usize,
}

/// How the engine picked a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The phase policy had routes or new ground to act on.
    Policy,
    /// Stepped back along the shortest breadcrumb trail of the phase.
    Trail,
    /// Best unvisited candidate, ignoring routes.
    Unvisited,
    /// Retraced the previous move.
    Backtrack,
}

/// Snapshot handed to a [`NavigationObserver`] after every state change.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Name of the maze being solved.
    pub maze: &'a str,
    /// Current phase.
    pub phase: Phase,
    /// Map as of this frame.
    pub map: &'a SpatialMap,
    /// Latest oracle observation.
    pub observation: &'a Observation,
    /// Moves made so far.
    pub moves: u32,
    /// How the latest move was picked, when the frame follows a move.
    pub decision: Option<Decision>,
}

/// Receives a [`Frame`] after entering, moving, collecting and exiting.
pub trait NavigationObserver {
    /// Inspects the engine state.
    fn observe(&mut self, frame: &Frame<'_>);
}

/// Engine driving maze attempts through a [`MoveOracle`].
pub struct Navigator<O> {
    oracle: O,
    config: NavigatorConfig,
    observer: Option<Box<dyn NavigationObserver>>,
}

impl<O: MoveOracle> Navigator<O> {
    /// Creates a navigator with the default configuration.
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, NavigatorConfig::default())
    }

    /// Creates a navigator with explicit limits.
    pub fn with_config(oracle: O, config: NavigatorConfig) -> Self {
        Self {
            oracle,
            config,
            observer: None,
        }
    }

    /// Installs an observer notified after every state change.
    #[must_use]
    pub fn with_observer(mut self, observer: impl NavigationObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Limits applied to each attempt.
    #[must_use]
    pub const fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Oracle the navigator talks to.
    #[must_use]
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Releases the oracle.
    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Enters `maze`, gathers its reward, banks it and leaves through an exit.
    pub fn run(&mut self, maze: &MazeInfo) -> Result<MazeOutcome, NavigationError> {
        info!(
            maze = %maze.name,
            tiles = maze.total_tiles,
            potential = maze.potential_reward,
            "entering maze"
        );
        let observation = self.request("enter", |oracle| oracle.enter(&maze.name))?;
        let mut attempt = Attempt::new(observation);
        self.notify(&maze.name, &attempt, None);

        loop {
            attempt.settle_phase(maze);

            match attempt.phase {
                Phase::Bank if attempt.observation.can_collect_score_here => {
                    let observation = self.request("collect", |oracle| oracle.collect())?;
                    attempt.collected(observation);
                    self.notify(&maze.name, &attempt, None);
                    continue;
                }
                Phase::Exit if attempt.observation.can_exit_maze_here => {
                    self.request("exit", |oracle| oracle.exit())?;
                    attempt.phase = Phase::Done;
                    info!(maze = %maze.name, moves = attempt.moves, "left maze");
                    self.notify(&maze.name, &attempt, None);
                    break;
                }
                _ => {}
            }

            if attempt.moves >= self.config.move_budget {
                warn!(maze = %maze.name, moves = attempt.moves, "move budget exhausted");
                return Err(NavigationError::MoveBudgetExhausted {
                    moves: attempt.moves,
                });
            }

            let (direction, decision) = attempt.decide()?;
            let observation = self.request("move", |oracle| oracle.move_to(direction))?;
            attempt.advance(direction, observation);
            self.notify(&maze.name, &attempt, Some(decision));
        }

        Ok(attempt.outcome(&maze.name))
    }

    /// Issues `call` until it succeeds or the attempt limit is reached.
    fn request<T>(
        &mut self,
        request: &'static str,
        mut call: impl FnMut(&mut O) -> Result<T, OracleError>,
    ) -> Result<T, NavigationError> {
        let attempts = self.config.max_oracle_attempts.max(1);
        let mut attempt = 1;

        loop {
            match call(&mut self.oracle) {
                Ok(value) => return Ok(value),
                Err(source) if attempt < attempts => {
                    warn!(request, attempt, attempts, error = %source, "oracle request failed; retrying");
                    attempt += 1;
                }
                Err(source) => {
                    warn!(request, attempts, error = %source, "oracle request failed; giving up");
                    return Err(NavigationError::Oracle {
                        request,
                        attempts,
                        source,
                    });
                }
            }
        }
    }

    fn notify(&mut self, maze: &str, attempt: &Attempt, decision: Option<Decision>) {
        if let Some(observer) = self.observer.as_mut() {
            observer.observe(&Frame {
                maze,
                phase: attempt.phase,
                map: &attempt.map,
                observation: &attempt.observation,
                moves: attempt.moves,
                decision,
            });
        }
    }
}

/// Private state of a single maze attempt.
struct Attempt {
    map: SpatialMap,
    routes: RouteCache,
    trails: Trails,
    phase: Phase,
    observation: Observation,
    last_direction: Option<Direction>,
    moves: u32,
    collections: u32,
}

impl Attempt {
    fn new(observation: Observation) -> Self {
        let mut attempt = Self {
            map: SpatialMap::new(),
            routes: RouteCache::new(),
            trails: Trails::new(),
            phase: Phase::Gather,
            observation: Observation::default(),
            last_direction: None,
            moves: 0,
            collections: 0,
        };
        attempt.absorb(observation);
        attempt
    }

    fn absorb(&mut self, observation: Observation) {
        let changes = self.map.register(&observation);
        self.routes.notify(changes);
        self.trails.track(&observation);
        self.observation = observation;
    }

    fn advance(&mut self, direction: Direction, observation: Observation) {
        self.map.move_to(direction);
        self.trails.record_move(direction);
        self.last_direction = Some(direction);
        self.moves += 1;
        self.absorb(observation);
    }

    fn collected(&mut self, observation: Observation) {
        self.collections += 1;
        info!(
            bag = observation.current_score_in_bag,
            location = %self.map.location(),
            "banked score"
        );
        self.absorb(observation);
    }

    /// Applies every phase transition the latest observation allows.
    fn settle_phase(&mut self, maze: &MazeInfo) {
        loop {
            let next = match self.phase {
                Phase::Gather if self.observation.total_score() >= maze.potential_reward => {
                    Phase::Bank
                }
                Phase::Bank if self.observation.current_score_in_hand == 0 => Phase::Exit,
                _ => return,
            };
            info!(
                maze = %maze.name,
                from = %self.phase,
                to = %next,
                moves = self.moves,
                "phase transition"
            );
            self.phase = next;
        }
    }

    fn candidates(&mut self, policy: Policy) -> Vec<CandidateFacts> {
        let classes: Vec<RouteClass> = policy.required_classes().collect();
        let islands = policy.criteria().contains(&Criterion::PreferIslandNeighbor);
        let potential = policy.criteria().contains(&Criterion::MostUnvisitedPotential);

        let mut candidates = Vec::with_capacity(self.observation.possible_move_actions.len());
        for action in &self.observation.possible_move_actions {
            let mut facts = CandidateFacts::new(action);
            for class in &classes {
                let distance = self.routes.distance_via(&self.map, *class, action.direction);
                facts = facts.with_distance(*class, distance);
            }
            if islands {
                facts = facts.with_island_neighbor(self.map.has_island_neighbor(action.direction));
            }
            if potential {
                facts =
                    facts.with_unvisited_potential(self.map.unvisited_potential(action.direction));
            }
            candidates.push(facts);
        }
        candidates
    }

    /// Picks the next move: policy first, then trail, new ground and backtracking.
    fn decide(&mut self) -> Result<(Direction, Decision), NavigationError> {
        let phase = self.phase;
        let location = self.map.location();
        let Some(policy) = Policy::for_phase(phase) else {
            return Err(NavigationError::Stuck { phase, location });
        };

        let candidates = self.candidates(policy);
        if policy.is_informed(&candidates) {
            if let Some(direction) = policy.choose(&candidates, self.last_direction) {
                debug!(%phase, %location, %direction, "policy move");
                return Ok((direction, Decision::Policy));
            }
        }

        if let Some(direction) = self.trail_step() {
            debug!(%phase, %location, %direction, "following breadcrumb trail");
            return Ok((direction, Decision::Trail));
        }

        let unvisited: Vec<CandidateFacts> = candidates
            .iter()
            .copied()
            .filter(|candidate| !candidate.is_visited())
            .collect();
        if let Some(direction) = policy.choose(&unvisited, self.last_direction) {
            debug!(%phase, %location, %direction, "heading for unvisited ground");
            return Ok((direction, Decision::Unvisited));
        }

        if let Some(direction) = self.trails.backtrack().filter(|direction| self.offers(*direction)) {
            debug!(%phase, %location, %direction, "backtracking");
            return Ok((direction, Decision::Backtrack));
        }

        warn!(%phase, %location, "no move available");
        Err(NavigationError::Stuck { phase, location })
    }

    fn trail_step(&self) -> Option<Direction> {
        let class = match self.phase {
            Phase::Bank => RouteClass::CollectionPoint,
            Phase::Exit => RouteClass::Exit,
            Phase::Gather | Phase::Done => return None,
        };
        self.trails
            .shortest(class)
            .and_then(Trail::next_step)
            .filter(|direction| self.offers(*direction))
    }

    fn offers(&self, direction: Direction) -> bool {
        self.observation.move_action(direction).is_some()
    }

    fn outcome(&self, maze: &str) -> MazeOutcome {
        MazeOutcome {
            maze: maze.to_owned(),
            moves: self.moves,
            collections: self.collections,
            score_in_bag: self.observation.current_score_in_bag,
            map_invalidated: self.map.is_invalid(),
            portals: self.map.portal_count(),
        }
    }
}
