//! Ground-truth maze descriptions served by the simulated oracle.

use std::collections::BTreeMap;

use maze_explorer_core::{Coord, Direction, MazeInfo};

/// Kind of an open tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TileKind {
    Open,
    Exit,
    CollectionPoint,
}

/// Errors raised while assembling a [`MazeLayout`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The grid contains no `S` glyph.
    #[error("layout has no start tile")]
    MissingStart,
    /// The grid contains more than one `S` glyph.
    #[error("layout has more than one start tile")]
    DuplicateStart,
    /// The grid contains a character outside the layout alphabet.
    #[error("unknown glyph '{glyph}' at row {row}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based row, counted from the top.
        row: usize,
        /// Zero-based column, counted in characters.
        column: usize,
    },
    /// A reward was placed on a wall or on the start tile.
    #[error("reward at {0} is not on an open tile other than the start")]
    InvalidReward(Coord),
    /// A portal endpoint is a wall, its entrance is an ordinary passage, or
    /// one of its ends is already taken by another portal.
    #[error("portal from {from} toward {direction} cannot lead to {to}")]
    InvalidPortal {
        /// Tile the portal leaves from.
        from: Coord,
        /// Direction of travel through the portal.
        direction: Direction,
        /// Tile the portal arrives at.
        to: Coord,
    },
}

/// Grid of open tiles, rewards and portals describing one maze.
///
/// Coordinates are relative to the start tile, with `y` growing upward, so
/// they match what the navigator's map records when no portal is involved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeLayout {
    name: String,
    tiles: BTreeMap<Coord, TileKind>,
    rewards: BTreeMap<Coord, u32>,
    portals: BTreeMap<(Coord, Direction), Coord>,
}

impl MazeLayout {
    /// Parses an ASCII grid given top row first.
    ///
    /// `#` is a wall, `.` an open tile, `S` the start, `E` an exit and `C` a
    /// collection point. Spaces are treated as walls.
    pub fn parse<R>(name: impl Into<String>, rows: &[R]) -> Result<Self, LayoutError>
    where
        R: AsRef<str>,
    {
        let mut start = None;
        let mut cells = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            for (column, glyph) in line.as_ref().chars().enumerate() {
                let kind = match glyph {
                    '#' | ' ' => continue,
                    '.' => TileKind::Open,
                    'E' => TileKind::Exit,
                    'C' => TileKind::CollectionPoint,
                    'S' => {
                        if start.replace((row, column)).is_some() {
                            return Err(LayoutError::DuplicateStart);
                        }
                        TileKind::Open
                    }
                    _ => return Err(LayoutError::UnknownGlyph { glyph, row, column }),
                };
                cells.push((row, column, kind));
            }
        }

        let (start_row, start_column) = start.ok_or(LayoutError::MissingStart)?;
        let tiles = cells
            .into_iter()
            .map(|(row, column, kind)| (grid_coord(start_row, start_column, row, column), kind))
            .collect();

        Ok(Self::from_tiles(name, tiles))
    }

    pub(crate) fn from_tiles(name: impl Into<String>, tiles: BTreeMap<Coord, TileKind>) -> Self {
        Self {
            name: name.into(),
            tiles,
            rewards: BTreeMap::new(),
            portals: BTreeMap::new(),
        }
    }

    /// Places a reward picked up by the first visit to `at`.
    pub fn with_reward(mut self, at: Coord, value: u32) -> Result<Self, LayoutError> {
        if at == Coord::ORIGIN || !self.tiles.contains_key(&at) {
            return Err(LayoutError::InvalidReward(at));
        }
        self.place_reward(at, value);
        Ok(self)
    }

    pub(crate) fn place_reward(&mut self, at: Coord, value: u32) {
        let _ = self.rewards.insert(at, value);
    }

    /// Links `from` toward `direction` to `to`, and `to` back toward `from`.
    ///
    /// The ordinary neighbour of `from` in that direction must be a wall, and
    /// neither end may already lead through another portal.
    pub fn with_portal(
        mut self,
        from: Coord,
        direction: Direction,
        to: Coord,
    ) -> Result<Self, LayoutError> {
        let back = direction.reversed();
        let blocked = !self.tiles.contains_key(&from.step(direction))
            && !self.tiles.contains_key(&to.step(back));
        let taken = self.portals.contains_key(&(from, direction))
            || self.portals.contains_key(&(to, back));
        if !blocked || taken || !self.tiles.contains_key(&from) || !self.tiles.contains_key(&to) {
            return Err(LayoutError::InvalidPortal {
                from,
                direction,
                to,
            });
        }

        let _ = self.portals.insert((from, direction), to);
        let _ = self.portals.insert((to, back), from);
        Ok(self)
    }

    /// Name the maze is entered by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Summary advertised to clients.
    #[must_use]
    pub fn info(&self) -> MazeInfo {
        MazeInfo {
            name: self.name.clone(),
            total_tiles: u32::try_from(self.tiles.len()).unwrap_or(u32::MAX),
            potential_reward: self.rewards.values().sum(),
        }
    }

    /// Tile reached by stepping from `coord` toward `direction`, if passable.
    #[must_use]
    pub fn destination(&self, coord: Coord, direction: Direction) -> Option<Coord> {
        if let Some(target) = self.portals.get(&(coord, direction)) {
            return Some(*target);
        }
        let next = coord.step(direction);
        self.tiles.contains_key(&next).then_some(next)
    }

    /// Reward placed on `coord`, zero when none.
    #[must_use]
    pub fn reward(&self, coord: Coord) -> u32 {
        self.rewards.get(&coord).copied().unwrap_or(0)
    }

    /// Number of portal links, counting each direction once.
    #[must_use]
    pub fn portal_count(&self) -> usize {
        self.portals.len() / 2
    }

    pub(crate) fn kind(&self, coord: Coord) -> Option<TileKind> {
        self.tiles.get(&coord).copied()
    }

    pub(crate) fn open_tiles(&self) -> impl Iterator<Item = Coord> + '_ {
        self.tiles.keys().copied()
    }
}

fn grid_coord(start_row: usize, start_column: usize, row: usize, column: usize) -> Coord {
    let x = signed(column) - signed(start_column);
    let y = signed(start_row) - signed(row);
    Coord::new(x, y)
}

fn signed(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_tile_becomes_origin_with_y_up() {
        let layout = MazeLayout::parse("plus", &["#C#", ".S.", "#E#"]).expect("valid layout");

        assert_eq!(layout.kind(Coord::ORIGIN), Some(TileKind::Open));
        assert_eq!(layout.kind(Coord::new(0, 1)), Some(TileKind::CollectionPoint));
        assert_eq!(layout.kind(Coord::new(0, -1)), Some(TileKind::Exit));
        assert_eq!(layout.kind(Coord::new(1, 1)), None);
        assert_eq!(layout.info().total_tiles, 5);
    }

    #[test]
    fn parse_rejects_bad_grids() {
        assert_eq!(
            MazeLayout::parse("none", &["..."]),
            Err(LayoutError::MissingStart)
        );
        assert_eq!(
            MazeLayout::parse("twice", &["S.S"]),
            Err(LayoutError::DuplicateStart)
        );
        assert_eq!(
            MazeLayout::parse("glyph", &["S.", ".x"]),
            Err(LayoutError::UnknownGlyph {
                glyph: 'x',
                row: 1,
                column: 1
            })
        );
    }

    #[test]
    fn portals_link_both_ways_and_shadow_walls() {
        let layout = MazeLayout::parse("ring", &["S.E"])
            .and_then(|layout| layout.with_portal(Coord::new(2, 0), Direction::Right, Coord::ORIGIN))
            .expect("valid portal");

        assert_eq!(
            layout.destination(Coord::new(2, 0), Direction::Right),
            Some(Coord::ORIGIN)
        );
        assert_eq!(
            layout.destination(Coord::ORIGIN, Direction::Left),
            Some(Coord::new(2, 0))
        );
        assert_eq!(layout.destination(Coord::ORIGIN, Direction::Up), None);
        assert_eq!(layout.portal_count(), 1);
    }

    #[test]
    fn portal_over_open_passage_is_rejected() {
        let result = MazeLayout::parse("corridor", &["S.E"])
            .and_then(|layout| layout.with_portal(Coord::ORIGIN, Direction::Right, Coord::new(2, 0)));

        assert!(matches!(result, Err(LayoutError::InvalidPortal { .. })));
    }

    #[test]
    fn portals_cannot_share_an_endpoint() {
        let layout = MazeLayout::parse("fork", &["S.", "#."])
            .and_then(|layout| layout.with_portal(Coord::new(1, 0), Direction::Right, Coord::ORIGIN))
            .expect("first portal is valid");

        assert_eq!(
            layout
                .clone()
                .with_portal(Coord::new(1, -1), Direction::Right, Coord::ORIGIN),
            Err(LayoutError::InvalidPortal {
                from: Coord::new(1, -1),
                direction: Direction::Right,
                to: Coord::ORIGIN,
            })
        );
        assert!(matches!(
            layout.with_portal(Coord::new(1, 0), Direction::Right, Coord::new(1, -1)),
            Err(LayoutError::InvalidPortal { .. })
        ));
    }

    #[test]
    fn rewards_sum_into_potential() {
        let layout = MazeLayout::parse("corridor", &["S..E"])
            .and_then(|layout| layout.with_reward(Coord::new(1, 0), 3))
            .and_then(|layout| layout.with_reward(Coord::new(2, 0), 4))
            .expect("valid rewards");

        assert_eq!(layout.info().potential_reward, 7);
        assert_eq!(layout.reward(Coord::new(2, 0)), 4);
        assert_eq!(
            layout.clone().with_reward(Coord::ORIGIN, 1),
            Err(LayoutError::InvalidReward(Coord::ORIGIN))
        );
        assert_eq!(
            layout.with_reward(Coord::new(9, 9), 1),
            Err(LayoutError::InvalidReward(Coord::new(9, 9)))
        );
    }
}
