#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Console rendering of the agent's map for Maze Explorer adapters.

use std::{collections::BTreeMap, fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use maze_explorer_core::Coord;
use maze_explorer_map::{Slot, SpatialMap};
use maze_explorer_system_navigator::{Frame, NavigationObserver};
use tracing::warn;

/// Character drawn for a coordinate the agent knows nothing about.
pub const UNKNOWN_GLYPH: char = '#';
/// Character drawn for the agent's tile.
pub const AGENT_GLYPH: char = '@';

/// Picks the character drawn for a map slot.
///
/// Exits, collection points and rewards take precedence over the visited
/// state so that targets stay visible once explored.
#[must_use]
pub fn glyph(slot: &Slot) -> char {
    match slot {
        Slot::Alias(_) => 'P',
        Slot::Tile(tile) if tile.is_exit() => 'E',
        Slot::Tile(tile) if tile.is_collection_point() => 'C',
        Slot::Tile(tile) if tile.has_reward() => '$',
        Slot::Tile(tile) if tile.is_visited() => '.',
        Slot::Tile(_) => '?',
    }
}

/// Inclusive rectangle covering every known coordinate and the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    min: Coord,
    max: Coord,
}

impl Bounds {
    /// Computes the bounds of the map.
    #[must_use]
    pub fn of(map: &SpatialMap) -> Self {
        let start = map.location();
        let (mut min_x, mut min_y) = (start.x(), start.y());
        let (mut max_x, mut max_y) = (start.x(), start.y());
        for (coord, _) in map.slots() {
            min_x = min_x.min(coord.x());
            min_y = min_y.min(coord.y());
            max_x = max_x.max(coord.x());
            max_y = max_y.max(coord.y());
        }

        Self {
            min: Coord::new(min_x, min_y),
            max: Coord::new(max_x, max_y),
        }
    }

    /// Bottom-left corner.
    #[must_use]
    pub const fn min(&self) -> Coord {
        self.min
    }

    /// Top-right corner.
    #[must_use]
    pub const fn max(&self) -> Coord {
        self.max
    }

    /// Number of columns covered.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.max.x().abs_diff(self.min.x()) + 1
    }

    /// Number of rows covered.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.max.y().abs_diff(self.min.y()) + 1
    }
}

/// Text picture of a single navigation frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    header: String,
    rows: Vec<String>,
}

impl Scene {
    /// Draws the map carried by `frame`, north at the top.
    #[must_use]
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        let header = format!(
            "{} | {} | moves {} | hand {} | bag {}{}",
            frame.maze,
            frame.phase,
            frame.moves,
            frame.observation.current_score_in_hand,
            frame.observation.current_score_in_bag,
            if frame.map.is_invalid() {
                " | map invalidated"
            } else {
                ""
            },
        );

        Self {
            header,
            rows: draw(frame.map),
        }
    }

    /// Status line printed above the map.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Map rows from north to south.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

fn draw(map: &SpatialMap) -> Vec<String> {
    let bounds = Bounds::of(map);
    let location = map.location();
    let slots: BTreeMap<Coord, &Slot> = map.slots().collect();
    let mut rows = Vec::with_capacity(bounds.height() as usize);

    for y in (bounds.min().y()..=bounds.max().y()).rev() {
        let row = (bounds.min().x()..=bounds.max().x())
            .map(|x| {
                let coord = Coord::new(x, y);
                if coord == location {
                    AGENT_GLYPH
                } else {
                    slots.get(&coord).map_or(UNKNOWN_GLYPH, |slot| glyph(slot))
                }
            })
            .collect();
        rows.push(row);
    }

    rows
}

/// [`NavigationObserver`] that writes every frame to a text sink.
#[derive(Debug)]
pub struct TextRenderer<W> {
    writer: W,
    frames: u64,
}

impl<W: Write> TextRenderer<W> {
    /// Creates a renderer writing to `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    /// Number of frames written so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Draws `frame` and flushes the writer.
    pub fn present(&mut self, frame: &Frame<'_>) -> AnyResult<()> {
        let scene = Scene::from_frame(frame);
        writeln!(self.writer, "{scene}").context("failed to write frame")?;
        self.writer.flush().context("failed to flush frame")?;
        self.frames += 1;
        Ok(())
    }
}

impl<W: Write> NavigationObserver for TextRenderer<W> {
    fn observe(&mut self, frame: &Frame<'_>) {
        if let Err(error) = self.present(frame) {
            warn!(maze = frame.maze, error = %error, "frame could not be rendered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_explorer_core::{Direction, MoveAction, Observation, Phase};

    fn action(direction: Direction) -> MoveAction {
        MoveAction {
            direction,
            has_been_visited: false,
            allows_exit: false,
            allows_score_collection: false,
            reward_on_destination: 0,
        }
    }

    fn start() -> (SpatialMap, Observation) {
        let observation = Observation {
            possible_move_actions: vec![
                MoveAction {
                    allows_exit: true,
                    ..action(Direction::Right)
                },
                MoveAction {
                    reward_on_destination: 3,
                    ..action(Direction::Up)
                },
                action(Direction::Left),
            ],
            ..Observation::default()
        };
        let mut map = SpatialMap::new();
        let _ = map.register(&observation);
        (map, observation)
    }

    fn frame<'a>(map: &'a SpatialMap, observation: &'a Observation) -> Frame<'a> {
        Frame {
            maze: "demo",
            phase: Phase::Gather,
            map,
            observation,
            moves: 0,
            decision: None,
        }
    }

    #[test]
    fn scene_draws_north_at_the_top() {
        let (map, observation) = start();
        let scene = Scene::from_frame(&frame(&map, &observation));

        assert_eq!(scene.rows(), ["#$#", "?@E"]);
        assert_eq!(scene.header(), "demo | gather | moves 0 | hand 0 | bag 0");
    }

    #[test]
    fn bounds_cover_the_agent_and_known_tiles() {
        let (map, _) = start();
        let bounds = Bounds::of(&map);

        assert_eq!(bounds.min(), Coord::new(-1, 0));
        assert_eq!(bounds.max(), Coord::new(1, 1));
        assert_eq!((bounds.width(), bounds.height()), (3, 2));
    }

    #[test]
    fn renderer_writes_each_observed_frame() {
        let (map, observation) = start();
        let mut renderer = TextRenderer::new(Vec::new());

        renderer.observe(&frame(&map, &observation));
        renderer.observe(&frame(&map, &observation));

        assert_eq!(renderer.frames(), 2);
        let text = String::from_utf8(renderer.into_inner()).expect("frames are utf-8");
        assert_eq!(text.matches("demo | gather").count(), 2);
        assert!(text.contains("?@E\n"));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_do_not_stop_navigation() {
        let (map, observation) = start();
        let mut renderer = TextRenderer::new(Broken);

        renderer.observe(&frame(&map, &observation));

        assert_eq!(renderer.frames(), 0);
        assert!(renderer.present(&frame(&map, &observation)).is_err());
    }
}
