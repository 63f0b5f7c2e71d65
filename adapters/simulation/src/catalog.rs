//! TOML catalogs of hand-written mazes.

use std::{fs, path::Path};

use maze_explorer_core::{Coord, Direction};
use serde::Deserialize;

use crate::layout::{LayoutError, MazeLayout};

/// Errors raised while loading a [`MazeCatalog`].
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read maze catalog {path}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The catalog is not valid TOML or does not match the catalog schema.
    #[error("failed to parse maze catalog")]
    Parse(#[from] toml::de::Error),
    /// A maze entry describes an impossible layout.
    #[error("maze `{maze}` is invalid")]
    Layout {
        /// Name of the offending maze.
        maze: String,
        /// What is wrong with it.
        #[source]
        source: LayoutError,
    },
    /// Two entries share a name.
    #[error("maze `{0}` is defined more than once")]
    DuplicateMaze(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default, rename = "maze")]
    mazes: Vec<MazeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MazeEntry {
    name: String,
    rows: Vec<String>,
    #[serde(default)]
    rewards: Vec<RewardEntry>,
    #[serde(default)]
    portals: Vec<PortalEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RewardEntry {
    at: Coord,
    value: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PortalEntry {
    from: Coord,
    direction: Direction,
    to: Coord,
}

impl MazeEntry {
    fn into_layout(self) -> Result<MazeLayout, LayoutError> {
        let mut layout = MazeLayout::parse(self.name, self.rows.as_slice())?;
        for reward in self.rewards {
            layout = layout.with_reward(reward.at, reward.value)?;
        }
        for portal in self.portals {
            layout = layout.with_portal(portal.from, portal.direction, portal.to)?;
        }
        Ok(layout)
    }
}

/// Ordered collection of named maze layouts.
///
/// ```toml
/// [[maze]]
/// name = "ring"
/// rows = ["S.C.E"]
/// rewards = [{ at = { x = 2, y = 0 }, value = 3 }]
/// portals = [{ from = { x = 4, y = 0 }, direction = "Right", to = { x = 0, y = 0 } }]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MazeCatalog {
    mazes: Vec<MazeLayout>,
}

impl MazeCatalog {
    /// Parses a catalog from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        let mut mazes: Vec<MazeLayout> = Vec::with_capacity(file.mazes.len());

        for entry in file.mazes {
            if mazes.iter().any(|maze| maze.name() == entry.name) {
                return Err(CatalogError::DuplicateMaze(entry.name));
            }
            let maze = entry.name.clone();
            let layout = entry
                .into_layout()
                .map_err(|source| CatalogError::Layout { maze, source })?;
            mazes.push(layout);
        }

        Ok(Self { mazes })
    }

    /// Reads and parses the catalog stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Layout registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MazeLayout> {
        self.mazes.iter().find(|maze| maze.name() == name)
    }

    /// Layouts in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &MazeLayout> {
        self.mazes.iter()
    }

    /// Number of mazes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mazes.len()
    }

    /// Whether the catalog holds no maze.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mazes.is_empty()
    }
}

impl IntoIterator for MazeCatalog {
    type Item = MazeLayout;
    type IntoIter = std::vec::IntoIter<MazeLayout>;

    fn into_iter(self) -> Self::IntoIter {
        self.mazes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RING: &str = r#"
        [[maze]]
        name = "ring"
        rows = ["S.C.E"]
        rewards = [{ at = { x = 2, y = 0 }, value = 3 }]
        portals = [{ from = { x = 4, y = 0 }, direction = "Right", to = { x = 0, y = 0 } }]

        [[maze]]
        name = "corridor"
        rows = ["S.E"]
    "#;

    #[test]
    fn catalog_reads_mazes_in_order() {
        let catalog = MazeCatalog::from_toml_str(RING).expect("valid catalog");

        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
        assert!(MazeCatalog::default().is_empty());
        let names: Vec<_> = catalog.iter().map(MazeLayout::name).collect();
        assert_eq!(names, ["ring", "corridor"]);

        let ring = catalog.get("ring").expect("ring exists");
        assert_eq!(ring.info().potential_reward, 3);
        assert_eq!(ring.portal_count(), 1);
        assert_eq!(
            ring.destination(Coord::ORIGIN, Direction::Left),
            Some(Coord::new(4, 0))
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let contents = r#"
            [[maze]]
            name = "twin"
            rows = ["SE"]

            [[maze]]
            name = "twin"
            rows = ["ES"]
        "#;

        assert!(matches!(
            MazeCatalog::from_toml_str(contents),
            Err(CatalogError::DuplicateMaze(name)) if name == "twin"
        ));
    }

    #[test]
    fn layout_errors_name_the_maze() {
        let contents = r#"
            [[maze]]
            name = "broken"
            rows = ["..E"]
        "#;

        match MazeCatalog::from_toml_str(contents) {
            Err(CatalogError::Layout { maze, source }) => {
                assert_eq!(maze, "broken");
                assert_eq!(source, LayoutError::MissingStart);
            }
            other => panic!("expected layout error, got {other:?}"),
        }
    }

    #[test]
    fn portals_sharing_an_endpoint_are_rejected() {
        let contents = r##"
            [[maze]]
            name = "fork"
            rows = ["S.E", "#.#"]
            portals = [
                { from = { x = 2, y = 0 }, direction = "Right", to = { x = 0, y = 0 } },
                { from = { x = 1, y = -1 }, direction = "Right", to = { x = 0, y = 0 } },
            ]
        "##;

        match MazeCatalog::from_toml_str(contents) {
            Err(CatalogError::Layout { maze, source }) => {
                assert_eq!(maze, "fork");
                assert_eq!(
                    source,
                    LayoutError::InvalidPortal {
                        from: Coord::new(1, -1),
                        direction: Direction::Right,
                        to: Coord::ORIGIN,
                    }
                );
            }
            other => panic!("expected layout error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let contents = r#"
            [[maze]]
            name = "typo"
            row = ["S.E"]
        "#;

        assert!(matches!(
            MazeCatalog::from_toml_str(contents),
            Err(CatalogError::Parse(_))
        ));
    }
}
