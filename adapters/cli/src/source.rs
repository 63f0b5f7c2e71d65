//! Selection of the mazes a run works through.

use std::{fmt, path::Path, str::FromStr};

use anyhow::{bail, Context, Result};
use maze_explorer_simulation::{generate_maze, MazeCatalog, MazeLayout};
use tracing::info;

/// Dimensions of a generated maze, in rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct MazeSize {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl FromStr for MazeSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (width, height) = value
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{value}`"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .ok()
                .filter(|rooms| *rooms > 0)
                .ok_or_else(|| format!("`{part}` is not a positive room count"))
        };

        Ok(Self {
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}

impl fmt::Display for MazeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Loads the catalog at `path`, keeping only `only` when given.
pub(crate) fn from_catalog(path: &Path, only: Option<&str>) -> Result<Vec<MazeLayout>> {
    let catalog = MazeCatalog::load(path)
        .with_context(|| format!("failed to load maze catalog {}", path.display()))?;
    info!(path = %path.display(), mazes = catalog.len(), "loaded maze catalog");
    select(catalog, only)
}

fn select(catalog: MazeCatalog, only: Option<&str>) -> Result<Vec<MazeLayout>> {
    if catalog.is_empty() {
        bail!("catalog holds no mazes");
    }
    let Some(name) = only else {
        return Ok(catalog.into_iter().collect());
    };
    if catalog.get(name).is_none() {
        let known: Vec<&str> = catalog.iter().map(MazeLayout::name).collect();
        bail!("catalog has no maze `{name}` (known: {})", known.join(", "));
    }

    Ok(catalog
        .into_iter()
        .filter(|layout| layout.name() == name)
        .collect())
}

/// Generates `count` mazes with consecutive seeds starting at `seed`.
pub(crate) fn generated(size: MazeSize, seed: u64, count: u32) -> Vec<MazeLayout> {
    (0..u64::from(count))
        .map(|offset| generate_maze(size.width, size.height, seed.wrapping_add(offset)))
        .collect()
}
