#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-process stand-in for the maze service.
//!
//! Layouts come from hand-written TOML catalogs or from the seeded generator
//! and are served through [`SimulatedOracle`], which follows the same rules as
//! the remote service: rewards are picked up on the first visit, collecting
//! banks the score in hand, and exiting is only possible on exit tiles.

mod catalog;
mod generator;
mod layout;
mod oracle;

pub use catalog::{CatalogError, MazeCatalog};
pub use generator::generate_maze;
pub use layout::{LayoutError, MazeLayout};
pub use oracle::{CountingOracle, OracleCalls, SimulatedOracle};
