//! # grid_visualizer_core
//!
//! The engine behind a grid pathfinding visualizer. A [CellGrid] of pathable cells, walls, one
//! start and one target is edited by a host; a greedy
//! [best-first search](https://en.wikipedia.org/wiki/Best-first_search) then expands cells in
//! order of their straight-line distance to the target and, once the target is reached, traces
//! a path back to the start through the expanded cells. Every cell state change is reported to
//! a [Display] so the search can be animated, optionally paced by configurable delays and run on
//! a background thread through [Pathfinder].
//!
//! Note that the search does not accumulate path cost: paths are found whenever the target is
//! reachable, but they are not necessarily shortest.
//!
//! ```
//! use grid_visualizer_core::{search, CellGrid, RecordingDisplay};
//! use grid_util::point::Point;
//!
//! let mut grid = CellGrid::new(80, 80);
//! grid.set_start(Point::new(0, 0)).unwrap();
//! grid.set_target(Point::new(2, 0)).unwrap();
//! let display = RecordingDisplay::new();
//! let outcome = search(&mut grid, &display).unwrap();
//! assert_eq!(
//!     outcome.path().unwrap(),
//!     &[Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)]
//! );
//! ```
pub mod best_first;
pub mod cell;
pub mod cell_grid;
pub mod config;
pub mod display;
pub mod error;
pub mod pathfinder;

pub use best_first::{search, BestFirstSearch, SearchOutcome, SearchState, Step};
pub use cell::{Category, Cell, Priority};
pub use cell_grid::CellGrid;
pub use config::SearchConfig;
pub use display::{ChannelDisplay, Display, DisplayEvent, NullDisplay, RecordingDisplay};
pub use error::{ConfigError, GridError, RunError};
pub use pathfinder::{Pathfinder, SearchHandle};

use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::IndexSet;

pub(crate) type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// Checks that consecutive points of a path are 4-neighbours of each other.
pub fn path_is_connected(path: &[Point]) -> bool {
    path.windows(2)
        .all(|w| (w[0].x - w[1].x).abs() + (w[0].y - w[1].y).abs() == 1)
}
