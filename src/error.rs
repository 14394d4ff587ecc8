use grid_util::point::Point;
use thiserror::Error;

/// Errors returned by grid edits and queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("{point} lies outside the {width}x{height} grid")]
    OutOfBounds {
        point: Point,
        width: usize,
        height: usize,
    },

    #[error("the grid cannot be edited while a search is running")]
    SearchInProgress,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown glyph '{glyph}' at {point}")]
    InvalidGlyph { glyph: char, point: Point },
}

/// Reasons a search could not be started or joined.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("search is not runnable (start missing: {missing_start}, target missing: {missing_target})")]
    NotRunnable {
        missing_start: bool,
        missing_target: bool,
    },

    #[error("a search is already running on this grid")]
    AlreadyRunning,

    #[error("failed to spawn search worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("search worker panicked")]
    WorkerPanicked,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
}
