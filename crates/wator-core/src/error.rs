//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a world cannot be initialised from the supplied parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Grid must have a non-zero size, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("Too many creatures to fit on map: {requested} requested, {capacity} cells available")]
    Overcrowded { requested: usize, capacity: usize },

    #[error("Grid of {width}x{height} cells is too large to address")]
    TooLarge { width: usize, height: usize },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error(
        "Shark starve limit ({starve_limit}) must not exceed the shark spawn period ({spawn_period})"
    )]
    UnsustainableHealth { starve_limit: u32, spawn_period: u32 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Placement sequence of size {size} is exhausted")]
    SequenceExhausted { size: usize },

    #[error("Cell {index} is outside a grid of {size} cells")]
    OutOfBounds { index: usize, size: usize },

    #[error("Cell {0} is already occupied")]
    CellOccupied(usize),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
