//! 2D grid for the world.

use crate::creature::Creature;
use serde::{Deserialize, Serialize};
use std::fmt;
use wator_core::{Action, CellState, ConfigError, Error, Result, Snapshot, Species};

/// The four cells orthogonally adjacent to a cell, after toroidal wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    pub north: usize,
    pub south: usize,
    pub west: usize,
    pub east: usize,
}

impl Neighbors {
    /// Neighbours in north, south, west, east order
    pub fn to_array(&self) -> [usize; 4] {
        [self.north, self.south, self.west, self.east]
    }

    /// Neighbours paired with the move that reaches them, in the same order
    pub fn with_directions(&self) -> [(usize, Action); 4] {
        [
            (self.north, Action::MoveNorth),
            (self.south, Action::MoveSouth),
            (self.west, Action::MoveWest),
            (self.east, Action::MoveEast),
        ]
    }
}

/// A 2D toroidal grid stored row-major, one optional creature per cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    cells: Vec<Option<Creature>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Like [`Grid::new`], but reports a grid too large to allocate as an error
    pub fn try_new(width: usize, height: usize) -> Result<Self> {
        let too_large = || Error::Config(ConfigError::TooLarge { width, height });
        let size = width.checked_mul(height).ok_or_else(too_large)?;

        let mut cells = Vec::new();
        cells.try_reserve_exact(size).map_err(|_| too_large())?;
        cells.resize(size, None);

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Creature> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    pub fn species_at(&self, index: usize) -> Option<Species> {
        self.get(index).map(Creature::species)
    }

    pub fn is_vacant(&self, index: usize) -> bool {
        self.get(index).is_none()
    }

    /// Put a creature into an empty cell, checking bounds and occupancy
    pub fn place(&mut self, index: usize, creature: Creature) -> Result<()> {
        let size = self.len();
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(Error::OutOfBounds { index, size })?;
        if slot.is_some() {
            return Err(Error::CellOccupied(index));
        }
        *slot = Some(creature);
        Ok(())
    }

    /// Remove and return the occupant of a cell
    pub(crate) fn take(&mut self, index: usize) -> Option<Creature> {
        self.cells[index].take()
    }

    /// Fill a cell the engine already knows to be empty
    pub(crate) fn put(&mut self, index: usize, creature: Creature) {
        let slot = &mut self.cells[index];
        debug_assert!(slot.is_none(), "cell {index} unexpectedly occupied");
        *slot = Some(creature);
    }

    /// North, south, west and east neighbours of `index`, wrapping on both axes.
    ///
    /// North/south wrap across the whole grid; east/west wrap within the row.
    pub fn adjacent(&self, index: usize) -> Neighbors {
        let size = self.len();
        let width = self.width;

        let north = if index >= width {
            index - width
        } else {
            index + size - width
        };

        let south = if index + width >= size {
            index + width - size
        } else {
            index + width
        };

        let east = if (index + 1) % width == 0 {
            index + 1 - width
        } else {
            index + 1
        };

        let west = if index % width == 0 {
            index + width - 1
        } else {
            index - 1
        };

        Neighbors {
            north,
            south,
            west,
            east,
        }
    }

    /// Classify a step from `from` to `to`.
    ///
    /// Returns `None` when `to` is neither `from` nor one of its neighbours. On
    /// grids narrow enough for neighbours to coincide, the first match in
    /// north, south, west, east order wins.
    pub fn direction(&self, from: usize, to: usize) -> Option<Action> {
        if from == to {
            return Some(Action::NoMove);
        }

        self.adjacent(from)
            .with_directions()
            .into_iter()
            .find(|(cell, _)| *cell == to)
            .map(|(_, action)| action)
    }

    /// Classification of every cell, in cell order
    pub fn state(&self) -> Snapshot {
        self.cells
            .iter()
            .map(|cell| CellState::from(cell.as_ref().map(Creature::species)))
            .collect()
    }

    /// Get (column, row) from index
    pub fn index_to_coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Iterator over occupied cells with their index
    pub fn creatures(&self) -> impl Iterator<Item = (usize, &Creature)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.as_ref().map(|creature| (index, creature)))
    }
}

/// One line per row: `F` for fish, `S` for shark, `*` for open water.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.state().render(self.width))
    }
}
