//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of creature living on Wa-Tor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Fish,
    Shark,
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Fish => write!(f, "FISH"),
            Species::Shark => write!(f, "SHARK"),
        }
    }
}

/// Classification of a single cell in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Empty,
    Fish,
    Shark,
}

impl CellState {
    /// Character used by the textual grid dump
    pub fn glyph(&self) -> char {
        match self {
            CellState::Empty => '*',
            CellState::Fish => 'F',
            CellState::Shark => 'S',
        }
    }
}

impl From<Species> for CellState {
    fn from(species: Species) -> Self {
        match species {
            Species::Fish => CellState::Fish,
            Species::Shark => CellState::Shark,
        }
    }
}

impl From<Option<Species>> for CellState {
    fn from(species: Option<Species>) -> Self {
        species.map_or(CellState::Empty, CellState::from)
    }
}

/// Read-only classification of every cell, in cell order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub Vec<CellState>);

impl Snapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<CellState> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = CellState> + '_ {
        self.0.iter().copied()
    }

    /// Number of cells holding the given classification
    pub fn count(&self, state: CellState) -> usize {
        self.0.iter().filter(|&&cell| cell == state).count()
    }

    /// One line per row of `width` cells, using each cell's glyph
    pub fn render(&self, width: usize) -> String {
        let mut out = String::with_capacity(self.len() + self.len() / width.max(1) + 1);
        for row in self.0.chunks(width.max(1)) {
            out.extend(row.iter().map(CellState::glyph));
            out.push('\n');
        }
        out
    }

    pub fn population(&self) -> Population {
        let mut population = Population::default();
        for cell in self.iter() {
            match cell {
                CellState::Empty => population.empty += 1,
                CellState::Fish => population.fish += 1,
                CellState::Shark => population.sharks += 1,
            }
        }
        population
    }
}

impl FromIterator<CellState> for Snapshot {
    fn from_iter<I: IntoIterator<Item = CellState>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Head count of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Population {
    pub fish: usize,
    pub sharks: usize,
    pub empty: usize,
}

impl Population {
    pub fn creatures(&self) -> usize {
        self.fish + self.sharks
    }

    pub fn is_extinct(&self) -> bool {
        self.creatures() == 0
    }
}

/// What happened to a creature during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NoMove,
    MoveNorth,
    MoveSouth,
    MoveEast,
    MoveWest,
    Death,
    Birth,
    Ate,
}

impl Action {
    pub fn is_move(&self) -> bool {
        matches!(
            self,
            Action::NoMove
                | Action::MoveNorth
                | Action::MoveSouth
                | Action::MoveEast
                | Action::MoveWest
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::NoMove => "MOVE_NONE",
            Action::MoveNorth => "MOVE_NORTH",
            Action::MoveSouth => "MOVE_SOUTH",
            Action::MoveEast => "MOVE_EAST",
            Action::MoveWest => "MOVE_WEST",
            Action::Death => "DEATH",
            Action::Birth => "BIRTH",
            Action::Ate => "ATE",
        };
        f.write_str(name)
    }
}

/// A single change-log entry: who did what, from which cell to which cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub subject: Species,
    pub from: usize,
    pub to: usize,
    pub action: Action,
}

impl Delta {
    pub fn new(subject: Species, from: usize, to: usize, action: Action) -> Self {
        Self {
            subject,
            from,
            to,
            action,
        }
    }

    /// An event that happens in place (death or birth)
    pub fn at(subject: Species, index: usize, action: Action) -> Self {
        Self::new(subject, index, index, action)
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Animal = {} from {} to {} Action={}",
            self.subject, self.from, self.to, self.action
        )
    }
}
