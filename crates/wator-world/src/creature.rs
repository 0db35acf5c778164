//! Creature state and per-species rules.

use serde::{Deserialize, Serialize};
use wator_core::{SimulationConfig, Species};

/// A creature occupying one cell of the grid.
///
/// Identity is the cell a creature sits in; there are no ids. `last_acted` is
/// the tick in which the creature last took its turn, which lets the engine
/// skip a creature that was moved into a cell it has not visited yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "species", rename_all = "snake_case")]
pub enum Creature {
    Fish {
        age: u32,
        last_acted: u64,
    },
    Shark {
        age: u32,
        last_acted: u64,
        health: u32,
    },
}

impl Creature {
    pub fn fish() -> Self {
        Creature::Fish {
            age: 0,
            last_acted: 0,
        }
    }

    pub fn shark(health: u32) -> Self {
        Creature::Shark {
            age: 0,
            last_acted: 0,
            health,
        }
    }

    /// Same species as `self`, newborn during `tick`
    pub fn offspring(&self, config: &SimulationConfig, tick: u64) -> Self {
        match self {
            Creature::Fish { .. } => Creature::Fish {
                age: 0,
                last_acted: tick,
            },
            Creature::Shark { .. } => Creature::Shark {
                age: 0,
                last_acted: tick,
                health: config.shark_starve_limit,
            },
        }
    }

    pub fn with_age(mut self, new_age: u32) -> Self {
        match &mut self {
            Creature::Fish { age, .. } | Creature::Shark { age, .. } => *age = new_age,
        }
        self
    }

    pub fn species(&self) -> Species {
        match self {
            Creature::Fish { .. } => Species::Fish,
            Creature::Shark { .. } => Species::Shark,
        }
    }

    pub fn age(&self) -> u32 {
        match self {
            Creature::Fish { age, .. } | Creature::Shark { age, .. } => *age,
        }
    }

    pub fn last_acted(&self) -> u64 {
        match self {
            Creature::Fish { last_acted, .. } | Creature::Shark { last_acted, .. } => *last_acted,
        }
    }

    /// Health of a shark; fish do not starve
    pub fn health(&self) -> Option<u32> {
        match self {
            Creature::Fish { .. } => None,
            Creature::Shark { health, .. } => Some(*health),
        }
    }

    pub fn mark_acted(&mut self, tick: u64) {
        match self {
            Creature::Fish { last_acted, .. } | Creature::Shark { last_acted, .. } => {
                *last_acted = tick
            }
        }
    }

    pub fn grow(&mut self) {
        match self {
            Creature::Fish { age, .. } | Creature::Shark { age, .. } => *age += 1,
        }
    }

    /// Pay one point of health for the turn. Returns true if the creature starved.
    pub fn starve(&mut self) -> bool {
        match self {
            Creature::Fish { .. } => false,
            Creature::Shark { health, .. } => {
                *health = health.saturating_sub(1);
                *health == 0
            }
        }
    }

    pub fn feed(&mut self, config: &SimulationConfig) {
        if let Creature::Shark { health, .. } = self {
            *health = config.fed_shark_health();
        }
    }

    /// Whether the creature's current age is a breeding age
    pub fn breeding_due(&self, config: &SimulationConfig) -> bool {
        let period = match self {
            Creature::Fish { .. } => config.fish_spawn_period,
            Creature::Shark { .. } => config.shark_spawn_period,
        };
        let age = self.age();
        age > 0 && age % period == 0
    }
}
