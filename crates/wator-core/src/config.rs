//! Configuration types for the simulation.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Rules shared by every creature for the lifetime of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Age interval (in ticks) at which a fish spawns offspring
    pub fish_spawn_period: u32,
    /// Age interval (in ticks) at which a shark spawns offspring
    pub shark_spawn_period: u32,
    /// Ticks a shark survives without eating; also its starting health
    pub shark_starve_limit: u32,
}

impl SimulationConfig {
    /// Health a shark is restored to after eating a fish.
    ///
    /// One above the starve limit, because the shark pays a point of health at
    /// the start of every turn, including the one in which it ate.
    pub fn fed_shark_health(&self) -> u32 {
        self.shark_starve_limit.saturating_add(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fish_spawn_period == 0 {
            return Err(ConfigError::ZeroValue("fish_spawn_period"));
        }
        if self.shark_spawn_period == 0 {
            return Err(ConfigError::ZeroValue("shark_spawn_period"));
        }
        if self.shark_starve_limit == 0 {
            return Err(ConfigError::ZeroValue("shark_starve_limit"));
        }
        // Sharks that breed faster than they starve grow without bound.
        if self.shark_starve_limit > self.shark_spawn_period {
            return Err(ConfigError::UnsustainableHealth {
                starve_limit: self.shark_starve_limit,
                spawn_period: self.shark_spawn_period,
            });
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fish_spawn_period: 25,
            shark_spawn_period: 35,
            shark_starve_limit: 10,
        }
    }
}

/// Dimensions and initial population of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: usize,
    /// Height of the world grid
    pub height: usize,
    /// Fish scattered at initialisation
    pub fish_count: usize,
    /// Sharks scattered at initialisation
    pub shark_count: usize,
}

impl WorldConfig {
    /// Number of cells, or `None` when `width * height` overflows
    pub fn size(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let capacity = self.size().ok_or(ConfigError::TooLarge {
            width: self.width,
            height: self.height,
        })?;
        if capacity == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }

        let requested = self.fish_count.saturating_add(self.shark_count);
        if self.fish_count.checked_add(self.shark_count).is_none() || requested > capacity {
            return Err(ConfigError::Overcrowded {
                requested,
                capacity,
            });
        }

        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 4,
            fish_count: 10,
            shark_count: 4,
        }
    }
}

/// A complete headless run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of ticks to run the simulation
    pub num_ticks: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// World configuration
    pub world: WorldConfig,
    /// Creature rules
    pub simulation: SimulationConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_ticks: 100,
            seed: 0,
            world: WorldConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl RunConfig {
    /// Checks the world first, then the rules, so crowding is reported before health.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.simulation.validate()
    }
}
