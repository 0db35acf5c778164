//! Simulation engine that advances the world one tick at a time.

use crate::change_log::ChangeLog;
use crate::creature::Creature;
use crate::grid::Grid;
use crate::placement::Placement;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::io;
use tracing::{debug, info, instrument, trace};
use wator_core::{
    Action, CellState, Delta, Population, Result, RunConfig, SimulationConfig, Snapshot, Species,
    WorldConfig,
};

/// Everything one call to [`Simulation::update`] produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Tick the world reached with this update
    pub tick: u64,
    pub previous: Snapshot,
    pub current: Snapshot,
    pub changes: ChangeLog,
}

pub struct Simulation {
    grid: Grid,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    tick: u64,
}

impl Simulation {
    /// Build a world and scatter its initial population: fish first, then sharks.
    pub fn new(world: &WorldConfig, config: SimulationConfig, mut rng: ChaCha8Rng) -> Result<Self> {
        world.validate()?;
        config.validate()?;

        let mut grid = Grid::try_new(world.width, world.height)?;
        let mut placement = Placement::new(grid.len(), &mut rng);

        for _ in 0..world.fish_count {
            grid.place(placement.draw()?, Creature::fish())?;
        }
        for _ in 0..world.shark_count {
            grid.place(placement.draw()?, Creature::shark(config.shark_starve_limit))?;
        }

        debug!(
            width = world.width,
            height = world.height,
            fish = world.fish_count,
            sharks = world.shark_count,
            free_cells = placement.remaining(),
            "World seeded"
        );

        Ok(Self {
            grid,
            config,
            rng,
            tick: 0,
        })
    }

    pub fn from_run_config(run: &RunConfig) -> Result<Self> {
        Self::new(
            &run.world,
            run.simulation,
            ChaCha8Rng::seed_from_u64(run.seed),
        )
    }

    /// A world with no creatures, to be populated with [`Simulation::place`]
    pub fn empty(
        width: usize,
        height: usize,
        config: SimulationConfig,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        let world = WorldConfig {
            width,
            height,
            fish_count: 0,
            shark_count: 0,
        };
        Self::new(&world, config, rng)
    }

    pub fn place(&mut self, index: usize, creature: Creature) -> Result<()> {
        self.grid.place(index, creature)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> Snapshot {
        self.grid.state()
    }

    pub fn population(&self) -> Population {
        self.state().population()
    }

    /// Write the textual grid dump
    pub fn debug_print<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.grid)
    }

    /// Advance the world by exactly one tick.
    ///
    /// Cells are visited in index order and every creature alive at the end of
    /// the tick has taken exactly one turn.
    pub fn update(&mut self) -> UpdateResult {
        let previous = self.grid.state();
        self.tick += 1;
        let mut changes = ChangeLog::new();

        for index in 0..self.grid.len() {
            // Creatures moved forward into unvisited cells already had their turn
            let pending = self
                .grid
                .get(index)
                .is_some_and(|creature| creature.last_acted() != self.tick);
            if !pending {
                continue;
            }

            if let Some(creature) = self.grid.take(index) {
                self.take_turn(index, creature, &mut changes);
            }
        }

        let current = self.grid.state();

        debug!(
            tick = self.tick,
            fish = current.count(CellState::Fish),
            sharks = current.count(CellState::Shark),
            changes = changes.len(),
            "Tick complete"
        );

        UpdateResult {
            tick: self.tick,
            previous,
            current,
            changes,
        }
    }

    /// Play one creature's turn. The creature has already been lifted out of `index`.
    fn take_turn(&mut self, index: usize, mut creature: Creature, changes: &mut ChangeLog) {
        let species = creature.species();
        creature.mark_acted(self.tick);

        if creature.starve() {
            trace!(tick = self.tick, index, "Shark starved");
            changes.push(Delta::at(species, index, Action::Death));
            return;
        }

        let candidates = self.candidates(index, species);
        let target = candidates.choose(&mut self.rng).copied().unwrap_or(index);

        let action = self.grid.direction(index, target);
        debug_assert!(action.is_some(), "{target} is not adjacent to {index}");
        changes.push(Delta::new(
            species,
            index,
            target,
            action.unwrap_or(Action::NoMove),
        ));

        if target == index {
            // Nowhere to go, so no vacated cell for offspring either
            creature.grow();
            self.grid.put(index, creature);
            return;
        }

        if let Some(prey) = self.grid.take(target) {
            debug_assert_eq!(prey.species(), Species::Fish);
            creature.feed(&self.config);
            changes.push(Delta::new(species, index, target, Action::Ate));
            trace!(tick = self.tick, from = index, to = target, "Shark ate a fish");
        }

        let newborn = creature
            .breeding_due(&self.config)
            .then(|| creature.offspring(&self.config, self.tick));

        creature.grow();
        self.grid.put(target, creature);

        if let Some(child) = newborn {
            self.grid.put(index, child);
            changes.push(Delta::at(species, index, Action::Birth));
            trace!(tick = self.tick, index, species = %species, "Creature born");
        }
    }

    /// Distinct neighbouring cells the creature at `index` may move into.
    ///
    /// Sharks restrict themselves to cells holding fish whenever there is one.
    fn candidates(&self, index: usize, species: Species) -> Vec<usize> {
        let mut open = Vec::with_capacity(4);
        let mut prey = Vec::new();

        for cell in self.grid.adjacent(index).to_array() {
            if cell == index || open.contains(&cell) || prey.contains(&cell) {
                continue;
            }
            match self.grid.species_at(cell) {
                None => open.push(cell),
                Some(Species::Fish) if species == Species::Shark => prey.push(cell),
                Some(_) => {}
            }
        }

        if prey.is_empty() {
            open
        } else {
            prey
        }
    }

    /// Run the simulation for the specified number of ticks
    pub fn run(&mut self, num_ticks: u64) -> RunSummary {
        self.run_with(num_ticks, |_| {})
    }

    /// Run for `num_ticks`, handing every update to `on_tick` as it happens
    #[instrument(skip(self, on_tick), fields(start_tick = self.tick))]
    pub fn run_with<F>(&mut self, num_ticks: u64, mut on_tick: F) -> RunSummary
    where
        F: FnMut(&UpdateResult),
    {
        info!("Starting simulation for {} ticks", num_ticks);
        let mut summary = RunSummary::new(self.tick, self.population());

        for _ in 0..num_ticks {
            let result = self.update();
            summary.record(&result);
            on_tick(&result);

            if self.tick % 100 == 0 {
                let population = result.current.population();
                info!(
                    tick = self.tick,
                    fish = population.fish,
                    sharks = population.sharks,
                    "Population snapshot"
                );
            }
        }

        info!(
            event = "run_summary",
            start_tick = summary.start_tick,
            final_tick = summary.final_tick,
            fish = summary.final_population.fish,
            sharks = summary.final_population.sharks,
            peak_fish = summary.peak_fish,
            peak_sharks = summary.peak_sharks,
            births = summary.births,
            deaths = summary.deaths,
            meals = summary.meals,
            fish_extinct_at = ?summary.fish_extinct_at,
            sharks_extinct_at = ?summary.sharks_extinct_at,
            "Simulation complete"
        );

        summary
    }
}

/// Aggregate statistics over a run of ticks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub start_tick: u64,
    pub final_tick: u64,
    pub final_population: Population,
    pub peak_fish: usize,
    pub peak_sharks: usize,
    pub births: usize,
    pub deaths: usize,
    pub meals: usize,
    pub fish_extinct_at: Option<u64>,
    pub sharks_extinct_at: Option<u64>,
}

impl RunSummary {
    pub fn new(start_tick: u64, population: Population) -> Self {
        Self {
            start_tick,
            final_tick: start_tick,
            final_population: population,
            peak_fish: population.fish,
            peak_sharks: population.sharks,
            births: 0,
            deaths: 0,
            meals: 0,
            fish_extinct_at: None,
            sharks_extinct_at: None,
        }
    }

    pub fn record(&mut self, result: &UpdateResult) {
        let before = result.previous.population();
        let after = result.current.population();

        self.final_tick = result.tick;
        self.final_population = after;
        self.peak_fish = self.peak_fish.max(after.fish);
        self.peak_sharks = self.peak_sharks.max(after.sharks);
        self.births += result.changes.count(Action::Birth);
        self.deaths += result.changes.count(Action::Death);
        self.meals += result.changes.count(Action::Ate);

        if before.fish > 0 && after.fish == 0 {
            self.fish_extinct_at = Some(result.tick);
        }
        if before.sharks > 0 && after.sharks == 0 {
            self.sharks_extinct_at = Some(result.tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wator_core::{ConfigError, Error};

    fn rules(fish: u32, shark: u32, starve: u32) -> SimulationConfig {
        SimulationConfig {
            fish_spawn_period: fish,
            shark_spawn_period: shark,
            shark_starve_limit: starve,
        }
    }

    fn init(
        width: usize,
        height: usize,
        fish_count: usize,
        shark_count: usize,
        config: SimulationConfig,
    ) -> Result<Simulation> {
        let world = WorldConfig {
            width,
            height,
            fish_count,
            shark_count,
        };
        Simulation::new(&world, config, ChaCha8Rng::seed_from_u64(42))
    }

    fn empty(width: usize, height: usize, config: SimulationConfig) -> Simulation {
        Simulation::empty(width, height, config, ChaCha8Rng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_init_places_requested_population() {
        let sim = init(5, 5, 5, 5, rules(3, 3, 2)).unwrap();
        let state = sim.state();
        assert_eq!(state.len(), 25);
        assert_eq!(state.count(CellState::Fish), 5);
        assert_eq!(state.count(CellState::Shark), 5);
        assert_eq!(sim.tick(), 0);

        for (_, creature) in sim.grid().creatures() {
            assert_eq!(creature.age(), 0);
            assert_eq!(creature.last_acted(), 0);
        }
        for (_, shark) in sim
            .grid()
            .creatures()
            .filter(|(_, c)| c.species() == Species::Shark)
        {
            assert_eq!(shark.health(), Some(2));
        }
    }

    #[test]
    fn test_init_can_fill_every_cell() {
        let sim = init(3, 3, 5, 4, rules(3, 3, 2)).unwrap();
        assert_eq!(sim.population().empty, 0);
    }

    #[test]
    fn test_init_overcrowded() {
        let result = init(2, 2, 3, 2, rules(3, 3, 2));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::Overcrowded {
                requested: 5,
                capacity: 4
            }))
        ));
    }

    #[test]
    fn test_init_unsustainable_health() {
        let result = init(3, 3, 2, 2, rules(3, 3, 5));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::UnsustainableHealth {
                starve_limit: 5,
                spawn_period: 3
            }))
        ));
    }

    #[test]
    fn test_update_on_empty_grid() {
        let mut sim = init(4, 4, 0, 0, rules(3, 3, 2)).unwrap();
        let result = sim.update();

        assert_eq!(sim.tick(), 1);
        assert_eq!(result.tick, 1);
        assert!(result.changes.is_empty());
        assert_eq!(result.current.count(CellState::Empty), 16);
        assert_eq!(result.previous, result.current);

        sim.update();
        assert_eq!(sim.tick(), 2);
    }

    #[test]
    fn test_starving_shark_dies_in_place() {
        let mut sim = empty(5, 5, rules(3, 3, 2));
        sim.place(12, Creature::shark(1)).unwrap();

        let result = sim.update();

        assert_eq!(result.previous.get(12), Some(CellState::Shark));
        assert_eq!(result.current.get(12), Some(CellState::Empty));
        assert_eq!(result.changes.len(), 1);
        assert_eq!(
            result.changes.as_slice()[0],
            Delta::at(Species::Shark, 12, Action::Death)
        );
        assert!(sim.population().is_extinct());
    }

    #[test]
    fn test_starving_shark_does_not_breed() {
        let mut sim = empty(5, 5, rules(3, 3, 2));
        sim.place(12, Creature::shark(1).with_age(3)).unwrap();

        let result = sim.update();
        assert_eq!(result.changes.count(Action::Birth), 0);
        assert_eq!(result.current.count(CellState::Shark), 0);
    }

    #[test]
    fn test_fish_breeds_into_vacated_cell() {
        let mut sim = empty(3, 3, rules(3, 3, 2));
        sim.place(4, Creature::fish().with_age(3)).unwrap();

        let result = sim.update();

        assert_eq!(result.previous.count(CellState::Fish), 1);
        assert_eq!(result.current.count(CellState::Fish), 2);
        assert_eq!(result.current.get(4), Some(CellState::Fish));

        let actions: Vec<Action> = result.changes.iter().map(|d| d.action).collect();
        assert_eq!(actions.len(), 2);
        assert!(actions[0].is_move() && actions[0] != Action::NoMove);
        assert_eq!(
            result.changes.as_slice()[1],
            Delta::at(Species::Fish, 4, Action::Birth)
        );

        let child = sim.grid().get(4).unwrap();
        assert_eq!(child.age(), 0);
        assert_eq!(child.last_acted(), 1);

        let parent_pos = result.changes.as_slice()[0].to;
        assert_eq!(sim.grid().get(parent_pos).unwrap().age(), 4);
    }

    #[test]
    fn test_young_fish_does_not_breed() {
        let mut sim = empty(3, 3, rules(3, 3, 2));
        sim.place(4, Creature::fish().with_age(2)).unwrap();

        let result = sim.update();
        assert_eq!(result.current.count(CellState::Fish), 1);
        assert_eq!(result.changes.count(Action::Birth), 0);
    }

    #[test]
    fn test_trapped_fish_neither_moves_nor_breeds() {
        let mut sim = empty(3, 3, rules(3, 3, 2));
        for index in 0..9 {
            sim.place(index, Creature::fish().with_age(3)).unwrap();
        }

        let result = sim.update();

        assert_eq!(result.changes.len(), 9);
        assert_eq!(result.changes.count(Action::NoMove), 9);
        assert_eq!(result.current, result.previous);
        for (_, fish) in sim.grid().creatures() {
            assert_eq!(fish.age(), 4);
            assert_eq!(fish.last_acted(), 1);
        }
    }

    #[test]
    fn test_shark_prefers_fish_over_open_water() {
        // The shark sits at a lower index than the fish, so it acts first
        let mut sim = empty(5, 5, rules(3, 3, 2));
        sim.place(12, Creature::shark(2)).unwrap();
        sim.place(17, Creature::fish()).unwrap();

        let result = sim.update();

        assert_eq!(
            result.changes.as_slice(),
            &[
                Delta::new(Species::Shark, 12, 17, Action::MoveSouth),
                Delta::new(Species::Shark, 12, 17, Action::Ate),
            ]
        );
        assert_eq!(result.current.count(CellState::Fish), 0);
        assert_eq!(result.current.get(17), Some(CellState::Shark));

        let shark = sim.grid().get(17).unwrap();
        assert_eq!(shark.health(), Some(3));
        assert_eq!(shark.age(), 1);
    }

    #[test]
    fn test_shark_at_max_starve_limit_feeds_without_overflow() {
        let mut sim = empty(5, 5, rules(3, u32::MAX, u32::MAX));
        sim.place(12, Creature::shark(u32::MAX)).unwrap();
        sim.place(17, Creature::fish()).unwrap();

        let result = sim.update();

        assert_eq!(result.changes.count(Action::Ate), 1);
        assert_eq!(sim.grid().get(17).unwrap().health(), Some(u32::MAX));
    }

    #[test]
    fn test_coinciding_neighbors_count_once() {
        // On a 2x1 grid north and south are the cell itself, west and east are both cell 1
        let mut sim = empty(2, 1, rules(5, 5, 2));
        sim.place(0, Creature::fish()).unwrap();

        assert_eq!(sim.candidates(0, Species::Fish), vec![1]);

        let result = sim.update();
        assert_eq!(
            result.changes.as_slice(),
            &[Delta::new(Species::Fish, 0, 1, Action::MoveWest)]
        );
        assert_eq!(result.current.get(1), Some(CellState::Fish));
    }

    #[test]
    fn test_open_neighbors_chosen_uniformly() {
        let trials = 4000u64;
        let mut counts = [0u64; 25];

        for seed in 0..trials {
            let mut sim =
                Simulation::empty(5, 5, rules(5, 5, 2), ChaCha8Rng::seed_from_u64(seed)).unwrap();
            sim.place(12, Creature::fish()).unwrap();
            let result = sim.update();
            counts[result.changes.as_slice()[0].to] += 1;
        }

        for cell in [7, 17, 11, 13] {
            let share = counts[cell] as f64 / trials as f64;
            assert!(
                (0.225..=0.275).contains(&share),
                "cell {cell} chosen {share:.3} of the time"
            );
        }
        assert_eq!(counts[7] + counts[17] + counts[11] + counts[13], trials);
    }

    #[test]
    fn test_shark_without_prey_moves_into_open_water() {
        let mut sim = empty(5, 5, rules(3, 3, 2));
        sim.place(12, Creature::shark(2)).unwrap();
        // Still in place when the first shark moves
        sim.place(17, Creature::shark(2)).unwrap();

        let result = sim.update();
        let moved = result.changes.iter().find(|d| d.from == 12).unwrap();
        assert_ne!(moved.to, 17);
        assert_ne!(moved.action, Action::NoMove);
        assert_eq!(result.current.count(CellState::Shark), 2);
        assert_eq!(result.changes.count(Action::Ate), 0);
    }

    #[test]
    fn test_shark_breeds_after_moving() {
        let mut sim = empty(5, 5, rules(3, 3, 3));
        sim.place(12, Creature::shark(3).with_age(3)).unwrap();

        let result = sim.update();

        assert_eq!(result.current.count(CellState::Shark), 2);
        assert_eq!(result.current.get(12), Some(CellState::Shark));
        let last = result.changes.as_slice().last().copied().unwrap();
        assert_eq!(last, Delta::at(Species::Shark, 12, Action::Birth));

        let child = sim.grid().get(12).unwrap();
        assert_eq!(child.health(), Some(3));
        assert_eq!(child.last_acted(), 1);
    }

    #[test]
    fn test_creature_moved_forward_is_not_processed_twice() {
        // On a single row, cell 0 borders 1 (east) and 2 (west, wrapped).
        let mut sim = empty(3, 1, rules(5, 5, 2));
        sim.place(0, Creature::fish()).unwrap();

        let result = sim.update();

        assert_eq!(result.changes.len(), 1);
        let delta = result.changes.as_slice()[0];
        assert!(delta.to == 1 || delta.to == 2);
        assert_eq!(sim.grid().get(delta.to).unwrap().age(), 1);
    }

    #[test]
    fn test_same_seed_same_history() {
        let run = RunConfig {
            world: WorldConfig {
                width: 8,
                height: 6,
                fish_count: 15,
                shark_count: 5,
            },
            simulation: rules(3, 4, 3),
            seed: 99,
            ..Default::default()
        };

        let mut first = Simulation::from_run_config(&run).unwrap();
        let mut second = Simulation::from_run_config(&run).unwrap();
        for _ in 0..20 {
            assert_eq!(first.update(), second.update());
        }
    }

    #[test]
    fn test_run_summary() {
        let mut sim = init(6, 6, 10, 3, rules(3, 3, 2)).unwrap();
        let mut seen = 0;
        let summary = sim.run_with(12, |_| seen += 1);

        assert_eq!(seen, 12);
        assert_eq!(summary.start_tick, 0);
        assert_eq!(summary.final_tick, 12);
        assert_eq!(sim.tick(), 12);
        assert_eq!(summary.final_population, sim.population());
        assert!(summary.peak_fish >= 10);
        assert!(summary.peak_sharks >= 3);
    }

    #[test]
    fn test_run_summary_records_extinction() {
        let mut sim = empty(5, 5, rules(3, 3, 2));
        sim.place(0, Creature::shark(2)).unwrap();

        let summary = sim.run(3);
        assert_eq!(summary.deaths, 1);
        assert_eq!(summary.sharks_extinct_at, Some(2));
        assert_eq!(summary.fish_extinct_at, None);
    }

    #[test]
    fn test_debug_print() {
        let mut sim = empty(3, 2, rules(3, 3, 2));
        sim.place(1, Creature::fish()).unwrap();
        sim.place(3, Creature::shark(2)).unwrap();

        let mut out = Vec::new();
        sim.debug_print(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "*F*\nS**\n");
    }

    #[test]
    fn test_update_result_serialization() {
        let mut sim = init(3, 3, 2, 1, rules(3, 3, 2)).unwrap();
        let result = sim.update();
        let json = serde_json::to_string(&result).unwrap();
        let back: UpdateResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_every_survivor_acts_once_per_tick(
            width in 1usize..=12,
            height in 1usize..=12,
            fish_pct in 0usize..=100,
            shark_pct in 0usize..=100,
            seed in any::<u64>(),
        ) {
            let size = width * height;
            let fish_count = size * fish_pct / 200;
            let shark_count = size * shark_pct / 200;
            let world = WorldConfig { width, height, fish_count, shark_count };
            let mut sim = Simulation::new(
                &world,
                rules(3, 4, 3),
                ChaCha8Rng::seed_from_u64(seed),
            ).unwrap();

            for expected_tick in 1..=6u64 {
                let result = sim.update();
                prop_assert_eq!(sim.tick(), expected_tick);
                prop_assert_eq!(result.current.len(), size);
                prop_assert_eq!(result.previous.len(), size);
                for (_, creature) in sim.grid().creatures() {
                    prop_assert_eq!(creature.last_acted(), expected_tick);
                }

                // Only creatures present before the tick take turns, one move or death each
                let before = result.previous.population().creatures();
                let turns = result
                    .changes
                    .iter()
                    .filter(|d| d.action.is_move() || d.action == Action::Death)
                    .count();
                prop_assert!(turns <= before);
            }
        }
    }
}
