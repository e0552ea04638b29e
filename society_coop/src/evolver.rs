use des::{Agent, EventLoop, Response};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info};

use crate::config::EvolverConfig;
use crate::error::{Result, SimError};
use crate::observer::Observer;
use crate::operators::{crossover_pairs, mutate_all, select_tournament};
use crate::output::EvolutionReport;
use crate::simulator::{random_population, Simulator};
use crate::stats::{GenerationRecord, PopulationSnapshot};
use crate::{Event, EvolutionStats, Stats};

/// Runs the genetic algorithm as a single agent in the event loop.
///
/// Owns the only RNG of the run. Every random draw (initial population,
/// match pairing, selection, crossover, mutation and agent resets) comes from
/// it in a fixed order, so one seed gives one result.
pub struct Evolver {
    config: EvolverConfig,
    rng: StdRng,
    simulator: Option<Simulator>,
    observers: Vec<Box<dyn Observer>>,

    initial: Option<GenerationRecord>,
    generations: Vec<GenerationRecord>,
    matches_played: usize,
    complete: bool,
    failure: Option<SimError>,
}

impl Evolver {
    pub fn new(config: EvolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: EvolverConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.random_seed);
        Evolver {
            config,
            rng,
            simulator: None,
            observers: Vec::new(),
            initial: None,
            generations: Vec::new(),
            matches_played: 0,
            complete: false,
            failure: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Upper bound on the event times of a full run
    pub fn horizon(&self) -> usize {
        let per_era = self.config.matches_per_era.saturating_add(3);
        self.config
            .generations
            .saturating_add(1)
            .saturating_mul(per_era)
            .saturating_add(2)
    }

    fn start(&mut self, current_t: usize) -> Result<Response<Event, Stats>> {
        info!(
            seed = self.config.random_seed,
            generations = self.config.generations,
            population = self.config.population_size,
            memory = self.config.memory_length,
            "Starting evolution"
        );
        let population = random_population(
            self.config.population_size,
            self.config.memory_length,
            &mut self.rng,
        )?;
        self.simulator = Some(Simulator::new(population)?);
        Ok(Response::event(
            current_t + 1,
            Event::EraStart { generation: 0 },
        ))
    }

    fn play_match(
        &mut self,
        current_t: usize,
        generation: usize,
        index: usize,
    ) -> Result<Response<Event, Stats>> {
        let simulator = active(&mut self.simulator)?;
        let outcome = simulator.step(&mut self.rng)?;
        self.matches_played += 1;
        for observer in &mut self.observers {
            observer.on_match(generation, &outcome);
        }

        let next = if index + 1 < self.config.matches_per_era {
            Event::Match {
                generation,
                index: index + 1,
            }
        } else {
            Event::EraComplete { generation }
        };
        Ok(Response::event(current_t + 1, next))
    }

    fn complete_era(
        &mut self,
        current_t: usize,
        generation: usize,
    ) -> Result<Response<Event, Stats>> {
        let simulator = active(&mut self.simulator)?;
        let record = GenerationRecord {
            generation,
            fitness: simulator.get_stats()?,
            counts: simulator.get_counts(),
        };
        let snapshot = simulator.snapshot();

        info!(
            generation,
            min = record.fitness.min,
            mean = record.fitness.mean,
            median = record.fitness.median,
            max = record.fitness.max,
            saints = record.counts.saints,
            buddies = record.counts.buddies,
            fight_club = record.counts.fight_club,
            vandals = record.counts.vandals,
            "Era complete"
        );

        for observer in &mut self.observers {
            observer.on_era_complete(&record, &snapshot);
        }
        if generation == 0 {
            self.initial = Some(record);
        } else {
            self.generations.push(record);
        }

        let next = if generation < self.config.generations {
            Event::Reproduction { generation }
        } else {
            Event::EvolutionComplete
        };
        Ok(Response::event(current_t + 1, next))
    }

    fn reproduce(&mut self, current_t: usize, generation: usize) -> Result<Response<Event, Stats>> {
        debug!(generation, "Breeding next generation");
        let simulator = active(&mut self.simulator)?;

        let mut offspring = select_tournament(
            simulator.population(),
            self.config.tournament_size,
            &mut self.rng,
        )?;
        crossover_pairs(&mut offspring, self.config.crossover_rate, &mut self.rng);
        mutate_all(&mut offspring, self.config.mutation_rate, &mut self.rng);

        simulator.replace_population(offspring)?;
        simulator.reset_agents(&mut self.rng);

        Ok(Response::event(
            current_t + 1,
            Event::EraStart {
                generation: generation + 1,
            },
        ))
    }

    fn handle(&mut self, current_t: usize, event: &Event) -> Result<Response<Event, Stats>> {
        match event {
            Event::EvolutionStart => self.start(current_t).map_err(|e| e.in_generation(0)),
            Event::EraStart { generation } => {
                debug!(generation, matches = self.config.matches_per_era, "Era start");
                Ok(Response::event(
                    current_t + 1,
                    Event::Match {
                        generation: *generation,
                        index: 0,
                    },
                ))
            }
            Event::Match { generation, index } => self
                .play_match(current_t, *generation, *index)
                .map_err(|e| e.in_generation(*generation)),
            Event::EraComplete { generation } => self
                .complete_era(current_t, *generation)
                .map_err(|e| e.in_generation(*generation)),
            Event::Reproduction { generation } => self
                .reproduce(current_t, *generation)
                .map_err(|e| e.in_generation(*generation + 1)),
            Event::EvolutionComplete => {
                self.complete = true;
                info!(
                    generations = self.generations.len(),
                    matches = self.matches_played,
                    "Evolution complete"
                );
                Ok(Response::new())
            }
        }
    }
}

impl Agent<Event, Stats> for Evolver {
    fn act(&mut self, current_t: usize, event: &Event) -> Response<Event, Stats> {
        if self.failure.is_some() || self.complete {
            return Response::new();
        }
        match self.handle(current_t, event) {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Evolution aborted");
                self.failure = Some(e);
                Response::new()
            }
        }
    }

    fn stats(&self) -> Stats {
        Stats::Evolution(EvolutionStats {
            config: self.config.clone(),
            initial: self.initial.clone(),
            generations: self.generations.clone(),
            matches_played: self.matches_played,
            final_snapshot: self
                .simulator
                .as_ref()
                .map(Simulator::snapshot)
                .unwrap_or_else(PopulationSnapshot::default),
            complete: self.complete,
            failure: self.failure.clone(),
        })
    }
}

fn active(simulator: &mut Option<Simulator>) -> Result<&mut Simulator> {
    simulator.as_mut().ok_or(SimError::InvalidPopulation {
        size: 0,
        reason: "no population has been initialised",
    })
}

/// Event loop holding one evolver, primed with `EvolutionStart`
pub fn build_event_loop(evolver: Evolver) -> (EventLoop<Event, Stats>, usize) {
    let horizon = evolver.horizon();
    let agents: Vec<Box<dyn Agent<Event, Stats>>> = vec![Box::new(evolver)];
    (EventLoop::new(vec![(0, Event::EvolutionStart)], agents), horizon)
}

/// Run the whole genetic algorithm for `config`
pub fn run_evolution(config: &EvolverConfig) -> Result<EvolutionReport> {
    run_evolution_with(config, Vec::new())
}

/// Run the genetic algorithm, notifying `observers` of every match and era
pub fn run_evolution_with(
    config: &EvolverConfig,
    observers: Vec<Box<dyn Observer>>,
) -> Result<EvolutionReport> {
    let mut evolver = Evolver::new(config.clone())?;
    for observer in observers {
        evolver = evolver.with_observer(observer);
    }

    let (mut event_loop, horizon) = build_event_loop(evolver);
    event_loop.run(horizon);

    let stats = event_loop
        .stats()
        .into_iter()
        .next()
        .ok_or(SimError::Incomplete {
            recorded: 0,
            expected: config.generations,
        })?;
    let Stats::Evolution(stats) = stats;
    EvolutionReport::from_stats(stats)
}
