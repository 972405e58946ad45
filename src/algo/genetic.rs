use crate::core::{makespan, Assignment, ConfigError, Instance, Schedule, Scheduler};
use rand::prelude::*;
use rand::seq::index;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters of the genetic algorithm.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub seed: u64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 200,
            mutation_rate: 0.1,
            seed: 0,
        }
    }
}

impl GeneticConfig {
    /// Checks the configuration before any generation runs.
    ///
    /// # Errors
    /// - If the mutation rate is outside `[0, 1]`.
    /// - If there are no generations.
    /// - If the population has fewer than 2 individuals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRate(self.mutation_rate));
        }
        if self.generations < 1 {
            return Err(ConfigError::Generations);
        }
        if self.population_size < 2 {
            return Err(ConfigError::PopulationSize(self.population_size));
        }
        Ok(())
    }
}

/// Best assignment found during a run, with the best makespan after every generation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Evolution {
    pub best: Assignment,
    pub makespan: u64,
    pub history: Vec<u64>,
}

/// Performs a genetic algorithm over job-to-node assignments.
/// Fitness is the makespan computed by the simulator.
#[derive(Clone, Debug)]
pub struct Genetic {
    config: GeneticConfig,
    rng: StdRng,
}

impl Genetic {
    /// Creates a new genetic algorithm.
    ///
    /// # Errors
    /// - If the configuration is invalid.
    pub fn new(config: GeneticConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self { config, rng })
    }

    /// Runs all configured generations on the instance.
    /// The best solution is kept aside and never put back into the population.
    pub fn optimize(&mut self, instance: &Instance) -> Evolution {
        let size = self.config.population_size;
        if size % 2 == 1 {
            log::warn!("Odd population size {size}, one child per generation is dropped");
        }
        if !instance.is_acyclic() {
            log::warn!("Precedence graph has a cycle, it will be broken during simulation");
        }
        log::info!(
            "Evolving {size} assignments of {} jobs on {} nodes for {} generations",
            instance.jobs().len(),
            instance.nodes().len(),
            self.config.generations
        );

        let mut population: Vec<_> = (0..size)
            .map(|_| Assignment::random(instance, &mut self.rng))
            .collect();
        let mut best: Option<Individual> = None;
        let mut history = Vec::with_capacity(self.config.generations);

        for generation in 0..self.config.generations {
            let mut scored = evaluate(population, instance);
            scored.sort_by_key(|individual| individual.makespan);

            if improve(&mut best, &scored[0]) {
                log::debug!("Generation {generation}: new best {}", scored[0].makespan);
            }
            let best_makespan = best.as_ref().map_or(0, |b| b.makespan);
            log::trace!("Generation {generation}: best {best_makespan}");
            history.push(best_makespan);

            population = self.breed(&scored[..size / 2], instance.nodes().len());
        }

        let Some(best) = best else {
            unreachable!("At least one generation is always run")
        };
        log::info!("Best makespan found: {}", best.makespan);

        Evolution {
            best: best.assignment,
            makespan: best.makespan,
            history,
        }
    }

    fn breed(&mut self, pool: &[Individual], nodes: usize) -> Vec<Assignment> {
        let size = self.config.population_size;
        let rate = self.config.mutation_rate;
        let mut next = Vec::with_capacity(size);

        while next.len() < size {
            let (first, second) = self.parents(pool);
            let (mut first, mut second) = crossover(first, second, &mut self.rng);

            mutate(&mut first, nodes, rate, &mut self.rng);
            next.push(first);

            if next.len() < size {
                mutate(&mut second, nodes, rate, &mut self.rng);
                next.push(second);
            }
        }

        next
    }

    /// Draws two distinct parents from the mating pool.
    /// A pool of one individual gives it as both parents.
    fn parents<'p>(&mut self, pool: &'p [Individual]) -> (&'p Assignment, &'p Assignment) {
        if pool.len() < 2 {
            return (&pool[0].assignment, &pool[0].assignment);
        }
        let picked = index::sample(&mut self.rng, pool.len(), 2);
        (
            &pool[picked.index(0)].assignment,
            &pool[picked.index(1)].assignment,
        )
    }
}

impl Default for Genetic {
    fn default() -> Self {
        let config = GeneticConfig::default();
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }
}

impl Scheduler for Genetic {
    fn schedule<'a>(&mut self, instance: &'a Instance) -> Schedule<'a> {
        if instance.jobs().is_empty() {
            return Schedule::empty(instance);
        }

        Schedule::new(instance, self.optimize(instance).best)
    }

    fn name(&self) -> &'static str {
        "Genetic"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn() -> Box<dyn Scheduler> = || Box::new(Genetic::default());

#[derive(Clone, Debug, Eq, PartialEq)]
struct Individual {
    assignment: Assignment,
    makespan: u64,
}

/// Replaces the best individual only by a strictly better candidate.
fn improve(best: &mut Option<Individual>, candidate: &Individual) -> bool {
    if best.as_ref().is_some_and(|b| b.makespan <= candidate.makespan) {
        return false;
    }
    *best = Some(candidate.clone());
    true
}

/// Scores every assignment in parallel, keeping the population order.
fn evaluate(population: Vec<Assignment>, instance: &Instance) -> Vec<Individual> {
    population
        .into_par_iter()
        .map(|assignment| Individual {
            makespan: makespan(instance, &assignment),
            assignment,
        })
        .collect()
}

/// Single-point crossover at a uniform point in `[1, len - 1]`.
/// Assignments shorter than 2 genes are copied unchanged.
pub fn crossover(
    first: &Assignment,
    second: &Assignment,
    rng: &mut impl Rng,
) -> (Assignment, Assignment) {
    if first.len() < 2 {
        return (first.clone(), second.clone());
    }
    let point = rng.gen_range(1..first.len());
    crossover_at(first, second, point)
}

/// Single-point crossover at the given point.
/// The first child takes the head of `first` and the tail of `second`, the second child the reverse.
#[must_use]
pub fn crossover_at(first: &Assignment, second: &Assignment, point: usize) -> (Assignment, Assignment) {
    let (head1, tail1) = first.genes().split_at(point);
    let (head2, tail2) = second.genes().split_at(point);
    (
        Assignment::from_genes([head1, tail2].concat()),
        Assignment::from_genes([head2, tail1].concat()),
    )
}

/// Redraws every gene with probability `rate` from a uniform node in `0..nodes`.
pub fn mutate(assignment: &mut Assignment, nodes: usize, rate: f64, rng: &mut impl Rng) {
    for gene in assignment.genes_mut() {
        if rng.gen_bool(rate) {
            *gene = rng.gen_range(0..nodes);
        }
    }
}
