//! Genetic Algorithm framework for optimization.
//!
//! This module defines the domain-independent pieces of the evolutionary
//! loop: the [`Individual`] trait (crossover and mutation live on the
//! individual), the [`GaProblem`] trait (evaluation and seeding live on the
//! problem), and [`GaRunner`], which drives tournament selection, elitism and
//! generational replacement.
//!
//! # Reproducibility
//!
//! Every random draw goes through the RNG handed to the runner, so a run
//! started with [`GaRunner::run_with_seed`] is reproducible. Evaluation must
//! be a pure function of the individual; with the `parallel` feature a
//! generation is evaluated on the rayon pool and the result is unchanged.
//!
//! # Cooperative scheduling
//!
//! [`GaRunner::run_cooperative`] calls a yield hook every
//! [`GaConfig::yield_interval`] generations so a host event loop can breathe.
//! Returning [`ControlFlow::Break`] abandons the run; the best individual seen
//! so far is still returned and [`GaResult::cancelled`] is set.

use rand::prelude::*;
use rand::rngs::StdRng;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the genetic algorithm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaConfig {
    /// Population size.
    pub population_size: usize,
    /// Maximum number of generations.
    pub max_generations: u32,
    /// Crossover rate (0.0 - 1.0).
    pub crossover_rate: f64,
    /// Mutation rate (0.0 - 1.0).
    pub mutation_rate: f64,
    /// Number of elite individuals to preserve each generation.
    pub elite_count: usize,
    /// Tournament size for selection.
    pub tournament_size: usize,
    /// Generations between two calls of the yield hook (0 = never).
    pub yield_interval: u32,
    /// Target fitness to stop early (None = run all generations).
    pub target_fitness: Option<f64>,
    /// Stagnation generations before early stop.
    pub stagnation_limit: Option<u32>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            crossover_rate: 0.85,
            mutation_rate: 0.05,
            elite_count: 5,
            tournament_size: 3,
            yield_interval: 5,
            target_fitness: None,
            stagnation_limit: Some(50),
        }
    }
}

impl GaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the maximum generations.
    pub fn with_max_generations(mut self, gen: u32) -> Self {
        self.max_generations = gen;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size.max(1);
        self
    }

    /// Sets the yield interval in generations.
    pub fn with_yield_interval(mut self, generations: u32) -> Self {
        self.yield_interval = generations;
        self
    }

    /// Sets the target fitness.
    pub fn with_target_fitness(mut self, fitness: f64) -> Self {
        self.target_fitness = Some(fitness);
        self
    }

    /// Sets or clears the stagnation limit.
    pub fn with_stagnation_limit(mut self, limit: Option<u32>) -> Self {
        self.stagnation_limit = limit;
        self
    }
}

/// Trait for individuals in the genetic algorithm.
pub trait Individual: Clone + Send + Sync {
    /// The fitness type (usually f64).
    type Fitness: PartialOrd + Copy + Send;

    /// Returns the fitness of this individual.
    fn fitness(&self) -> Self::Fitness;

    /// Creates a random individual.
    fn random<R: Rng>(rng: &mut R) -> Self;

    /// Performs crossover with another individual.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self;

    /// Mutates this individual in place.
    fn mutate<R: Rng>(&mut self, rng: &mut R);
}

/// Trait for problem-specific GA operations.
pub trait GaProblem: Send + Sync {
    /// The individual type for this problem.
    type Individual: Individual;

    /// Evaluates the fitness of an individual.
    fn evaluate(&self, individual: &mut Self::Individual);

    /// Evaluates a whole generation.
    ///
    /// Sequential unless the `parallel` feature is enabled.
    fn evaluate_batch(&self, individuals: &mut [Self::Individual]) {
        #[cfg(feature = "parallel")]
        individuals.par_iter_mut().for_each(|ind| {
            self.evaluate(ind);
        });

        #[cfg(not(feature = "parallel"))]
        individuals.iter_mut().for_each(|ind| {
            self.evaluate(ind);
        });
    }

    /// Creates an initial population.
    fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Self::Individual> {
        (0..size).map(|_| Self::Individual::random(rng)).collect()
    }

    /// Called after each generation (for progress reporting).
    fn on_generation(
        &self,
        _generation: u32,
        _best: &Self::Individual,
        _population: &[Self::Individual],
    ) {
    }
}

/// Progress information during GA execution.
#[derive(Debug, Clone)]
pub struct GaProgress<F> {
    /// Current generation number.
    pub generation: u32,
    /// Maximum generations configured.
    pub max_generations: u32,
    /// Best fitness so far.
    pub best_fitness: F,
    /// Average fitness of current population.
    pub avg_fitness: f64,
    /// Elapsed time since start.
    pub elapsed: Duration,
    /// Whether the algorithm is still running.
    pub running: bool,
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I: Individual> {
    /// The best individual found.
    pub best: I,
    /// Final generation reached.
    pub generations: u32,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Whether the target fitness was reached.
    pub target_reached: bool,
    /// Whether the run was abandoned through the yield hook.
    pub cancelled: bool,
    /// Fitness history (best fitness per generation).
    pub history: Vec<f64>,
}

/// Genetic algorithm runner.
pub struct GaRunner<P: GaProblem> {
    config: GaConfig,
    problem: P,
}

impl<P: GaProblem> GaRunner<P>
where
    <P::Individual as Individual>::Fitness: Into<f64>,
{
    /// Creates a new GA runner.
    pub fn new(config: GaConfig, problem: P) -> Self {
        Self { config, problem }
    }

    /// Returns the problem being optimized.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs the genetic algorithm with an entropy-seeded RNG.
    pub fn run(&self) -> GaResult<P::Individual> {
        self.run_with_rng(&mut StdRng::from_entropy())
    }

    /// Runs the genetic algorithm with a reproducible RNG.
    pub fn run_with_seed(&self, seed: u64) -> GaResult<P::Individual> {
        self.run_with_rng(&mut StdRng::seed_from_u64(seed))
    }

    /// Runs the genetic algorithm with a specific RNG.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> GaResult<P::Individual> {
        self.run_with_rng_and_progress(
            rng,
            None::<fn(GaProgress<<P::Individual as Individual>::Fitness>)>,
        )
    }

    /// Runs the genetic algorithm with a specific RNG and optional progress callback.
    pub fn run_with_rng_and_progress<R: Rng, F>(
        &self,
        rng: &mut R,
        progress_callback: Option<F>,
    ) -> GaResult<P::Individual>
    where
        F: Fn(GaProgress<<P::Individual as Individual>::Fitness>),
    {
        self.run_cooperative(rng, progress_callback, |_| ControlFlow::Continue(()))
    }

    /// Runs the genetic algorithm, calling `yield_point` with the current
    /// generation every `yield_interval` generations.
    pub fn run_cooperative<R: Rng, F, Y>(
        &self,
        rng: &mut R,
        progress_callback: Option<F>,
        mut yield_point: Y,
    ) -> GaResult<P::Individual>
    where
        F: Fn(GaProgress<<P::Individual as Individual>::Fitness>),
        Y: FnMut(u32) -> ControlFlow<()>,
    {
        let start = Instant::now();
        let mut history = Vec::new();
        let population_size = self.config.population_size.max(1);

        let mut population = self.problem.initialize_population(population_size, rng);
        if population.is_empty() {
            population.push(P::Individual::random(rng));
        }
        self.problem.evaluate_batch(&mut population);
        sort_by_fitness(&mut population);

        let mut best = population[0].clone();
        let mut best_fitness: f64 = best.fitness().into();
        let mut stagnation_count = 0u32;
        let mut generation = 0u32;
        let mut target_reached = false;
        let mut cancelled = false;

        while generation < self.config.max_generations {
            if let Some(target) = self.config.target_fitness {
                if best_fitness >= target {
                    target_reached = true;
                    break;
                }
            }

            if self.config.yield_interval > 0
                && generation > 0
                && generation % self.config.yield_interval == 0
                && yield_point(generation).is_break()
            {
                cancelled = true;
                break;
            }

            history.push(best_fitness);

            let mut new_population = Vec::with_capacity(population_size);

            // Elitism
            for individual in population
                .iter()
                .take(self.config.elite_count.min(population.len()))
            {
                new_population.push(individual.clone());
            }

            let child_count = population_size - new_population.len();
            let mut children: Vec<P::Individual> = Vec::with_capacity(child_count);

            while children.len() < child_count {
                let parent1 = self.tournament_select(&population, rng);
                let parent2 = self.tournament_select(&population, rng);

                let mut child = if rng.gen::<f64>() < self.config.crossover_rate {
                    parent1.crossover(parent2, rng)
                } else {
                    parent1.clone()
                };

                if rng.gen::<f64>() < self.config.mutation_rate {
                    child.mutate(rng);
                }

                children.push(child);
            }

            self.problem.evaluate_batch(&mut children);
            new_population.extend(children);
            sort_by_fitness(&mut new_population);

            let new_best_fitness: f64 = new_population[0].fitness().into();
            if new_best_fitness > best_fitness {
                best = new_population[0].clone();
                best_fitness = new_best_fitness;
                stagnation_count = 0;
            } else {
                stagnation_count += 1;
            }

            self.problem
                .on_generation(generation, &best, &new_population);

            if let Some(ref callback) = progress_callback {
                callback(GaProgress {
                    generation,
                    max_generations: self.config.max_generations,
                    best_fitness: best.fitness(),
                    avg_fitness: average_fitness(&new_population),
                    elapsed: start.elapsed(),
                    running: true,
                });
            }

            population = new_population;
            generation += 1;

            if let Some(limit) = self.config.stagnation_limit {
                if stagnation_count >= limit {
                    break;
                }
            }
        }

        history.push(best_fitness);

        if let Some(ref callback) = progress_callback {
            callback(GaProgress {
                generation,
                max_generations: self.config.max_generations,
                best_fitness: best.fitness(),
                avg_fitness: average_fitness(&population),
                elapsed: start.elapsed(),
                running: false,
            });
        }

        GaResult {
            best,
            generations: generation,
            elapsed: start.elapsed(),
            target_reached,
            cancelled,
            history,
        }
    }

    /// Tournament selection.
    fn tournament_select<'a, R: Rng>(
        &self,
        population: &'a [P::Individual],
        rng: &mut R,
    ) -> &'a P::Individual {
        let mut best_idx = rng.gen_range(0..population.len());

        for _ in 1..self.config.tournament_size {
            let idx = rng.gen_range(0..population.len());
            if population[idx].fitness() > population[best_idx].fitness() {
                best_idx = idx;
            }
        }

        &population[best_idx]
    }
}

/// Sorts by fitness, best first. The sort is stable so equal individuals keep
/// their order and runs stay reproducible.
fn sort_by_fitness<I: Individual>(population: &mut [I]) {
    population.sort_by(|a, b| {
        b.fitness()
            .partial_cmp(&a.fitness())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn average_fitness<I: Individual>(population: &[I]) -> f64
where
    I::Fitness: Into<f64>,
{
    population
        .iter()
        .map(|ind| ind.fitness().into())
        .sum::<f64>()
        / population.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Clone)]
    struct SimpleIndividual {
        value: f64,
    }

    impl Individual for SimpleIndividual {
        type Fitness = f64;

        fn fitness(&self) -> f64 {
            // Maximize: -(x^2), optimal at x=0
            -self.value * self.value
        }

        fn random<R: Rng>(rng: &mut R) -> Self {
            Self {
                value: rng.gen_range(-100.0..100.0),
            }
        }

        fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
            Self {
                value: if rng.gen() { self.value } else { other.value },
            }
        }

        fn mutate<R: Rng>(&mut self, rng: &mut R) {
            self.value += rng.gen_range(-10.0..10.0);
        }
    }

    struct SimpleProblem;

    impl GaProblem for SimpleProblem {
        type Individual = SimpleIndividual;

        fn evaluate(&self, _individual: &mut Self::Individual) {
            // Fitness is computed in Individual::fitness()
        }
    }

    #[test]
    fn test_ga_basic() {
        let config = GaConfig::default()
            .with_population_size(50)
            .with_max_generations(100)
            .with_mutation_rate(0.5)
            .with_target_fitness(-0.01);

        let runner = GaRunner::new(config, SimpleProblem);
        let result = runner.run_with_seed(7);

        assert!(result.best.value.abs() < 5.0);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_ga_seeded_runs_are_identical() {
        let config = GaConfig::default()
            .with_population_size(20)
            .with_max_generations(15);

        let a = GaRunner::new(config.clone(), SimpleProblem).run_with_seed(42);
        let b = GaRunner::new(config, SimpleProblem).run_with_seed(42);

        assert_eq!(a.best.value, b.best.value);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_yield_hook_interval_and_break() {
        let config = GaConfig::default()
            .with_population_size(10)
            .with_max_generations(20)
            .with_stagnation_limit(None)
            .with_yield_interval(4);
        let runner = GaRunner::new(config, SimpleProblem);

        let calls = Cell::new(0u32);
        let result = runner.run_cooperative(
            &mut StdRng::seed_from_u64(1),
            None::<fn(GaProgress<f64>)>,
            |generation| {
                assert_eq!(generation % 4, 0);
                calls.set(calls.get() + 1);
                if calls.get() == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );

        assert_eq!(calls.get(), 2);
        assert!(result.cancelled);
        assert_eq!(result.generations, 8);
    }

    #[test]
    fn test_yielding_does_not_change_result() {
        let config = GaConfig::default()
            .with_population_size(16)
            .with_max_generations(12)
            .with_stagnation_limit(None)
            .with_yield_interval(3);

        let quiet = GaRunner::new(config.clone(), SimpleProblem).run_with_seed(9);
        let chatty = GaRunner::new(config, SimpleProblem).run_cooperative(
            &mut StdRng::seed_from_u64(9),
            Some(|_: GaProgress<f64>| {}),
            |_| ControlFlow::Continue(()),
        );

        assert_eq!(quiet.best.value, chatty.best.value);
        assert_eq!(quiet.generations, chatty.generations);
    }
}
