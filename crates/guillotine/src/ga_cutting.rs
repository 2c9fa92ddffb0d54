//! Genetic search over rotation and grouping genes.
//!
//! A chromosome carries one rotation bit per piece and the three grouping
//! genes (strategy, tolerance, maximum group size). Decoding applies the
//! rotations, groups, sorts canonically and simulates sheets with the
//! placement engine until the working copy runs out or a sheet stalls.
//!
//! Fitness is the average sheet utilization, minus a penalty per stalled
//! sheet, plus a small bonus for sheets whose leftover is one contiguous
//! rectangle. Evaluation is a pure function of the chromosome, so the best
//! tree is rebuilt by decoding the winner once more after the run.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;

use rand::prelude::*;
use rand::rngs::StdRng;
use u_cutplan_core::ga::{GaConfig, GaProblem, GaProgress, GaRunner, Individual};
use u_cutplan_core::{Config, ProgressInfo};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grouping::{search_space, GroupingParams, GroupingStrategy};
use crate::piece::{sort_canonical, unfuse_all, Piece};
use crate::placement::PlacementEngine;
use crate::tree::CutTree;
use crate::void_fill::collect_voids;

/// Configuration of the cutting GA.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CuttingGaConfig {
    /// Evolution parameters.
    pub ga: GaConfig,
    /// Upper bound on sheets simulated per evaluation.
    ///
    /// A simulation normally runs until the inventory is used up; the cap
    /// bounds the cost of one evaluation on large inventories, where the
    /// first sheets dominate the fitness anyway. Defaults to 8.
    pub max_simulated_sheets: usize,
    /// Share of rotation bits flipped by a rotation mutation.
    pub rotation_flip_rate: f64,
    /// Relative weights of the four mutations: rotation flips, grouping
    /// strategy, tolerance, maximum group size.
    pub mutation_weights: [f64; 4],
    /// Fitness penalty per simulated sheet that placed nothing.
    pub stall_penalty: f64,
    /// Fitness weight of the average leftover continuity.
    pub continuity_weight: f64,
}

impl Default for CuttingGaConfig {
    fn default() -> Self {
        Self {
            ga: GaConfig::default()
                .with_population_size(30)
                .with_max_generations(20)
                .with_elite_count(2)
                .with_tournament_size(4)
                .with_crossover_rate(0.9)
                .with_mutation_rate(0.3)
                .with_yield_interval(5)
                .with_stagnation_limit(None),
            max_simulated_sheets: 8,
            rotation_flip_rate: 0.15,
            mutation_weights: [0.4, 0.3, 0.15, 0.15],
            stall_penalty: 0.05,
            continuity_weight: 0.02,
        }
    }
}

impl CuttingGaConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.ga = self.ga.with_population_size(size);
        self
    }

    /// Sets the generation count.
    pub fn with_generations(mut self, generations: u32) -> Self {
        self.ga = self.ga.with_max_generations(generations);
        self
    }

    /// Sets the yield interval in generations.
    pub fn with_yield_interval(mut self, generations: u32) -> Self {
        self.ga = self.ga.with_yield_interval(generations);
        self
    }

    /// Sets the simulated sheet cap.
    pub fn with_max_simulated_sheets(mut self, sheets: usize) -> Self {
        self.max_simulated_sheets = sheets.max(1);
        self
    }

    /// Sets the mutation weights.
    pub fn with_mutation_weights(mut self, weights: [f64; 4]) -> Self {
        self.mutation_weights = weights;
        self
    }
}

/// Values the grouping genes may take.
#[derive(Debug, Clone, Default)]
pub struct GeneSpace {
    tolerances: Vec<f64>,
    group_sizes: Vec<Option<usize>>,
    flip_rate: f64,
    weights: [f64; 4],
}

impl GeneSpace {
    fn new(config: &Config, ga: &CuttingGaConfig) -> Self {
        let mut tolerances = vec![0.0];
        tolerances.extend(config.fuzzy_tolerances.iter().copied().filter(|&t| t > 0.0));
        let mut group_sizes = vec![None];
        group_sizes.extend(config.max_group_sizes.iter().copied().filter(Option::is_some));
        Self {
            tolerances,
            group_sizes,
            flip_rate: ga.rotation_flip_rate,
            weights: ga.mutation_weights,
        }
    }

    fn random_grouping<R: Rng>(&self, rng: &mut R) -> GroupingParams {
        let strategy = GroupingStrategy::SEARCHED
            .choose(rng)
            .copied()
            .unwrap_or_default();
        GroupingParams {
            strategy,
            tolerance: self.tolerances.choose(rng).copied().unwrap_or(0.0),
            max_group_size: self.group_sizes.choose(rng).copied().flatten(),
        }
    }
}

/// Chromosome of the cutting GA.
#[derive(Debug, Clone)]
pub struct CuttingChromosome {
    /// Rotation bit per piece of the expanded inventory.
    pub rotations: Vec<bool>,
    /// Grouping genes.
    pub grouping: GroupingParams,
    space: Arc<GeneSpace>,
    fitness: f64,
    utilization: f64,
    sheets: usize,
}

impl CuttingChromosome {
    fn new(rotations: Vec<bool>, grouping: GroupingParams, space: Arc<GeneSpace>) -> Self {
        Self {
            rotations,
            grouping,
            space,
            fitness: f64::NEG_INFINITY,
            utilization: 0.0,
            sheets: 0,
        }
    }

    /// Creates a random chromosome for `pieces` pieces.
    pub fn random_with_space<R: Rng>(pieces: usize, space: Arc<GeneSpace>, rng: &mut R) -> Self {
        let rotations = (0..pieces).map(|_| rng.gen_bool(0.5)).collect();
        let grouping = space.random_grouping(rng);
        Self::new(rotations, grouping, space)
    }

    /// Average utilization of the simulated sheets.
    pub fn utilization(&self) -> f64 {
        self.utilization
    }

    /// Number of simulated sheets.
    pub fn sheets(&self) -> usize {
        self.sheets
    }

    /// Uniform crossover of every gene.
    pub fn uniform_crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        let rotations = self
            .rotations
            .iter()
            .zip(&other.rotations)
            .map(|(&a, &b)| if rng.gen() { a } else { b })
            .collect();
        let (a, b) = (&self.grouping, &other.grouping);
        let grouping = GroupingParams {
            strategy: if rng.gen() { a.strategy } else { b.strategy },
            tolerance: if rng.gen() { a.tolerance } else { b.tolerance },
            max_group_size: if rng.gen() {
                a.max_group_size
            } else {
                b.max_group_size
            },
        };
        Self::new(rotations, grouping, self.space.clone())
    }

    /// Flips a share of the rotation bits.
    pub fn flip_rotations<R: Rng>(&mut self, rng: &mut R) {
        if self.rotations.is_empty() {
            return;
        }
        let count = ((self.rotations.len() as f64 * self.space.flip_rate).round() as usize).max(1);
        for _ in 0..count {
            let i = rng.gen_range(0..self.rotations.len());
            self.rotations[i] = !self.rotations[i];
        }
        self.fitness = f64::NEG_INFINITY;
    }
}

impl Individual for CuttingChromosome {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    /// A chromosome over no pieces and an empty gene space.
    ///
    /// The runner only falls back to this when the problem returns an empty
    /// population. [`CuttingProblem`] always returns `size.max(1)`
    /// chromosomes built from its own gene space, so this one never enters a
    /// cutting run.
    fn random<R: Rng>(rng: &mut R) -> Self {
        Self::random_with_space(0, Arc::new(GeneSpace::default()), rng)
    }

    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        self.uniform_crossover(other, rng)
    }

    fn mutate<R: Rng>(&mut self, rng: &mut R) {
        let weights = self.space.weights;
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return;
        }
        let mut draw = rng.gen::<f64>() * total;
        let mut choice = weights.len() - 1;
        for (i, w) in weights.iter().enumerate() {
            if draw < *w {
                choice = i;
                break;
            }
            draw -= w;
        }

        let space = self.space.clone();
        match choice {
            0 => self.flip_rotations(rng),
            1 => {
                if let Some(&s) = GroupingStrategy::SEARCHED.choose(rng) {
                    self.grouping.strategy = s;
                }
            }
            2 => {
                if let Some(&t) = space.tolerances.choose(rng) {
                    self.grouping.tolerance = t;
                }
            }
            _ => {
                if let Some(&s) = space.group_sizes.choose(rng) {
                    self.grouping.max_group_size = s;
                }
            }
        }
        self.fitness = f64::NEG_INFINITY;
    }
}

/// Decoded chromosome.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Fitness value.
    pub fitness: f64,
    /// Average utilization over simulated sheets.
    pub utilization: f64,
    /// Sheets simulated.
    pub sheets: usize,
    /// Sheets that placed nothing.
    pub stalls: usize,
    /// Tree of the first sheet.
    pub first_tree: CutTree,
    /// Pieces the first sheet left over, as original units.
    pub first_unplaced: Vec<Piece>,
}

/// Largest free rectangle over all free area of a sheet (1 when nothing or
/// only one rectangle is free).
pub fn continuity(tree: &CutTree) -> f64 {
    let free = tree.usable_area() - tree.placed_area();
    if free <= 0.0 {
        return 1.0;
    }
    let sheet_rest =
        (tree.usable_width() - tree.used_along(tree.root())) * tree.usable_height();
    let largest = collect_voids(tree)
        .iter()
        .map(|v| v.area())
        .fold(sheet_rest, f64::max);
    (largest / free).clamp(0.0, 1.0)
}

/// GA problem: pieces of one job on one sheet size.
pub struct CuttingProblem {
    pieces: Vec<Piece>,
    config: Config,
    ga: CuttingGaConfig,
    engine: PlacementEngine,
    space: Arc<GeneSpace>,
}

impl CuttingProblem {
    /// Creates the problem for `pieces` (original, unfused rectangles).
    pub fn new(
        pieces: Vec<Piece>,
        config: &Config,
        ga: CuttingGaConfig,
        usable_width: f64,
        usable_height: f64,
    ) -> Self {
        let space = Arc::new(GeneSpace::new(config, &ga));
        Self {
            pieces,
            config: config.clone(),
            engine: PlacementEngine::new(config, usable_width, usable_height),
            ga,
            space,
        }
    }

    /// Number of rotation genes.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// The seeded starting chromosomes: one per grouping combination of the
    /// strategy search, without rotations.
    pub fn seeds(&self) -> Vec<CuttingChromosome> {
        search_space(&self.config)
            .into_iter()
            .map(|grouping| {
                CuttingChromosome::new(vec![false; self.pieces.len()], grouping, self.space.clone())
            })
            .collect()
    }

    /// Working queue of a chromosome.
    pub fn build_pieces(&self, chromosome: &CuttingChromosome) -> Vec<Piece> {
        let oriented: Vec<Piece> = self
            .pieces
            .iter()
            .zip(chromosome.rotations.iter().chain(std::iter::repeat(&false)))
            .map(|(p, &r)| if r { p.rotated() } else { p.clone() })
            .collect();
        let mut work = chromosome.grouping.apply(
            &oriented,
            self.engine.usable_width(),
            self.engine.usable_height(),
        );
        sort_canonical(&mut work);
        work
    }

    /// Simulates sheets for a chromosome.
    pub fn simulate(&self, chromosome: &CuttingChromosome) -> Simulation {
        let mut remaining = self.build_pieces(chromosome);
        let mut first: Option<(CutTree, Vec<Piece>)> = None;
        let mut utilization = 0.0;
        let mut continuity_sum = 0.0;
        let mut sheets = 0;
        let mut stalls = 0;

        while !remaining.is_empty() && sheets < self.ga.max_simulated_sheets {
            let outcome = self.engine.run(remaining);
            let placed = outcome.placed_count();
            utilization += outcome.tree.utilization();
            continuity_sum += continuity(&outcome.tree);
            sheets += 1;
            remaining = outcome.unplaced;
            if first.is_none() {
                first = Some((outcome.tree, unfuse_all(remaining.clone())));
            }
            if placed == 0 {
                stalls += 1;
                break;
            }
        }

        let (first_tree, first_unplaced) = first.unwrap_or_else(|| {
            (
                CutTree::new(self.engine.usable_width(), self.engine.usable_height()),
                Vec::new(),
            )
        });
        let (avg_util, avg_continuity) = if sheets > 0 {
            (utilization / sheets as f64, continuity_sum / sheets as f64)
        } else {
            (0.0, 0.0)
        };
        let fitness = (avg_util - self.ga.stall_penalty * stalls as f64
            + self.ga.continuity_weight * avg_continuity)
            .max(0.0);

        Simulation {
            fitness,
            utilization: avg_util,
            sheets,
            stalls,
            first_tree,
            first_unplaced,
        }
    }
}

impl GaProblem for CuttingProblem {
    type Individual = CuttingChromosome;

    fn evaluate(&self, individual: &mut Self::Individual) {
        let sim = self.simulate(individual);
        individual.fitness = sim.fitness;
        individual.utilization = sim.utilization;
        individual.sheets = sim.sheets;
    }

    fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Self::Individual> {
        let mut population = self.seeds();
        let size = size.max(1);
        population.truncate(size);
        while population.len() < size {
            population.push(CuttingChromosome::random_with_space(
                self.pieces.len(),
                self.space.clone(),
                rng,
            ));
        }
        population
    }

    fn on_generation(&self, generation: u32, best: &Self::Individual, _population: &[Self::Individual]) {
        log::debug!(
            "generation {}: fitness={:.4}, utilization={:.1}%, sheets={}, grouping={:?}",
            generation,
            best.fitness,
            best.utilization * 100.0,
            best.sheets,
            best.grouping.strategy
        );
    }
}

/// Result of a genetic search.
#[derive(Debug, Clone)]
pub struct GeneticOutcome {
    /// First-sheet tree of the best chromosome.
    pub tree: CutTree,
    /// Pieces the first sheet left over.
    pub unplaced: Vec<Piece>,
    /// Best chromosome.
    pub best: CuttingChromosome,
    /// Best fitness.
    pub fitness: f64,
    /// Generations run.
    pub generations: u32,
    /// Whether the yield hook abandoned the run.
    pub cancelled: bool,
    /// Best fitness per generation.
    pub history: Vec<f64>,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
}

/// Genetic search over one sheet size.
#[derive(Debug, Clone)]
pub struct GeneticSearch {
    config: Config,
    ga: CuttingGaConfig,
    usable_width: f64,
    usable_height: f64,
}

impl GeneticSearch {
    /// Creates the search.
    pub fn new(config: &Config, ga: CuttingGaConfig, usable_width: f64, usable_height: f64) -> Self {
        Self {
            config: config.clone(),
            ga,
            usable_width,
            usable_height,
        }
    }

    /// Runs with a seeded generator, without progress reporting.
    pub fn run(&self, pieces: &[Piece], seed: u64) -> GeneticOutcome {
        self.run_with(pieces, seed, |_| {}, |_| ControlFlow::Continue(()))
    }

    /// Runs with a progress callback and a yield hook called every
    /// `yield_interval` generations. Breaking from the hook stops the run
    /// and returns the best chromosome seen so far.
    pub fn run_with<P, Y>(&self, pieces: &[Piece], seed: u64, progress: P, yield_point: Y) -> GeneticOutcome
    where
        P: Fn(ProgressInfo),
        Y: FnMut(u32) -> ControlFlow<()>,
    {
        let start = Instant::now();
        let problem = CuttingProblem::new(
            unfuse_all(pieces.to_vec()),
            &self.config,
            self.ga.clone(),
            self.usable_width,
            self.usable_height,
        );

        if problem.piece_count() == 0 {
            let best = CuttingChromosome::new(Vec::new(), GroupingParams::none(), problem.space.clone());
            return GeneticOutcome {
                tree: CutTree::new(self.usable_width, self.usable_height),
                unplaced: Vec::new(),
                best,
                fitness: 0.0,
                generations: 0,
                cancelled: false,
                history: Vec::new(),
                elapsed_ms: 0,
            };
        }

        let runner = GaRunner::new(self.ga.ga.clone(), problem);
        let report = |p: GaProgress<f64>| {
            let info = ProgressInfo::new()
                .with_phase("genetic")
                .with_iteration(p.generation.min(p.max_generations), p.max_generations)
                .with_fitness(p.best_fitness)
                .with_elapsed(p.elapsed.as_millis() as u64);
            progress(if p.running { info } else { info.finished() });
        };
        let result = runner.run_cooperative(&mut StdRng::seed_from_u64(seed), Some(report), yield_point);

        let sim = runner.problem().simulate(&result.best);
        log::info!(
            "genetic search: {} generations, fitness {:.4}, first sheet {:.1}%",
            result.generations,
            sim.fitness,
            sim.first_tree.utilization() * 100.0
        );

        GeneticOutcome {
            tree: sim.first_tree,
            unplaced: sim.first_unplaced,
            fitness: result.best.fitness(),
            best: result.best,
            generations: result.generations,
            cancelled: result.cancelled,
            history: result.history,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn small_ga() -> CuttingGaConfig {
        CuttingGaConfig::default()
            .with_population_size(12)
            .with_generations(4)
    }

    fn mixed_pieces() -> Vec<Piece> {
        vec![
            Piece::new(700.0, 300.0),
            Piece::new(650.0, 310.0),
            Piece::new(400.0, 400.0),
            Piece::new(300.0, 200.0),
            Piece::new(300.0, 200.0),
            Piece::new(120.0, 90.0),
        ]
    }

    #[test]
    fn test_seeds_follow_search_space() {
        let config = Config::default();
        let problem = CuttingProblem::new(mixed_pieces(), &config, small_ga(), 2000.0, 1000.0);
        let seeds = problem.seeds();
        let space = search_space(&config);
        assert_eq!(seeds.len(), space.len());
        for (seed, params) in seeds.iter().zip(&space) {
            assert_eq!(&seed.grouping, params);
            assert!(seed.rotations.iter().all(|r| !r));
        }

        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(problem.initialize_population(30, &mut rng).len(), 30);
        assert_eq!(problem.initialize_population(5, &mut rng).len(), 5);
    }

    #[test]
    fn test_population_is_never_empty() {
        let problem = CuttingProblem::new(mixed_pieces(), &Config::default(), small_ga(), 2000.0, 1000.0);
        let mut rng = StdRng::seed_from_u64(5);
        let population = problem.initialize_population(0, &mut rng);
        assert_eq!(population.len(), 1);
        assert_eq!(population[0].rotations.len(), problem.piece_count());
    }

    #[test]
    fn test_simulation_stops_at_sheet_cap() {
        let squares = vec![Piece::new(600.0, 600.0); 3];
        let config = Config::default();

        let full = CuttingProblem::new(squares.clone(), &config, small_ga(), 1000.0, 1000.0);
        let seeds = full.seeds();
        let seed = &seeds[0];
        assert_eq!(full.simulate(seed).sheets, 3);

        let capped = CuttingProblem::new(
            squares,
            &config,
            small_ga().with_max_simulated_sheets(2),
            1000.0,
            1000.0,
        );
        let sim = capped.simulate(seed);
        assert_eq!(sim.sheets, 2);
        assert_eq!(sim.stalls, 0);
    }

    #[test]
    fn test_crossover_keeps_gene_count() {
        let space = Arc::new(GeneSpace::new(&Config::default(), &CuttingGaConfig::default()));
        let mut rng = StdRng::seed_from_u64(11);
        let a = CuttingChromosome::random_with_space(9, space.clone(), &mut rng);
        let b = CuttingChromosome::random_with_space(9, space, &mut rng);
        let child = a.crossover(&b, &mut rng);
        assert_eq!(child.rotations.len(), 9);
        for (i, bit) in child.rotations.iter().enumerate() {
            assert!(*bit == a.rotations[i] || *bit == b.rotations[i]);
        }
    }

    #[test]
    fn test_rotation_mutation_flips_bits() {
        let ga = CuttingGaConfig::default().with_mutation_weights([1.0, 0.0, 0.0, 0.0]);
        let space = Arc::new(GeneSpace::new(&Config::default(), &ga));
        let mut chromosome = CuttingChromosome::new(vec![false; 20], GroupingParams::none(), space);
        let mut rng = StdRng::seed_from_u64(5);
        chromosome.mutate(&mut rng);
        assert!(chromosome.rotations.iter().any(|&r| r));
        assert_eq!(chromosome.grouping, GroupingParams::none());
    }

    #[test]
    fn test_continuity_of_empty_and_full_sheets() {
        let empty = CutTree::new(1000.0, 500.0);
        assert_eq!(continuity(&empty), 1.0);

        let mut tree = CutTree::new(1000.0, 500.0);
        let x = tree.add_child(tree.root(), crate::tree::CutAxis::X, 400.0, 1);
        let y = tree.add_child(x, crate::tree::CutAxis::Y, 500.0, 1);
        let z = tree.add_child(y, crate::tree::CutAxis::Z, 400.0, 1);
        tree.add_child(z, crate::tree::CutAxis::W, 500.0, 1);
        assert_eq!(continuity(&tree), 1.0);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let search = GeneticSearch::new(&Config::default(), small_ga(), 2000.0, 1000.0);
        let a = search.run(&mixed_pieces(), 42);
        let b = search.run(&mixed_pieces(), 42);
        assert_eq!(a.fitness, b.fitness);
        assert_eq!(a.tree, b.tree);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_places_easy_job() {
        let search = GeneticSearch::new(&Config::default(), small_ga(), 2750.0, 1220.0);
        let pieces = vec![Piece::new(600.0, 400.0); 10];
        let out = search.run(&pieces, 1);
        assert_eq!(out.tree.placed_piece_count(), 10);
        assert!(out.unplaced.is_empty());
        assert!(out.fitness > 0.7);
    }

    #[test]
    fn test_yield_hook_can_abandon() {
        let ga = small_ga().with_generations(10).with_yield_interval(2);
        let search = GeneticSearch::new(&Config::default(), ga, 2000.0, 1000.0);
        let reports = Cell::new(0u32);
        let out = search.run_with(
            &mixed_pieces(),
            7,
            |_| reports.set(reports.get() + 1),
            |_| ControlFlow::Break(()),
        );
        assert!(out.cancelled);
        assert_eq!(out.generations, 2);
        assert!(reports.get() >= 1);
        assert!(out.tree.placed_piece_count() > 0);
    }

    #[test]
    fn test_empty_job() {
        let search = GeneticSearch::new(&Config::default(), small_ga(), 1000.0, 1000.0);
        let out = search.run(&[], 0);
        assert!(out.tree.is_empty());
        assert_eq!(out.generations, 0);
    }
}
