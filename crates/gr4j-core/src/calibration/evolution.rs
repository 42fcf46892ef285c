//! Seeded differential evolution over a box.
//!
//! Strategy `best/1/bin`: every trial vector is built from the current best
//! member plus one scaled difference of two other members, then mixed with
//! its target by binomial crossover. The mutation factor is dithered once
//! per generation.
//!
//! All random numbers of a generation are drawn before any objective is
//! evaluated, and the evaluations are collected in population order, so the
//! search path depends only on the seed and never on thread scheduling.
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CalibrationConfig;
use crate::error::CalibrationError;

/// Objective value substituted for failed or non-finite evaluations.
pub const PENALTY_OBJECTIVE: f64 = 1e10;

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Every requested generation was evolved.
    MaxGenerations,
    /// The wall-clock budget ran out; the result is the best found so far.
    TimeBudget,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::MaxGenerations => f.write_str("max generations"),
            Termination::TimeBudget => f.write_str("time budget"),
        }
    }
}

/// Best point found by [`DifferentialEvolution::minimize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Optimum {
    pub x: Vec<f64>,
    pub value: f64,
    /// Generations evolved after the initial population.
    pub generations: usize,
    pub evaluations: usize,
    pub termination: Termination,
    /// Best objective after the initial population and after each generation.
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialEvolution {
    bounds: Vec<(f64, f64)>,
    population_size: usize,
    max_generations: usize,
    seed: u64,
    mutation: (f64, f64),
    recombination: f64,
    time_budget: Option<Duration>,
}

impl DifferentialEvolution {
    /// Search over `bounds` with the default settings of [`CalibrationConfig`].
    pub fn new(bounds: Vec<(f64, f64)>) -> Self {
        let defaults = CalibrationConfig::default();
        Self {
            bounds,
            population_size: defaults.population_size,
            max_generations: defaults.max_generations,
            seed: defaults.seed,
            mutation: defaults.mutation,
            recombination: defaults.recombination,
            time_budget: None,
        }
    }

    /// Search over the GR4J parameter box of a validated configuration.
    pub fn from_config(config: &CalibrationConfig) -> Result<Self, CalibrationError> {
        config.validate()?;
        Ok(Self::new(config.bounds.to_array().to_vec())
            .population_size(config.population_size)
            .max_generations(config.max_generations)
            .seed(config.seed)
            .mutation(config.mutation.0, config.mutation.1)
            .recombination(config.recombination)
            .time_budget(config.time_budget()))
    }

    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn mutation(mut self, lo: f64, hi: f64) -> Self {
        self.mutation = (lo, hi);
        self
    }

    pub fn recombination(mut self, rate: f64) -> Self {
        self.recombination = rate;
        self
    }

    pub fn time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget = budget;
        self
    }

    fn check(&self) -> Result<(), CalibrationError> {
        if self.bounds.is_empty() {
            return Err(CalibrationError::InvalidBounds {
                name: "search box",
                min: f64::NAN,
                max: f64::NAN,
            });
        }
        for &(min, max) in &self.bounds {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(CalibrationError::InvalidBounds {
                    name: "search box",
                    min,
                    max,
                });
            }
        }
        if self.population_size < 4 {
            return Err(CalibrationError::InvalidPopulation {
                size: self.population_size,
            });
        }
        let (lo, hi) = self.mutation;
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(CalibrationError::InvalidMutation(lo, hi));
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(CalibrationError::InvalidRecombination(self.recombination));
        }
        Ok(())
    }

    /// Latin hypercube sample: each dimension is cut into `n` equal strata
    /// and every stratum holds exactly one member.
    fn latin_hypercube(&self, rng: &mut StdRng) -> Vec<Vec<f64>> {
        let n = self.population_size;
        let mut population = vec![vec![0.0; self.bounds.len()]; n];
        for (d, &(lo, hi)) in self.bounds.iter().enumerate() {
            let mut strata: Vec<usize> = (0..n).collect();
            strata.shuffle(rng);
            for (member, stratum) in population.iter_mut().zip(strata) {
                let u = (stratum as f64 + rng.gen::<f64>()) / n as f64;
                member[d] = lo + u * (hi - lo);
            }
        }
        population
    }

    /// Two distinct member indices, both different from `target`.
    fn pick_pair(&self, rng: &mut StdRng, target: usize) -> (usize, usize) {
        let n = self.population_size;
        let mut r1 = rng.gen_range(0..n);
        while r1 == target {
            r1 = rng.gen_range(0..n);
        }
        let mut r2 = rng.gen_range(0..n);
        while r2 == target || r2 == r1 {
            r2 = rng.gen_range(0..n);
        }
        (r1, r2)
    }

    fn trial(
        &self,
        rng: &mut StdRng,
        population: &[Vec<f64>],
        best: &[f64],
        target: usize,
        f: f64,
    ) -> Vec<f64> {
        let (r1, r2) = self.pick_pair(rng, target);
        let dim = self.bounds.len();
        let forced = rng.gen_range(0..dim);
        let mut trial = population[target].clone();
        for (j, &(lo, hi)) in self.bounds.iter().enumerate() {
            if j == forced || rng.gen::<f64>() < self.recombination {
                let v = best[j] + f * (population[r1][j] - population[r2][j]);
                trial[j] = if (lo..=hi).contains(&v) {
                    v
                } else {
                    lo + rng.gen::<f64>() * (hi - lo)
                };
            }
        }
        trial
    }

    /// Minimise `objective` over the box.
    ///
    /// Non-finite objective values are replaced by [`PENALTY_OBJECTIVE`].
    /// Errors only for an invalid search setup.
    pub fn minimize<F>(&self, objective: F) -> Result<Optimum, CalibrationError>
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        self.check()?;
        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let evaluate = |members: &[Vec<f64>]| -> Vec<f64> {
            members
                .par_iter()
                .map(|x| {
                    let v = objective(x);
                    if v.is_finite() {
                        v
                    } else {
                        PENALTY_OBJECTIVE
                    }
                })
                .collect()
        };

        let mut population = self.latin_hypercube(&mut rng);
        let mut fitness = evaluate(&population);
        let mut evaluations = population.len();
        report_penalties(0, &fitness);

        let mut best_index = 0;
        for (i, &v) in fitness.iter().enumerate() {
            if v < fitness[best_index] {
                best_index = i;
            }
        }
        let mut best_x = population[best_index].clone();
        let mut best_value = fitness[best_index];
        let mut history = vec![best_value];

        let mut generations = 0;
        let mut termination = Termination::MaxGenerations;
        let out_of_time = |elapsed: Duration| self.time_budget.is_some_and(|b| elapsed > b);

        if out_of_time(started.elapsed()) {
            termination = Termination::TimeBudget;
        } else {
            for generation in 1..=self.max_generations {
                let f = rng.gen_range(self.mutation.0..=self.mutation.1);
                let trials: Vec<Vec<f64>> = (0..population.len())
                    .map(|i| self.trial(&mut rng, &population, &best_x, i, f))
                    .collect();
                let trial_fitness = evaluate(&trials);
                evaluations += trials.len();
                report_penalties(generation, &trial_fitness);

                for (i, (trial, value)) in trials.into_iter().zip(trial_fitness).enumerate() {
                    if value <= fitness[i] {
                        population[i] = trial;
                        fitness[i] = value;
                    }
                    if fitness[i] < best_value {
                        best_value = fitness[i];
                        best_x = population[i].clone();
                    }
                }

                generations = generation;
                history.push(best_value);
                debug!(generation, best = best_value, "generation complete");

                if out_of_time(started.elapsed()) {
                    termination = Termination::TimeBudget;
                    break;
                }
            }
        }

        Ok(Optimum {
            x: best_x,
            value: best_value,
            generations,
            evaluations,
            termination,
            history,
        })
    }
}

fn report_penalties(generation: usize, fitness: &[f64]) {
    let penalized = fitness.iter().filter(|&&v| v >= PENALTY_OBJECTIVE).count();
    if penalized > 0 {
        warn!(generation, penalized, "candidates penalized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| (v - 1.0).powi(2)).sum()
    }

    fn search() -> DifferentialEvolution {
        DifferentialEvolution::new(vec![(-5.0, 5.0); 3])
            .population_size(20)
            .max_generations(150)
            .seed(11)
    }

    #[test]
    fn finds_sphere_minimum() {
        let opt = search().minimize(sphere).unwrap();
        assert!(opt.value < 1e-4, "value = {}", opt.value);
        for v in &opt.x {
            assert!((v - 1.0).abs() < 1e-2);
        }
        assert_eq!(opt.termination, Termination::MaxGenerations);
        assert_eq!(opt.generations, 150);
        assert_eq!(opt.evaluations, 20 * 151);
    }

    #[test]
    fn same_seed_same_path() {
        let a = search().max_generations(30).minimize(sphere).unwrap();
        let b = search().max_generations(30).minimize(sphere).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_different_path() {
        let a = search().max_generations(5).minimize(sphere).unwrap();
        let b = search().max_generations(5).seed(12).minimize(sphere).unwrap();
        assert_ne!(a.x, b.x);
    }

    #[test]
    fn history_is_monotone() {
        let opt = search().max_generations(40).minimize(sphere).unwrap();
        assert_eq!(opt.history.len(), 41);
        assert!(opt.history.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(*opt.history.last().unwrap(), opt.value);
    }

    fn initial_population() -> Vec<Vec<f64>> {
        search().latin_hypercube(&mut StdRng::seed_from_u64(11))
    }

    #[test]
    fn flat_objective_keeps_first_member() {
        let opt = search().max_generations(20).minimize(|_| 3.0).unwrap();
        assert_eq!(opt.value, 3.0);
        assert_eq!(opt.x, initial_population()[0]);
    }

    #[test]
    fn plateau_keeps_earliest_discovery() {
        let plateau = |x: &[f64]| if x[0] > 0.0 { 0.0 } else { 1.0 };
        let first_on_plateau = initial_population()
            .into_iter()
            .find(|x| plateau(&x[..]) == 0.0)
            .unwrap();
        let opt = search().max_generations(20).minimize(plateau).unwrap();
        assert_eq!(opt.value, 0.0);
        assert_eq!(opt.x, first_on_plateau);
    }

    #[test]
    fn stays_inside_box() {
        let bounds = vec![(2.0, 3.0), (-1.0, -0.5)];
        let outside = std::sync::atomic::AtomicUsize::new(0);
        let opt = DifferentialEvolution::new(bounds.clone())
            .population_size(8)
            .max_generations(20)
            .minimize(|x| {
                if x.iter().zip(&bounds).any(|(v, (lo, hi))| v < lo || v > hi) {
                    outside.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                }
                x.iter().sum()
            })
            .unwrap();
        assert_eq!(outside.into_inner(), 0);
        assert!(opt.x[0] >= 2.0 && opt.x[1] >= -1.0);
    }

    #[test]
    fn zero_generations_evaluates_initial_population_only() {
        let opt = search().max_generations(0).minimize(sphere).unwrap();
        assert_eq!(opt.generations, 0);
        assert_eq!(opt.evaluations, 20);
        assert_eq!(opt.history.len(), 1);
    }

    #[test]
    fn nan_objective_is_penalized_not_fatal() {
        let opt = search()
            .max_generations(10)
            .minimize(|x| if x[0] < 0.0 { f64::NAN } else { sphere(x) })
            .unwrap();
        assert!(opt.value < PENALTY_OBJECTIVE);
        assert!(opt.x[0] >= 0.0);
    }

    #[test]
    fn all_failures_return_penalty() {
        let opt = search().max_generations(2).minimize(|_| f64::NAN).unwrap();
        assert_eq!(opt.value, PENALTY_OBJECTIVE);
    }

    #[test]
    fn exhausted_time_budget_stops_early() {
        let opt = search()
            .max_generations(1_000_000)
            .time_budget(Some(Duration::ZERO))
            .minimize(|x| {
                std::thread::sleep(Duration::from_millis(1));
                sphere(x)
            })
            .unwrap();
        assert_eq!(opt.termination, Termination::TimeBudget);
        assert!(opt.generations < 1_000_000);
    }

    #[test]
    fn rejects_bad_setup() {
        assert!(matches!(
            search().population_size(3).minimize(sphere),
            Err(CalibrationError::InvalidPopulation { size: 3 })
        ));
        assert!(DifferentialEvolution::new(vec![(1.0, 0.0)]).minimize(sphere).is_err());
        assert!(DifferentialEvolution::new(vec![]).minimize(sphere).is_err());
        assert!(DifferentialEvolution::new(vec![(0.0, f64::INFINITY)])
            .minimize(sphere)
            .is_err());
    }

    #[test]
    fn degenerate_dimension_is_fixed() {
        let opt = DifferentialEvolution::new(vec![(2.0, 2.0), (-3.0, 3.0)])
            .population_size(10)
            .max_generations(30)
            .minimize(sphere)
            .unwrap();
        assert_eq!(opt.x[0], 2.0);
    }
}
