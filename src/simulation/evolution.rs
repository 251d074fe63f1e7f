//! Breeding the next generation.
//!
//! At a generation boundary the five best bots become parents. Their brains,
//! together with the best brain ever recorded, seed a fixed pool of candidate
//! offspring: straight copies, averages, crossovers, mutants, tweaks and a
//! couple of fresh random brains. The worst bots are then replaced by brains
//! drawn from the shuffled pool.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::brain::{NeuralNetwork, reproduce};
use super::params::Params;

/// Number of top-ranked bots used as parents.
pub const PARENT_COUNT: usize = 5;

/// Crossover pairings as (parent index, parent index, bias toward the first).
const SAMPLE_PAIRS: [(usize, usize, f64); 7] = [
    (0, 1, 0.5),
    (0, 1, 0.9),
    (0, 1, 0.75),
    (1, 2, 0.5),
    (1, 2, 0.9),
    (1, 2, 0.75),
    (2, 3, 0.5),
];

/// Averaged pairings as parent indices.
const AVERAGE_PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// Multiplier applied to the mutation rate for the heavier tweak round.
const HEAVY_TWEAK_FACTOR: f64 = 5.0;

/// Fresh random brains added to every pool.
const FRESH_BRAINS: usize = 2;

/// Size of the candidate pool built by [`candidate_pool`].
pub const POOL_SIZE: usize =
    1 + PARENT_COUNT + AVERAGE_PAIRS.len() + SAMPLE_PAIRS.len() + 3 * PARENT_COUNT + FRESH_BRAINS;

/// Best brain seen across all generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    /// The brain itself.
    pub brain: NeuralNetwork,
    /// Fitness it scored in its generation.
    pub score: f64,
}

/// Summary of a finished generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Number of the generation that just started.
    pub generation: u64,
    /// Fitness of the best bot of the finished generation.
    pub best_fitness: f64,
    /// Mean fitness of the finished generation.
    pub average_fitness: f64,
    /// Best fitness ever recorded, after this generation.
    pub best_ever_fitness: f64,
}

impl GenerationReport {
    /// Best fitness per tick and per unit of reward, as a percentage.
    pub fn normalized_best(&self, params: &Params) -> f64 {
        normalize(self.best_fitness, params)
    }

    /// Average fitness per tick and per unit of reward, as a percentage.
    pub fn normalized_average(&self, params: &Params) -> f64 {
        normalize(self.average_fitness, params)
    }
}

fn normalize(fitness: f64, params: &Params) -> f64 {
    let scale = params.ticks_per_generation as f64 * params.beneficial_reward;
    if scale == 0.0 {
        0.0
    } else {
        100.0 * fitness / scale
    }
}

/// Builds the candidate offspring pool.
///
/// `parents` is ordered best first. The champion and every parent appear
/// unmodified in the result; `max_mutation_rate` bounds the rate drawn for the
/// mutated and tweaked candidates.
pub fn candidate_pool<R: Rng + ?Sized>(
    champion: &NeuralNetwork,
    parents: [&NeuralNetwork; PARENT_COUNT],
    max_mutation_rate: f64,
    rng: &mut R,
) -> Vec<NeuralNetwork> {
    let mut pool = Vec::with_capacity(POOL_SIZE);

    pool.push(reproduce::clone(champion));
    pool.extend(parents.iter().map(|p| reproduce::clone(p)));

    for (a, b) in AVERAGE_PAIRS {
        pool.push(reproduce::average(parents[a], parents[b]));
    }

    for (a, b, bias) in SAMPLE_PAIRS {
        pool.push(reproduce::sample(parents[a], parents[b], bias, rng));
    }

    let rate = rng.random::<f64>() * max_mutation_rate;

    for parent in parents {
        pool.push(reproduce::mutate(parent, rate, rng));
    }
    for parent in parents {
        pool.push(reproduce::tweak(parent, rate, rng));
    }
    for parent in parents {
        pool.push(reproduce::tweak(parent, rate * HEAVY_TWEAK_FACTOR, rng));
    }

    for _ in 0..FRESH_BRAINS {
        pool.push(parents[0].random_like(rng));
    }

    pool
}

/// Picks `count` brains from an already shuffled pool, cycling through it
/// when more brains are needed than it holds.
pub fn draw_replacements(pool: &[NeuralNetwork], count: usize) -> Vec<NeuralNetwork> {
    pool.iter().cycle().take(count).cloned().collect()
}
