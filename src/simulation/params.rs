//! Simulation parameters and their validation.
//!
//! Parameters load from JSON with every missing field taking its default, so
//! older config files keep working.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PersistError};

use super::bot::{BRAIN_INPUTS, BRAIN_OUTPUTS};

/// How the arena edge treats bots and balls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallPolicy {
    /// Bots are clamped to the arena and flagged as stuck, balls bounce.
    #[default]
    Solid,
    /// Anything leaving one edge reappears on the opposite edge.
    Wrap,
}

/// Simulation parameters that control evolution, bots and the arena.
///
/// The engine owns its own copy. Callers change it through
/// `Ecosystem::update_params`, which refuses to touch the population size or
/// brain width once evolution has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Number of bots competing in each generation.
    pub population_size: usize,
    /// Fraction of the worst bots replaced after each generation.
    pub death_fraction: f64,
    /// Ticks between generations.
    pub ticks_per_generation: u64,
    /// Upper bound for the per-generation mutation rate.
    pub mutation_rate: f64,
    /// Neurons in the brain's hidden layer.
    pub hidden_layer_size: usize,
    /// Maximum degrees a bot can turn per tick.
    pub max_turn_rate: f64,
    /// Fraction of the arena a bot can cover per tick moving forward.
    pub max_speed: f64,
    /// Arc in degrees across which a bot can swing its sight line.
    pub scan_degrees: f64,
    /// Longest sight line as a fraction of the arena width.
    pub antenna_length: f64,
    /// Beneficial balls in the arena.
    pub beneficial_balls: usize,
    /// Harmful balls in the arena.
    pub harmful_balls: usize,
    /// Times per generation the balls are scattered again.
    pub ball_resets_per_generation: u64,
    /// Fitness gained per tick spent looking at a beneficial ball.
    pub beneficial_reward: f64,
    /// Fitness lost per tick spent looking at a harmful ball.
    pub harmful_penalty: f64,
    /// Ball diameter relative to the arena.
    pub ball_size: f64,
    /// Energy a ball holds before it relocates.
    pub target_energy: f64,
    /// Edge behaviour for bots and balls.
    pub wall_policy: WallPolicy,
    /// Set once evolution starts; locks population size and brain width.
    pub started: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            population_size: 30,
            death_fraction: 0.25,
            ticks_per_generation: 20_000,
            mutation_rate: 0.05,
            hidden_layer_size: 16,
            max_turn_rate: 10.0,
            max_speed: 0.01,
            scan_degrees: 90.0,
            antenna_length: 0.25,
            beneficial_balls: 3,
            harmful_balls: 3,
            ball_resets_per_generation: 10,
            beneficial_reward: 5.0,
            harmful_penalty: 5.0,
            ball_size: 0.08,
            target_energy: f64::MAX,
            wall_policy: WallPolicy::Solid,
            started: false,
        }
    }
}

impl Params {
    /// Checks every parameter against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn fail(msg: String) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(msg))
        }

        if self.population_size == 0 {
            return fail("population_size must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.death_fraction) {
            return fail(format!(
                "death_fraction {} must be between 0.0 and 1.0",
                self.death_fraction
            ));
        }
        if self.ticks_per_generation == 0 {
            return fail("ticks_per_generation must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return fail(format!(
                "mutation_rate {} must be between 0.0 and 1.0",
                self.mutation_rate
            ));
        }
        if self.hidden_layer_size == 0 {
            return fail("hidden_layer_size must be at least 1".into());
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return fail(format!("max_speed {} must be positive", self.max_speed));
        }
        for (name, value) in [
            ("max_turn_rate", self.max_turn_rate),
            ("scan_degrees", self.scan_degrees),
            ("antenna_length", self.antenna_length),
            ("ball_size", self.ball_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return fail(format!("{name} {value} must be non-negative"));
            }
        }
        if self.target_energy.is_nan() || self.target_energy <= 0.0 {
            return fail(format!(
                "target_energy {} must be positive",
                self.target_energy
            ));
        }
        Ok(())
    }

    /// Layer sizes of every bot brain: sensors, hidden layer, motors.
    pub fn brain_topology(&self) -> [usize; 3] {
        [BRAIN_INPUTS, self.hidden_layer_size, BRAIN_OUTPUTS]
    }

    /// Ticks between two scheduled ball resets, or `None` if balls are only
    /// reset at generation boundaries.
    pub fn ticks_per_ball_reset(&self) -> Option<u64> {
        if self.ball_resets_per_generation == 0 {
            None
        } else {
            Some((self.ticks_per_generation / self.ball_resets_per_generation).max(1))
        }
    }

    /// Number of bots replaced at each generation boundary.
    pub fn replacement_count(&self) -> usize {
        (self.death_fraction * self.population_size as f64).floor() as usize
    }

    /// Loads parameters from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let json = std::fs::read_to_string(path)?;
        let params: Params = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }
}
