//! Main ecosystem simulation with parallel bot updates.
//!
//! The ecosystem owns the bots, the balls and the parameters. It handles:
//! - Parallel bot updates using rayon
//! - Event-driven ball updates for thread safety
//! - Periodic ball resets
//! - Ranking, breeding and replacement at generation boundaries

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::ball::Ball;
use super::bot::{BRAIN_INPUTS, BRAIN_OUTPUTS, Bot};
use super::brain::NeuralNetwork;
use super::events::{self, EventQueue, SimulationEvent};
use super::evolution::{self, Champion, GenerationReport, PARENT_COUNT, POOL_SIZE};
use super::history::GenerationHistory;
use super::params::Params;
use super::vision;
use crate::error::{ConfigError, PersistError};

/// The simulation state: bots, balls, parameters and evolution bookkeeping.
///
/// All randomness flows from a single seeded generator, so two ecosystems
/// built with the same seed and driven by the same calls stay identical.
#[derive(Debug, Clone)]
pub struct Ecosystem {
    params: Params,
    bots: Vec<Bot>,
    balls: Vec<Ball>,
    generation: u64,
    ticks: u64,
    best_ever: Option<Champion>,
    last_report: Option<GenerationReport>,
    history: GenerationHistory,
    next_bot_id: u64,
    blank_brain: NeuralNetwork,
    rng: ChaCha8Rng,
}

impl Ecosystem {
    /// Creates an ecosystem with random bots and balls, seeded from entropy.
    pub fn new(params: Params) -> Result<Self, ConfigError> {
        Self::with_seed(params, rand::random())
    }

    /// Creates an ecosystem with random bots and balls from a fixed seed.
    pub fn with_seed(params: Params, seed: u64) -> Result<Self, ConfigError> {
        params.validate()?;
        let blank_brain = blank_brain(&params)?;

        let mut ecosystem = Self {
            params,
            bots: Vec::new(),
            balls: Vec::new(),
            generation: 0,
            ticks: 0,
            best_ever: None,
            last_report: None,
            history: GenerationHistory::default(),
            next_bot_id: 0,
            blank_brain,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        ecosystem.reset_population();
        Ok(ecosystem)
    }

    /// Builds an ecosystem around existing brains, one bot per brain.
    ///
    /// Every brain must match `params.brain_topology()`.
    pub fn from_parts(
        params: Params,
        brains: Vec<NeuralNetwork>,
        seed: u64,
    ) -> Result<Self, PersistError> {
        params.validate()?;
        let expected = params.brain_topology();

        for (index, brain) in brains.iter().enumerate() {
            if brain.input_size() != BRAIN_INPUTS || brain.output_size() != BRAIN_OUTPUTS {
                return Err(PersistError::BrainShape {
                    index,
                    inputs: brain.input_size(),
                    outputs: brain.output_size(),
                    expected_inputs: BRAIN_INPUTS,
                    expected_outputs: BRAIN_OUTPUTS,
                });
            }
            let found = brain.layer_sizes();
            if found != expected {
                return Err(PersistError::TopologyMismatch {
                    index,
                    expected: expected.to_vec(),
                    found,
                });
            }
        }

        let mut ecosystem = Self {
            blank_brain: blank_brain(&params)?,
            params,
            bots: Vec::with_capacity(brains.len()),
            balls: Vec::new(),
            generation: 0,
            ticks: 0,
            best_ever: None,
            last_report: None,
            history: GenerationHistory::default(),
            next_bot_id: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        ecosystem.bots = ecosystem.spawn_bots(brains);
        ecosystem.reset_balls();
        Ok(ecosystem)
    }

    /// Advances the simulation by one tick.
    ///
    /// When the tick counter reaches the generation length the population is
    /// bred (`breed_on_boundary`) or the counters simply roll over.
    pub fn tick(&mut self, breed_on_boundary: bool) {
        self.ticks += 1;

        if let Some(every) = self.params.ticks_per_ball_reset() {
            if self.ticks % every == 0 {
                self.reset_balls();
            }
        }

        if self.ticks >= self.params.ticks_per_generation {
            if breed_on_boundary {
                self.create_next_generation();
            } else {
                self.generation += 1;
                self.ticks = 0;
            }
        }

        let walls = self.params.wall_policy;
        for ball in &mut self.balls {
            ball.step(walls);
        }

        let params = &self.params;
        let balls = &self.balls;

        // parallel phase, each bot only writes to itself
        // ball updates go through the event queue and are applied in bot order
        let fed: Vec<(u64, Vec<usize>)> = self
            .bots
            .par_iter_mut()
            .map(|bot| {
                let sighting = vision::scan(bot, balls, params);
                let seen = sighting.reading.color;

                bot.seen_color = seen;
                bot.sense_and_decide(&sighting.reading);
                bot.integrate_motion(params.wall_policy, params.max_turn_rate, params.max_speed);
                bot.reward(seen, params.beneficial_reward, params.harmful_penalty);

                (bot.id, sighting.fed)
            })
            .collect();

        let mut queue = EventQueue::new();
        for (bot_id, indices) in fed {
            for ball_idx in indices {
                queue.push(SimulationEvent::BallFed { bot_id, ball_idx });
            }
        }
        events::apply_events(self, queue);
    }

    /// Ranks the bots, breeds replacements for the worst ones and starts a
    /// new generation.
    pub fn create_next_generation(&mut self) -> GenerationReport {
        self.generation += 1;
        self.ticks = 0;

        let mut ranked = std::mem::take(&mut self.bots);
        if ranked.is_empty() {
            self.reset_balls();
            let report = GenerationReport {
                generation: self.generation,
                best_fitness: 0.0,
                average_fitness: 0.0,
                best_ever_fitness: self.best_ever.as_ref().map_or(0.0, |c| c.score),
            };
            self.last_report = Some(report);
            return report;
        }
        ranked.sort_by(Bot::rank_cmp);

        let best = &ranked[0];
        let improved = self
            .best_ever
            .as_ref()
            .is_none_or(|champion| best.fitness > champion.score);
        if improved {
            self.best_ever = Some(Champion {
                brain: best.brain.clone(),
                score: best.fitness,
            });
        }

        let best_fitness = best.fitness;
        let average_fitness = ranked.iter().map(|b| b.fitness).sum::<f64>() / ranked.len() as f64;
        let best_ever_fitness = self.best_ever.as_ref().map_or(best_fitness, |c| c.score);

        let report = GenerationReport {
            generation: self.generation,
            best_fitness,
            average_fitness,
            best_ever_fitness,
        };
        info!(
            generation = report.generation,
            best = best_fitness,
            average = average_fitness,
            best_ever = best_ever_fitness,
            "generation complete"
        );
        self.last_report = Some(report);
        self.history.push(report);

        let last = ranked.len() - 1;
        let parents: [&NeuralNetwork; PARENT_COUNT] =
            std::array::from_fn(|i| &ranked[i.min(last)].brain);
        let champion = self.best_ever.as_ref().map_or(parents[0], |c| &c.brain);

        let mut pool =
            evolution::candidate_pool(champion, parents, self.params.mutation_rate, &mut self.rng);
        pool.shuffle(&mut self.rng);

        let replace = self.params.replacement_count().min(ranked.len());
        if replace > POOL_SIZE {
            warn!(
                replace,
                pool = POOL_SIZE,
                "more bots to replace than candidates, reusing candidates"
            );
        }
        let replacements = evolution::draw_replacements(&pool, replace);

        ranked.truncate(ranked.len() - replace);
        let brains = ranked
            .into_iter()
            .map(|bot| bot.brain)
            .chain(replacements)
            .collect();
        self.bots = self.spawn_bots(brains);

        self.reset_balls();
        report
    }

    /// Scatters a fresh set of balls using the current ball counts.
    pub fn reset_balls(&mut self) {
        self.balls = Ball::create_balls(
            self.params.beneficial_balls,
            self.params.harmful_balls,
            self.params.ball_size,
            self.params.target_energy,
            &mut self.rng,
        );
        debug!(count = self.balls.len(), "balls reset");
    }

    /// Alias of [`Ecosystem::reset_balls`].
    pub fn reset_targets(&mut self) {
        self.reset_balls();
    }

    /// Replaces every bot with a fresh one carrying a random brain.
    pub fn reset_population(&mut self) {
        let mut bots = Vec::with_capacity(self.params.population_size);
        for _ in 0..self.params.population_size {
            let id = self.next_id();
            bots.push(Bot::new_random(id, &self.blank_brain, &mut self.rng));
        }
        self.bots = bots;
        self.reset_balls();
        debug!(count = self.bots.len(), "population reset");
    }

    /// Marks evolution as started.
    ///
    /// The first call resets the population one last time; from then on the
    /// population size and brain width are locked.
    pub fn start(&mut self) {
        if !self.params.started {
            self.reset_population();
            self.params.started = true;
            info!(population = self.bots.len(), "evolution started");
        }
    }

    /// Whether [`Ecosystem::start`] has been called.
    pub fn is_started(&self) -> bool {
        self.params.started
    }

    /// Replaces the parameters.
    ///
    /// Ball count changes take effect at the next ball reset. Once started,
    /// changing the population size or the hidden layer width is refused.
    pub fn update_params(&mut self, mut new: Params) -> Result<(), ConfigError> {
        new.validate()?;

        let population_changed = new.population_size != self.params.population_size;
        let hidden_changed = new.hidden_layer_size != self.params.hidden_layer_size;

        if self.params.started {
            if population_changed {
                return Err(ConfigError::Locked("population_size"));
            }
            if hidden_changed {
                return Err(ConfigError::Locked("hidden_layer_size"));
            }
            new.started = true;
        }

        if hidden_changed {
            self.blank_brain = blank_brain(&new)?;
        }
        self.params = new;

        if population_changed || hidden_changed {
            self.reset_population();
        }
        Ok(())
    }

    /// Creates an independent copy holding the first `n` brains in fresh bots
    /// and a freshly scattered set of balls.
    ///
    /// The copy's generator is seeded from this ecosystem's generator.
    pub fn snapshot(&mut self, n: usize) -> Ecosystem {
        let seed = self.rng.random::<u64>();

        let mut copy = Self {
            params: self.params.clone(),
            bots: Vec::new(),
            balls: Vec::new(),
            generation: self.generation,
            ticks: 0,
            best_ever: None,
            last_report: None,
            history: GenerationHistory::default(),
            next_bot_id: 0,
            blank_brain: self.blank_brain.clone(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        let brains = self.bots.iter().take(n).map(|b| b.brain.clone()).collect();
        copy.bots = copy.spawn_bots(brains);
        copy.reset_balls();
        copy
    }

    /// Drains a ball after a bot fed on it. Returns `true` if it relocated.
    pub(crate) fn feed_ball(&mut self, idx: usize) -> bool {
        match self.balls.get_mut(idx) {
            Some(ball) => ball.feed(&mut self.rng),
            None => false,
        }
    }

    /// The bots of the current generation.
    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    /// The balls in the arena.
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Generations completed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticks elapsed in the current generation.
    pub fn tick_number(&self) -> u64 {
        self.ticks
    }

    /// Best brain ever recorded, with its score.
    pub fn best_ever(&self) -> Option<&Champion> {
        self.best_ever.as_ref()
    }

    /// Best score ever recorded, or negative infinity before the first
    /// generation boundary.
    pub fn best_ever_score(&self) -> f64 {
        self.best_ever.as_ref().map_or(f64::NEG_INFINITY, |c| c.score)
    }

    /// Current parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Reports of recent generations.
    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    /// Report of the most recent generation boundary.
    pub fn last_report(&self) -> Option<&GenerationReport> {
        self.last_report.as_ref()
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub(crate) fn set_best_ever(&mut self, best_ever: Option<Champion>) {
        self.best_ever = best_ever;
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_bot_id;
        self.next_bot_id += 1;
        id
    }

    fn spawn_bots(&mut self, brains: Vec<NeuralNetwork>) -> Vec<Bot> {
        brains
            .into_iter()
            .map(|brain| {
                let id = self.next_id();
                Bot::new(id, brain, &mut self.rng)
            })
            .collect()
    }
}

fn blank_brain(params: &Params) -> Result<NeuralNetwork, ConfigError> {
    NeuralNetwork::zeros(&params.brain_topology())
        .map_err(|e| ConfigError::Invalid(format!("brain topology: {e}")))
}
