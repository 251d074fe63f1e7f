//! Bot behavior, state, and lifecycle.
//!
//! A bot sweeps a single sight line in front of its nose. Each tick it feeds
//! what it sees, a short memory of what it saw last, and its own motion state
//! into its brain, then turns and moves according to the brain's outputs.

use std::cmp::Ordering;

use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::ball::BallColor;
use super::brain::{self, NeuralNetwork};
use super::geometry::{self, Point};
use super::params::WallPolicy;
use super::vision::SightReading;

/// Number of sensor values fed to a bot's brain each tick.
pub const BRAIN_INPUTS: usize = 22;
/// Number of motor values read from a bot's brain each tick.
pub const BRAIN_OUTPUTS: usize = 4;
/// Ticks after which "time since last detection" saturates.
pub const MEMORY_TICKS: i64 = 100;
/// Body width relative to the arena.
pub const BOT_SIZE: f64 = 0.08;

/// A bot with a neural network brain.
///
/// Motor outputs are kept in their squashed ranges: scan angle, turn rate
/// and speed in `(-1, 1)`, sight extension in `(0, 1)`. Use the scaled
/// accessors to turn them into degrees and arena units.
#[derive(Debug, Clone)]
pub struct Bot {
    /// Unique identifier, also the ranking tie-break.
    pub id: u64,
    /// Top-left corner of the body.
    pub pos: Point,
    /// Heading in degrees, `[0, 360)`; 0 points up the arena.
    pub orientation: f64,
    /// Sight line offset, `(-1, 1)` of half the field of view.
    pub scan_angle: f64,
    /// Turn command, `(-1, 1)` of the maximum turn rate.
    pub turn_rate: f64,
    /// Speed command, `(-1, 1)`; reverse runs at half speed.
    pub speed: f64,
    /// Sight line length, `(0, 1)` of the antenna length.
    pub extension: f64,
    /// Brain controlling this bot.
    pub brain: NeuralNetwork,
    /// `1.0` if the last move pushed the bot into a solid wall.
    pub stuck: f64,
    /// Fitness accumulated during the current generation.
    pub fitness: f64,
    /// Color of the ball on the sight line this tick, if any.
    pub seen_color: Option<BallColor>,
    ticks: i64,
    last_detection_tick: i64,
    last_detection_scan_angle: f64,
    last_seen_color: f64,
    last_angle_difference: f64,
    last_brain_inputs: Array1<f64>,
    rng: ChaCha8Rng,
}

impl Bot {
    /// Creates a bot at a random position and heading around `brain`.
    ///
    /// The bot's private noise generator is seeded from `rng`.
    pub fn new<R: Rng + ?Sized>(id: u64, brain: NeuralNetwork, rng: &mut R) -> Self {
        let pos = Point::new(rng.random(), rng.random());
        let orientation = rng.random::<f64>() * 360.0;
        let seed = rng.random::<u64>();

        Self {
            id,
            pos,
            orientation,
            scan_angle: 0.0,
            turn_rate: 0.0,
            speed: 0.0,
            extension: 1.0,
            brain,
            stuck: 0.0,
            fitness: 0.0,
            seen_color: None,
            ticks: 0,
            last_detection_tick: -MEMORY_TICKS,
            last_detection_scan_angle: 0.0,
            last_seen_color: 0.0,
            last_angle_difference: 0.0,
            last_brain_inputs: Array1::zeros(BRAIN_INPUTS),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a bot with a freshly randomised brain.
    pub fn new_random<R: Rng + ?Sized>(id: u64, template: &NeuralNetwork, rng: &mut R) -> Self {
        let brain = template.random_like(rng);
        Self::new(id, brain, rng)
    }

    /// Body width.
    pub fn size(&self) -> f64 {
        BOT_SIZE
    }

    /// Head length, measured from the edge of the body.
    pub fn head_size(&self) -> f64 {
        BOT_SIZE / 3.0
    }

    /// Center of the body.
    pub fn center(&self) -> Point {
        let half = self.size() / 2.0;
        Point::new(self.pos.x() + half, self.pos.y() + half)
    }

    /// Heading in radians in arena coordinates, where 0 points along +x.
    pub fn heading_radians(&self) -> f64 {
        (self.orientation - 90.0).to_radians()
    }

    /// Tip of the nose, where the sight line starts.
    pub fn nose(&self) -> Point {
        let reach = self.size() / 2.0 + self.head_size();
        let heading = self.heading_radians();
        let c = self.center();
        Point::new(c.x() + heading.cos() * reach, c.y() + heading.sin() * reach)
    }

    /// Scan offset in degrees for a field of view of `scan_degrees`.
    pub fn scan_angle_degrees(&self, scan_degrees: f64) -> f64 {
        self.scan_angle * (scan_degrees / 2.0)
    }

    /// Turn in degrees this tick for a maximum of `max_turn_rate`.
    pub fn turn_rate_degrees(&self, max_turn_rate: f64) -> f64 {
        self.turn_rate * max_turn_rate
    }

    /// Signed distance moved this tick; reverse is capped at half of `max_speed`.
    pub fn effective_speed(&self, max_speed: f64) -> f64 {
        if self.speed > 0.0 {
            self.speed * max_speed
        } else {
            self.speed * (max_speed / 2.0)
        }
    }

    /// Current sight line length for an antenna of `antenna_length`.
    pub fn sight_length(&self, antenna_length: f64) -> f64 {
        self.extension * antenna_length
    }

    /// Ticks this bot has lived.
    pub fn age(&self) -> i64 {
        self.ticks
    }

    /// Tick of the most recent sighting, `-MEMORY_TICKS` if none yet.
    pub fn last_detection_tick(&self) -> i64 {
        self.last_detection_tick
    }

    /// Scan angle the bot held at its most recent sighting.
    pub fn last_detection_scan_angle(&self) -> f64 {
        self.last_detection_scan_angle
    }

    /// Color sign of the most recently seen ball, `0` if none yet.
    pub fn last_seen_color(&self) -> f64 {
        self.last_seen_color
    }

    /// Relative angle of the most recently seen ball.
    pub fn last_angle_difference(&self) -> f64 {
        self.last_angle_difference
    }

    /// Sensor values fed to the brain on the last tick.
    pub fn last_brain_inputs(&self) -> &Array1<f64> {
        &self.last_brain_inputs
    }

    /// Runs one sense-think step: updates memory, queries the brain and
    /// stores the new motor outputs.
    pub fn sense_and_decide(&mut self, reading: &SightReading) {
        self.ticks += 1;

        if let Some(color) = reading.color {
            self.last_detection_tick = self.ticks;
            self.last_detection_scan_angle = self.scan_angle;
            self.last_seen_color = color.sign();
            self.last_angle_difference = reading.relative_angle;
        }

        let inputs = self.brain_inputs(reading);
        let outputs = self.brain.propagate(&inputs);
        self.last_brain_inputs = inputs;

        self.scan_angle = brain::tanh(outputs[0]);
        self.turn_rate = brain::tanh(outputs[1]);
        self.speed = brain::tanh(outputs[2]);
        self.extension = brain::sigmoid(outputs[3]);
    }

    fn brain_inputs(&mut self, reading: &SightReading) -> Array1<f64> {
        let now_seeing = reading.color.map_or(0.0, BallColor::sign);

        let since_detection = self.ticks - self.last_detection_tick;
        let time_input = if since_detection > MEMORY_TICKS {
            1.0
        } else {
            since_detection as f64 / MEMORY_TICKS as f64
        };

        let noise_1: f64 = self.rng.random();
        let noise_2: f64 = self.rng.random();

        Array1::from(vec![
            now_seeing,
            time_input,
            reading.distance,
            reading.relative_angle,
            reading.lateral_speed,
            reading.closing_speed,
            self.last_seen_color,
            self.last_detection_scan_angle,
            self.last_angle_difference,
            self.scan_angle,
            self.turn_rate,
            self.speed,
            self.extension,
            (self.orientation / 180.0) - 1.0,
            self.pos.x(),
            self.pos.y(),
            self.stuck,
            reading.closest_distance,
            reading.closest_relative_angle,
            reading.closest_color,
            noise_1,
            noise_2,
        ])
    }

    /// Turns and moves the bot according to its last decision.
    pub fn integrate_motion(&mut self, walls: WallPolicy, max_turn_rate: f64, max_speed: f64) {
        let orientation =
            (self.orientation + self.turn_rate_degrees(max_turn_rate)).rem_euclid(360.0);
        // rem_euclid rounds tiny negative sums up to the divisor
        self.orientation = if orientation >= 360.0 { 0.0 } else { orientation };

        let step = self.effective_speed(max_speed);
        let heading = self.heading_radians();
        let x = self.pos.x() + step * heading.cos();
        let y = self.pos.y() + step * heading.sin();

        match walls {
            WallPolicy::Solid => {
                let inside = (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y);
                self.stuck = if inside { 0.0 } else { 1.0 };
                self.pos = Point::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
            }
            WallPolicy::Wrap => {
                self.stuck = 0.0;
                self.pos = Point::new(geometry::wrap_unit(x), geometry::wrap_unit(y));
            }
        }
    }

    /// Adds the reward or penalty for the ball seen this tick.
    pub fn reward(&mut self, seen: Option<BallColor>, benefit: f64, detriment: f64) {
        match seen {
            Some(BallColor::Harmful) => self.fitness -= detriment,
            Some(BallColor::Beneficial) => self.fitness += benefit,
            None => {}
        }
    }

    /// Ranking order: higher fitness first, ties broken by higher id first.
    ///
    /// Sorting ascending with this comparator puts the best bot at index 0.
    pub fn rank_cmp(&self, other: &Bot) -> Ordering {
        other
            .fitness
            .total_cmp(&self.fitness)
            .then_with(|| other.id.cmp(&self.id))
    }
}
