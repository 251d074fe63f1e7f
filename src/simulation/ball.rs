//! Moving colored balls that bots try to look at (or avoid).
//!
//! Balls drift at a small constant velocity, bounce off solid walls or wrap
//! around, and lose energy each tick a bot stares at them. An exhausted ball
//! jumps to a new random spot.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Point;
use super::params::WallPolicy;

/// Largest per-axis ball speed, as a fraction of the arena per tick.
pub const BALL_SPEED: f64 = 0.003;

/// Smallest magnitude of the random velocity factor, so balls never stall.
const MIN_VELOCITY_FACTOR: f64 = 0.15;

/// Energy drained each time a bot feeds on a ball.
pub const FEED_COST: f64 = 0.10;

/// Whether looking at a ball helps or hurts a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallColor {
    /// Rewards the bot (green).
    Beneficial,
    /// Penalises the bot (red).
    Harmful,
}

impl BallColor {
    /// Sign fed to bot brains: `+1` beneficial, `-1` harmful.
    pub fn sign(self) -> f64 {
        match self {
            BallColor::Beneficial => 1.0,
            BallColor::Harmful => -1.0,
        }
    }
}

/// A ball in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Top-left corner of the ball's bounding box.
    pub pos: Point,
    /// Velocity in arena units per tick.
    pub vel: Point,
    /// Color of the ball.
    pub color: BallColor,
    /// Diameter relative to the arena.
    pub size: f64,
    /// Energy left before the ball relocates.
    pub energy: f64,
    /// Energy restored on relocation.
    pub max_energy: f64,
}

impl Ball {
    /// Creates a ball with explicit state.
    pub fn new(pos: Point, vel: Point, color: BallColor, size: f64, max_energy: f64) -> Self {
        Self {
            pos,
            vel,
            color,
            size,
            energy: max_energy,
            max_energy,
        }
    }

    /// Creates a ball at a random position with a random small velocity.
    pub fn new_random<R: Rng + ?Sized>(
        color: BallColor,
        size: f64,
        max_energy: f64,
        rng: &mut R,
    ) -> Self {
        let pos = Point::new(rng.random(), rng.random());
        let vel = random_velocity(rng);
        Self::new(pos, vel, color, size, max_energy)
    }

    /// Creates `beneficial` green balls followed by `harmful` red balls.
    pub fn create_balls<R: Rng + ?Sized>(
        beneficial: usize,
        harmful: usize,
        size: f64,
        max_energy: f64,
        rng: &mut R,
    ) -> Vec<Ball> {
        let mut balls = Vec::with_capacity(beneficial + harmful);
        for _ in 0..beneficial {
            balls.push(Ball::new_random(BallColor::Beneficial, size, max_energy, rng));
        }
        for _ in 0..harmful {
            balls.push(Ball::new_random(BallColor::Harmful, size, max_energy, rng));
        }
        balls
    }

    /// Radius of the ball.
    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    /// Center of the ball.
    pub fn center(&self) -> Point {
        let r = self.radius();
        Point::new(self.pos.x() + r, self.pos.y() + r)
    }

    /// Advances the ball by one tick.
    pub fn step(&mut self, walls: WallPolicy) {
        self.pos = Point::new(self.pos.x() + self.vel.x(), self.pos.y() + self.vel.y());

        match walls {
            WallPolicy::Solid => {
                let (mut vx, mut vy) = self.vel.x_y();
                if !(0.0..=1.0).contains(&self.pos.x()) {
                    vx = -vx;
                }
                if !(0.0..=1.0).contains(&self.pos.y()) {
                    vy = -vy;
                }
                self.vel = Point::new(vx, vy);
            }
            WallPolicy::Wrap => {
                self.pos = Point::new(wrap_once(self.pos.x()), wrap_once(self.pos.y()));
            }
        }
    }

    /// Drains energy after a bot fed on the ball, relocating it once exhausted.
    ///
    /// Returns `true` if the ball relocated.
    pub fn feed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.energy -= FEED_COST;
        if self.energy < 0.0 {
            self.relocate(rng);
            true
        } else {
            false
        }
    }

    /// Moves the ball to a random spot with a new velocity and full energy.
    pub fn relocate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.energy = self.max_energy;
        self.pos = Point::new(rng.random(), rng.random());
        self.vel = random_velocity(rng);
    }
}

/// Shifts a coordinate that left the arena by at most one width back inside.
fn wrap_once(v: f64) -> f64 {
    if v < 0.0 {
        v + 1.0
    } else if v > 1.0 {
        v - 1.0
    } else {
        v
    }
}

fn random_velocity<R: Rng + ?Sized>(rng: &mut R) -> Point {
    Point::new(
        BALL_SPEED * min_random_factor(rng),
        BALL_SPEED * min_random_factor(rng),
    )
}

/// Uniform value in `[-1, 1]` whose magnitude is at least [`MIN_VELOCITY_FACTOR`].
fn min_random_factor<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let v: f64 = rng.random_range(-1.0..=1.0);
        if v.abs() >= MIN_VELOCITY_FACTOR {
            return v;
        }
    }
}
