//! Sight-line vision - what a bot sees each tick.
//!
//! A bot has a single sight line that starts at its nose and points along
//! its heading plus the current scan offset. Every ball is checked against
//! it. Separately the bot "hears" the closest ball whether or not it is in
//! sight.

use super::ball::{Ball, BallColor};
use super::bot::Bot;
use super::geometry::{Point, Segment, distance};
use super::params::Params;

/// Distance reported for the closest ball when nothing is nearer.
pub const HEARING_RANGE: f64 = 5.0;

/// Sensor values for one bot and one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightReading {
    /// Color of the ball on the sight line, if any.
    pub color: Option<BallColor>,
    /// Nose-to-center distance of the seen ball over the sight length.
    pub distance: f64,
    /// Sight angle minus the angle of the nose-to-ball line, radians.
    pub relative_angle: f64,
    /// Seen ball's motion across the sight line.
    pub lateral_speed: f64,
    /// Seen ball's motion along the sight line.
    pub closing_speed: f64,
    /// Nose-to-center distance of the closest ball.
    pub closest_distance: f64,
    /// Sight angle minus the bot's orientation, radians, taken when the
    /// closest ball is found. It does not depend on where that ball is.
    pub closest_relative_angle: f64,
    /// Color sign of the closest ball, `0` if none.
    pub closest_color: f64,
}

impl Default for SightReading {
    fn default() -> Self {
        Self {
            color: None,
            distance: 1.0,
            relative_angle: 0.0,
            lateral_speed: 0.0,
            closing_speed: 0.0,
            closest_distance: HEARING_RANGE,
            closest_relative_angle: 0.0,
            closest_color: 0.0,
        }
    }
}

/// Result of scanning the arena for one bot.
#[derive(Debug, Clone, Default)]
pub struct Sighting {
    /// Values to feed into the bot's brain.
    pub reading: SightReading,
    /// Indices of every ball the sight line touched, in scan order.
    pub fed: Vec<usize>,
}

/// Builds the bot's current sight line.
pub fn sight_line(bot: &Bot, params: &Params) -> Segment {
    let nose = bot.nose();
    let angle = (bot.orientation - 90.0 + bot.scan_angle_degrees(params.scan_degrees)).to_radians();
    let length = bot.sight_length(params.antenna_length);

    Segment::new(
        nose,
        Point::new(
            nose.x() + angle.cos() * length,
            nose.y() + angle.sin() * length,
        ),
    )
}

/// Scans every ball for `bot`.
///
/// When several balls cross the sight line, the last one in `balls` wins.
pub fn scan(bot: &Bot, balls: &[Ball], params: &Params) -> Sighting {
    let line = sight_line(bot, params);
    let nose = line.start();
    let mut sighting = Sighting::default();
    let reading = &mut sighting.reading;

    for (i, ball) in balls.iter().enumerate() {
        let center = ball.center();
        let to_ball = Segment::new(nose, center);
        let ball_distance = to_ball.length();

        if ball_distance < reading.closest_distance {
            reading.closest_distance = ball_distance;
            reading.closest_relative_angle = line.angle() - bot.orientation.to_radians();
            reading.closest_color = ball.color.sign();
        }

        if line.intersects_circle(center, ball.radius()) {
            reading.color = Some(ball.color);
            reading.distance = distance(nose, center) / line.length();
            reading.relative_angle = line.angle() - to_ball.angle();

            let (lateral, closing) = relative_motion(bot, ball, params);
            reading.lateral_speed = lateral;
            reading.closing_speed = closing;

            sighting.fed.push(i);
        }
    }

    sighting
}

/// Ball motion relative to the bot, split into lateral and closing parts.
///
/// The combined velocity is expressed in units of the bot's top speed and
/// projected onto the ball's heading as seen from the sight line.
fn relative_motion(bot: &Bot, ball: &Ball, params: &Params) -> (f64, f64) {
    let max_speed = params.max_speed;
    let bot_speed = bot.effective_speed(max_speed);
    let heading = bot.heading_radians();

    let rel_x = (ball.vel.x() + bot_speed * heading.cos()) / max_speed;
    let rel_y = (ball.vel.y() + bot_speed * heading.sin()) / max_speed;
    let rel_speed = rel_x.hypot(rel_y);

    let ball_heading = ball.vel.y().atan2(ball.vel.x()).to_degrees();
    let scan_offset = bot.orientation + bot.scan_angle_degrees(params.scan_degrees);
    let adjusted = (ball_heading - scan_offset).to_radians();

    (rel_speed * adjusted.cos(), rel_speed * adjusted.sin())
}
