//! Event system for applying ball updates after the parallel bot phase.
//!
//! During a tick every bot reads the same ball positions. Feeding a ball can
//! relocate it, so those writes are queued and applied serially once all bots
//! have moved, in bot order.

use tracing::debug;

use super::ecosystem::Ecosystem;

/// Events that modify simulation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEvent {
    /// A bot's sight line rested on a ball this tick.
    BallFed {
        /// ID of the bot that looked at the ball.
        bot_id: u64,
        /// Index of the ball in the ball vector.
        ball_idx: usize,
    },
}

/// Queue for collecting simulation events from parallel updates.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<SimulationEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.events.drain(..)
    }
}

/// Applies all queued events to the ecosystem state.
pub fn apply_events(state: &mut Ecosystem, mut queue: EventQueue) {
    for event in queue.drain() {
        match event {
            SimulationEvent::BallFed { bot_id, ball_idx } => {
                if state.feed_ball(ball_idx) {
                    debug!(bot_id, ball_idx, "ball exhausted and relocated");
                }
            }
        }
    }
}
