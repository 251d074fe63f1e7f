//! # Botlife - Evolving Ball-Watching Bots
//!
//! A population of bots, each steered by a small neural network, roams a unit
//! arena full of drifting colored balls. Bots earn fitness for keeping green
//! balls on their sight line and lose it for red ones. After a fixed number
//! of ticks the best bots are bred and the worst are replaced.
//!
//! ## Features
//!
//! - Feed-forward neural network brains (ReLU hidden layer, raw outputs)
//! - Genetic operators: clone, mutate, tweak, average and sample
//! - Elitist generation transition with a fixed candidate pool
//! - Sight-line vision with a "hearing" sense for the closest ball
//! - Deterministic runs from a seed, with a parallel bot phase
//! - Save/load of evolved brains
//!
//! ## Core Modules
//!
//! - [`simulation::bot`] - Bot behavior and state
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::ecosystem`] - Main simulation logic
//! - [`simulation::evolution`] - Breeding the next generation
//! - [`simulation::ball`] - Balls the bots watch
//! - [`simulation::events`] - Event system for thread-safe updates

/// Error types shared across the crate.
pub mod error;

/// Core simulation logic and data structures.
pub mod simulation {
    /// Colored balls drifting through the arena.
    pub mod ball;
    /// Bot behavior, state, and lifecycle.
    pub mod bot;
    /// Neural network implementation for bot brains.
    pub mod brain;
    /// Main ecosystem simulation with parallel updates.
    pub mod ecosystem;
    /// Event system for thread-safe state updates.
    pub mod events;
    /// Candidate pool and generation reports.
    pub mod evolution;
    /// Points, segments and circle intersection.
    pub mod geometry;
    /// Fitness history across generations.
    pub mod history;
    /// Simulation parameters.
    pub mod params;
    /// Save files for evolved brains.
    pub mod persistence;
    /// Lock-protected handle for sharing an ecosystem across threads.
    pub mod shared;
    /// What a bot sees along its sight line.
    pub mod vision;
}
