//! Thread-safe handle to a running ecosystem.
//!
//! One thread drives the simulation while others (a display, an autosave
//! task) read from it or take snapshots. Every call takes the lock for its
//! whole duration, so readers never observe a half-finished tick.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::ecosystem::Ecosystem;
use super::evolution::GenerationReport;
use super::params::Params;
use crate::error::{ConfigError, PersistError};

/// Cloneable, lock-protected ecosystem.
#[derive(Debug, Clone)]
pub struct SharedEcosystem {
    inner: Arc<Mutex<Ecosystem>>,
}

impl SharedEcosystem {
    /// Wraps an ecosystem.
    pub fn new(ecosystem: Ecosystem) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ecosystem)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ecosystem> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`Ecosystem::tick`].
    pub fn tick(&self, breed_on_boundary: bool) {
        self.lock().tick(breed_on_boundary);
    }

    /// See [`Ecosystem::create_next_generation`].
    pub fn create_next_generation(&self) -> GenerationReport {
        self.lock().create_next_generation()
    }

    /// See [`Ecosystem::reset_balls`].
    pub fn reset_balls(&self) {
        self.lock().reset_balls();
    }

    /// See [`Ecosystem::reset_population`].
    pub fn reset_population(&self) {
        self.lock().reset_population();
    }

    /// See [`Ecosystem::start`].
    pub fn start(&self) {
        self.lock().start();
    }

    /// See [`Ecosystem::update_params`].
    pub fn update_params(&self, params: Params) -> Result<(), ConfigError> {
        self.lock().update_params(params)
    }

    /// Independent copy of the first `n` brains; see [`Ecosystem::snapshot`].
    pub fn snapshot(&self, n: usize) -> Ecosystem {
        self.lock().snapshot(n)
    }

    /// Runs `f` with read access to the ecosystem.
    pub fn with<T>(&self, f: impl FnOnce(&Ecosystem) -> T) -> T {
        let guard = self.lock();
        f(&*guard)
    }

    /// Saves the current state to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        self.lock().save_to_file(path)
    }
}
