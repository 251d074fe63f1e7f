//! Saving and loading evolved brains.
//!
//! A save file is a JSON document starting with a fixed marker and format
//! version, followed by the generation counter, the ball counts, one network
//! per bot and, optionally, the best network ever seen and the parameters.
//! Files written without parameters load with default parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::brain::{Layer, NeuralNetwork};
use super::ecosystem::Ecosystem;
use super::evolution::Champion;
use super::params::Params;
use crate::error::PersistError;

/// Marker every save file starts with.
pub const MAGIC: &str = "BOT BRAIN FILE";
/// Save format version this build reads and writes.
pub const VERSION: &str = "1.0";

/// Just enough of a save file to check what it is.
#[derive(Deserialize)]
struct Header {
    magic: String,
    version: String,
}

/// A saved evolution state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    /// File marker, always [`MAGIC`].
    pub magic: String,
    /// Format version, always [`VERSION`].
    pub version: String,
    /// Generation counter at save time.
    pub generation: u64,
    /// Beneficial ball count.
    pub beneficial_balls: usize,
    /// Harmful ball count.
    pub harmful_balls: usize,
    /// One network per bot, as raw layers.
    pub brains: Vec<Vec<Layer>>,
    /// Score of the best network ever seen.
    pub best_score: Option<f64>,
    /// Best network ever seen, as raw layers.
    pub best_brain: Option<Vec<Layer>>,
    /// Parameters at save time.
    #[serde(default)]
    pub params: Option<Params>,
}

impl SaveState {
    /// Captures the state of `ecosystem`.
    pub fn capture(ecosystem: &Ecosystem) -> Self {
        let params = ecosystem.params();
        let best = ecosystem.best_ever();
        Self {
            magic: MAGIC.to_string(),
            version: VERSION.to_string(),
            generation: ecosystem.generation(),
            beneficial_balls: params.beneficial_balls,
            harmful_balls: params.harmful_balls,
            brains: ecosystem
                .bots()
                .iter()
                .map(|bot| bot.brain.layers().to_vec())
                .collect(),
            best_score: best.map(|c| c.score),
            best_brain: best.map(|c| c.brain.layers().to_vec()),
            params: Some(params.clone()),
        }
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a save file, checking the marker and version first.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let header: Header = serde_json::from_str(json)?;
        if header.magic != MAGIC {
            return Err(PersistError::BadMagic(header.magic));
        }
        if header.version != VERSION {
            return Err(PersistError::VersionMismatch {
                expected: VERSION,
                found: header.version,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuilds an ecosystem from this state.
    ///
    /// Every network is checked for consistent layers and for the bot's
    /// sensor and motor layout. Bot positions and balls are regenerated from
    /// `seed`.
    pub fn into_ecosystem(self, seed: u64) -> Result<Ecosystem, PersistError> {
        let brains = self
            .brains
            .into_iter()
            .map(NeuralNetwork::new)
            .collect::<Result<Vec<_>, _>>()?;
        let best_brain = self.best_brain.map(NeuralNetwork::new).transpose()?;

        let mut params = match self.params {
            Some(params) => params,
            None => {
                warn!("save file has no parameters, using defaults");
                let mut params = Params::default();
                if let Some(hidden) = brains.first().and_then(hidden_width) {
                    params.hidden_layer_size = hidden;
                }
                params
            }
        };
        params.beneficial_balls = self.beneficial_balls;
        params.harmful_balls = self.harmful_balls;
        // loaded brains are evolved already, start() must not replace them
        params.started = true;

        let mut ecosystem = Ecosystem::from_parts(params, brains, seed)?;
        ecosystem.set_generation(self.generation);

        let champion = match (best_brain, self.best_score) {
            (Some(brain), Some(score)) => Some(Champion { brain, score }),
            _ => None,
        };
        ecosystem.set_best_ever(champion);

        Ok(ecosystem)
    }
}

/// Hidden width of a single-hidden-layer network.
fn hidden_width(brain: &NeuralNetwork) -> Option<usize> {
    match brain.layer_sizes().as_slice() {
        [_, hidden, _] => Some(*hidden),
        _ => None,
    }
}

/// File name used when the caller does not pick one.
pub fn default_save_name() -> String {
    format!("botbrains.{}.json", chrono::Utc::now().timestamp_millis())
}

impl Ecosystem {
    /// Writes the ecosystem's brains and parameters to `path`.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let json = SaveState::capture(self).to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        info!(path = %path.display(), generation = self.generation(), "saved");
        Ok(())
    }

    /// Loads an ecosystem saved with [`Ecosystem::save_to_file`].
    pub fn load_from_file(path: impl AsRef<Path>, seed: u64) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let ecosystem = SaveState::from_json(&json)?.into_ecosystem(seed)?;
        info!(
            path = %path.display(),
            generation = ecosystem.generation(),
            bots = ecosystem.bots().len(),
            "loaded"
        );
        Ok(ecosystem)
    }
}
