//! Error types for network construction, configuration and save files.

use thiserror::Error;

/// Errors raised when a layer stack does not form a valid network.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The network has no layers at all.
    #[error("network must contain at least one layer")]
    Empty,
    /// A layer's bias vector does not match its weight rows.
    #[error("layer {layer} has {rows} weight rows but {biases} biases")]
    BiasMismatch {
        /// Index of the offending layer.
        layer: usize,
        /// Rows in the weight matrix.
        rows: usize,
        /// Length of the bias vector.
        biases: usize,
    },
    /// A layer's outputs do not line up with the next layer's inputs.
    #[error("layer {layer} outputs {outputs} values but layer {} expects {next_inputs}", .layer + 1)]
    LayerMismatch {
        /// Index of the earlier layer.
        layer: usize,
        /// Rows of the earlier layer.
        outputs: usize,
        /// Columns of the following layer.
        next_inputs: usize,
    },
}

/// Errors raised when validating or changing simulation parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// A parameter cannot change once evolution has started.
    #[error("{0} cannot change after evolution has started")]
    Locked(&'static str),
}

/// Errors raised while saving or loading engine state.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Reading or writing the save file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The save file is not valid JSON or misses required fields.
    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),
    /// The save file does not start with the expected marker.
    #[error("invalid file type, magic not found (got {0:?})")]
    BadMagic(String),
    /// The save file was written by an incompatible version.
    #[error("invalid file type, version mismatch (expected {expected}, got {found})")]
    VersionMismatch {
        /// Version this build understands.
        expected: &'static str,
        /// Version stored in the file.
        found: String,
    },
    /// A stored network has inconsistent layer dimensions.
    #[error("corrupt brain: {0}")]
    Topology(#[from] TopologyError),
    /// A stored network does not fit the bot's sensor and motor layout.
    #[error("brain {index} has shape {inputs}->{outputs}, expected {expected_inputs}->{expected_outputs}")]
    BrainShape {
        /// Index of the brain in the save file.
        index: usize,
        /// Inputs of the stored network.
        inputs: usize,
        /// Outputs of the stored network.
        outputs: usize,
        /// Inputs a bot feeds its brain.
        expected_inputs: usize,
        /// Outputs a bot reads from its brain.
        expected_outputs: usize,
    },
    /// A stored network's layer sizes differ from the configured brain.
    #[error("brain {index} has layer sizes {found:?}, expected {expected:?}")]
    TopologyMismatch {
        /// Index of the brain in the save file.
        index: usize,
        /// Layer sizes the parameters call for.
        expected: Vec<usize>,
        /// Layer sizes of the stored network.
        found: Vec<usize>,
    },
    /// The stored parameters are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
