//! Feed-forward neural networks used as bot controllers.
//!
//! A [`NeuralNetwork`] is an ordered stack of dense [`Layer`]s. Hidden layers
//! use a rectified-linear activation; the last layer's raw values are returned
//! so callers can squash each output as they see fit with [`sigmoid`] or
//! [`tanh`].
//!
//! Networks are immutable once built. The genetic operators in [`reproduce`]
//! always return a new network and leave their parents untouched.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TopologyError;

pub mod layer;
pub mod reproduce;

pub use layer::Layer;

/// Rectified-linear unit.
#[inline]
pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

/// Logistic function, maps ℝ onto `(0, 1)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Hyperbolic tangent, maps ℝ onto `(-1, 1)`.
#[inline]
pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

/// A fixed-topology feed-forward network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Layer>", into = "Vec<Layer>")]
pub struct NeuralNetwork {
    layers: Vec<Layer>,
}

impl NeuralNetwork {
    /// Creates a network from its layers, checking that adjacent layers fit.
    pub fn new(layers: Vec<Layer>) -> Result<Self, TopologyError> {
        if layers.is_empty() {
            return Err(TopologyError::Empty);
        }

        for (i, layer) in layers.iter().enumerate() {
            if layer.biases.len() != layer.output_size() {
                return Err(TopologyError::BiasMismatch {
                    layer: i,
                    rows: layer.output_size(),
                    biases: layer.biases.len(),
                });
            }
        }

        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(TopologyError::LayerMismatch {
                    layer: i,
                    outputs: pair[0].output_size(),
                    next_inputs: pair[1].input_size(),
                });
            }
        }

        Ok(Self { layers })
    }

    /// Creates a zero-initialised network with the given layer sizes.
    ///
    /// `layer_sizes` lists the input size followed by each layer's output
    /// size, e.g. `[22, 16, 4]`.
    pub fn zeros(layer_sizes: &[usize]) -> Result<Self, TopologyError> {
        Self::new(
            layer_sizes
                .windows(2)
                .map(|w| Layer::zeros(w[0], w[1]))
                .collect(),
        )
    }

    /// Creates a network with every weight and bias drawn from `[-1, 1]`.
    pub fn with_random_weights<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        rng: &mut R,
    ) -> Result<Self, TopologyError> {
        Self::new(
            layer_sizes
                .windows(2)
                .map(|w| Layer::new_random(w[0], w[1], rng))
                .collect(),
        )
    }

    /// Returns a network of the same topology with fresh random weights.
    pub fn random_like<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        reproduce::map_entries(self, |_| rng.random_range(-1.0..=1.0))
    }

    /// Runs a forward pass.
    ///
    /// Panics if `inputs` does not match the first layer's input size.
    #[inline]
    pub fn propagate(&self, inputs: &Array1<f64>) -> Array1<f64> {
        let last = self.layers.len() - 1;
        let mut output = inputs.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            output = layer.forward(&output);
            if i < last {
                output.mapv_inplace(relu);
            }
        }
        output
    }

    /// The layers, from input to output.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of inputs the network consumes.
    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    /// Number of outputs the network produces.
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    /// Input size followed by every layer's output size.
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.input_size())
            .chain(self.layers.iter().map(Layer::output_size))
            .collect()
    }

    /// Whether `other` has exactly the same per-layer shapes.
    pub fn same_topology(&self, other: &NeuralNetwork) -> bool {
        self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(&other.layers)
                .all(|(a, b)| a.weights.dim() == b.weights.dim() && a.biases.len() == b.biases.len())
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// Flattens all weights and biases into a single vector, layer by layer.
    pub fn to_flat_vector(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.parameter_count());
        for layer in &self.layers {
            flat.extend(layer.weights.iter().copied());
            flat.extend(layer.biases.iter().copied());
        }
        flat
    }
}

impl TryFrom<Vec<Layer>> for NeuralNetwork {
    type Error = TopologyError;

    fn try_from(layers: Vec<Layer>) -> Result<Self, Self::Error> {
        Self::new(layers)
    }
}

impl From<NeuralNetwork> for Vec<Layer> {
    fn from(network: NeuralNetwork) -> Self {
        network.layers
    }
}
