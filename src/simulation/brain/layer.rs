//! A single fully connected layer.

use ndarray::{Array1, Array2, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A dense layer: `output = weights · input + biases`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Weight matrix (`output_size` × `input_size`).
    pub weights: Array2<f64>,
    /// Bias vector (`output_size`).
    pub biases: Array1<f64>,
}

impl Layer {
    /// Creates a layer from explicit weights and biases.
    pub fn new(weights: Array2<f64>, biases: Array1<f64>) -> Self {
        Self { weights, biases }
    }

    /// Creates a layer with every weight and bias set to zero.
    pub fn zeros(input_size: usize, output_size: usize) -> Self {
        Self {
            weights: Array2::zeros((output_size, input_size)),
            biases: Array1::zeros(output_size),
        }
    }

    /// Creates a layer with weights and biases drawn uniformly from `[-1, 1]`.
    pub fn new_random<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        Self {
            weights: Array2::from_shape_fn((output_size, input_size), |_| {
                rng.random_range(-1.0..=1.0)
            }),
            biases: Array1::from_shape_fn(output_size, |_| rng.random_range(-1.0..=1.0)),
        }
    }

    /// Number of inputs the layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of outputs the layer produces.
    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Affine part of the forward pass, without activation.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f64>) -> Array1<f64> {
        let mut output = self.weights.dot(inputs);
        output += &self.biases;
        output
    }

    /// Builds a new layer by applying `f` to every weight, then every bias.
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self {
            weights: self.weights.mapv(&mut f),
            biases: self.biases.mapv(&mut f),
        }
    }

    /// Builds a new layer by combining matching entries of two parents.
    ///
    /// Both layers must have the same shape.
    pub fn zip_map(a: &Layer, b: &Layer, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        Self {
            weights: Zip::from(&a.weights)
                .and(&b.weights)
                .map_collect(|&x, &y| f(x, y)),
            biases: Zip::from(&a.biases)
                .and(&b.biases)
                .map_collect(|&x, &y| f(x, y)),
        }
    }
}
