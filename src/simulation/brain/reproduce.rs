//! Genetic operators that breed new networks from one or two parents.
//!
//! Every operator preserves the parent topology exactly and returns a new
//! network. Values are never clamped, so repeated `tweak` and `average` steps
//! may drift outside `[-1, 1]`.

use rand::Rng;

use super::{Layer, NeuralNetwork};

/// Applies `f` to every weight and bias, layer by layer.
pub(crate) fn map_entries(parent: &NeuralNetwork, mut f: impl FnMut(f64) -> f64) -> NeuralNetwork {
    NeuralNetwork {
        layers: parent.layers.iter().map(|l| l.map(&mut f)).collect(),
    }
}

/// Combines matching entries of two parents with `f`.
///
/// Panics if the parents have different topologies.
fn zip_entries(
    a: &NeuralNetwork,
    b: &NeuralNetwork,
    mut f: impl FnMut(f64, f64) -> f64,
) -> NeuralNetwork {
    assert!(
        a.same_topology(b),
        "parents must share a topology: {:?} vs {:?}",
        a.layer_sizes(),
        b.layer_sizes()
    );
    NeuralNetwork {
        layers: a
            .layers
            .iter()
            .zip(&b.layers)
            .map(|(la, lb)| Layer::zip_map(la, lb, &mut f))
            .collect(),
    }
}

/// Deep copy of `parent`.
pub fn clone(parent: &NeuralNetwork) -> NeuralNetwork {
    parent.clone()
}

/// Replaces each entry with a fresh value from `[-1, 1]` with probability `rate`.
pub fn mutate<R: Rng + ?Sized>(parent: &NeuralNetwork, rate: f64, rng: &mut R) -> NeuralNetwork {
    map_entries(parent, |w| {
        if rng.random::<f64>() < rate {
            rng.random_range(-1.0..=1.0)
        } else {
            w
        }
    })
}

/// Scales each entry by `1 + u`, `u` uniform in `[-0.1, 0.1]`, with probability `rate`.
pub fn tweak<R: Rng + ?Sized>(parent: &NeuralNetwork, rate: f64, rng: &mut R) -> NeuralNetwork {
    map_entries(parent, |w| {
        if rng.random::<f64>() < rate {
            w * (1.0 + rng.random_range(-0.1..=0.1))
        } else {
            w
        }
    })
}

/// Elementwise mean of two parents.
pub fn average(a: &NeuralNetwork, b: &NeuralNetwork) -> NeuralNetwork {
    zip_entries(a, b, |x, y| (x + y) / 2.0)
}

/// Uniform crossover: each entry comes from `a` with probability `bias_toward_a`, else from `b`.
pub fn sample<R: Rng + ?Sized>(
    a: &NeuralNetwork,
    b: &NeuralNetwork,
    bias_toward_a: f64,
    rng: &mut R,
) -> NeuralNetwork {
    zip_entries(a, b, |x, y| {
        if rng.random::<f64>() < bias_toward_a {
            x
        } else {
            y
        }
    })
}
