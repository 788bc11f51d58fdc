use super::{IndexedRating, ModelParameters};
use crate::utils::dot;

/// Applies one stochastic update for a single observed rating.
pub trait Optimizer {
    /// Returns the prediction error measured before the update.
    fn step(&self, params: &mut ModelParameters, sample: &IndexedRating, global_mean: f64) -> f64;
}

/// Plain SGD with L2 shrinkage on biases and factors.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
    pub regularization: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64, regularization: f64) -> Self {
        Self {
            learning_rate,
            regularization,
        }
    }
}

impl Optimizer for Sgd {
    fn step(&self, params: &mut ModelParameters, sample: &IndexedRating, global_mean: f64) -> f64 {
        let (u, i) = (sample.user, sample.item);
        let lr = self.learning_rate;
        let reg = self.regularization;

        let prediction = global_mean
            + params.user_bias[u]
            + params.item_bias[i]
            + dot(params.user_factors.row(u), params.item_factors.row(i));
        let error = sample.rating - prediction;

        let user_bias = params.user_bias[u];
        let item_bias = params.item_bias[i];
        params.user_bias[u] = user_bias + lr * (error - reg * user_bias);
        params.item_bias[i] = item_bias + lr * (error - reg * item_bias);

        // Both sides read the pre-update value of the other.
        let mut user_row = params.user_factors.row_mut(u);
        let mut item_row = params.item_factors.row_mut(i);
        for (pu, qi) in user_row.iter_mut().zip(item_row.iter_mut()) {
            let user_factor = *pu;
            let item_factor = *qi;
            *pu += lr * (error * item_factor - reg * user_factor);
            *qi += lr * (error * user_factor - reg * item_factor);
        }

        error
    }
}
