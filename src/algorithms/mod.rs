pub mod convergence;
pub mod initializer;
pub mod mapping;
pub mod optimizer;
pub mod predictor;
pub mod trainer;

pub use convergence::{ConvergenceMonitor, Decision, StopReason, ValidationErrorHistory};
pub use initializer::ParameterInitializer;
pub use mapping::{EntityMaps, IdentifierMap, IndexedRating, Lookup, ValidationSample};
pub use optimizer::{Optimizer, Sgd};
pub use predictor::Predictor;
pub use trainer::{SgdTrainer, TrainingOutcome};

use crate::utils::dot;
use ndarray::{Array1, Array2};

/// Learned biases and latent factors. Sized to the training entity universe.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub user_bias: Array1<f64>,
    pub item_bias: Array1<f64>,
    pub user_factors: Array2<f64>,
    pub item_factors: Array2<f64>,
}

impl ModelParameters {
    pub fn n_users(&self) -> usize {
        self.user_bias.len()
    }

    pub fn n_items(&self) -> usize {
        self.item_bias.len()
    }

    pub fn n_factors(&self) -> usize {
        self.user_factors.ncols()
    }

    /// Unclamped score. Unknown entities contribute nothing; the factor term
    /// needs both sides known.
    pub fn score(&self, global_mean: f64, user: Lookup, item: Lookup) -> f64 {
        let mut prediction = global_mean;

        if let Lookup::Known(u) = user {
            prediction += self.user_bias[u];
        }
        if let Lookup::Known(i) = item {
            prediction += self.item_bias[i];
        }
        if let (Lookup::Known(u), Lookup::Known(i)) = (user, item) {
            prediction += dot(self.user_factors.row(u), self.item_factors.row(i));
        }

        prediction
    }
}

/// Frozen outcome of a training run: maps, parameters and the baseline.
#[derive(Debug, Clone)]
pub struct LatentFactorModel {
    pub maps: EntityMaps,
    pub params: ModelParameters,
    pub global_mean: f64,
}

impl LatentFactorModel {
    pub fn score_ids(&self, user_id: &str, item_id: &str) -> f64 {
        let (user, item) = self.maps.lookup_pair(user_id, item_id);
        self.params.score(self.global_mean, user, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params() -> ModelParameters {
        ModelParameters {
            user_bias: array![0.5, -1.0],
            item_bias: array![0.25],
            user_factors: array![[1.0, 2.0], [0.0, 1.0]],
            item_factors: array![[0.5, 0.5]],
        }
    }

    #[test]
    fn test_score_known_pair_includes_all_terms() {
        let p = params();
        let score = p.score(5.0, Lookup::Known(0), Lookup::Known(0));
        assert!((score - (5.0 + 0.5 + 0.25 + 1.5)).abs() < 1e-12);
    }

    #[test]
    fn test_score_degrades_for_unknown_entities() {
        let p = params();
        assert_eq!(p.score(5.0, Lookup::Unknown, Lookup::Known(0)), 5.25);
        assert_eq!(p.score(5.0, Lookup::Known(1), Lookup::Unknown), 4.0);
        assert_eq!(p.score(5.0, Lookup::Unknown, Lookup::Unknown), 5.0);
    }
}
