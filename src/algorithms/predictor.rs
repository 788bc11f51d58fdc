use super::LatentFactorModel;
use crate::config::RatingDomain;
use crate::models::{PredictionRecord, TargetPair};

/// Scores target pairs against a trained model and clamps into the rating domain.
pub struct Predictor<'a> {
    model: &'a LatentFactorModel,
    domain: RatingDomain,
}

impl<'a> Predictor<'a> {
    pub fn new(model: &'a LatentFactorModel, domain: RatingDomain) -> Self {
        Self { model, domain }
    }

    pub fn predict_rating(&self, user_id: &str, item_id: &str) -> f64 {
        self.domain.clamp(self.model.score_ids(user_id, item_id))
    }

    pub fn predict(&self, target: &TargetPair) -> PredictionRecord {
        PredictionRecord {
            user_id: target.user_id.clone(),
            item_id: target.item_id.clone(),
            predicted_rating: self.predict_rating(&target.user_id, &target.item_id),
        }
    }

    /// One record per target, in target order.
    pub fn predict_all(&self, targets: &[TargetPair]) -> Vec<PredictionRecord> {
        targets.iter().map(|t| self.predict(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{EntityMaps, ModelParameters};
    use crate::models::RatingRecord;
    use ndarray::array;

    fn model(user_bias: f64, item_bias: f64, global_mean: f64) -> LatentFactorModel {
        let training = vec![RatingRecord::new("u1", "i1", global_mean)];
        LatentFactorModel {
            maps: EntityMaps::from_training(&training),
            params: ModelParameters {
                user_bias: array![user_bias],
                item_bias: array![item_bias],
                user_factors: array![[0.2, 0.3]],
                item_factors: array![[0.4, -0.1]],
            },
            global_mean,
        }
    }

    #[test]
    fn test_clamps_above_max() {
        let model = model(8.0, 0.0, 7.0);
        let predictor = Predictor::new(&model, RatingDomain::default());
        // 7 + 8 lands well above 10.
        assert_eq!(predictor.predict_rating("u1", "i9"), 10.0);
    }

    #[test]
    fn test_clamps_below_min() {
        let model = model(-4.0, -5.0, 7.0);
        let predictor = Predictor::new(&model, RatingDomain::default());
        assert_eq!(predictor.predict_rating("u1", "i1"), 0.0);
    }

    #[test]
    fn test_unknown_user_known_item() {
        let model = model(1.0, 0.75, 6.0);
        let predictor = Predictor::new(&model, RatingDomain::default());
        assert_eq!(predictor.predict_rating("stranger", "i1"), 6.0 + 0.75);
    }

    #[test]
    fn test_fully_unknown_pair_is_global_mean() {
        let model = model(1.0, 0.75, 6.0);
        let predictor = Predictor::new(&model, RatingDomain::default());
        assert_eq!(predictor.predict_rating("stranger", "unseen"), 6.0);
    }

    #[test]
    fn test_known_pair_includes_factor_term() {
        let model = model(0.5, 0.25, 6.0);
        let predictor = Predictor::new(&model, RatingDomain::default());
        let record = predictor.predict(&TargetPair::new("u1", "i1"));
        assert_eq!(record.user_id, "u1");
        assert!((record.predicted_rating - (6.75 + 0.08 - 0.03)).abs() < 1e-12);
    }
}
