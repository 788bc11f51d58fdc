use crate::algorithms::convergence::validation_rmse;
use crate::algorithms::{
    ConvergenceMonitor, EntityMaps, LatentFactorModel, ParameterInitializer, Predictor,
    SgdTrainer, StopReason, ValidationErrorHistory,
};
use crate::config::Config;
use crate::error::{RecommenderError, Result};
use crate::models::{PredictionRecord, RatingRecord, TargetPair};
use crate::services::output::{print_predictions, save_predictions};
use crate::utils::metrics::mae;
use crate::utils::validation::{validate_rating_records, validate_training_set};
use crate::utils::mean;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub epochs_run: usize,
    pub stop_reason: StopReason,
    pub validation_rmse: ValidationErrorHistory,
    pub final_validation_rmse: Option<f64>,
    pub final_validation_mae: Option<f64>,
    pub global_mean: f64,
    pub n_users: usize,
    pub n_items: usize,
    pub unknown_validation_pairs: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct RecommendationRun {
    /// Present when `output.return_predictions` is set.
    pub predictions: Option<Vec<PredictionRecord>>,
    pub report: TrainingReport,
}

/// Trains a fresh latent-factor model per call and scores target pairs with it.
#[derive(Debug, Clone)]
pub struct CollaborativeRecommender {
    config: Config,
}

impl CollaborativeRecommender {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn fit(
        &self,
        training: &[RatingRecord],
        validation: &[RatingRecord],
    ) -> Result<(LatentFactorModel, TrainingReport)> {
        validate_training_set(training)?;
        validate_rating_records(training, &self.config.rating)?;
        validate_rating_records(validation, &self.config.rating)?;

        let run_id = Uuid::new_v4();
        let span = info_span!("training_run", %run_id);
        let _enter = span.enter();
        let started_at = Utc::now();
        let clock = Instant::now();

        let maps = EntityMaps::from_training(training);
        let indexed_training = maps.index_training(training);
        let indexed_validation = maps.index_validation(validation);

        let unknown_validation_pairs = indexed_validation
            .iter()
            .filter(|s| !s.user.is_known() || !s.item.is_known())
            .count();
        if unknown_validation_pairs > 0 {
            warn!(
                unknown_validation_pairs,
                "validation pairs reference users or items absent from training"
            );
        }

        let global_mean = mean(training.iter().map(|r| r.rating))
            .ok_or_else(|| RecommenderError::InsufficientData("training set is empty".to_string()))?;

        let training_config = &self.config.training;
        info!(
            n_ratings = training.len(),
            n_validation = validation.len(),
            global_mean,
            "starting training"
        );

        let mut params = ParameterInitializer::from_config(training_config).initialize(
            maps.users.len(),
            maps.items.len(),
            training_config.n_factors,
        )?;
        info!(
            n_users = params.n_users(),
            n_items = params.n_items(),
            n_factors = params.n_factors(),
            "parameters initialized"
        );

        let monitor = ConvergenceMonitor::new(training_config.n_epochs, training_config.stop_threshold)
            .with_time_budget(training_config.time_budget());
        let outcome = SgdTrainer::from_config(training_config).train(
            &mut params,
            &indexed_training,
            &indexed_validation,
            global_mean,
            monitor,
        )?;

        let final_validation_rmse = validation_rmse(&params, global_mean, &indexed_validation);
        let final_validation_mae = mae(indexed_validation
            .iter()
            .map(|s| (s.rating, params.score(global_mean, s.user, s.item))));

        let report = TrainingReport {
            run_id,
            started_at,
            epochs_run: outcome.epochs_run,
            stop_reason: outcome.stop_reason,
            validation_rmse: outcome.history,
            final_validation_rmse,
            final_validation_mae,
            global_mean,
            n_users: params.n_users(),
            n_items: params.n_items(),
            unknown_validation_pairs,
            elapsed: clock.elapsed(),
        };

        let model = LatentFactorModel {
            maps,
            params,
            global_mean,
        };

        Ok((model, report))
    }

    /// Clamped predictions ordered by user id, then rating descending.
    pub fn predict(&self, model: &LatentFactorModel, targets: &[TargetPair]) -> Vec<PredictionRecord> {
        let mut predictions = Predictor::new(model, self.config.rating).predict_all(targets);
        sort_predictions(&mut predictions);
        predictions
    }

    /// Full pipeline: train, predict, then apply every enabled output mode.
    pub fn run(
        &self,
        training: &[RatingRecord],
        validation: &[RatingRecord],
        targets: &[TargetPair],
    ) -> Result<RecommendationRun> {
        let (model, report) = self.fit(training, validation)?;
        let predictions = self.predict(&model, targets);

        let output = &self.config.output;
        if output.save_to_file {
            save_predictions(&output.path, &predictions)?;
        }
        if output.print_on_console {
            print_predictions(&predictions)?;
        }

        Ok(RecommendationRun {
            predictions: output.return_predictions.then_some(predictions),
            report,
        })
    }
}

/// Stable sort: user id ascending, predicted rating descending, ties keep input order.
pub fn sort_predictions(predictions: &mut [PredictionRecord]) {
    predictions.sort_by(|a, b| {
        compare_identifiers(&a.user_id, &b.user_id)
            .then_with(|| b.predicted_rating.total_cmp(&a.predicted_rating))
    });
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum IdentifierKey<'a> {
    Integer(i128),
    Text(&'a str),
}

impl<'a> IdentifierKey<'a> {
    fn parse(id: &'a str) -> Self {
        let digits = id.strip_prefix('-').unwrap_or(id);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = id.parse() {
                return IdentifierKey::Integer(value);
            }
        }
        IdentifierKey::Text(id)
    }
}

/// Integer identifiers order numerically and before any textual identifier;
/// textual ones order lexicographically. Equal numbers fall back to the text.
pub fn compare_identifiers(a: &str, b: &str) -> Ordering {
    IdentifierKey::parse(a)
        .cmp(&IdentifierKey::parse(b))
        .then_with(|| a.cmp(b))
}
