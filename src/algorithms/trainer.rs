use super::{
    ConvergenceMonitor, Decision, IndexedRating, ModelParameters, Optimizer, Sgd, StopReason,
    ValidationErrorHistory, ValidationSample,
};
use crate::config::TrainingConfig;
use crate::error::{RecommenderError, Result};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub epochs_run: usize,
    pub stop_reason: StopReason,
    pub history: ValidationErrorHistory,
}

/// Epoch loop over the training set in its given order.
pub struct SgdTrainer<O: Optimizer = Sgd> {
    optimizer: O,
    n_epochs: usize,
}

impl SgdTrainer<Sgd> {
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self::new(
            Sgd::new(config.learning_rate, config.regularization_factor),
            config.n_epochs,
        )
    }
}

impl<O: Optimizer> SgdTrainer<O> {
    pub fn new(optimizer: O, n_epochs: usize) -> Self {
        Self {
            optimizer,
            n_epochs,
        }
    }

    /// One full pass. Fails on the first update that leaves a non-finite parameter.
    pub fn run_epoch(
        &self,
        params: &mut ModelParameters,
        training: &[IndexedRating],
        global_mean: f64,
        epoch: usize,
    ) -> Result<()> {
        for (record, sample) in training.iter().enumerate() {
            self.optimizer.step(params, sample, global_mean);
            check_finite(params, sample, epoch, record)?;
        }
        Ok(())
    }

    /// Trains until the monitor stops or the epoch budget runs out. The
    /// parameters of the last completed epoch are kept either way.
    pub fn train(
        &self,
        params: &mut ModelParameters,
        training: &[IndexedRating],
        validation: &[ValidationSample],
        global_mean: f64,
        mut monitor: ConvergenceMonitor,
    ) -> Result<TrainingOutcome> {
        if training.is_empty() {
            return Err(RecommenderError::InsufficientData(
                "training set is empty".to_string(),
            ));
        }

        monitor.start();
        let mut epochs_run = 0;
        let mut stop_reason = StopReason::EpochBudgetExhausted;

        for epoch in 0..self.n_epochs {
            self.run_epoch(params, training, global_mean, epoch)?;
            epochs_run = epoch + 1;

            if let Decision::Stop(reason) = monitor.check(params, global_mean, validation, epoch) {
                stop_reason = reason;
                break;
            }
        }

        info!(epochs_run, ?stop_reason, "training finished");
        debug!(history = ?monitor.history().values(), "validation history");

        Ok(TrainingOutcome {
            epochs_run,
            stop_reason,
            history: monitor.into_history(),
        })
    }
}

fn check_finite(
    params: &ModelParameters,
    sample: &IndexedRating,
    epoch: usize,
    record: usize,
) -> Result<()> {
    let instability = |parameter| RecommenderError::NumericInstability {
        epoch: epoch + 1,
        record,
        parameter,
    };

    if !params.user_bias[sample.user].is_finite() {
        return Err(instability("user bias"));
    }
    if !params.item_bias[sample.item].is_finite() {
        return Err(instability("item bias"));
    }
    if !params.user_factors.row(sample.user).iter().all(|v| v.is_finite()) {
        return Err(instability("user factor"));
    }
    if !params.item_factors.row(sample.item).iter().all(|v| v.is_finite()) {
        return Err(instability("item factor"));
    }
    Ok(())
}
