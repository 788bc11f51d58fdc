use super::{ModelParameters, ValidationSample};
use crate::utils::metrics::rmse;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Validation RMSE stopped improving by at least the threshold.
    Converged,
    TimeBudgetExhausted,
    EpochBudgetExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop(StopReason),
}

/// Per-epoch validation RMSE, one slot per epoch of the budget. Slots after an
/// early stop, or for an empty validation set, stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorHistory {
    values: Vec<Option<f64>>,
}

impl ValidationErrorHistory {
    pub fn new(n_epochs: usize) -> Self {
        Self {
            values: vec![None; n_epochs],
        }
    }

    pub fn get(&self, epoch: usize) -> Option<f64> {
        self.values.get(epoch).copied().flatten()
    }

    pub fn record(&mut self, epoch: usize, value: Option<f64>) {
        if let Some(slot) = self.values.get_mut(epoch) {
            *slot = value;
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Last recorded value, if any.
    pub fn last(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}

/// RMSE over the validation set under the shared scoring rule, without clamping.
pub fn validation_rmse(
    params: &ModelParameters,
    global_mean: f64,
    validation: &[ValidationSample],
) -> Option<f64> {
    rmse(
        validation
            .iter()
            .map(|s| s.rating - params.score(global_mean, s.user, s.item)),
    )
}

#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    stop_threshold: f64,
    time_budget: Option<Duration>,
    started: Instant,
    history: ValidationErrorHistory,
}

impl ConvergenceMonitor {
    pub fn new(n_epochs: usize, stop_threshold: f64) -> Self {
        Self {
            stop_threshold,
            time_budget: None,
            started: Instant::now(),
            history: ValidationErrorHistory::new(n_epochs),
        }
    }

    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget = budget;
        self
    }

    /// Restarts the wall clock the time budget is measured against.
    pub fn start(&mut self) {
        self.started = Instant::now();
    }

    pub fn history(&self) -> &ValidationErrorHistory {
        &self.history
    }

    pub fn into_history(self) -> ValidationErrorHistory {
        self.history
    }

    /// Scores the validation set after `epoch` (zero-based) and decides whether to go on.
    pub fn check(
        &mut self,
        params: &ModelParameters,
        global_mean: f64,
        validation: &[ValidationSample],
        epoch: usize,
    ) -> Decision {
        let current = validation_rmse(params, global_mean, validation);
        self.history.record(epoch, current);

        match current {
            Some(value) => info!(epoch = epoch + 1, rmse = value, "validation RMSE"),
            None => warn!(epoch = epoch + 1, "validation set is empty, RMSE undefined"),
        }

        if epoch > 0 {
            if let (Some(current), Some(previous)) = (current, self.history.get(epoch - 1)) {
                if current + self.stop_threshold > previous {
                    debug!(current, previous, "validation RMSE no longer improving");
                    return Decision::Stop(StopReason::Converged);
                }
            }
        }

        if let Some(budget) = self.time_budget {
            let elapsed = self.started.elapsed();
            if elapsed >= budget {
                warn!(?elapsed, ?budget, "training time budget exhausted");
                return Decision::Stop(StopReason::TimeBudgetExhausted);
            }
        }

        Decision::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Lookup;
    use ndarray::array;

    fn params_with_user_bias(bias: f64) -> ModelParameters {
        ModelParameters {
            user_bias: array![bias],
            item_bias: array![0.0],
            user_factors: array![[0.0]],
            item_factors: array![[0.0]],
        }
    }

    fn validation() -> Vec<ValidationSample> {
        vec![ValidationSample {
            user: Lookup::Known(0),
            item: Lookup::Known(0),
            rating: 6.0,
        }]
    }

    #[test]
    fn test_first_epoch_always_continues() {
        let mut monitor = ConvergenceMonitor::new(5, 1e-6);
        let decision = monitor.check(&params_with_user_bias(0.0), 5.0, &validation(), 0);
        assert_eq!(decision, Decision::Continue);
        assert_eq!(monitor.history().get(0), Some(1.0));
    }

    #[test]
    fn test_stops_when_improvement_is_below_threshold() {
        let mut monitor = ConvergenceMonitor::new(5, 0.1);
        let data = validation();

        assert_eq!(monitor.check(&params_with_user_bias(0.0), 5.0, &data, 0), Decision::Continue);
        // 1.0 -> 0.5 is a real improvement.
        assert_eq!(monitor.check(&params_with_user_bias(0.5), 5.0, &data, 1), Decision::Continue);
        // 0.5 -> 0.45 is not.
        assert_eq!(
            monitor.check(&params_with_user_bias(0.55), 5.0, &data, 2),
            Decision::Stop(StopReason::Converged)
        );

        let history = monitor.into_history();
        assert_eq!(history.len(), 5);
        assert_eq!(history.get(3), None);
        assert!((history.last().unwrap() - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_stop_follows_several_improving_epochs() {
        let mut monitor = ConvergenceMonitor::new(8, 0.05);
        let data = validation();
        // RMSE trajectory 1.0, 0.6, 0.3, 0.2, 0.18.
        let biases = [0.0, 0.4, 0.7, 0.8, 0.82];

        for (epoch, &bias) in biases[..4].iter().enumerate() {
            assert_eq!(
                monitor.check(&params_with_user_bias(bias), 5.0, &data, epoch),
                Decision::Continue,
                "epoch {}",
                epoch
            );
        }
        assert_eq!(
            monitor.check(&params_with_user_bias(biases[4]), 5.0, &data, 4),
            Decision::Stop(StopReason::Converged)
        );

        let history = monitor.history();
        assert!((history.get(3).unwrap() - 0.2).abs() < 1e-12);
        assert!((history.get(4).unwrap() - 0.18).abs() < 1e-12);
        assert_eq!(history.get(5), None);
    }

    #[test]
    fn test_worse_error_stops() {
        let mut monitor = ConvergenceMonitor::new(3, 0.0);
        let data = validation();
        monitor.check(&params_with_user_bias(0.5), 5.0, &data, 0);
        assert_eq!(
            monitor.check(&params_with_user_bias(0.0), 5.0, &data, 1),
            Decision::Stop(StopReason::Converged)
        );
    }

    #[test]
    fn test_unknown_validation_entities_score_global_mean() {
        let data = vec![ValidationSample {
            user: Lookup::Unknown,
            item: Lookup::Unknown,
            rating: 7.0,
        }];
        let value = validation_rmse(&params_with_user_bias(3.0), 5.0, &data);
        assert_eq!(value, Some(2.0));
    }

    #[test]
    fn test_empty_validation_never_stops() {
        let mut monitor = ConvergenceMonitor::new(3, 1e-6);
        let params = params_with_user_bias(0.0);
        for epoch in 0..3 {
            assert_eq!(monitor.check(&params, 5.0, &[], epoch), Decision::Continue);
        }
        assert!(monitor.history().values().iter().all(Option::is_none));
    }

    #[test]
    fn test_zero_time_budget_stops_after_first_epoch() {
        let mut monitor =
            ConvergenceMonitor::new(3, 1e-6).with_time_budget(Some(Duration::ZERO));
        monitor.start();
        assert_eq!(
            monitor.check(&params_with_user_bias(0.0), 5.0, &validation(), 0),
            Decision::Stop(StopReason::TimeBudgetExhausted)
        );
    }
}
