use crate::error::{RecommenderError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub training: TrainingConfig,
    pub rating: RatingDomain,
    pub data: DataConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub regularization_factor: f64,
    pub n_epochs: usize,
    pub n_factors: usize,
    pub stop_threshold: f64,
    pub seed: u64,
    pub init_mean: f64,
    pub init_std_dev: f64,
    /// Wall-clock budget checked between epochs. `None` disables it.
    pub time_budget_secs: Option<u64>,
}

impl TrainingConfig {
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs)
    }
}

/// Closed interval every prediction is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingDomain {
    pub min_rating: f64,
    pub max_rating: f64,
}

impl RatingDomain {
    pub fn new(min_rating: f64, max_rating: f64) -> Self {
        Self {
            min_rating,
            max_rating,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min_rating && value <= self.max_rating
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_rating, self.max_rating)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub train_fraction: f64,
    pub split_seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub save_to_file: bool,
    pub print_on_console: bool,
    pub return_predictions: bool,
    pub path: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            regularization_factor: 0.05,
            n_epochs: 50,
            n_factors: 25,
            stop_threshold: 1e-6,
            seed: 13,
            init_mean: 0.0,
            init_std_dev: 0.01,
            time_budget_secs: None,
        }
    }
}

impl Default for RatingDomain {
    fn default() -> Self {
        Self::new(0.0, 10.0)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            split_seed: 8,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_to_file: true,
            print_on_console: false,
            return_predictions: true,
            path: PathBuf::from("submission.csv"),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("FACTOREC").separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;
        self.rating.validate()?;

        let fraction = self.data.train_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(RecommenderError::InvalidConfig(format!(
                "train_fraction must be in (0, 1], got {}",
                fraction
            )));
        }

        Ok(())
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_factors == 0 {
            return Err(RecommenderError::InsufficientData(
                "n_factors must be greater than 0".to_string(),
            ));
        }

        let non_negative = [
            ("learning_rate", self.learning_rate),
            ("regularization_factor", self.regularization_factor),
            ("stop_threshold", self.stop_threshold),
            ("init_std_dev", self.init_std_dev),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(RecommenderError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        if !self.init_mean.is_finite() {
            return Err(RecommenderError::InvalidConfig(
                "init_mean must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

impl RatingDomain {
    pub fn validate(&self) -> Result<()> {
        if !self.min_rating.is_finite()
            || !self.max_rating.is_finite()
            || self.min_rating >= self.max_rating
        {
            return Err(RecommenderError::InvalidConfig(format!(
                "rating domain [{}, {}] is empty or not finite",
                self.min_rating, self.max_rating
            )));
        }
        Ok(())
    }
}
