use super::ModelParameters;
use crate::config::TrainingConfig;
use crate::error::{RecommenderError, Result};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

pub fn zeros(size: usize) -> Array1<f64> {
    Array1::zeros(size)
}

/// Row-major `rows x cols` matrix drawn from `distribution`, consuming `rng` in row order.
pub fn normal_matrix<R: Rng>(
    rng: &mut R,
    distribution: &Normal<f64>,
    rows: usize,
    cols: usize,
) -> Result<Array2<f64>> {
    let values: Vec<f64> = (0..rows * cols).map(|_| rng.sample(distribution)).collect();
    Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| RecommenderError::InvalidConfig(format!("factor matrix shape: {}", e)))
}

/// Seeds fresh bias vectors and factor matrices for one training run.
#[derive(Debug, Clone)]
pub struct ParameterInitializer {
    seed: u64,
    mean: f64,
    std_dev: f64,
}

impl ParameterInitializer {
    pub fn new(seed: u64, mean: f64, std_dev: f64) -> Self {
        Self {
            seed,
            mean,
            std_dev,
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self::new(config.seed, config.init_mean, config.init_std_dev)
    }

    /// Zero biases; user factors are drawn first, then item factors, from one seeded stream.
    pub fn initialize(
        &self,
        n_users: usize,
        n_items: usize,
        n_factors: usize,
    ) -> Result<ModelParameters> {
        if n_users == 0 || n_items == 0 {
            return Err(RecommenderError::InsufficientData(format!(
                "cannot initialize parameters for {} users and {} items",
                n_users, n_items
            )));
        }
        if n_factors == 0 {
            return Err(RecommenderError::InsufficientData(
                "n_factors must be greater than 0".to_string(),
            ));
        }

        let distribution = Normal::new(self.mean, self.std_dev)
            .map_err(|e| RecommenderError::InvalidConfig(format!("factor distribution: {}", e)))?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let user_factors = normal_matrix(&mut rng, &distribution, n_users, n_factors)?;
        let item_factors = normal_matrix(&mut rng, &distribution, n_items, n_factors)?;

        Ok(ModelParameters {
            user_bias: zeros(n_users),
            item_bias: zeros(n_items),
            user_factors,
            item_factors,
        })
    }
}
