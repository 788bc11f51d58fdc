pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::{Config, RatingDomain, TrainingConfig};
pub use error::{RecommenderError, Result};
pub use models::*;
pub use services::{CollaborativeRecommender, RecommendationRun, TrainingReport};

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
