pub mod output;
pub mod recommendation;

pub use recommendation::{CollaborativeRecommender, RecommendationRun, TrainingReport};
