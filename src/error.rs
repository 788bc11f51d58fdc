use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommenderError>;

/// Every failure the recommender can report. All of them abort the run.
#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error("input schema error at line {line}: {message}")]
    InputSchema { line: usize, message: String },

    #[error("invalid rating {value} for ({user_id}, {item_id}) at line {line}")]
    InvalidRating {
        line: usize,
        user_id: String,
        item_id: String,
        value: String,
    },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("non-finite {parameter} after update of record {record} in epoch {epoch}")]
    NumericInstability {
        epoch: usize,
        record: usize,
        parameter: &'static str,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
