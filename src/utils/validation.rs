use crate::config::RatingDomain;
use crate::error::{RecommenderError, Result};
use crate::models::RatingRecord;
use serde_json::Value;

/// Accepts JSON strings and integers as identifiers; integers keep their decimal form.
pub fn validate_identifier(value: Option<&Value>, field: &str, line: usize) -> Result<String> {
    let schema_error = |message: String| RecommenderError::InputSchema { line, message };

    match value {
        None | Some(Value::Null) => Err(schema_error(format!("missing field {}", field))),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(schema_error(format!("field {} is empty", field)))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Some(other) => Err(schema_error(format!(
            "field {} must be a string or integer, got {}",
            field, other
        ))),
    }
}

/// Extracts a rating that must be numeric and inside the domain.
pub fn validate_rating_value(
    value: Option<&Value>,
    user_id: &str,
    item_id: &str,
    domain: &RatingDomain,
    line: usize,
) -> Result<f64> {
    let invalid = |value: String| RecommenderError::InvalidRating {
        line,
        user_id: user_id.to_string(),
        item_id: item_id.to_string(),
        value,
    };

    let value = value.ok_or_else(|| RecommenderError::InputSchema {
        line,
        message: "missing field Rating".to_string(),
    })?;

    match value.as_f64() {
        Some(rating) if rating.is_finite() && domain.contains(rating) => Ok(rating),
        _ => Err(invalid(value.to_string())),
    }
}

/// Checks records built in code rather than parsed from a file.
pub fn validate_rating_records(records: &[RatingRecord], domain: &RatingDomain) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        if !record.rating.is_finite() || !domain.contains(record.rating) {
            return Err(RecommenderError::InvalidRating {
                line: index + 1,
                user_id: record.user_id.clone(),
                item_id: record.item_id.clone(),
                value: record.rating.to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_training_set(records: &[RatingRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(RecommenderError::InsufficientData(
            "training set is empty".to_string(),
        ));
    }
    Ok(())
}
