//! Input tables: JSON-lines ratings, CSV targets, and the seeded train/validation split.

use super::validation::{validate_identifier, validate_rating_value};
use crate::config::RatingDomain;
use crate::error::{RecommenderError, Result};
use crate::models::{RatingRecord, TargetPair};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Reads one `{UserId, ItemId, Rating}` object per line. Blank lines are skipped.
pub fn read_ratings<R: BufRead>(reader: R, domain: &RatingDomain) -> Result<Vec<RatingRecord>> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let object: Map<String, Value> =
            serde_json::from_str(&line).map_err(|e| RecommenderError::InputSchema {
                line: line_no,
                message: format!("expected a JSON object: {}", e),
            })?;

        let user_id = validate_identifier(object.get("UserId"), "UserId", line_no)?;
        let item_id = validate_identifier(object.get("ItemId"), "ItemId", line_no)?;
        let rating =
            validate_rating_value(object.get("Rating"), &user_id, &item_id, domain, line_no)?;

        records.push(RatingRecord {
            user_id,
            item_id,
            rating,
        });
    }

    debug!(count = records.len(), "read rating records");
    Ok(records)
}

pub fn load_ratings<P: AsRef<Path>>(path: P, domain: &RatingDomain) -> Result<Vec<RatingRecord>> {
    let file = File::open(path)?;
    read_ratings(BufReader::new(file), domain)
}

/// Reads a CSV whose header names `UserId` and `ItemId` in any position.
pub fn read_targets<R: Read>(reader: R) -> Result<Vec<TargetPair>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| RecommenderError::InputSchema {
                line: 1,
                message: format!("missing column {}", name),
            })
    };
    let user_col = column("UserId")?;
    let item_col = column("ItemId")?;

    let mut targets = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let line = index + 2;
        let field = |col: usize, name: &str| match row.get(col) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(RecommenderError::InputSchema {
                line,
                message: format!("missing value for {}", name),
            }),
        };

        targets.push(TargetPair {
            user_id: field(user_col, "UserId")?,
            item_id: field(item_col, "ItemId")?,
        });
    }

    debug!(count = targets.len(), "read target pairs");
    Ok(targets)
}

pub fn load_targets<P: AsRef<Path>>(path: P) -> Result<Vec<TargetPair>> {
    let file = File::open(path)?;
    read_targets(BufReader::new(file))
}

/// Samples `round(train_fraction * n)` records for training, in sampled order;
/// the rest become validation in their original order.
pub fn train_validation_split(
    records: &[RatingRecord],
    train_fraction: f64,
    seed: u64,
) -> (Vec<RatingRecord>, Vec<RatingRecord>) {
    let n_train = ((train_fraction * records.len() as f64).round() as usize).min(records.len());

    let mut positions: Vec<usize> = (0..records.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    positions.shuffle(&mut rng);

    let (train_positions, rest) = positions.split_at(n_train);
    let mut validation_positions = rest.to_vec();
    validation_positions.sort_unstable();

    let training = train_positions.iter().map(|&p| records[p].clone()).collect();
    let validation = validation_positions
        .iter()
        .map(|&p| records[p].clone())
        .collect();

    (training, validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ratings() {
        let input = "{\"UserId\":\"u1\",\"ItemId\":\"i1\",\"Rating\":8}\n\n{\"UserId\":7,\"ItemId\":\"i2\",\"Rating\":4.5,\"Extra\":true}\n";
        let records = read_ratings(input.as_bytes(), &RatingDomain::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], RatingRecord::new("u1", "i1", 8.0));
        assert_eq!(records[1], RatingRecord::new("7", "i2", 4.5));
    }

    #[test]
    fn test_read_ratings_reports_line_of_bad_record() {
        let input = "{\"UserId\":\"u1\",\"ItemId\":\"i1\",\"Rating\":8}\n{\"UserId\":\"u1\",\"Rating\":8}\n";
        let err = read_ratings(input.as_bytes(), &RatingDomain::default()).unwrap_err();
        assert!(matches!(err, RecommenderError::InputSchema { line: 2, .. }));

        let input = "{\"UserId\":\"u1\",\"ItemId\":\"i1\",\"Rating\":12}\n";
        let err = read_ratings(input.as_bytes(), &RatingDomain::default()).unwrap_err();
        assert!(matches!(err, RecommenderError::InvalidRating { line: 1, .. }));

        let err = read_ratings("not json\n".as_bytes(), &RatingDomain::default()).unwrap_err();
        assert!(matches!(err, RecommenderError::InputSchema { line: 1, .. }));
    }

    #[test]
    fn test_read_targets_any_column_order() {
        let input = "ItemId,UserId\ni1, u2\ni3,u1\n";
        let targets = read_targets(input.as_bytes()).unwrap();
        assert_eq!(
            targets,
            vec![TargetPair::new("u2", "i1"), TargetPair::new("u1", "i3")]
        );
    }

    #[test]
    fn test_read_targets_missing_column() {
        let err = read_targets("UserId,Other\nu1,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, RecommenderError::InputSchema { line: 1, .. }));
    }

    #[test]
    fn test_split_is_deterministic_and_partitions() {
        let records: Vec<RatingRecord> = (0..10)
            .map(|i| RatingRecord::new(format!("u{}", i), "i", i as f64))
            .collect();

        let (train_a, valid_a) = train_validation_split(&records, 0.8, 8);
        let (train_b, valid_b) = train_validation_split(&records, 0.8, 8);
        assert_eq!(train_a, train_b);
        assert_eq!(valid_a, valid_b);
        assert_eq!(train_a.len(), 8);
        assert_eq!(valid_a.len(), 2);

        let mut all: Vec<f64> = train_a.iter().chain(&valid_a).map(|r| r.rating).collect();
        all.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(all, (0..10).map(|i| i as f64).collect::<Vec<_>>());

        assert!(valid_a[0].rating < valid_a[1].rating);
    }

    #[test]
    fn test_full_fraction_keeps_everything_for_training() {
        let records = vec![RatingRecord::new("u", "i", 1.0)];
        let (train, valid) = train_validation_split(&records, 1.0, 8);
        assert_eq!(train.len(), 1);
        assert!(valid.is_empty());
    }
}
