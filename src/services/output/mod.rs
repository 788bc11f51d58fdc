use crate::error::Result;
use crate::models::PredictionRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes `UserId,ItemId,Predictions` rows in the given order. The header is
/// written even when there are no predictions.
pub fn write_predictions<W: Write>(writer: W, predictions: &[PredictionRecord]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(["UserId", "ItemId", "Predictions"])?;
    for record in predictions {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_predictions<P: AsRef<Path>>(path: P, predictions: &[PredictionRecord]) -> Result<()> {
    let path = path.as_ref();
    write_predictions(File::create(path)?, predictions)?;
    info!(path = %path.display(), count = predictions.len(), "predictions saved");
    Ok(())
}

/// Writes only the identifier columns, `UserId,ItemId`.
pub fn write_identifiers<W: Write>(writer: W, predictions: &[PredictionRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["UserId", "ItemId"])?;
    for record in predictions {
        csv_writer.write_record([record.user_id.as_str(), record.item_id.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn print_predictions(predictions: &[PredictionRecord]) -> Result<()> {
    let stdout = std::io::stdout();
    write_identifiers(stdout.lock(), predictions)
}
