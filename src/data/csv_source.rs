//! Delimited-text channel files (PSCAD `.csv` exports).
//!
//! The first column is time, every other column is a channel named by its
//! header. Reading a channel drops rows earlier than `init_time` and shifts the
//! retained time axis by `-init_time`.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::data::series::Series;
use crate::error::SourceError;

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, SourceError> {
    if !path.is_file() {
        return Err(SourceError::FileUnavailable(path.to_path_buf()));
    }
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SourceError::parse(path, e))
}

fn headers(path: &Path, rdr: &mut csv::Reader<std::fs::File>) -> Result<StringRecord, SourceError> {
    let h = rdr.headers().map_err(|e| SourceError::parse(path, e))?.clone();
    if h.is_empty() {
        return Err(SourceError::parse(path, "missing header row"));
    }
    Ok(h)
}

/// Channel names: every header after the first (time) column.
pub fn list_channels(path: &Path) -> Result<Vec<String>, SourceError> {
    let mut rdr = open(path)?;
    let h = headers(path, &mut rdr)?;
    Ok(h.iter().skip(1).map(str::to_string).collect())
}

/// Read `column` against the time column, keeping rows with `time >= init_time`.
pub fn read_series(path: &Path, column: &str, init_time: f64) -> Result<Series, SourceError> {
    let mut rdr = open(path)?;
    let h = headers(path, &mut rdr)?;
    let idx = h
        .iter()
        .skip(1)
        .position(|name| name == column)
        .map(|i| i + 1)
        .ok_or_else(|| SourceError::ChannelNotFound {
            file: path.to_path_buf(),
            channel: column.to_string(),
        })?;

    let mut series = Series::default();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| SourceError::parse(path, e))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let t = parse_time(path, row, record.get(0))?;
        if t.is_nan() || t < init_time {
            continue;
        }
        let v = parse_value(path, row, record.get(idx))?;
        series.time.push(t - init_time);
        series.values.push(v);
    }
    Ok(series)
}

fn parse_time(path: &Path, row: usize, cell: Option<&str>) -> Result<f64, SourceError> {
    let cell = cell.unwrap_or("");
    cell.parse::<f64>()
        .map_err(|_| SourceError::parse(path, format!("row {}: bad time value '{cell}'", row + 2)))
}

// Missing cells read as NaN so one short row does not discard the channel.
fn parse_value(path: &Path, row: usize, cell: Option<&str>) -> Result<f64, SourceError> {
    match cell {
        None | Some("") => Ok(f64::NAN),
        Some(c) => c
            .parse::<f64>()
            .map_err(|_| SourceError::parse(path, format!("row {}: bad sample '{c}'", row + 2))),
    }
}
