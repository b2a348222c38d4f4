//! Data loading utilities

use crate::error::{HeartError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Load a CSV file with a header row. Empty cells become nulls; nothing else
/// is transformed.
pub fn load_data(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let start = Instant::now();

    let file = File::open(path)
        .map_err(|e| HeartError::DataError(format!("cannot open {}: {}", path.display(), e)))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| HeartError::DataError(format!("cannot parse {}: {}", path.display(), e)))?;

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded dataset"
    );
    Ok(df)
}

/// Write a frame as CSV to any writer
pub fn write_csv<W: Write>(df: &mut DataFrame, writer: W) -> Result<()> {
    CsvWriter::new(writer)
        .include_header(true)
        .finish(df)
        .map_err(|e| HeartError::DataError(e.to_string()))
}

/// Save a frame to a CSV file
pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_csv(df, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_csv_with_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heart.csv");
        std::fs::write(&path, "Age,Sex,Cholesterol\n40,M,289\n49,F,\n").unwrap();

        let df = load_data(&path).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("Cholesterol").unwrap().null_count(), 1);
        assert_eq!(df.column("Sex").unwrap().str().unwrap().get(1), Some("F"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_data("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, HeartError::DataError(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut df = df!("a" => &[1i64, 2], "b" => &["x", "y"]).unwrap();

        save_csv(&mut df, &path).unwrap();
        let reloaded = load_data(&path).unwrap();
        assert!(reloaded.equals(&df));
    }
}
