//! Dataset Loader Module
//! Reads the CENIPA CSV exports into Polars DataFrames.
//!
//! The exports are `;`-separated and windows-1252 encoded, and use the
//! tokens `***`, `NULL`, `****`, `*****` for missing values in any column.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use polars::prelude::*;
use thiserror::Error;

use super::{AIRCRAFT_ID, CLASSIFICATION, MANUFACTURER, OCCURRENCE_DATE, OCCURRENCE_ID, STATE};

/// Field separator used by the CENIPA exports.
pub const SEPARATOR: u8 = b';';

/// Tokens the source data uses for missing values, in any column.
pub const NULL_TOKENS: [&str; 4] = ["***", "NULL", "****", "*****"];

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Structurally malformed CSV (e.g. inconsistent field counts).
    /// Malformed rows abort the load; no partial dataset is produced.
    #[error("malformed CSV {path}: {message}")]
    Format { path: PathBuf, message: String },
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },
}

/// Read one export into a DataFrame, preserving every column and row order.
fn read_table(path: &Path) -> Result<DataFrame, LoaderError> {
    let bytes = std::fs::read(path).map_err(|e| LoaderError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Single-byte decode; every byte sequence is valid windows-1252.
    let (text, _, _) = WINDOWS_1252.decode(&bytes);
    let utf8 = text.into_owned().into_bytes();

    let null_tokens: Vec<PlSmallStr> = NULL_TOKENS.iter().map(|t| (*t).into()).collect();

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(SEPARATOR)
                .with_null_values(Some(NullValues::AllColumns(null_tokens))),
        )
        .into_reader_with_file_handle(Cursor::new(utf8))
        .finish()
        .map_err(|e| LoaderError::Format {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded table"
    );

    Ok(df)
}

fn require_columns(df: &DataFrame, columns: &[&str], path: &Path) -> Result<(), LoaderError> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(LoaderError::MissingColumn {
                column: (*column).to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Load the occurrence export.
pub fn load_occurrences(path: &Path) -> Result<DataFrame, LoaderError> {
    let df = read_table(path)?;
    require_columns(
        &df,
        &[OCCURRENCE_ID, OCCURRENCE_DATE, CLASSIFICATION, STATE],
        path,
    )?;
    Ok(df)
}

/// Load the aircraft export.
pub fn load_aircraft(path: &Path) -> Result<DataFrame, LoaderError> {
    let df = read_table(path)?;
    require_columns(&df, &[AIRCRAFT_ID, MANUFACTURER], path)?;
    Ok(df)
}

/// Load both exports.
pub fn load_raw_tables(
    occurrence_path: &Path,
    aircraft_path: &Path,
) -> Result<(DataFrame, DataFrame), LoaderError> {
    let occurrences = load_occurrences(occurrence_path)?;
    let aircraft = load_aircraft(aircraft_path)?;
    Ok((occurrences, aircraft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let (bytes, _, _) = WINDOWS_1252.encode(content);
        file.write_all(&bytes).unwrap();
        file
    }

    #[test]
    fn loads_semicolon_separated_table() {
        let file = create_csv(
            "codigo_ocorrencia;ocorrencia_classificacao;ocorrencia_uf;ocorrencia_dia\n\
             1;ACIDENTE;SP;31/12/2020\n\
             2;INCIDENTE;RJ;01/01/2021\n",
        );
        let df = load_occurrences(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 4);
    }

    #[test]
    fn null_tokens_become_missing_values() {
        let file = create_csv(
            "codigo_ocorrencia;ocorrencia_classificacao;ocorrencia_uf;ocorrencia_dia\n\
             1;****;***;31/12/2020\n\
             2;NULL;SP;*****\n",
        );
        let df = load_occurrences(file.path()).unwrap();
        let classification = df
            .column("ocorrencia_classificacao")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        assert_eq!(classification.get(0), None);
        assert_eq!(classification.get(1), None);

        let uf = df
            .column("ocorrencia_uf")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        assert_eq!(uf.get(0), None);
        assert_eq!(uf.get(1), Some("SP"));
    }

    #[test]
    fn decodes_legacy_encoding() {
        let file = create_csv(
            "codigo_ocorrencia;ocorrencia_classificacao;ocorrencia_uf;ocorrencia_dia;cidade\n\
             1;ACIDENTE;SP;31/12/2020;SÃO PAULO\n",
        );
        let df = load_occurrences(file.path()).unwrap();
        let cidade = df
            .column("cidade")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        assert_eq!(cidade.get(0), Some("SÃO PAULO"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_occurrences(Path::new("/nonexistent/ocorrencia.csv"));
        assert!(matches!(result, Err(LoaderError::Io { .. })));
    }

    #[test]
    fn ragged_row_is_format_error() {
        let file = create_csv(
            "codigo_ocorrencia;ocorrencia_classificacao;ocorrencia_uf;ocorrencia_dia\n\
             1;ACIDENTE;SP;31/12/2020;extra;fields\n",
        );
        let result = load_occurrences(file.path());
        assert!(matches!(result, Err(LoaderError::Format { .. })));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let file = create_csv("codigo_ocorrencia;ocorrencia_uf\n1;SP\n");
        let result = load_occurrences(file.path());
        assert!(
            matches!(result, Err(LoaderError::MissingColumn { ref column, .. }) if column == "ocorrencia_dia")
        );
    }
}
