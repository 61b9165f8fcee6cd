//! Transformation Pipeline Module
//! Turns the two raw tables into one analysis-ready enriched table.
//!
//! Steps, in order: date validation (unparseable rows dropped), year
//! derivation, left join onto the aircraft table, manufacturer
//! normalization. Row order follows the surviving occurrence rows.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use thiserror::Error;

use super::{AIRCRAFT_ID, MANUFACTURER, MANUFACTURER_CLEAN, OCCURRENCE_DATE, OCCURRENCE_ID, YEAR};

/// Date format of the `ocorrencia_dia` column.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Exact-match canonicalization table applied after uppercase/trim.
/// Collapses legal-entity suffixes to the short brand name.
const CANONICAL_MANUFACTURERS: [(&str, &str); 6] = [
    ("EMBRAER S A", "EMBRAER"),
    ("CESSNA AIRCRAFT", "CESSNA"),
    ("PIPER AIRCRAFT", "PIPER"),
    ("BEECH AIRCRAFT", "BEECH"),
    ("BELL HELICOPTER", "BELL"),
    ("ROBINSON HELICOPTER", "ROBINSON"),
];

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("dataframe operation failed: {0}")]
    Frame(#[from] PolarsError),
}

/// The analysis-ready table plus ingestion counters.
#[derive(Debug, Clone)]
pub struct EnrichedDataset {
    pub frame: DataFrame,
    /// Occurrence rows read from the export, before date validation.
    pub occurrence_rows: usize,
    /// Aircraft rows read from the export.
    pub aircraft_rows: usize,
    /// Occurrence rows dropped for an unparseable or missing date.
    pub dropped_rows: usize,
}

/// Normalize a raw manufacturer name: uppercase, trim, then collapse known
/// legal-entity variants. Unmapped values pass through. Idempotent.
pub fn normalize_manufacturer(raw: &str) -> String {
    let cleaned = raw.trim().to_uppercase();
    for (variant, brand) in CANONICAL_MANUFACTURERS {
        if cleaned == variant {
            return brand.to_string();
        }
    }
    cleaned
}

/// Drop occurrence rows whose date does not parse as `dd/mm/yyyy` and attach
/// the derived `year` column. Returns the surviving frame and the drop count.
fn validate_dates(occurrences: &DataFrame) -> Result<(DataFrame, usize), PipelineError> {
    let dates = occurrences
        .column(OCCURRENCE_DATE)?
        .as_materialized_series()
        .str()?
        .clone();

    let mut keep = Vec::with_capacity(occurrences.height());
    let mut years: Vec<i32> = Vec::with_capacity(occurrences.height());

    for value in dates.into_iter() {
        match value.and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()) {
            Some(date) => {
                keep.push(true);
                years.push(date.year());
            }
            None => keep.push(false),
        }
    }

    let dropped = occurrences.height() - years.len();
    let mask = BooleanChunked::from_slice("valid_date".into(), &keep);
    let mut survivors = occurrences.filter(&mask)?;
    survivors.with_column(Column::new(YEAR.into(), years))?;

    Ok((survivors, dropped))
}

/// Keep only the first aircraft row per occurrence so the left join stays
/// one-to-one (occurrences involving several airframes keep the first
/// listed). Rows with a missing key are kept; they match nothing.
fn first_aircraft_per_occurrence(aircraft: &DataFrame) -> Result<DataFrame, PipelineError> {
    let keys = aircraft.column(AIRCRAFT_ID)?.as_materialized_series();

    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(aircraft.height());
    for i in 0..aircraft.height() {
        let value = keys.get(i)?;
        let first = value.is_null() || seen.insert(value.to_string());
        keep.push(first);
    }

    if keep.iter().all(|&k| k) {
        return Ok(aircraft.clone());
    }

    let mask = BooleanChunked::from_slice("first_airframe".into(), &keep);
    Ok(aircraft.filter(&mask)?)
}

/// Attach `manufacturer_clean`, derived from the post-join manufacturer
/// column. Missing manufacturers stay missing.
fn attach_clean_manufacturer(joined: &mut DataFrame) -> Result<(), PipelineError> {
    let manufacturers = joined
        .column(MANUFACTURER)?
        .as_materialized_series()
        .str()?
        .clone();

    let clean: Vec<Option<String>> = manufacturers
        .into_iter()
        .map(|value| value.map(normalize_manufacturer))
        .collect();

    joined.with_column(Column::new(MANUFACTURER_CLEAN.into(), clean))?;
    Ok(())
}

/// Run the full pipeline over the two raw tables.
pub fn build_enriched(
    occurrences: &DataFrame,
    aircraft: &DataFrame,
) -> Result<EnrichedDataset, PipelineError> {
    let occurrence_rows = occurrences.height();
    let aircraft_rows = aircraft.height();

    let (survivors, dropped_rows) = validate_dates(occurrences)?;
    if dropped_rows > 0 {
        tracing::warn!(
            dropped = dropped_rows,
            surviving = survivors.height(),
            "dropped occurrence rows with unparseable dates"
        );
    } else {
        tracing::info!(rows = survivors.height(), "all occurrence dates parsed");
    }

    let aircraft = first_aircraft_per_occurrence(aircraft)?;

    // The output keeps the surviving occurrence order.
    let mut args = JoinArgs::new(JoinType::Left);
    args.maintain_order = MaintainOrderJoin::Left;

    let mut joined = survivors
        .lazy()
        .join(
            aircraft.lazy(),
            [col(OCCURRENCE_ID)],
            [col(AIRCRAFT_ID)],
            args,
        )
        .collect()?;

    attach_clean_manufacturer(&mut joined)?;

    Ok(EnrichedDataset {
        frame: joined,
        occurrence_rows,
        aircraft_rows,
        dropped_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrence_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("codigo_ocorrencia".into(), [1i64, 2, 3, 4]),
            Column::new(
                "ocorrencia_dia".into(),
                ["31/12/2020", "2020-12-31", "15/06/2019", "10/05/2020"],
            ),
            Column::new(
                "ocorrencia_classificacao".into(),
                ["ACIDENTE", "INCIDENTE", "ACIDENTE", "INCIDENTE GRAVE"],
            ),
            Column::new("ocorrencia_uf".into(), ["SP", "RJ", "MG", "SP"]),
        ])
        .unwrap()
    }

    fn aircraft_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("codigo_ocorrencia2".into(), [1i64, 3]),
            Column::new(
                "aeronave_fabricante".into(),
                ["  embraer s a  ", "BOEING"],
            ),
        ])
        .unwrap()
    }

    fn clean_manufacturers(dataset: &EnrichedDataset) -> Vec<Option<String>> {
        dataset
            .frame
            .column(MANUFACTURER_CLEAN)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn unparseable_dates_are_dropped_entirely() {
        let dataset = build_enriched(&occurrence_frame(), &aircraft_frame()).unwrap();
        assert_eq!(dataset.frame.height(), 3);
        assert_eq!(dataset.dropped_rows, 1);
        assert_eq!(dataset.occurrence_rows, 4);

        let ids: Vec<i64> = dataset
            .frame
            .column(OCCURRENCE_ID)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        // Surviving rows keep the original order.
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn year_is_derived_from_the_parsed_date() {
        let dataset = build_enriched(&occurrence_frame(), &aircraft_frame()).unwrap();
        let years: Vec<i32> = dataset
            .frame
            .column(YEAR)
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(years, vec![2020, 2019, 2020]);
    }

    #[test]
    fn join_preserves_unmatched_occurrences_with_null_manufacturer() {
        let dataset = build_enriched(&occurrence_frame(), &aircraft_frame()).unwrap();
        let clean = clean_manufacturers(&dataset);
        assert_eq!(
            clean,
            vec![
                Some("EMBRAER".to_string()),
                Some("BOEING".to_string()),
                None
            ]
        );
    }

    #[test]
    fn duplicate_aircraft_keys_do_not_multiply_occurrences() {
        let aircraft = DataFrame::new(vec![
            Column::new("codigo_ocorrencia2".into(), [1i64, 1, 3]),
            Column::new(
                "aeronave_fabricante".into(),
                ["CESSNA AIRCRAFT", "PIPER AIRCRAFT", "BOEING"],
            ),
        ])
        .unwrap();

        let dataset = build_enriched(&occurrence_frame(), &aircraft).unwrap();
        assert_eq!(dataset.frame.height(), 3);

        let clean = clean_manufacturers(&dataset);
        assert_eq!(clean[0], Some("CESSNA".to_string()));
    }

    #[test]
    fn normalization_collapses_known_variants() {
        assert_eq!(normalize_manufacturer("  embraer s a  "), "EMBRAER");
        assert_eq!(normalize_manufacturer("CESSNA AIRCRAFT"), "CESSNA");
        assert_eq!(normalize_manufacturer("piper aircraft"), "PIPER");
    }

    #[test]
    fn normalization_passes_unknown_values_through() {
        assert_eq!(normalize_manufacturer("BOEING"), "BOEING");
        assert_eq!(normalize_manufacturer("  airbus  "), "AIRBUS");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["  embraer s a  ", "BOEING", "cessna aircraft", "NEIVA"] {
            let once = normalize_manufacturer(raw);
            assert_eq!(normalize_manufacturer(&once), once);
        }
    }
}
