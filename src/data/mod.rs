//! Data module - CSV loading, transformation pipeline, and dataset cache

mod cache;
mod loader;
mod pipeline;

pub use cache::{DatasetCache, DatasetError, DatasetKey};
pub use loader::{load_aircraft, load_occurrences, load_raw_tables, LoaderError, NULL_TOKENS};
pub use pipeline::{build_enriched, normalize_manufacturer, EnrichedDataset, PipelineError};

/// Occurrence-table column holding the unique occurrence identifier.
pub const OCCURRENCE_ID: &str = "codigo_ocorrencia";
/// Occurrence-table column holding the occurrence date as `dd/mm/yyyy` text.
pub const OCCURRENCE_DATE: &str = "ocorrencia_dia";
/// Occurrence-table column holding the occurrence classification.
pub const CLASSIFICATION: &str = "ocorrencia_classificacao";
/// Occurrence-table column holding the two-letter state (UF) code.
pub const STATE: &str = "ocorrencia_uf";
/// Aircraft-table column holding the foreign key back to the occurrence.
pub const AIRCRAFT_ID: &str = "codigo_ocorrencia2";
/// Aircraft-table column holding the raw manufacturer name.
pub const MANUFACTURER: &str = "aeronave_fabricante";

/// Derived column: calendar year of the occurrence date.
pub const YEAR: &str = "year";
/// Derived column: normalized manufacturer name.
pub const MANUFACTURER_CLEAN: &str = "manufacturer_clean";
