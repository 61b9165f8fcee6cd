//! Aggregator Module
//! Read-only categorical aggregation feeding the dashboard charts.

use std::collections::HashMap;

use polars::prelude::*;
use rayon::prelude::*;

use crate::data::{CLASSIFICATION, MANUFACTURER_CLEAN, STATE, YEAR};

/// States shown in the "top states" panel.
pub const TOP_STATES: usize = 10;
/// Manufacturers shown in the "top manufacturers" panel.
pub const TOP_MANUFACTURERS: usize = 20;

/// One category with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: u32,
}

/// Precomputed aggregates for a single year.
#[derive(Debug, Clone)]
pub struct YearBreakdown {
    pub year: i32,
    pub total: usize,
    pub classification: Vec<CategoryCount>,
    pub states: Vec<CategoryCount>,
    pub manufacturers: Vec<CategoryCount>,
}

/// Distinct years present in the enriched table, most recent first.
pub fn available_years(frame: &DataFrame) -> Vec<i32> {
    let Ok(column) = frame.column(YEAR) else {
        return Vec::new();
    };
    let Ok(years) = column.as_materialized_series().i32() else {
        return Vec::new();
    };

    let mut out: Vec<i32> = years.into_iter().flatten().collect();
    out.sort_unstable();
    out.dedup();
    out.reverse();
    out
}

/// Rows of the enriched table for one year.
pub fn filter_by_year(frame: &DataFrame, year: i32) -> PolarsResult<DataFrame> {
    frame
        .clone()
        .lazy()
        .filter(col(YEAR).eq(lit(year)))
        .collect()
}

/// Count the non-missing values of a categorical column, most frequent
/// first; ties break alphabetically.
pub fn value_counts(frame: &DataFrame, column: &str) -> Vec<CategoryCount> {
    let Ok(col) = frame.column(column) else {
        return Vec::new();
    };
    let Ok(values) = col.as_materialized_series().str() else {
        return Vec::new();
    };

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

/// Leading `n` entries of a count list.
pub fn top_n(mut counts: Vec<CategoryCount>, n: usize) -> Vec<CategoryCount> {
    counts.truncate(n);
    counts
}

fn breakdown_for(slice: &DataFrame, year: i32) -> YearBreakdown {
    YearBreakdown {
        year,
        total: slice.height(),
        classification: value_counts(slice, CLASSIFICATION),
        states: top_n(value_counts(slice, STATE), TOP_STATES),
        manufacturers: top_n(value_counts(slice, MANUFACTURER_CLEAN), TOP_MANUFACTURERS),
    }
}

/// Breakdowns for every year in the table, computed in parallel.
pub fn build_breakdowns(frame: &DataFrame) -> HashMap<i32, YearBreakdown> {
    available_years(frame)
        .into_par_iter()
        .map(|year| {
            let slice = filter_by_year(frame, year).unwrap_or_default();
            (year, breakdown_for(&slice, year))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("codigo_ocorrencia".into(), [1i64, 2, 3, 4, 5]),
            Column::new("year".into(), [2020i32, 2020, 2020, 2019, 2019]),
            Column::new(
                "ocorrencia_classificacao".into(),
                ["ACIDENTE", "INCIDENTE", "ACIDENTE", "INCIDENTE", "ACIDENTE"],
            ),
            Column::new(
                "ocorrencia_uf".into(),
                [Some("SP"), Some("RJ"), None, Some("SP"), Some("MG")],
            ),
            Column::new(
                "manufacturer_clean".into(),
                [Some("EMBRAER"), Some("CESSNA"), Some("EMBRAER"), None, None],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn years_are_listed_most_recent_first() {
        assert_eq!(available_years(&enriched_frame()), vec![2020, 2019]);
    }

    #[test]
    fn value_counts_order_by_count_then_label() {
        let frame = enriched_frame();
        let counts = value_counts(&frame, "ocorrencia_classificacao");
        assert_eq!(
            counts,
            vec![
                CategoryCount {
                    label: "ACIDENTE".to_string(),
                    count: 3
                },
                CategoryCount {
                    label: "INCIDENTE".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn value_counts_skip_missing_values() {
        let frame = enriched_frame();
        let counts = value_counts(&frame, "manufacturer_clean");
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].label, "EMBRAER");
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn breakdowns_are_sliced_per_year() {
        let frame = enriched_frame();
        let breakdowns = build_breakdowns(&frame);
        assert_eq!(breakdowns.len(), 2);

        let y2020 = &breakdowns[&2020];
        assert_eq!(y2020.total, 3);
        assert_eq!(y2020.classification[0].label, "ACIDENTE");
        assert_eq!(y2020.classification[0].count, 2);
        assert_eq!(y2020.states.len(), 2);

        let y2019 = &breakdowns[&2019];
        assert_eq!(y2019.total, 2);
        assert!(y2019.manufacturers.is_empty());
    }

    #[test]
    fn top_n_caps_the_list() {
        let counts = vec![
            CategoryCount {
                label: "A".to_string(),
                count: 3,
            },
            CategoryCount {
                label: "B".to_string(),
                count: 2,
            },
            CategoryCount {
                label: "C".to_string(),
                count: 1,
            },
        ];
        assert_eq!(top_n(counts, 2).len(), 2);
    }
}
