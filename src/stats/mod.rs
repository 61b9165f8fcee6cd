//! Stats module - categorical aggregation over the enriched table

mod aggregator;

pub use aggregator::{
    available_years, build_breakdowns, filter_by_year, top_n, value_counts, CategoryCount,
    YearBreakdown, TOP_MANUFACTURERS, TOP_STATES,
};
