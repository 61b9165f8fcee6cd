//! Charts module - chart rendering

mod plotter;

pub use plotter::{ChartKind, ChartPlotter};
