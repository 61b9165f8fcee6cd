//! Dashboard Widget
//! Central panel showing the per-year chart cards and the raw-data table.

use std::collections::HashMap;
use std::sync::Arc;

use egui::{RichText, ScrollArea, Stroke};

use crate::charts::{ChartKind, ChartPlotter};
use crate::data::EnrichedDataset;
use crate::gui::control_panel::UserSettings;
use crate::stats::{self, CategoryCount, YearBreakdown};

const CARD_SPACING: f32 = 15.0;
/// Raw-table rows shown before truncation.
const RAW_TABLE_MAX_ROWS: usize = 200;

/// Central dashboard over the enriched dataset.
pub struct Dashboard {
    dataset: Option<Arc<EnrichedDataset>>,
    breakdowns: HashMap<i32, YearBreakdown>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            dataset: None,
            breakdowns: HashMap::new(),
        }
    }

    /// Clear the dashboard after a failed load.
    pub fn clear(&mut self) {
        self.dataset = None;
        self.breakdowns.clear();
    }

    pub fn set_dataset(
        &mut self,
        dataset: Arc<EnrichedDataset>,
        breakdowns: HashMap<i32, YearBreakdown>,
    ) {
        self.dataset = Some(dataset);
        self.breakdowns = breakdowns;
    }

    /// Draw the dashboard for the selected year.
    pub fn show(&self, ui: &mut egui::Ui, settings: &UserSettings) {
        let Some(dataset) = &self.dataset else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        let breakdown = settings
            .selected_year
            .and_then(|year| self.breakdowns.get(&year));
        let Some(breakdown) = breakdown else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Select a year").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(5.0);
                ui.label(
                    RichText::new(format!("Dashboard for {}", breakdown.year))
                        .size(20.0)
                        .strong(),
                );
                ui.label(
                    RichText::new(format!("{} occurrences", breakdown.total))
                        .size(12.0)
                        .color(egui::Color32::GRAY),
                );
                ui.add_space(10.0);

                let card_width = (ui.available_width() - CARD_SPACING) / 2.0 - 14.0;
                ui.horizontal(|ui| {
                    Self::draw_breakdown_card(
                        ui,
                        card_width,
                        "Occurrence Classification",
                        "classification",
                        &breakdown.classification,
                        settings.chart_kind,
                    );
                    ui.add_space(CARD_SPACING);
                    Self::draw_breakdown_card(
                        ui,
                        card_width,
                        "Top 10 States (UF)",
                        "states",
                        &breakdown.states,
                        settings.chart_kind,
                    );
                });

                ui.add_space(CARD_SPACING);
                let full_width = ui.available_width() - 14.0;
                Self::draw_breakdown_card(
                    ui,
                    full_width,
                    "Top 20 Manufacturers",
                    "manufacturers",
                    &breakdown.manufacturers,
                    settings.chart_kind,
                );

                if settings.show_raw_data {
                    Self::draw_raw_table(ui, dataset, breakdown.year);
                }

                ui.add_space(CARD_SPACING);
            });
    }

    fn draw_breakdown_card(
        ui: &mut egui::Ui,
        width: f32,
        title: &str,
        id: &str,
        counts: &[CategoryCount],
        kind: ChartKind,
    ) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(Stroke::new(
                1.0,
                ui.visuals().widgets.noninteractive.bg_stroke.color,
            ))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(width);
                ui.vertical(|ui| {
                    ui.label(RichText::new(title).size(15.0).strong());
                    ui.add_space(6.0);
                    ChartPlotter::draw_breakdown(ui, id, counts, kind);
                });
            });
    }

    /// Year-sliced raw table, truncated for display.
    fn draw_raw_table(ui: &mut egui::Ui, dataset: &EnrichedDataset, year: i32) {
        let Ok(slice) = stats::filter_by_year(&dataset.frame, year) else {
            return;
        };

        ui.add_space(CARD_SPACING);
        ui.label(RichText::new("Raw Data").size(15.0).strong());

        let shown = slice.height().min(RAW_TABLE_MAX_ROWS);
        if slice.height() > RAW_TABLE_MAX_ROWS {
            ui.label(
                RichText::new(format!("Showing first {} of {} rows", shown, slice.height()))
                    .size(11.0)
                    .color(egui::Color32::GRAY),
            );
        }
        ui.add_space(5.0);

        ScrollArea::horizontal()
            .id_salt("raw_data_scroll")
            .show(ui, |ui| {
                egui::Grid::new("raw_data_grid")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([10.0, 3.0])
                    .show(ui, |ui| {
                        for name in slice.get_column_names() {
                            ui.label(RichText::new(name.to_string()).strong().size(11.0));
                        }
                        ui.end_row();

                        let columns = slice.get_columns();
                        for row in 0..shown {
                            for column in columns {
                                let text = column
                                    .get(row)
                                    .map(|value| {
                                        if value.is_null() {
                                            String::new()
                                        } else {
                                            value.to_string().trim_matches('"').to_string()
                                        }
                                    })
                                    .unwrap_or_default();
                                ui.label(RichText::new(text).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
