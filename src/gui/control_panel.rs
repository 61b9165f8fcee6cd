//! Control Panel Widget
//! Left side panel with data-source, filter, and chart controls.

use std::path::{Path, PathBuf};

use egui::{Color32, ComboBox, RichText};

use crate::charts::ChartKind;
use crate::config::AppConfig;

/// User settings driving the dashboard
#[derive(Clone)]
pub struct UserSettings {
    pub occurrence_csv: PathBuf,
    pub aircraft_csv: PathBuf,
    pub chart_kind: ChartKind,
    pub selected_year: Option<i32>,
    pub show_raw_data: bool,
}

/// Left side control panel with file selection and dashboard controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub years: Vec<i32>,
    pub progress: f32,
    pub status: String,
}

impl ControlPanel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            settings: UserSettings {
                occurrence_csv: config.occurrence_csv.clone(),
                aircraft_csv: config.aircraft_csv.clone(),
                chart_kind: ChartKind::default(),
                selected_year: None,
                show_raw_data: false,
            },
            years: Vec::new(),
            progress: 0.0,
            status: "Ready".to_string(),
        }
    }

    /// Update available years after a dataset load, keeping the current
    /// selection when it is still valid.
    pub fn update_years(&mut self, years: Vec<i32>) {
        self.years = years;
        let valid = self
            .settings
            .selected_year
            .is_some_and(|year| self.years.contains(&year));
        if !valid {
            self.settings.selected_year = self.years.first().copied();
        }
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }

    fn file_row(ui: &mut egui::Ui, path: &Path) -> bool {
        let mut clicked = false;
        ui.horizontal(|ui| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "No file selected".to_string());
            ui.label(RichText::new(name).size(12.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("📂 Browse").clicked() {
                    clicked = true;
                }
            });
        });
        clicked
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("✈ AeroScope")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("CENIPA Occurrence Dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new("Occurrences").size(11.0).color(Color32::GRAY));
                if Self::file_row(ui, &self.settings.occurrence_csv) {
                    action = ControlPanelAction::BrowseOccurrences;
                }
                ui.add_space(4.0);
                ui.label(RichText::new("Aircraft").size(11.0).color(Color32::GRAY));
                if Self::file_row(ui, &self.settings.aircraft_csv) {
                    action = ControlPanelAction::BrowseAircraft;
                }
            });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("▶ Load Dataset").size(14.0))
                .min_size(egui::vec2(180.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::Reload;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔎 Filters").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([80.0, 20.0], egui::Label::new("Year:"));
            let selected = self
                .settings
                .selected_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string());
            ComboBox::from_id_salt("year_filter")
                .width(120.0)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for year in &self.years {
                        if ui
                            .selectable_label(
                                self.settings.selected_year == Some(*year),
                                year.to_string(),
                            )
                            .clicked()
                        {
                            self.settings.selected_year = Some(*year);
                        }
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart Options Section =====
        ui.label(RichText::new("📊 Chart Type").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            for kind in [ChartKind::Bars, ChartKind::Pie, ChartKind::Treemap] {
                ui.radio_value(&mut self.settings.chart_kind, kind, kind.label());
            }
        });

        ui.add_space(10.0);
        ui.checkbox(
            &mut self.settings.show_raw_data,
            "Show raw data for selected year",
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseOccurrences,
    BrowseAircraft,
    Reload,
}
