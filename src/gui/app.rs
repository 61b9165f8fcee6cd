//! AeroScope Main Application
//! Main window with control panel and dashboard.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use egui::SidePanel;

use crate::config::AppConfig;
use crate::data::{self, DatasetCache, DatasetKey, EnrichedDataset};
use crate::gui::{ControlPanel, ControlPanelAction, Dashboard};
use crate::stats::{self, YearBreakdown};

/// Load result from the background thread
enum LoadResult {
    Progress(f32, String),
    Complete {
        key: DatasetKey,
        dataset: Arc<EnrichedDataset>,
        breakdowns: HashMap<i32, YearBreakdown>,
    },
    Error(String),
}

/// Main application window.
pub struct AeroScopeApp {
    cache: DatasetCache,
    control_panel: ControlPanel,
    dashboard: Dashboard,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl AeroScopeApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self {
            cache: DatasetCache::new(),
            control_panel: ControlPanel::new(&config),
            dashboard: Dashboard::new(),
            load_rx: None,
            is_loading: false,
        };

        // Load the configured exports right away when they are present.
        if config.occurrence_csv.exists() && config.aircraft_csv.exists() {
            app.start_load();
        }

        app
    }

    fn handle_browse_occurrences(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.control_panel.settings.occurrence_csv = path;
        }
    }

    fn handle_browse_aircraft(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.control_panel.settings.aircraft_csv = path;
        }
    }

    /// Start dataset loading in a background thread.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        let occurrence_csv = self.control_panel.settings.occurrence_csv.clone();
        let aircraft_csv = self.control_panel.settings.aircraft_csv.clone();

        // The key is computed up front so the cache can be consulted on the
        // UI thread; the worker only does pure computation.
        let key = match DatasetKey::for_paths(&occurrence_csv, &aircraft_csv) {
            Ok(key) => key,
            Err(error) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", error));
                return;
            }
        };
        let cached = self.cache.get(&key);

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel.set_progress(5.0, "Loading dataset...");

        thread::spawn(move || {
            Self::run_load(tx, key, cached, occurrence_csv, aircraft_csv);
        });
    }

    /// Run loading and aggregation (called from background thread).
    fn run_load(
        tx: Sender<LoadResult>,
        key: DatasetKey,
        cached: Option<Arc<EnrichedDataset>>,
        occurrence_csv: PathBuf,
        aircraft_csv: PathBuf,
    ) {
        let dataset = match cached {
            Some(dataset) => {
                let _ = tx.send(LoadResult::Progress(50.0, "Using cached dataset...".to_string()));
                dataset
            }
            None => {
                let _ = tx.send(LoadResult::Progress(10.0, "Reading CSV files...".to_string()));
                let tables = data::load_raw_tables(&occurrence_csv, &aircraft_csv);
                let (occurrences, aircraft) = match tables {
                    Ok(tables) => tables,
                    Err(error) => {
                        let _ = tx.send(LoadResult::Error(error.to_string()));
                        return;
                    }
                };

                let _ = tx.send(LoadResult::Progress(40.0, "Transforming dataset...".to_string()));
                match data::build_enriched(&occurrences, &aircraft) {
                    Ok(dataset) => Arc::new(dataset),
                    Err(error) => {
                        let _ = tx.send(LoadResult::Error(error.to_string()));
                        return;
                    }
                }
            }
        };

        let _ = tx.send(LoadResult::Progress(75.0, "Aggregating by year...".to_string()));
        let breakdowns = stats::build_breakdowns(&dataset.frame);

        let _ = tx.send(LoadResult::Complete {
            key,
            dataset,
            breakdowns,
        });
    }

    /// Check for load results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    LoadResult::Complete {
                        key,
                        dataset,
                        breakdowns,
                    } => {
                        self.cache.insert(key, dataset.clone());

                        let mut years: Vec<i32> = breakdowns.keys().copied().collect();
                        years.sort_unstable_by(|a, b| b.cmp(a));
                        self.control_panel.update_years(years);

                        let status = format!(
                            "Loaded {} occurrences ({} without valid dates)",
                            dataset.frame.height(),
                            dataset.dropped_rows
                        );
                        self.control_panel.set_progress(100.0, &status);

                        self.dashboard.set_dataset(dataset, breakdowns);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        // A failed run renders nothing; never a partial table.
                        self.dashboard.clear();
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }
}

impl eframe::App for AeroScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(330.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseOccurrences => self.handle_browse_occurrences(),
                        ControlPanelAction::BrowseAircraft => self.handle_browse_aircraft(),
                        ControlPanelAction::Reload => {
                            if !self.is_loading {
                                self.start_load();
                            }
                        }
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.dashboard.show(ui, &self.control_panel.settings);
        });
    }
}
