use eframe::egui::{self, ScrollArea, Ui};

use crate::data::loader;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AutoDashApp {
    pub state: AppState,
}

impl Default for AutoDashApp {
    fn default() -> Self {
        let mut state = AppState::default();
        // Pick up the fixed-path dataset if one exists; a missing file just
        // leaves the guidance screen up.
        match loader::load_default() {
            Ok(Some(dataset)) => {
                log::info!(
                    "Loaded {} records from {}",
                    dataset.len(),
                    loader::DEFAULT_DATA_PATH
                );
                state.set_dataset(dataset);
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Failed to load default dataset: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
        Self { state }
    }
}

impl eframe::App for AutoDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: indicators + charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            guidance_screen(ui);
            return;
        }
    };

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Key Market Indicators");
        panels::indicator_cards(ui, state);
        ui.separator();

        ui.heading("Daily Sales Trend");
        charts::sales_trend_chart(ui, state, dataset);
        ui.separator();

        ui.columns(2, |cols: &mut [Ui]| {
            cols[0].heading("Brand Market Share");
            charts::market_share_chart(&mut cols[0], state, dataset);
            cols[1].heading("Price Distribution");
            charts::price_distribution_chart(&mut cols[1], state, dataset);
        });
        ui.separator();

        ui.heading("Sales by Vehicle Type");
        charts::vehicle_type_chart(ui, state, dataset);
    });
}

/// Shown when no dataset exists yet: where the file goes and what it should
/// contain.
fn guidance_screen(ui: &mut Ui) {
    ui.heading("No data found");
    ui.label(format!(
        "Place a CSV file at '{}' (or use File → Open…) with columns such as:",
        loader::DEFAULT_DATA_PATH
    ));
    ui.add_space(8.0);
    for header in loader::expected_schema() {
        ui.label(format!("  • {header}"));
    }
    ui.add_space(8.0);
    ui.label("All columns are optional; features degrade per missing column.");
    ui.weak("Tip: `cargo run --bin generate_sample` writes a sample dataset.");
}
