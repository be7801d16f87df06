use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::loader;
use crate::data::model::{CellValue, Column};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone the catalog so we can mutate state inside the widget loop.
    let columns: Vec<Column> = dataset
        .columns
        .iter()
        .copied()
        .filter(|c| c.is_categorical())
        .collect();
    let has_dates = dataset.has_column(Column::Date);
    let unique: Vec<(Column, Vec<CellValue>)> = columns
        .iter()
        .map(|&c| (c, dataset.unique_values(c).cloned().collect()))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            if has_dates {
                ui.strong("Date Range");
                let mut changed = false;
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    changed |= ui
                        .add(DatePickerButton::new(&mut state.date_start).id_salt("date_from"))
                        .changed();
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    changed |= ui
                        .add(DatePickerButton::new(&mut state.date_end).id_salt("date_to"))
                        .changed();
                });
                if changed {
                    state.apply_date_range();
                }
                ui.separator();
            }

            // ---- Per-column filter widgets (collapsible) ----
            for (col, all_values) in &unique {
                let n_selected = state
                    .filters
                    .selected
                    .get(col)
                    .map(|s| s.len())
                    .unwrap_or(0);
                let header_text = if n_selected == 0 {
                    format!("{}  (all)", col.label())
                } else {
                    format!("{}  ({n_selected}/{})", col.label(), all_values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col.header())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.clear_column(*col);
                        }
                        ui.small("No selection keeps every value.");

                        for val in all_values {
                            let mut checked = state.is_value_selected(*col, val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(*col, val);
                            }
                        }
                    });
            }

            ui.separator();
            if ui.button("Reset Filters").clicked() {
                state.reset_filters();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Indicator cards
// ---------------------------------------------------------------------------

/// The key-metrics row at the top of the dashboard.
pub fn indicator_cards(ui: &mut Ui, state: &AppState) {
    let ind = &state.indicators;
    ui.columns(4, |cols: &mut [Ui]| {
        metric_card(&mut cols[0], "Total Sales", &format!("{}", ind.total_sales), None);
        metric_card(
            &mut cols[1],
            "Average Price",
            &format!("${:.2}", ind.avg_price),
            trend_delta(ind.price_trend),
        );
        metric_card(
            &mut cols[2],
            "Sales Growth",
            &format!("{:.1}%", ind.sales_growth),
            None,
        );
        metric_card(&mut cols[3], "Top Brand", ind.top_brand_label(), None);
    });
}

fn trend_delta(trend: f64) -> Option<(String, Color32)> {
    if trend == 0.0 {
        return None;
    }
    let color = if trend > 0.0 {
        Color32::from_rgb(0x43, 0xA0, 0x47)
    } else {
        Color32::RED
    };
    Some((format!("{trend:+.1}%"), color))
}

fn metric_card(ui: &mut Ui, label: &str, value: &str, delta: Option<(String, Color32)>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.small(label);
            ui.heading(value);
            if let Some((text, color)) = delta {
                ui.label(RichText::new(text).color(color).small());
            }
        });
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records with columns {:?}",
                    dataset.len(),
                    dataset.columns
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name("filtered_sales.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match loader::export_csv(dataset, &state.visible_indices, &path) {
            Ok(()) => {
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export error: {e:#}"));
            }
        }
    }
}
