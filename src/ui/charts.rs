use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints};

use crate::data::model::{CellValue, Column, Dataset, Record};
use crate::state::AppState;

const ACCENT: Color32 = Color32::from_rgb(0x1E, 0x88, 0xE5);

// ---------------------------------------------------------------------------
// Aggregation – pure helpers feeding the chart widgets
// ---------------------------------------------------------------------------

/// Sales summed per day over the visible subset, in date order.
pub fn daily_sales(dataset: &Dataset, indices: &[usize]) -> Vec<(NaiveDate, f64)> {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for &idx in indices {
        let rec = &dataset.records[idx];
        let Some(day) = rec.date else {
            continue;
        };
        *per_day.entry(day).or_insert(0.0) += measure(dataset, rec);
    }
    per_day.into_iter().collect()
}

/// Sales measure summed per distinct value of a categorical column,
/// in value order.
pub fn totals_by(dataset: &Dataset, indices: &[usize], column: Column) -> Vec<(CellValue, f64)> {
    let mut per_value: BTreeMap<CellValue, f64> = BTreeMap::new();
    for &idx in indices {
        let rec = &dataset.records[idx];
        let Some(val) = rec.cell(column) else {
            continue;
        };
        *per_value.entry(val).or_insert(0.0) += measure(dataset, rec);
    }
    per_value.into_iter().collect()
}

/// Histogram of prices over the visible subset: `(bin_center, count)` pairs
/// plus the bin width.
pub fn price_histogram(
    dataset: &Dataset,
    indices: &[usize],
    bins: usize,
) -> (Vec<(f64, usize)>, f64) {
    let prices: Vec<f64> = indices
        .iter()
        .filter_map(|&i| dataset.records[i].price)
        .collect();
    let (Some(&min), Some(&max)) = (
        prices.iter().min_by(|a, b| a.total_cmp(b)),
        prices.iter().max_by(|a, b| a.total_cmp(b)),
    ) else {
        return (Vec::new(), 0.0);
    };

    let span = max - min;
    if span <= f64::EPSILON {
        // All prices identical: a single degenerate bin.
        return (vec![(min, prices.len())], 1.0);
    }

    let width = span / bins as f64;
    let mut counts = vec![0usize; bins];
    for p in &prices {
        let bin = (((p - min) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    let centers = counts
        .into_iter()
        .enumerate()
        .map(|(i, n)| (min + (i as f64 + 0.5) * width, n))
        .collect();
    (centers, width)
}

/// Per-row sales measure: `sales_count` when the dataset has it, otherwise
/// each row counts as 1.
fn measure(dataset: &Dataset, rec: &Record) -> f64 {
    if dataset.has_column(Column::SalesCount) {
        rec.sales_count.unwrap_or(0) as f64
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Chart widgets
// ---------------------------------------------------------------------------

/// Daily sales trend line. Degrades to a notice without a date column.
pub fn sales_trend_chart(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    if !dataset.has_column(Column::Date) {
        ui.weak("Sales trend unavailable: no date column in the data.");
        return;
    }

    let series = daily_sales(dataset, &state.visible_indices);
    let points: PlotPoints = series
        .iter()
        .map(|(day, total)| [day.num_days_from_ce() as f64, *total])
        .collect();

    Plot::new("sales_trend")
        .height(240.0)
        .x_axis_formatter(date_axis)
        .y_axis_label("Sales")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Daily sales").color(ACCENT).width(1.5));
        });
}

/// Brand market-share bars, one coloured bar per brand.
pub fn market_share_chart(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    if !dataset.has_column(Column::Brand) {
        ui.weak("Market share unavailable: no brand column in the data.");
        return;
    }

    let totals = totals_by(dataset, &state.visible_indices, Column::Brand);
    Plot::new("market_share")
        .height(240.0)
        .legend(Legend::default())
        .show_x(false)
        .show(ui, |plot_ui| {
            for (i, (brand, total)) in totals.iter().enumerate() {
                let bar = Bar::new(i as f64, *total).width(0.7).name(brand.to_string());
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(brand.to_string())
                        .color(state.brand_colors.color_for(brand)),
                );
            }
        });
}

/// Price distribution histogram.
pub fn price_distribution_chart(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    if !dataset.has_column(Column::Price) {
        ui.weak("Price distribution unavailable: no price column in the data.");
        return;
    }

    let (bins, width) = price_histogram(dataset, &state.visible_indices, 20);
    let bars: Vec<Bar> = bins
        .into_iter()
        .map(|(center, count)| Bar::new(center, count as f64).width(width * 0.9))
        .collect();

    Plot::new("price_distribution")
        .height(240.0)
        .x_axis_label("Price")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Prices").color(ACCENT));
        });
}

/// Sales by vehicle type bars.
pub fn vehicle_type_chart(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    if !dataset.has_column(Column::VehicleType) {
        ui.weak("Vehicle type breakdown unavailable: column missing from the data.");
        return;
    }

    let totals = totals_by(dataset, &state.visible_indices, Column::VehicleType);
    Plot::new("vehicle_type")
        .height(240.0)
        .legend(Legend::default())
        .show_x(false)
        .show(ui, |plot_ui| {
            for (i, (kind, total)) in totals.iter().enumerate() {
                let bar = Bar::new(i as f64, *total).width(0.7).name(kind.to_string());
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(kind.to_string()));
            }
        });
}

fn date_axis(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn row(brand: &str, sales: u64, day: &str, price: f64) -> Record {
        Record {
            brand: Some(brand.to_string()),
            sales_count: Some(sales),
            date: Some(day.parse().unwrap()),
            price: Some(price),
            ..Record::default()
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            row("Audi", 10, "2023-01-15", 50_000.0),
            row("BMW", 30, "2023-01-15", 60_000.0),
            row("Audi", 5, "2023-01-16", 52_000.0),
        ])
    }

    #[test]
    fn daily_sales_groups_and_orders_by_date() {
        let ds = sample();
        let series = daily_sales(&ds, &[0, 1, 2]);
        assert_eq!(
            series,
            vec![
                ("2023-01-15".parse().unwrap(), 40.0),
                ("2023-01-16".parse().unwrap(), 5.0),
            ]
        );
    }

    #[test]
    fn totals_by_brand_respects_subset() {
        let ds = sample();
        let totals = totals_by(&ds, &[0, 2], Column::Brand);
        assert_eq!(totals, vec![(CellValue::Text("Audi".into()), 15.0)]);
    }

    #[test]
    fn totals_fall_back_to_row_counts() {
        let ds = Dataset::from_records(vec![
            Record {
                vehicle_type: Some("SUV".into()),
                ..Record::default()
            },
            Record {
                vehicle_type: Some("SUV".into()),
                ..Record::default()
            },
        ]);
        let totals = totals_by(&ds, &[0, 1], Column::VehicleType);
        assert_eq!(totals, vec![(CellValue::Text("SUV".into()), 2.0)]);
    }

    #[test]
    fn histogram_handles_empty_and_uniform_prices() {
        let ds = sample();
        let (bins, _) = price_histogram(&ds, &[], 10);
        assert!(bins.is_empty());

        let uniform = Dataset::from_records(vec![
            row("A", 1, "2023-01-01", 100.0),
            row("A", 1, "2023-01-02", 100.0),
        ]);
        let (bins, width) = price_histogram(&uniform, &[0, 1], 10);
        assert_eq!(bins, vec![(100.0, 2)]);
        assert_eq!(width, 1.0);
    }

    #[test]
    fn histogram_counts_cover_all_prices() {
        let ds = sample();
        let (bins, _) = price_histogram(&ds, &[0, 1, 2], 5);
        let total: usize = bins.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 3);
    }
}
