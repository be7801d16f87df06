use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::indicators::{self, IndicatorSet};
use crate::data::model::{CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is found or opened).
    pub dataset: Option<Dataset>,

    /// The user's current filter selections.
    pub filters: FilterState,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Indicators over the visible subset (recomputed with the indices).
    pub indicators: IndicatorSet,

    /// Date-picker widget values; mirror `filters.date_range` once the user
    /// touches them, otherwise sit at the dataset's bounds.
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,

    /// Stable per-brand colours for the charts.
    pub brand_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            dataset: None,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            indicators: IndicatorSet::default(),
            date_start: today,
            date_end: today,
            brand_colors: ColorMap::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: filters start empty, everything is
    /// visible, date pickers snap to the data's bounds.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.filters = FilterState::default();
        if let Some((lo, hi)) = dataset.date_bounds() {
            self.date_start = lo;
            self.date_end = hi;
        }
        self.brand_colors = ColorMap::new(dataset.unique_values(Column::Brand));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the visible subset and its indicators after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
            self.indicators = indicators::compute(ds, &self.visible_indices);
        } else {
            self.visible_indices.clear();
            self.indicators = IndicatorSet::default();
        }
    }

    /// Apply the date-picker values as the active date range.
    pub fn apply_date_range(&mut self) {
        if self.date_end < self.date_start {
            std::mem::swap(&mut self.date_start, &mut self.date_end);
        }
        self.filters.date_range = Some((self.date_start, self.date_end));
        self.refilter();
    }

    /// The Reset Filters action: clear every constraint and snap the date
    /// pickers back to the dataset bounds.
    pub fn reset_filters(&mut self) {
        self.filters.clear();
        if let Some((lo, hi)) = self.dataset.as_ref().and_then(|ds| ds.date_bounds()) {
            self.date_start = lo;
            self.date_end = hi;
        }
        self.refilter();
    }

    /// Toggle a single value in a column's allowed set. Removing the last
    /// value drops the constraint entirely (back to "all values pass").
    pub fn toggle_filter_value(&mut self, column: Column, value: &CellValue) {
        let mut allowed = self.filters.selected.remove(&column).unwrap_or_default();
        if !allowed.remove(value) {
            allowed.insert(value.clone());
        }
        self.filters.set_allowed(column, allowed);
        self.refilter();
    }

    /// Whether a value currently passes the column's filter selection.
    pub fn is_value_selected(&self, column: Column, value: &CellValue) -> bool {
        match self.filters.selected.get(&column) {
            Some(allowed) => allowed.contains(value),
            None => false,
        }
    }

    /// Drop the constraint on a column (the "All" button).
    pub fn clear_column(&mut self, column: Column) {
        self.filters.set_allowed(column, BTreeSet::new());
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn row(brand: &str, sales: u64, day: &str) -> Record {
        Record {
            brand: Some(brand.to_string()),
            sales_count: Some(sales),
            date: Some(day.parse().unwrap()),
            ..Record::default()
        }
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(Dataset::from_records(vec![
            row("Audi", 10, "2023-01-15"),
            row("BMW", 30, "2023-02-01"),
        ]));
        state
    }

    #[test]
    fn fresh_dataset_is_fully_visible() {
        let state = loaded_state();
        assert!(state.filters.is_empty());
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.indicators.total_sales, 40);
    }

    #[test]
    fn toggle_filters_and_reset() {
        let mut state = loaded_state();
        let audi = CellValue::Text("Audi".into());

        state.toggle_filter_value(Column::Brand, &audi);
        assert_eq!(state.visible_indices, vec![0]);
        assert_eq!(state.indicators.total_sales, 10);
        assert_eq!(state.indicators.top_brand.as_deref(), Some("Audi"));

        // Toggling the last value off removes the constraint.
        state.toggle_filter_value(Column::Brand, &audi);
        assert_eq!(state.visible_indices, vec![0, 1]);

        state.toggle_filter_value(Column::Brand, &audi);
        state.reset_filters();
        assert!(state.filters.is_empty());
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn date_pickers_apply_as_closed_interval() {
        let mut state = loaded_state();
        state.date_start = "2023-01-01".parse().unwrap();
        state.date_end = "2023-01-31".parse().unwrap();
        state.apply_date_range();
        assert_eq!(state.visible_indices, vec![0]);

        // Inverted pickers are swapped, not rejected.
        state.date_start = "2023-02-28".parse().unwrap();
        state.date_end = "2023-01-01".parse().unwrap();
        state.apply_date_range();
        assert_eq!(state.visible_indices, vec![0, 1]);
    }
}
