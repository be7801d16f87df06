use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Filter predicate: date interval + allowed values per categorical column
// ---------------------------------------------------------------------------

/// The user's current constraints. A column with no entry imposes no
/// restriction; `date_range` is a closed interval, inclusive at both ends.
///
/// Created empty at session start, mutated by the filter widgets, cleared by
/// the Reset button. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub selected: BTreeMap<Column, BTreeSet<CellValue>>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.selected.is_empty()
    }

    /// Drop every constraint (the Reset Filters action).
    pub fn clear(&mut self) {
        self.date_range = None;
        self.selected.clear();
    }

    /// Restrict a column to the given values; an empty set removes the
    /// entry entirely so it stops constraining (mirrors the "All" choice).
    pub fn set_allowed(&mut self, column: Column, values: BTreeSet<CellValue>) {
        if values.is_empty() {
            self.selected.remove(&column);
        } else {
            self.selected.insert(column, values);
        }
    }
}

/// Return indices of records that pass all active filters.
///
/// A record passes when:
/// * every discrete filter's column either is absent from the dataset's
///   schema (filter is a no-op) or the record's cell is in the allowed set;
/// * the date range, if set, contains the record's date.
///
/// Predicates AND across columns; membership in a set is the OR within one
/// column. Surviving rows keep their relative order.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            if let Some((start, end)) = filters.date_range {
                if dataset.has_column(Column::Date) {
                    match rec.date {
                        Some(d) if d >= start && d <= end => {}
                        _ => return false,
                    }
                }
            }
            for (col, allowed) in &filters.selected {
                if !dataset.has_column(*col) {
                    continue;
                }
                match rec.cell(*col) {
                    Some(val) => {
                        if !allowed.contains(&val) {
                            return false;
                        }
                    }
                    // Row has no value for a constrained column → filtered out.
                    None => return false,
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}
