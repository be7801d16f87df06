use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Column – the closed set of known dataset columns
// ---------------------------------------------------------------------------

/// Every column the dashboard understands. A given source file may carry any
/// subset of these; consumers branch on presence via [`Dataset::has_column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Date,
    Brand,
    Model,
    SalesCount,
    Price,
    Region,
    VehicleType,
    FuelType,
    Year,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Date,
        Column::Brand,
        Column::Model,
        Column::SalesCount,
        Column::Price,
        Column::Region,
        Column::VehicleType,
        Column::FuelType,
        Column::Year,
    ];

    /// Header name as it appears in the source CSV / JSON keys.
    pub fn header(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Brand => "brand",
            Column::Model => "model",
            Column::SalesCount => "sales_count",
            Column::Price => "price",
            Column::Region => "region",
            Column::VehicleType => "vehicle_type",
            Column::FuelType => "fuel_type",
            Column::Year => "year",
        }
    }

    /// Human-readable label for filter headers and chart titles.
    pub fn label(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Brand => "Brand",
            Column::Model => "Model",
            Column::SalesCount => "Sales Count",
            Column::Price => "Price",
            Column::Region => "Region",
            Column::VehicleType => "Vehicle Type",
            Column::FuelType => "Fuel Type",
            Column::Year => "Year",
        }
    }

    pub fn from_header(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.header() == name)
    }

    /// Columns offered as discrete multi-select filters in the side panel.
    /// Date gets a dedicated range widget; measures are not filterable.
    pub fn is_categorical(self) -> bool {
        matches!(
            self,
            Column::Brand
                | Column::Model
                | Column::Region
                | Column::VehicleType
                | Column::FuelType
                | Column::Year
        )
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single typed cell, usable as a filter/catalog key
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value. Kept `Ord` so values can live in
/// `BTreeSet` / `BTreeMap` for the sorted unique-value catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Integer(_) => 0,
                Date(_) => 1,
                Text(_) => 2,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Date(d) => write!(f, "{d}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one sales row
// ---------------------------------------------------------------------------

/// A single sales observation. Every field is optional; presence is decided
/// per-dataset by the source file's columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub date: Option<NaiveDate>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub sales_count: Option<u64>,
    pub price: Option<f64>,
    pub region: Option<String>,
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<String>,
    pub year: Option<i32>,
}

impl Record {
    /// The cell for a given column, as a filterable value. Measures
    /// (`sales_count`, `price`) are not filter keys and return `None`; they
    /// are consumed directly by the indicator and chart code.
    pub fn cell(&self, column: Column) -> Option<CellValue> {
        match column {
            Column::Date => self.date.map(CellValue::Date),
            Column::Brand => self.brand.clone().map(CellValue::Text),
            Column::Model => self.model.clone().map(CellValue::Text),
            Column::Region => self.region.clone().map(CellValue::Text),
            Column::VehicleType => self.vehicle_type.clone().map(CellValue::Text),
            Column::FuelType => self.fuel_type.clone().map(CellValue::Text),
            Column::Year => self.year.map(|y| CellValue::Integer(y as i64)),
            Column::SalesCount | Column::Price => None,
        }
    }

    /// Whether the row carries a value for the column at all.
    pub fn has(&self, column: Column) -> bool {
        match column {
            Column::SalesCount => self.sales_count.is_some(),
            Column::Price => self.price.is_some(),
            other => self.cell(other).is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with precomputed column indices. Read-only after
/// load; filtering and indicator computation never mutate it.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All rows, in source order.
    pub records: Vec<Record>,
    /// Columns present in at least one row.
    pub columns: BTreeSet<Column>,
    /// For each present column the sorted set of unique values
    /// (the value catalog backing the filter widgets).
    unique_values: BTreeMap<Column, BTreeSet<CellValue>>,
}

impl Dataset {
    /// Build column presence and the unique-value catalog from loaded rows.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: BTreeSet<Column> = BTreeSet::new();
        let mut unique_values: BTreeMap<Column, BTreeSet<CellValue>> = BTreeMap::new();

        for rec in &records {
            for col in Column::ALL {
                if !rec.has(col) {
                    continue;
                }
                columns.insert(col);
                if let Some(val) = rec.cell(col) {
                    unique_values.entry(col).or_default().insert(val);
                }
            }
        }
        Dataset {
            records,
            columns,
            unique_values,
        }
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Sorted distinct values for a column; empty when the column is absent.
    pub fn unique_values(&self, column: Column) -> impl Iterator<Item = &CellValue> {
        self.unique_values.get(&column).into_iter().flatten()
    }

    /// Inclusive min/max of the date column, if any dates exist.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn row(brand: &str, sales: u64) -> Record {
        Record {
            brand: Some(brand.to_string()),
            sales_count: Some(sales),
            ..Record::default()
        }
    }

    #[test]
    fn unique_values_sorted_and_deduplicated() {
        let ds = Dataset::from_records(vec![row("BMW", 10), row("Audi", 30), row("BMW", 5)]);
        let brands: Vec<String> = ds
            .unique_values(Column::Brand)
            .map(|v| v.to_string())
            .collect();
        assert_eq!(brands, vec!["Audi", "BMW"]);
    }

    #[test]
    fn absent_column_yields_empty_catalog() {
        let ds = Dataset::from_records(vec![row("BMW", 10)]);
        assert!(!ds.has_column(Column::Region));
        assert_eq!(ds.unique_values(Column::Region).count(), 0);
    }

    #[test]
    fn year_values_sort_numerically() {
        let mut a = row("BMW", 1);
        a.year = Some(2021);
        let mut b = row("BMW", 1);
        b.year = Some(2019);
        let ds = Dataset::from_records(vec![a, b]);
        let years: Vec<&CellValue> = ds.unique_values(Column::Year).collect();
        assert_eq!(
            years,
            vec![&CellValue::Integer(2019), &CellValue::Integer(2021)]
        );
    }

    #[test]
    fn date_bounds_cover_min_and_max() {
        let mut a = row("BMW", 1);
        a.date = Some(date("2023-03-01"));
        let mut b = row("BMW", 1);
        b.date = Some(date("2023-01-15"));
        let ds = Dataset::from_records(vec![a, b]);
        assert_eq!(
            ds.date_bounds(),
            Some((date("2023-01-15"), date("2023-03-01")))
        );
    }
}
