use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{Column, Dataset, Record};

// ---------------------------------------------------------------------------
// IndicatorSet – the summary metrics shown in the dashboard cards
// ---------------------------------------------------------------------------

/// Computed summary metrics for a filtered subset. Ephemeral: rebuilt from
/// scratch on every filter change, never cached across interactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    /// Sum of `sales_count`, or the row count when the column is absent.
    pub total_sales: u64,
    /// Mean of `price`; 0.0 when the column is absent or the subset is empty.
    pub avg_price: f64,
    /// Percentage change of summed price between the later and earlier half
    /// of the date-ordered rows. 0.0 when undefined.
    pub price_trend: f64,
    /// Same half-over-half percentage for the sales measure.
    pub sales_growth: f64,
    /// Brand with the largest summed sales measure; `None` when the brand
    /// column is absent or the subset is empty. Ties go to the
    /// lexicographically smallest name.
    pub top_brand: Option<String>,
}

impl IndicatorSet {
    /// Display string for the top-brand card.
    pub fn top_brand_label(&self) -> &str {
        self.top_brand.as_deref().unwrap_or("N/A")
    }
}

/// Compute the indicator set over the rows selected by `indices`.
///
/// Pure: reads the dataset, returns a fresh value, mutates nothing.
pub fn compute(dataset: &Dataset, indices: &[usize]) -> IndicatorSet {
    let rows: Vec<&Record> = indices.iter().map(|&i| &dataset.records[i]).collect();

    let total_sales = if dataset.has_column(Column::SalesCount) {
        rows.iter().filter_map(|r| r.sales_count).sum()
    } else {
        rows.len() as u64
    };

    let avg_price = {
        let prices: Vec<f64> = rows.iter().filter_map(|r| r.price).collect();
        if prices.is_empty() {
            0.0
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        }
    };

    let price_trend = half_over_half(&rows, |r| r.price);
    let sales_growth = half_over_half(&rows, |r| r.sales_count.map(|c| c as f64));

    IndicatorSet {
        total_sales,
        avg_price,
        price_trend,
        sales_growth,
        top_brand: top_brand(dataset, &rows),
    }
}

/// Percentage change of a measure between the two time-halves of the subset.
///
/// Rows are bucketed by their date against the midpoint of the distinct
/// dates: the earlier half covers the first ⌊n/2⌋ distinct dates, the later
/// half the rest. Defined as 0 when fewer than 2 distinct dates exist or the
/// earlier-half sum is 0, so the division is always guarded.
fn half_over_half(rows: &[&Record], measure: impl Fn(&Record) -> Option<f64>) -> f64 {
    let mut dates: Vec<NaiveDate> = rows.iter().filter_map(|r| r.date).collect();
    dates.sort_unstable();
    dates.dedup();
    if dates.len() < 2 {
        return 0.0;
    }
    let split = dates[dates.len() / 2];

    let mut earlier = 0.0;
    let mut later = 0.0;
    for row in rows {
        let (Some(d), Some(v)) = (row.date, measure(row)) else {
            continue;
        };
        if d < split {
            earlier += v;
        } else {
            later += v;
        }
    }
    if earlier == 0.0 {
        return 0.0;
    }
    (later - earlier) / earlier * 100.0
}

/// Group by brand, sum the sales measure (row count when `sales_count` is
/// absent), and return the brand with the maximum. Iterating the `BTreeMap`
/// in key order and replacing only on a strictly greater sum makes ties
/// resolve to the lexicographically smallest brand.
fn top_brand(dataset: &Dataset, rows: &[&Record]) -> Option<String> {
    if !dataset.has_column(Column::Brand) {
        return None;
    }
    let has_sales = dataset.has_column(Column::SalesCount);

    let mut per_brand: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        let Some(brand) = row.brand.as_deref() else {
            continue;
        };
        let weight = if has_sales {
            row.sales_count.unwrap_or(0)
        } else {
            1
        };
        *per_brand.entry(brand).or_insert(0) += weight;
    }

    let mut best: Option<(&str, u64)> = None;
    for (brand, sum) in per_brand {
        match best {
            Some((_, top)) if sum <= top => {}
            _ => best = Some((brand, sum)),
        }
    }
    best.map(|(brand, _)| brand.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, FilterState};
    use crate::data::model::CellValue;

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

    fn all_indices(ds: &Dataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn totals_and_top_brand() {
        let ds = Dataset::from_records(vec![row("A", 10), row("B", 30)]);
        let ind = compute(&ds, &all_indices(&ds));
        assert_eq!(ind.total_sales, 40);
        assert_eq!(ind.top_brand.as_deref(), Some("B"));
    }

    #[test]
    fn total_sales_falls_back_to_row_count() {
        let records = vec![
            Record {
                brand: Some("A".into()),
                ..Record::default()
            },
            Record {
                brand: Some("A".into()),
                ..Record::default()
            },
            Record {
                brand: Some("B".into()),
                ..Record::default()
            },
        ];
        let ds = Dataset::from_records(records);
        let ind = compute(&ds, &all_indices(&ds));
        assert_eq!(ind.total_sales, 3);
        // Without sales_count, top brand is decided by row count.
        assert_eq!(ind.top_brand.as_deref(), Some("A"));
    }

    #[test]
    fn empty_dataset_is_safe() {
        let ds = Dataset::from_records(Vec::new());
        let ind = compute(&ds, &[]);
        assert_eq!(ind.total_sales, 0);
        assert_eq!(ind.avg_price, 0.0);
        assert_eq!(ind.price_trend, 0.0);
        assert_eq!(ind.sales_growth, 0.0);
        assert_eq!(ind.top_brand_label(), "N/A");
    }

    #[test]
    fn avg_price_is_arithmetic_mean() {
        let mut a = row("A", 1);
        a.price = Some(20_000.0);
        let mut b = row("A", 1);
        b.price = Some(30_000.0);
        let ds = Dataset::from_records(vec![a, b]);
        let ind = compute(&ds, &all_indices(&ds));
        assert_eq!(ind.avg_price, 25_000.0);
    }

    #[test]
    fn sales_growth_between_halves() {
        let mut early = row("A", 100);
        early.date = Some(date("2023-01-01"));
        let mut late = row("A", 150);
        late.date = Some(date("2023-02-01"));
        let ds = Dataset::from_records(vec![early, late]);
        let ind = compute(&ds, &all_indices(&ds));
        assert_eq!(ind.sales_growth, 50.0);
    }

    #[test]
    fn growth_is_zero_with_single_period_or_zero_base() {
        let mut single = row("A", 100);
        single.date = Some(date("2023-01-01"));
        let ds = Dataset::from_records(vec![single]);
        assert_eq!(compute(&ds, &all_indices(&ds)).sales_growth, 0.0);

        let mut zero_base = row("A", 0);
        zero_base.date = Some(date("2023-01-01"));
        let mut later = row("A", 50);
        later.date = Some(date("2023-02-01"));
        let ds = Dataset::from_records(vec![zero_base, later]);
        assert_eq!(compute(&ds, &all_indices(&ds)).sales_growth, 0.0);
    }

    #[test]
    fn top_brand_tie_breaks_lexicographically() {
        let ds = Dataset::from_records(vec![row("Zeta", 10), row("Alpha", 10)]);
        let ind = compute(&ds, &all_indices(&ds));
        assert_eq!(ind.top_brand.as_deref(), Some("Alpha"));
    }

    #[test]
    fn indicators_follow_the_filtered_subset() {
        let ds = Dataset::from_records(vec![row("A", 10), row("B", 30)]);
        let mut f = FilterState::default();
        f.set_allowed(
            Column::Brand,
            [CellValue::Text("A".into())].into_iter().collect(),
        );
        let idx = filtered_indices(&ds, &f);
        assert_eq!(idx.len(), 1);
        let ind = compute(&ds, &idx);
        assert_eq!(ind.total_sales, 10);
        assert_eq!(ind.top_brand.as_deref(), Some("A"));
    }
}
