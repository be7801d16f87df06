use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde_json::Value as JsonValue;

use super::model::{Column, Dataset, Record};

/// Default dataset location relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/automotive_sales.csv";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the dataset from the fixed default path.
///
/// A missing file is not an error: it returns `Ok(None)` so the UI can show
/// schema guidance instead of failing.
pub fn load_default() -> Result<Option<Dataset>> {
    let path = Path::new(DEFAULT_DATA_PATH);
    if !path.exists() {
        log::info!("No dataset at {DEFAULT_DATA_PATH}, starting empty");
        return Ok(None);
    }
    load_file(path).map(Some)
}

/// Load a sales dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row naming the columns of §schema, one record per line
/// * `.json` – records-oriented array: `[{ "date": "2023-01-15", ... }, ...]`
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names; unknown columns are ignored.
/// The `date` column is `YYYY-MM-DD`. A cell that fails to parse leaves the
/// field unset rather than rejecting the whole row.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<Option<Column>> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(Column::from_header)
        .collect();

    if headers.iter().all(|h| h.is_none()) {
        bail!("CSV has no recognised columns (expected e.g. date, brand, sales_count)");
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let line = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut rec = Record::default();
        for (idx, raw) in line.iter().enumerate() {
            let Some(Some(col)) = headers.get(idx) else {
                continue;
            };
            set_cell(&mut rec, *col, raw.trim());
        }
        records.push(rec);
    }

    Ok(Dataset::from_records(records))
}

/// Assign one raw text cell to its typed `Record` field. Empty or
/// unparseable cells leave the field `None`.
fn set_cell(rec: &mut Record, col: Column, raw: &str) {
    if raw.is_empty() {
        return;
    }
    match col {
        Column::Date => rec.date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok(),
        Column::Brand => rec.brand = Some(raw.to_string()),
        Column::Model => rec.model = Some(raw.to_string()),
        Column::SalesCount => rec.sales_count = raw.parse().ok(),
        Column::Price => rec.price = raw.parse().ok(),
        Column::Region => rec.region = Some(raw.to_string()),
        Column::VehicleType => rec.vehicle_type = Some(raw.to_string()),
        Column::FuelType => rec.fuel_type = Some(raw.to_string()),
        Column::Year => rec.year = raw.parse().ok(),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "date": "2023-01-15", "brand": "Audi", "sales_count": 42, "price": 51200.0 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut rec = Record::default();
        for (key, val) in obj {
            let Some(col) = Column::from_header(key) else {
                continue;
            };
            match val {
                JsonValue::String(s) => set_cell(&mut rec, col, s),
                JsonValue::Number(n) => match col {
                    Column::SalesCount => rec.sales_count = n.as_u64(),
                    Column::Price => rec.price = n.as_f64(),
                    Column::Year => rec.year = n.as_i64().map(|y| y as i32),
                    _ => {}
                },
                _ => {}
            }
        }
        records.push(rec);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Serialize the rows selected by `indices` back out as CSV, with one column
/// per field present in the dataset, in schema order.
pub fn export_csv(dataset: &Dataset, indices: &[usize], path: &Path) -> Result<()> {
    let columns: Vec<Column> = Column::ALL
        .iter()
        .copied()
        .filter(|c| dataset.has_column(*c))
        .collect();
    if columns.is_empty() {
        bail!("Nothing to export: dataset has no columns");
    }

    let mut writer = csv::Writer::from_path(path).context("creating export file")?;
    let header: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    writer.write_record(&header).context("writing header")?;

    for &idx in indices {
        let rec = &dataset.records[idx];
        let row: Vec<String> = columns.iter().map(|c| cell_text(rec, *c)).collect();
        writer
            .write_record(&row)
            .with_context(|| format!("writing row {idx}"))?;
    }
    writer.flush().context("flushing export file")?;
    log::info!("Exported {} rows to {}", indices.len(), path.display());
    Ok(())
}

fn cell_text(rec: &Record, col: Column) -> String {
    match col {
        Column::SalesCount => rec.sales_count.map(|v| v.to_string()),
        Column::Price => rec.price.map(|v| v.to_string()),
        other => rec.cell(other).map(|v| v.to_string()),
    }
    .unwrap_or_default()
}

/// Columns a guidance message should mention when no data file exists.
pub fn expected_schema() -> BTreeSet<&'static str> {
    Column::ALL.iter().map(|c| c.header()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_roundtrip_types() {
        let path = write_temp(
            "autodash_loader_test.csv",
            "date,brand,sales_count,price,year\n\
             2023-01-15,Audi,42,51200.5,2022\n\
             2023-02-01,BMW,,not-a-price,2023\n",
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.has_column(Column::Date));
        assert_eq!(ds.records[0].sales_count, Some(42));
        assert_eq!(ds.records[0].price, Some(51200.5));
        // Lenient cells: missing and malformed values stay unset.
        assert_eq!(ds.records[1].sales_count, None);
        assert_eq!(ds.records[1].price, None);
        assert_eq!(ds.records[1].year, Some(2023));
    }

    #[test]
    fn csv_without_known_columns_is_rejected() {
        let path = write_temp("autodash_loader_bad.csv", "foo,bar\n1,2\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(load_file(Path::new("data.parquet")).is_err());
    }

    #[test]
    fn json_records_load() {
        let path = write_temp(
            "autodash_loader_test.json",
            r#"[{"date":"2023-01-15","brand":"Audi","sales_count":42,"price":51200.0},
                {"brand":"BMW","sales_count":30}]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.records[0].date,
            Some("2023-01-15".parse().unwrap())
        );
        assert_eq!(ds.records[1].brand.as_deref(), Some("BMW"));
        assert!(!ds.has_column(Column::Region));
    }

    #[test]
    fn export_writes_filtered_subset() {
        let src = write_temp(
            "autodash_export_src.csv",
            "brand,sales_count\nAudi,10\nBMW,30\n",
        );
        let ds = load_file(&src).unwrap();
        let out = std::env::temp_dir().join("autodash_export_out.csv");
        export_csv(&ds, &[1], &out).unwrap();

        let roundtrip = load_file(&out).unwrap();
        assert_eq!(roundtrip.len(), 1);
        assert_eq!(roundtrip.records[0].brand.as_deref(), Some("BMW"));
        assert_eq!(roundtrip.records[0].sales_count, Some(30));
    }
}
