use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{
    Array, ArrayRef, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use thiserror::Error;

use super::model::{Shipment, ShipmentDataset};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// A loader failure. Fatal: the dashboard cannot render anything without
/// the dataset, so the app surfaces this on an error screen and stops.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no dataset file found (searched {0:?})")]
    NotFound(Vec<String>),
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {reason:#}")]
    Schema { path: PathBuf, reason: anyhow::Error },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fixed dataset source, probed in order. First existing file wins.
pub const DATASET_CANDIDATES: [&str; 3] = [
    "logistics_dataset.parquet",
    "logistics_dataset.csv",
    "logistics_dataset.json",
];

/// Load the dataset from the fixed path, once per process.
///
/// The first call performs the read and every later call returns the same
/// memoized result; the table is immutable for the process lifetime.
pub fn load_cached() -> &'static Result<ShipmentDataset, LoadError> {
    static DATASET: OnceLock<Result<ShipmentDataset, LoadError>> = OnceLock::new();
    DATASET.get_or_init(load_default)
}

/// Load the dataset from the first existing fixed-path candidate.
pub fn load_default() -> Result<ShipmentDataset, LoadError> {
    let path = DATASET_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .ok_or_else(|| {
            LoadError::NotFound(DATASET_CANDIDATES.iter().map(|s| s.to_string()).collect())
        })?;
    load_file(path)
}

/// Load a shipment dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat columns, one shipment per row (recommended)
/// * `.csv`     – headed, one shipment per row
/// * `.json`    – records orientation: `[{ "shipment_id": ..., ... }, ...]`
pub fn load_file(path: &Path) -> Result<ShipmentDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(vec![path.display().to_string()]));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let shipments = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    match shipments {
        Ok(rows) => Ok(ShipmentDataset::from_shipments(rows)),
        Err(reason) => Err(match reason.downcast::<std::io::Error>() {
            Ok(source) => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
            Err(reason) => LoadError::Schema {
                path: path.to_path_buf(),
                reason,
            },
        }),
    }
}

// ---------------------------------------------------------------------------
// Wire format shared by the CSV and JSON loaders
// ---------------------------------------------------------------------------

/// One raw row as it appears on disk.  Numeric cells are optional (missing
/// or null loads as NaN); the date is parsed separately so a bad cell can
/// name its row.
#[derive(Debug, Deserialize)]
struct ShipmentRow {
    shipment_id: String,
    origin_country: String,
    destination_country: String,
    mode: String,
    status: String,
    carrier: String,
    container_type: String,
    lead_time_days: Option<f64>,
    cargo_value_usd: Option<f64>,
    cargo_weight_kg: Option<f64>,
    distance_km: Option<f64>,
    departure_date: String,
}

impl ShipmentRow {
    fn into_shipment(self, row: usize) -> Result<Shipment> {
        let departure_date = parse_date(&self.departure_date).with_context(|| {
            format!(
                "row {row}: invalid departure_date '{}'",
                self.departure_date
            )
        })?;
        Ok(Shipment {
            shipment_id: self.shipment_id,
            origin_country: self.origin_country,
            destination_country: self.destination_country,
            mode: self.mode,
            status: self.status,
            carrier: self.carrier,
            container_type: self.container_type,
            lead_time_days: self.lead_time_days.unwrap_or(f64::NAN),
            cargo_value_usd: self.cargo_value_usd.unwrap_or(f64::NAN),
            cargo_weight_kg: self.cargo_weight_kg.unwrap_or(f64::NAN),
            distance_km: self.distance_km.unwrap_or(f64::NAN),
            departure_date,
        })
    }
}

/// Parse a date cell.  Datetime strings keep only their date component.
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let date_part = s.split(['T', ' ']).next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y/%m/%d"))
        .map_err(|_| anyhow!("expected YYYY-MM-DD"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Shipment>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;

    let mut shipments = Vec::new();
    for (row_no, result) in reader.deserialize::<ShipmentRow>().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        shipments.push(row.into_shipment(row_no)?);
    }
    Ok(shipments)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "shipment_id": "SH-0001",
///     "origin_country": "USA",
///     "mode": "Air",
///     ...
///     "departure_date": "2024-03-07"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Shipment>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<ShipmentRow> = serde_json::from_str(&text).context("parsing JSON records")?;

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| row.into_shipment(i))
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing shipment data.
///
/// Expected schema: one flat column per `Shipment` field — Utf8 for the
/// categorical columns, Float64/Float32/Int64/Int32 for the numeric ones,
/// Date32 or Utf8 for `departure_date`.  Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Shipment>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut shipments = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let shipment_id = column(&batch, "shipment_id")?;
        let origin = column(&batch, "origin_country")?;
        let destination = column(&batch, "destination_country")?;
        let mode = column(&batch, "mode")?;
        let status = column(&batch, "status")?;
        let carrier = column(&batch, "carrier")?;
        let container_type = column(&batch, "container_type")?;
        let lead_time = column(&batch, "lead_time_days")?;
        let cargo_value = column(&batch, "cargo_value_usd")?;
        let cargo_weight = column(&batch, "cargo_weight_kg")?;
        let distance = column(&batch, "distance_km")?;
        let departure = column(&batch, "departure_date")?;

        for row in 0..batch.num_rows() {
            shipments.push(Shipment {
                shipment_id: extract_string(&shipment_id, row)
                    .with_context(|| format!("row {row}: shipment_id"))?,
                origin_country: extract_string(&origin, row)
                    .with_context(|| format!("row {row}: origin_country"))?,
                destination_country: extract_string(&destination, row)
                    .with_context(|| format!("row {row}: destination_country"))?,
                mode: extract_string(&mode, row).with_context(|| format!("row {row}: mode"))?,
                status: extract_string(&status, row)
                    .with_context(|| format!("row {row}: status"))?,
                carrier: extract_string(&carrier, row)
                    .with_context(|| format!("row {row}: carrier"))?,
                container_type: extract_string(&container_type, row)
                    .with_context(|| format!("row {row}: container_type"))?,
                lead_time_days: extract_f64(&lead_time, row)
                    .with_context(|| format!("row {row}: lead_time_days"))?,
                cargo_value_usd: extract_f64(&cargo_value, row)
                    .with_context(|| format!("row {row}: cargo_value_usd"))?,
                cargo_weight_kg: extract_f64(&cargo_weight, row)
                    .with_context(|| format!("row {row}: cargo_weight_kg"))?,
                distance_km: extract_f64(&distance, row)
                    .with_context(|| format!("row {row}: distance_km"))?,
                departure_date: extract_date(&departure, row)
                    .with_context(|| format!("row {row}: departure_date"))?,
            });
        }
    }

    Ok(shipments)
}

// -- Parquet / Arrow helpers --

fn column(batch: &RecordBatch, name: &str) -> Result<ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow!("parquet file missing '{name}' column"))?;
    Ok(batch.column(idx).clone())
}

/// Extract a categorical cell.  Null loads as an empty string.
fn extract_string(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            use arrow::array::AsArray;
            Ok(col.as_string::<i64>().value(row).to_string())
        }
        other => bail!("expected a string column, got {other:?}"),
    }
}

/// Extract a numeric cell.  Null loads as NaN.
fn extract_f64(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        other => bail!("expected a numeric column, got {other:?}"),
    }
}

/// Extract a date cell from a Date32 or string column.
fn extract_date(col: &ArrayRef, row: usize) -> Result<NaiveDate> {
    if col.is_null(row) {
        bail!("null departure_date");
    }
    match col.data_type() {
        DataType::Date32 => {
            let arr = col.as_any().downcast_ref::<Date32Array>().unwrap();
            arr.value_as_date(row).context("Date32 out of range")
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = extract_string(col, row)?;
            parse_date(&text)
        }
        other => bail!("expected a Date32 or string column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CSV_HEADER: &str = "shipment_id,origin_country,destination_country,mode,status,carrier,container_type,lead_time_days,cargo_value_usd,cargo_weight_kg,distance_km,departure_date";

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "{CSV_HEADER}\n\
             SH-1,USA,Germany,Air,Delivered,DHL,40ft,4.5,1200.0,300.0,6400.0,2024-03-07\n\
             SH-2,China,USA,Sea,Pending,Maersk,20ft,28.0,900.5,8000.0,11000.0,2024-04-19\n"
        );
        let path = write_temp(&dir, "data.csv", &content);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.shipments[0].shipment_id, "SH-1");
        assert_eq!(ds.shipments[0].mode, "Air");
        assert_eq!(ds.shipments[1].cargo_value_usd, 900.5);
        assert_eq!(
            ds.shipments[1].departure_date,
            NaiveDate::from_ymd_opt(2024, 4, 19).unwrap()
        );
        assert_eq!(ds.modes.len(), 2);
        assert_eq!(ds.statuses.len(), 2);
    }

    #[test]
    fn csv_missing_numeric_cell_loads_as_nan() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "{CSV_HEADER}\n\
             SH-1,USA,Germany,Air,Delivered,DHL,40ft,,1200.0,300.0,6400.0,2024-03-07\n"
        );
        let path = write_temp(&dir, "data.csv", &content);

        let ds = load_file(&path).unwrap();
        assert!(ds.shipments[0].lead_time_days.is_nan());
    }

    #[test]
    fn csv_missing_column_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "data.csv", "shipment_id,mode\nSH-1,Air\n");

        match load_file(&path) {
            Err(LoadError::Schema { .. }) => {}
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn csv_bad_date_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "{CSV_HEADER}\n\
             SH-1,USA,Germany,Air,Delivered,DHL,40ft,4.5,1200.0,300.0,6400.0,yesterday\n"
        );
        let path = write_temp(&dir, "data.csv", &content);

        match load_file(&path) {
            Err(LoadError::Schema { reason, .. }) => {
                assert!(format!("{reason:#}").contains("departure_date"));
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let content = r#"[
            {
                "shipment_id": "SH-1",
                "origin_country": "USA",
                "destination_country": "Germany",
                "mode": "Air",
                "status": "Delivered",
                "carrier": "DHL",
                "container_type": "40ft",
                "lead_time_days": 4.5,
                "cargo_value_usd": 1200.0,
                "cargo_weight_kg": 300.0,
                "distance_km": 6400.0,
                "departure_date": "2024-03-07"
            }
        ]"#;
        let path = write_temp(&dir, "data.json", content);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.shipments[0].carrier, "DHL");
        assert_eq!(ds.shipments[0].lead_time_days, 4.5);
    }

    #[test]
    fn json_non_tabular_content_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "data.json", r#"{"not": "an array"}"#);

        assert!(matches!(load_file(&path), Err(LoadError::Schema { .. })));
    }

    #[test]
    fn missing_file_is_not_found() {
        assert!(matches!(
            load_file(Path::new("does_not_exist.csv")),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "data.xlsx", "not really a spreadsheet");

        assert!(matches!(
            load_file(&path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn datetime_strings_keep_their_date_component() {
        assert_eq!(
            parse_date("2024-03-07T08:30:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
        );
        assert_eq!(
            parse_date("2024/03/07").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
        );
        assert!(parse_date("March 7th").is_err());
    }
}
