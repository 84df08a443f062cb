use std::path::{Path, PathBuf};

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::CellValue;
use crate::error::{ConfigError, Result};

// ---------------------------------------------------------------------------
// Table – column-addressable rows in file order
// ---------------------------------------------------------------------------

/// A parsed table. Columns are stored column-major, rows keep file order.
///
/// Next to each typed cell the table keeps the cell's text. For delimited
/// files that is the raw field, so `01` stays `01` and `n/a` stays `n/a`.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    column_names: Vec<String>,
    columns: Vec<Vec<CellValue>>,
    texts: Vec<Vec<String>>,
}

impl Table {
    /// Typed rows; the text of a cell is its id rendering.
    fn from_rows(path: &Path, column_names: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let text = cell.to_id_string();
                        (cell, text)
                    })
                    .collect()
            })
            .collect();
        Self::from_cells_and_text(path, column_names, rows)
    }

    /// Raw text rows; cells are type-guessed, the text is kept verbatim.
    fn from_text_rows(path: &Path, column_names: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|text| (guess_cell_type(&text), text))
                    .collect()
            })
            .collect();
        Self::from_cells_and_text(path, column_names, rows)
    }

    fn from_cells_and_text(
        path: &Path,
        column_names: Vec<String>,
        rows: Vec<Vec<(CellValue, String)>>,
    ) -> Self {
        let width = column_names.len();
        let mut columns: Vec<Vec<CellValue>> = vec![Vec::with_capacity(rows.len()); width];
        let mut texts: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); width];
        for row in rows {
            for ((col, text_col), (cell, text)) in columns.iter_mut().zip(&mut texts).zip(row) {
                col.push(cell);
                text_col.push(text);
            }
        }
        Table {
            path: path.to_path_buf(),
            column_names,
            columns,
            texts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&[CellValue]> {
        self.position(name).map(|i| self.columns[i].as_slice())
    }

    /// The text of every cell in a column, untouched by type guessing.
    pub fn column_text(&self, name: &str) -> Result<&[String]> {
        self.position(name).map(|i| self.texts[i].as_slice())
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.column_names
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ConfigError::ColumnNotFound {
                column: name.to_string(),
                path: self.path.clone(),
            })
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.tsv`     – tab-separated, header row
/// * `.csv`     – comma-separated, header row
/// * `.json`    – `[{ "participant_id": "sub-01", "age": 31 }, ...]`
/// * `.parquet` – flat scalar columns
pub fn read_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "tsv" => read_delimited(path, b'\t')?,
        "csv" => read_delimited(path, b',')?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };
    log::debug!(
        "read {} rows x {} columns from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited loader
// ---------------------------------------------------------------------------

fn read_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::from_text_rows(path, headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() || s == "n/a" || s == "NaN" {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" => CellValue::Bool(true),
        "false" | "False" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// Columns are the union of keys; a key missing from a record reads as null.
fn read_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root.as_array().ok_or_else(|| ConfigError::MalformedTable {
        path: path.to_path_buf(),
        message: "expected top-level JSON array".into(),
    })?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| ConfigError::MalformedTable {
            path: path.to_path_buf(),
            message: format!("row {i} is not a JSON object"),
        })?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|rec| {
            headers
                .iter()
                .map(|h| rec.get(h).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(Table::from_rows(path, headers, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested columns are rendered as their
/// type name.
fn read_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|e| ConfigError::io(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        if headers.is_none() {
            headers = Some(
                batch
                    .schema()
                    .fields()
                    .iter()
                    .map(|f| f.name().clone())
                    .collect(),
            );
        }
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col.as_ref(), row))
                    .collect(),
            );
        }
    }

    Ok(Table::from_rows(path, headers.unwrap_or_default(), rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &dyn Array, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let cell = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|s| CellValue::String(s.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|s| CellValue::String(s.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| CellValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| CellValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col
            .as_boolean_opt()
            .map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    cell.unwrap_or_else(|| CellValue::String(format!("{:?}", col.data_type())))
}
