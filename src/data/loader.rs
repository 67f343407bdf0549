use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use npyz::npz::NpzArchive;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::model::{Cell, ResultTable};
use crate::error::FigureError;

// ---------------------------------------------------------------------------
// Loader strategy
// ---------------------------------------------------------------------------

/// How a figure's inputs are stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// One table per name, loaded in order.
    Tables(&'static [&'static str]),
    /// A single structured JSON document.
    Structured(&'static str),
    /// A table plus the `<name>.npz` / `<name>_RAW.npz` archive pair.
    Archive(&'static str),
}

impl Source {
    /// Every base name this source reads.
    pub fn names(&self) -> Vec<&'static str> {
        match self {
            Source::Tables(names) => names.to_vec(),
            Source::Structured(name) | Source::Archive(name) => vec![name],
        }
    }
}

/// Known table extensions. Names without one of these are read as `<name>.csv`,
/// which matters for names such as `simulate_vanilla_ancient_mutations.msle`.
const TABLE_EXTENSIONS: [&str; 4] = ["csv", "parquet", "pq", "json"];

/// Resolve the on-disk path of a table name inside `dir`.
pub fn table_path(dir: &Path, name: &str) -> PathBuf {
    let has_ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| TABLE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if has_ext {
        dir.join(name)
    } else {
        dir.join(format!("{name}.csv"))
    }
}

fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(FigureError::MissingFile(path.to_path_buf()).into());
    }
    log::debug!("Loading {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Table loading
// ---------------------------------------------------------------------------

/// Load a result table. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, comma separated (pandas `to_csv`)
/// * `.parquet` – flat columns of numbers, strings or booleans
/// * `.json`    – records `[{col: value}, ...]` or columns `{col: [values]}`
pub fn load_table(path: &Path) -> Result<ResultTable> {
    require_file(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let name = table_name(path);
    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, &name),
        "json" => load_json(path, &name),
        "csv" => load_csv(path, &name),
        other => return Err(FigureError::UnsupportedFormat(other.to_string()).into()),
    };
    table.with_context(|| format!("loading {}", path.display()))
}

/// Load every named table from `dir`, in order.
pub fn load_tables(dir: &Path, names: &[&str]) -> Result<Vec<ResultTable>> {
    names
        .iter()
        .map(|name| load_table(&table_path(dir, name)))
        .collect()
}

fn table_name(path: &Path) -> String {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names; every field is type-guessed on its own, so a
/// column may mix numbers and blanks (read as missing).
fn load_csv(path: &Path, name: &str) -> Result<ResultTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, found {}",
                headers.len(),
                record.len()
            );
        }
        rows.push(record.iter().map(Cell::parse).collect());
    }

    Ok(ResultTable::from_rows(name, headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path, name: &str) -> Result<ResultTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    table_from_json(name, &root)
}

/// Build a table from a JSON value, either records-oriented
/// (`[{"a": 1, "b": 2}, ...]`) or column-oriented (`{"a": [1, ...], "b": [2, ...]}`).
pub fn table_from_json(name: &str, value: &JsonValue) -> Result<ResultTable> {
    match value {
        JsonValue::Array(records) => {
            let mut columns: Vec<String> = Vec::new();
            for (i, rec) in records.iter().enumerate() {
                let obj = rec
                    .as_object()
                    .with_context(|| format!("Row {i} is not a JSON object"))?;
                for key in obj.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }
            let rows = records
                .iter()
                .map(|rec| {
                    columns
                        .iter()
                        .map(|c| rec.get(c).map(json_to_cell).unwrap_or(Cell::Null))
                        .collect()
                })
                .collect();
            Ok(ResultTable::from_rows(name, columns, rows))
        }
        JsonValue::Object(cols) => {
            let mut names = Vec::with_capacity(cols.len());
            let mut data = Vec::with_capacity(cols.len());
            for (key, values) in cols {
                let values = values
                    .as_array()
                    .with_context(|| format!("column '{key}' is not an array"))?;
                names.push(key.clone());
                data.push(values.iter().map(json_to_cell).collect());
            }
            Ok(ResultTable::new(name, names, data)?)
        }
        _ => bail!("Expected a JSON array of records or an object of columns"),
    }
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::parse(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

/// Deserialize a structured result document (nested dictionaries of arrays).
pub fn load_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    require_file(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table. Nested columns are rendered as text.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, name: &str) -> Result<ResultTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut data: Vec<Vec<Cell>> = vec![Vec::new(); columns.len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, out) in data.iter_mut().enumerate() {
            let col = batch.column(col_idx);
            out.extend((0..batch.num_rows()).map(|row| extract_cell(col, row)));
        }
    }

    Ok(ResultTable::new(name, columns, data)?)
}

/// Extract a single value from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => match any.downcast_ref::<StringArray>() {
            Some(s) => Cell::Text(s.value(row).to_string()),
            None => Cell::Null,
        },
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map_or(Cell::Null, |a| Cell::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map_or(Cell::Null, |a| Cell::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map_or(Cell::Null, |a| Cell::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map_or(Cell::Null, |a| Cell::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map_or(Cell::Null, |a| Cell::Bool(a.value(row))),
        other => Cell::Text(format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// NPZ archives
// ---------------------------------------------------------------------------

/// One array read from an `.npz` archive, flattened in C order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveArray<T> {
    pub name: String,
    pub shape: Vec<u64>,
    pub data: Vec<T>,
}

impl<T: Clone> ArchiveArray<T> {
    /// Rows of a 2-d array (a 1-d array is a single row).
    pub fn rows(&self) -> Vec<Vec<T>> {
        let width = match self.shape.as_slice() {
            [_, w] => *w as usize,
            _ => self.data.len(),
        };
        if width == 0 {
            return Vec::new();
        }
        self.data.chunks(width).map(<[T]>::to_vec).collect()
    }
}

/// Array names in archive order (the order `np.savez` wrote them).
pub fn archive_names(path: &Path) -> Result<Vec<String>> {
    require_file(path)?;
    let archive = NpzArchive::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(archive.array_names().map(str::to_string).collect())
}

fn read_archive_array<T: npyz::Deserialize>(path: &Path, name: &str) -> Result<ArchiveArray<T>> {
    require_file(path)?;
    let mut archive =
        NpzArchive::open(path).with_context(|| format!("opening {}", path.display()))?;
    let npy = archive
        .by_name(name)
        .with_context(|| format!("reading array '{name}' from {}", path.display()))?
        .with_context(|| format!("array '{name}' not found in {}", path.display()))?;
    let shape = npy.shape().to_vec();
    let data = npy
        .into_vec::<T>()
        .with_context(|| format!("decoding array '{name}' from {}", path.display()))?;
    Ok(ArchiveArray {
        name: name.to_string(),
        shape,
        data,
    })
}

/// Read a float64 array by name.
pub fn read_f64_array(path: &Path, name: &str) -> Result<ArchiveArray<f64>> {
    read_archive_array(path, name)
}

/// Read a unicode (`<U`) or byte-string (`|S`) array by name.
pub fn read_string_array(path: &Path, name: &str) -> Result<ArchiveArray<String>> {
    read_archive_array(path, name)
}

/// Read the `index`-th array of an archive, in archive order.
pub fn read_f64_array_at(path: &Path, index: usize) -> Result<ArchiveArray<f64>> {
    let names = archive_names(path)?;
    let name = names
        .get(index)
        .with_context(|| format!("{} holds {} arrays, wanted #{index}", path.display(), names.len()))?;
    read_f64_array(path, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn dotted_names_get_csv_extension() {
        let dir = Path::new("simulated-data");
        assert_eq!(
            table_path(dir, "simulate_vanilla_ancient_mutations.msle"),
            dir.join("simulate_vanilla_ancient_mutations.msle.csv")
        );
        assert_eq!(table_path(dir, "sizes.parquet"), dir.join("sizes.parquet"));
        assert_eq!(table_path(dir, "locations.csv"), dir.join("locations.csv"));
    }

    #[test]
    fn csv_with_pandas_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, ",simulated_ts,tsdate").unwrap();
        writeln!(f, "0,10,12.5").unwrap();
        writeln!(f, "1,100,").unwrap();
        drop(f);

        let table = load_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.index_column().unwrap(), "");
        let tsdate = table.numeric("tsdate").unwrap();
        assert_eq!(tsdate[0], 12.5);
        assert!(tsdate[1].is_nan());
    }

    #[test]
    fn missing_file_is_typed() {
        let err = load_table(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FigureError>(),
            Some(FigureError::MissingFile(_))
        ));
    }

    #[test]
    fn parquet_columns_are_typed() {
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sizes.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("sample_size", DataType::Int64, false),
            Field::new("tsinfer_cpu", DataType::Float64, true),
            Field::new("dataset", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![10, 20])),
                Arc::new(Float64Array::from(vec![Some(1.5), None])),
                Arc::new(StringArray::from(vec!["HGDP", "SGDP"])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_tables(dir.path(), &["sizes.parquet"]).unwrap().remove(0);
        assert_eq!(table.numeric("sample_size").unwrap(), vec![10.0, 20.0]);
        let cpu = table.numeric("tsinfer_cpu").unwrap();
        assert_eq!(cpu[0], 1.5);
        assert!(cpu[1].is_nan());
        assert_eq!(table.text("dataset").unwrap(), vec!["HGDP", "SGDP"]);
    }

    #[test]
    fn json_columns_and_records_agree() {
        let cols: JsonValue = serde_json::json!({"a": [1, 2], "b": ["x", "y"]});
        let recs: JsonValue = serde_json::json!([{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]);
        let t1 = table_from_json("t", &cols).unwrap();
        let t2 = table_from_json("t", &recs).unwrap();
        assert_eq!(t1, t2);
    }

    #[test]
    fn archive_rows_split_by_width() {
        let arr = ArchiveArray {
            name: "w".into(),
            shape: vec![2, 3],
            data: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        };
        assert_eq!(arr.rows(), vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }
}
