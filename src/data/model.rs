use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FigureError, Result};

// ---------------------------------------------------------------------------
// Cell – a single value in a result table
// ---------------------------------------------------------------------------

/// A dynamically-typed table value mirroring the dtypes the pipeline writes.
/// Group keys live in a `BTreeMap`, so `Cell` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Cell::*;
        // Numbers compare by value regardless of how they were parsed.
        if let (Some(a), Some(b)) = (self.number(), other.number()) {
            return a.total_cmp(&b);
        }
        fn discriminant(v: &Cell) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

impl Cell {
    /// Guess the type of a raw text field.
    pub fn parse(raw: &str) -> Cell {
        let s = raw.trim();
        if s.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Cell::Float(f);
        }
        match s {
            "True" | "true" => Cell::Bool(true),
            "False" | "false" => Cell::Bool(false),
            _ => Cell::Text(s.to_string()),
        }
    }

    /// Numeric view of the value; missing values read as NaN.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            Cell::Null => Some(f64::NAN),
            _ => None,
        }
    }

    fn number(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// ResultTable – one loaded result file
// ---------------------------------------------------------------------------

/// A column-oriented table loaded from one result file.
///
/// Rows have no identity beyond their position. Operations never modify the
/// table in place; filters and transforms return new tables or plain vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    name: String,
    columns: Vec<String>,
    data: Vec<Vec<Cell>>,
}

impl ResultTable {
    /// Build a table from column-major data. All columns must be the same length.
    pub fn new(name: impl Into<String>, columns: Vec<String>, data: Vec<Vec<Cell>>) -> Result<Self> {
        let name = name.into();
        if columns.len() != data.len() {
            return Err(FigureError::LengthMismatch {
                x: columns.len(),
                y: data.len(),
            });
        }
        if let Some(first) = data.first() {
            if let Some(bad) = data.iter().find(|col| col.len() != first.len()) {
                return Err(FigureError::LengthMismatch {
                    x: first.len(),
                    y: bad.len(),
                });
            }
        }
        Ok(ResultTable {
            name,
            columns,
            data,
        })
    }

    /// Build a table from row-major records. Short rows are padded with nulls.
    pub fn from_rows(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut data: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); columns.len()];
        for row in rows {
            let mut cells = row.into_iter();
            for col in data.iter_mut() {
                col.push(cells.next().unwrap_or(Cell::Null));
            }
        }
        ResultTable {
            name: name.into(),
            columns,
            data,
        }
    }

    /// Build a numeric table from named columns.
    pub fn from_numeric(name: impl Into<String>, columns: Vec<(&str, Vec<f64>)>) -> Result<Self> {
        let (names, data): (Vec<String>, Vec<Vec<Cell>>) = columns
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.into_iter().map(Cell::Float).collect()))
            .unzip();
        ResultTable::new(name, names, data)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    fn position(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| FigureError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    pub fn column(&self, column: &str) -> Result<&[Cell]> {
        Ok(&self.data[self.position(column)?])
    }

    /// A column as `f64`, with missing values as NaN.
    pub fn numeric(&self, column: &str) -> Result<Vec<f64>> {
        let idx = self.position(column)?;
        self.numeric_at(idx)
    }

    fn numeric_at(&self, idx: usize) -> Result<Vec<f64>> {
        self.data[idx]
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.as_f64().ok_or_else(|| FigureError::NotNumeric {
                    table: self.name.clone(),
                    column: self.columns[idx].clone(),
                    row,
                    value: cell.to_string(),
                })
            })
            .collect()
    }

    /// A column rendered as text.
    pub fn text(&self, column: &str) -> Result<Vec<String>> {
        Ok(self.column(column)?.iter().map(Cell::to_string).collect())
    }

    /// Name of the first column, which holds the saved index for pandas exports.
    pub fn index_column(&self) -> Result<&str> {
        self.columns
            .first()
            .map(String::as_str)
            .ok_or_else(|| FigureError::EmptyInput(format!("table '{}' has no columns", self.name)))
    }

    /// Keep the rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> ResultTable {
        let data = self
            .data
            .iter()
            .map(|col| {
                col.iter()
                    .zip(mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(c, _)| c.clone())
                    .collect()
            })
            .collect();
        ResultTable {
            name: self.name.clone(),
            columns: self.columns.clone(),
            data,
        }
    }

    /// Row mask of `predicate` applied to a numeric column. NaN rows never match
    /// unless the predicate says so.
    pub fn mask(&self, column: &str, predicate: impl Fn(f64) -> bool) -> Result<Vec<bool>> {
        Ok(self.numeric(column)?.into_iter().map(predicate).collect())
    }

    /// Rows where every listed column is a finite number.
    pub fn complete_rows(&self, columns: &[&str]) -> Result<Vec<bool>> {
        let mut mask = vec![true; self.len()];
        for column in columns {
            for (keep, v) in mask.iter_mut().zip(self.numeric(column)?) {
                *keep &= v.is_finite();
            }
        }
        Ok(mask)
    }

    /// Rows with no missing value in any column.
    pub fn drop_missing(&self) -> ResultTable {
        let mask: Vec<bool> = (0..self.len())
            .map(|r| {
                self.data.iter().all(|col| match &col[r] {
                    Cell::Null => false,
                    Cell::Float(v) => !v.is_nan(),
                    _ => true,
                })
            })
            .collect();
        self.filter(&mask)
    }

    /// Mean of `value` per distinct `key`, in key order. NaN values are skipped.
    pub fn group_mean(&self, key: &str, value: &str) -> Result<Vec<(Cell, f64)>> {
        let keys = self.column(key)?;
        let values = self.numeric(value)?;
        let mut groups: BTreeMap<&Cell, (f64, usize)> = BTreeMap::new();
        for (k, v) in keys.iter().zip(values) {
            let entry = groups.entry(k).or_insert((0.0, 0));
            if !v.is_nan() {
                entry.0 += v;
                entry.1 += 1;
            }
        }
        Ok(groups
            .into_iter()
            .map(|(k, (sum, n))| {
                let mean = if n == 0 { f64::NAN } else { sum / n as f64 };
                (k.clone(), mean)
            })
            .collect())
    }

    /// Mean of `column` over the rows whose first (index) column equals `index`.
    ///
    /// NaN values propagate, so a partially-missing group yields NaN.
    pub fn mean_at(&self, index: f64, column: &str) -> Result<f64> {
        let keys = self.numeric_at(self.position(self.index_column()?)?)?;
        let values = self.numeric(column)?;
        let selected: Vec<f64> = keys
            .iter()
            .zip(&values)
            .filter(|(k, _)| **k == index)
            .map(|(_, v)| *v)
            .collect();
        if selected.is_empty() {
            return Ok(f64::NAN);
        }
        Ok(selected.iter().sum::<f64>() / selected.len() as f64)
    }

    /// Long format of the listed columns: `(column name, value)` pairs, column by column.
    pub fn melt(&self, value_vars: &[&str]) -> Result<Vec<(String, f64)>> {
        let mut out = Vec::with_capacity(self.len() * value_vars.len());
        for var in value_vars {
            for v in self.numeric(var)? {
                out.push((var.to_string(), v));
            }
        }
        Ok(out)
    }

    /// The numeric block formed by every column after the index column,
    /// returned as row-major data with its column names.
    pub fn matrix(&self) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
        let names: Vec<String> = self.columns.iter().skip(1).cloned().collect();
        let cols = (1..self.columns.len())
            .map(|i| self.numeric_at(i))
            .collect::<Result<Vec<_>>>()?;
        let rows = (0..self.len())
            .map(|r| cols.iter().map(|c| c[r]).collect())
            .collect();
        Ok((names, rows))
    }

    /// Apply `f` to every numeric cell, leaving text untouched.
    pub fn map_numeric(&self, f: impl Fn(f64) -> f64) -> ResultTable {
        let data = self
            .data
            .iter()
            .map(|col| {
                col.iter()
                    .map(|c| match c {
                        Cell::Float(v) => Cell::Float(f(*v)),
                        Cell::Integer(i) => Cell::Float(f(*i as f64)),
                        other => other.clone(),
                    })
                    .collect()
            })
            .collect();
        ResultTable {
            name: self.name.clone(),
            columns: self.columns.clone(),
            data,
        }
    }

    /// Concatenate tables row-wise over their shared columns.
    pub fn concat(tables: &[&ResultTable]) -> ResultTable {
        let Some(first) = tables.first() else {
            return ResultTable::from_rows("", Vec::new(), Vec::new());
        };
        let columns: Vec<String> = first
            .columns
            .iter()
            .filter(|c| tables.iter().all(|t| t.has_column(c)))
            .cloned()
            .collect();
        let data = columns
            .iter()
            .map(|c| {
                tables
                    .iter()
                    .flat_map(|t| t.data[t.columns.iter().position(|x| x == c).unwrap_or(0)].iter().cloned())
                    .collect()
            })
            .collect();
        ResultTable {
            name: first.name.clone(),
            columns,
            data,
        }
    }

    /// Join tables side by side on row position, suffixing the columns of `other`.
    /// The result has as many rows as the shorter table.
    pub fn join_columns(&self, other: &ResultTable, suffix: &str) -> ResultTable {
        let n = self.len().min(other.len());
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().map(|c| format!("{c}{suffix}")));
        let data = self
            .data
            .iter()
            .chain(other.data.iter())
            .map(|col| col[..n].to_vec())
            .collect();
        ResultTable {
            name: self.name.clone(),
            columns,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResultTable {
        ResultTable::from_rows(
            "t",
            vec!["".into(), "size".into(), "value".into()],
            vec![
                vec![Cell::Integer(0), Cell::Integer(0), Cell::Float(1.0)],
                vec![Cell::Integer(1), Cell::Integer(10), Cell::Float(3.0)],
                vec![Cell::Integer(0), Cell::Integer(10), Cell::Null],
                vec![Cell::Integer(1), Cell::Integer(0), Cell::Float(5.0)],
            ],
        )
    }

    #[test]
    fn parse_guesses_types() {
        assert_eq!(Cell::parse("3"), Cell::Integer(3));
        assert_eq!(Cell::parse("2.5"), Cell::Float(2.5));
        assert_eq!(Cell::parse(""), Cell::Null);
        assert_eq!(Cell::parse("True"), Cell::Bool(true));
        assert_eq!(Cell::parse("Han"), Cell::Text("Han".into()));
        assert!(Cell::parse("nan").as_f64().unwrap().is_nan());
    }

    #[test]
    fn missing_column_is_reported() {
        let err = table().numeric("nope").unwrap_err();
        assert!(matches!(err, FigureError::MissingColumn { ref column, .. } if column == "nope"));
    }

    #[test]
    fn text_column_is_not_numeric() {
        let t = ResultTable::from_rows("t", vec!["a".into()], vec![vec!["x".into()]]);
        assert!(matches!(t.numeric("a"), Err(FigureError::NotNumeric { row: 0, .. })));
    }

    #[test]
    fn group_mean_skips_missing() {
        let means = table().group_mean("size", "value").unwrap();
        assert_eq!(means, vec![(Cell::Integer(0), 3.0), (Cell::Integer(10), 3.0)]);
    }

    #[test]
    fn mean_at_uses_index_column() {
        let t = table();
        assert_eq!(t.mean_at(1.0, "value").unwrap(), 4.0);
        assert!(t.mean_at(0.0, "value").unwrap().is_nan());
        assert!(t.mean_at(7.0, "value").unwrap().is_nan());
    }

    #[test]
    fn filter_keeps_masked_rows() {
        let t = table();
        let mask = t.mask("size", |s| s > 0.0).unwrap();
        let kept = t.filter(&mask);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.numeric("size").unwrap(), vec![10.0, 10.0]);
    }

    #[test]
    fn concat_and_join() {
        let t = table();
        let both = ResultTable::concat(&[&t, &t]);
        assert_eq!(both.len(), 8);
        let joined = t.join_columns(&t, "_amh");
        assert!(joined.has_column("value_amh"));
        assert_eq!(joined.len(), 4);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = ResultTable::new(
            "t",
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Float(1.0)], vec![]],
        )
        .unwrap_err();
        assert!(matches!(err, FigureError::LengthMismatch { x: 1, y: 0 }));
    }
}
