//! Column-oriented in-memory tables
//!
//! [`Frame`] is the tabular value this crate moves between the caller and the
//! database session: an ordered list of named columns, each a vector of
//! [`Cell`]s. Frames are rectangular — inserting a column pads every column
//! to the longest one with nulls. There is no row-index concept; a source
//! that carries one must surface it as an ordinary column first.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One value inside a frame column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    /// Naive calendar timestamp; any zone information was normalized away
    /// before the value entered the frame.
    Timestamp(NaiveDateTime),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::I8(0) | Cell::I16(0) | Cell::I32(0) | Cell::I64(0) => Some(false),
            Cell::I8(1) | Cell::I16(1) | Cell::I32(1) | Cell::I64(1) => Some(true),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::I8(v) => Some(i64::from(*v)),
            Cell::I16(v) => Some(i64::from(*v)),
            Cell::I32(v) => Some(i64::from(*v)),
            Cell::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::F32(v) => Some(f64::from(*v)),
            Cell::F64(v) => Some(*v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::I8(v) => write!(f, "{v}"),
            Cell::I16(v) => write!(f, "{v}"),
            Cell::I32(v) => write!(f, "{v}"),
            Cell::I64(v) => write!(f, "{v}"),
            Cell::F32(v) => write!(f, "{v}"),
            Cell::F64(v) => write!(f, "{v}"),
            Cell::Timestamp(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::I32(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::I64(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::F64(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(v: NaiveDateTime) -> Self {
        Cell::Timestamp(v)
    }
}

impl From<NaiveDate> for Cell {
    fn from(v: NaiveDate) -> Self {
        Cell::Timestamp(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<serde_json::Value> for Cell {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Null,
            serde_json::Value::Bool(b) => Cell::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Cell::I64)
                .or_else(|| n.as_f64().map(Cell::F64))
                .unwrap_or(Cell::Null),
            serde_json::Value::String(s) => Cell::Text(s),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<Cell>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Cell] {
        &self.values
    }
}

/// An ordered, rectangular collection of named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<Column>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty frame whose columns are the given names, in order.
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Frame {
            columns: names
                .into_iter()
                .map(|name| Column {
                    name: name.into(),
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    /// Build a frame from a JSON object of column arrays.
    ///
    /// Scalar members become single-row columns. Key order is preserved.
    pub fn from_json(value: serde_json::Value) -> Result<Self, Error> {
        let serde_json::Value::Object(map) = value else {
            return Err(Error::InvalidArgument(
                "expected a JSON object of column arrays".to_string(),
            ));
        };
        let mut frame = Frame::new();
        for (name, column) in map {
            let values = match column {
                serde_json::Value::Array(items) => items.into_iter().map(Cell::from).collect(),
                scalar => vec![Cell::from(scalar)],
            };
            frame.insert_column(name, values);
        }
        Ok(frame)
    }

    /// Insert a column, replacing any existing column of the same name, then
    /// re-pad every column to the longest one with nulls.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Cell>) {
        let name = name.into();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column { name, values }),
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        let rows = self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for column in &mut self.columns {
            column.values.resize(rows, Cell::Null);
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub(crate) fn column_values_mut(&mut self, name: &str) -> Option<&mut Vec<Cell>> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.values)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Append one row; missing trailing cells are null-filled.
    pub fn push_row<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut cells = cells.into_iter();
        for column in &mut self.columns {
            column.values.push(cells.next().unwrap_or(Cell::Null));
        }
    }

    /// The single cell of a 1x1 result frame.
    pub fn scalar(&self) -> Option<&Cell> {
        if self.column_count() == 1 && self.row_count() == 1 {
            self.columns[0].values.first()
        } else {
            None
        }
    }

    /// Non-null values of the first column, rendered as text.
    ///
    /// Result frames that list names (databases, tables, partition columns)
    /// come back as a single column; this flattens them.
    pub fn first_column_text(&self) -> Vec<String> {
        self.columns
            .first()
            .map(|c| {
                c.values
                    .iter()
                    .filter(|cell| !cell.is_null())
                    .map(|cell| cell.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stable-sort rows by the given columns, in order. Unknown column names
    /// are skipped.
    pub fn sort_rows_by(&mut self, keys: &[&str]) {
        let mut order: Vec<usize> = (0..self.row_count()).collect();
        order.sort_by(|&a, &b| {
            for key in keys {
                if let Some(values) = self.column(key) {
                    let ord = compare_cells(&values[a], &values[b]);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
            Ordering::Equal
        });
        for column in &mut self.columns {
            column.values = order.iter().map(|&i| column.values[i].clone()).collect();
        }
    }
}

/// Ordering for row sorting. Nulls sort first; numeric cells compare across
/// widths; cells of unrelated kinds compare equal so a stable sort leaves
/// their relative order alone.
fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    match (a, b) {
        (Cell::Null, Cell::Null) => Ordering::Equal,
        (Cell::Null, _) => Ordering::Less,
        (_, Cell::Null) => Ordering::Greater,
        (Cell::Text(x), Cell::Text(y)) => x.cmp(y),
        (Cell::Timestamp(x), Cell::Timestamp(y)) => x.cmp(y),
        (Cell::Bool(x), Cell::Bool(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_columns_preserves_order() {
        let frame = Frame::with_columns(["date", "code", "price"]);
        let names: Vec<&str> = frame.column_names().collect();
        assert_eq!(names, vec!["date", "code", "price"]);
        assert_eq!(frame.row_count(), 0);
    }

    #[test]
    fn test_insert_column_pads_short_columns() {
        let mut frame = Frame::new();
        frame.insert_column("a", vec![Cell::I64(1), Cell::I64(2)]);
        frame.insert_column("b", vec![Cell::Text("x".to_string())]);
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.column("b").unwrap()[1], Cell::Null);
    }

    #[test]
    fn test_insert_column_replaces_existing() {
        let mut frame = Frame::new();
        frame.insert_column("a", vec![Cell::I64(1)]);
        frame.insert_column("a", vec![Cell::I64(7)]);
        assert_eq!(frame.column_count(), 1);
        assert_eq!(frame.column("a").unwrap()[0], Cell::I64(7));
    }

    #[test]
    fn test_from_json_object_of_arrays() {
        let frame = Frame::from_json(json!({
            "code": ["AAPL", "MSFT"],
            "price": [150.0, 200.0],
            "volume": [1000000, 2000000],
        }))
        .unwrap();
        let names: Vec<&str> = frame.column_names().collect();
        assert_eq!(names, vec!["code", "price", "volume"]);
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.column("volume").unwrap()[1], Cell::I64(2000000));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Frame::from_json(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_scalar() {
        let mut frame = Frame::new();
        frame.insert_column("flag", vec![Cell::Bool(true)]);
        assert_eq!(frame.scalar(), Some(&Cell::Bool(true)));

        frame.insert_column("other", vec![Cell::I64(1)]);
        assert_eq!(frame.scalar(), None);
    }

    #[test]
    fn test_push_row_null_fills_missing_cells() {
        let mut frame = Frame::with_columns(["a", "b"]);
        frame.push_row([Cell::I64(1)]);
        assert_eq!(frame.column("b").unwrap()[0], Cell::Null);
    }

    #[test]
    fn test_sort_rows_by_composite_key() {
        let mut frame = Frame::new();
        frame.insert_column(
            "code",
            vec![
                Cell::Text("MSFT".to_string()),
                Cell::Text("AAPL".to_string()),
                Cell::Text("AAPL".to_string()),
            ],
        );
        frame.insert_column("price", vec![Cell::F64(2.0), Cell::F64(3.0), Cell::F64(1.0)]);
        frame.sort_rows_by(&["code", "price"]);
        assert_eq!(
            frame.column("price").unwrap(),
            &[Cell::F64(1.0), Cell::F64(3.0), Cell::F64(2.0)]
        );
    }

    #[test]
    fn test_cell_as_bool_accepts_unit_integers() {
        assert_eq!(Cell::I64(1).as_bool(), Some(true));
        assert_eq!(Cell::I32(0).as_bool(), Some(false));
        assert_eq!(Cell::I64(2).as_bool(), None);
    }

    #[test]
    fn test_first_column_text_skips_nulls() {
        let mut frame = Frame::new();
        frame.insert_column(
            "name",
            vec![
                Cell::Text("dfs://a".to_string()),
                Cell::Null,
                Cell::Text("dfs://b".to_string()),
            ],
        );
        assert_eq!(frame.first_column_text(), vec!["dfs://a", "dfs://b"]);
    }
}
