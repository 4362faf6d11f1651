//! Schema-typed frames
//!
//! A [`TypedFrame`] binds an in-memory [`Frame`] to one database table's
//! declared column schema: the columns are exactly the schema's columns, in
//! schema order, and every column has been coerced toward the semantic type
//! its database type tag maps to.
//!
//! Coercion is best-effort by design: a cell that will not cast keeps its
//! original value, and the write path leaves it to the server to enforce the
//! declared types. Callers depend on partially-typed results; do not tighten
//! this into a hard failure.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Asia::Shanghai;
use serde::{Deserialize, Serialize};

use crate::dtype::{DbType, SemanticType};
use crate::error::Error;
use crate::frame::{Cell, Frame};
use crate::schema::DbColumn;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedFrame {
    frame: Frame,
    dtypes: Vec<(String, SemanticType)>,
}

impl TypedFrame {
    /// Build a typed frame for `table_name`, re-fetching the schema from the
    /// database. The schema is fetched on every construction; nothing is
    /// cached between round-trips.
    pub fn new(
        session: &dyn Session,
        db_path: &str,
        table_name: &str,
        source: Option<&Frame>,
    ) -> Result<Self, Error> {
        let schema = session.fetch_schema(db_path, table_name)?;
        Self::from_schema(&schema.columns, source)
    }

    /// Build a typed frame from an already-fetched column schema.
    ///
    /// Source columns that are not in the schema are silently dropped;
    /// schema columns absent from the source are null-filled for every row.
    /// A type tag without a mapping entry fails the construction.
    pub fn from_schema(columns: &[DbColumn], source: Option<&Frame>) -> Result<Self, Error> {
        let mut dtypes = Vec::with_capacity(columns.len());
        for column in columns {
            let tag: DbType = column.dtype.parse()?;
            dtypes.push((column.name.clone(), tag.semantic()));
        }

        let mut frame = Frame::with_columns(dtypes.iter().map(|(name, _)| name.clone()));
        if let Some(source) = source {
            for (name, _) in &dtypes {
                if let Some(values) = source.column(name) {
                    frame.insert_column(name.clone(), values.to_vec());
                }
            }
        }

        let mut typed = TypedFrame { frame, dtypes };
        typed.apply_column_types();
        Ok(typed)
    }

    fn apply_column_types(&mut self) {
        for (name, target) in &self.dtypes {
            if let Some(values) = self.frame.column_values_mut(name) {
                coerce_column(values, *target);
            }
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }

    /// The target semantic type of a column, if it is part of the schema.
    pub fn dtype(&self, column: &str) -> Option<SemanticType> {
        self.dtypes
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, dtype)| *dtype)
    }

    /// Column name to semantic type, in schema order.
    pub fn dtypes(&self) -> &[(String, SemanticType)] {
        &self.dtypes
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.frame.column_names()
    }

    pub fn row_count(&self) -> usize {
        self.frame.row_count()
    }
}

/// Coerce one column's cells toward the target type, best-effort.
pub(crate) fn coerce_column(values: &mut [Cell], target: SemanticType) {
    match target {
        SemanticType::Timestamp => {
            for cell in values.iter_mut() {
                if let Cell::Text(s) = cell
                    && let Some(ts) = parse_timestamp(s)
                {
                    *cell = Cell::Timestamp(ts);
                }
            }
        }
        SemanticType::Bool => {
            // A column that is already boolean is left alone; otherwise the
            // lexical token mapping applies and unrecognized cells become
            // null rather than errors.
            if values.iter().all(|c| matches!(c, Cell::Bool(_) | Cell::Null)) {
                return;
            }
            for cell in values.iter_mut() {
                *cell = bool_from_token(cell);
            }
        }
        _ => {
            for cell in values.iter_mut() {
                if let Some(cast) = cast_cell(cell, target) {
                    *cell = cast;
                }
            }
        }
    }
}

/// Parse a textual timestamp. Values with an explicit offset are converted
/// to the fixed reference zone (UTC+8) and then stripped to a naive local
/// timestamp; downstream comparisons assume naive timestamps in that zone.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Shanghai).naive_local());
    }
    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y.%m.%d %H:%M:%S%.f",
        "%Y.%m.%dT%H:%M:%S%.f",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ts);
        }
    }
    for format in ["%Y-%m-%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

fn bool_from_token(cell: &Cell) -> Cell {
    match cell {
        Cell::Bool(b) => Cell::Bool(*b),
        Cell::Text(s) => match s.as_str() {
            "TRUE" | "True" | "true" | "是" | "1" => Cell::Bool(true),
            "FALSE" | "False" | "false" | "否" | "0" => Cell::Bool(false),
            _ => Cell::Null,
        },
        _ => Cell::Null,
    }
}

/// `Some(new_cell)` when the cell casts cleanly, `None` to leave it alone.
fn cast_cell(cell: &Cell, target: SemanticType) -> Option<Cell> {
    match target {
        SemanticType::Int8 => int_value(cell).and_then(|v| i8::try_from(v).ok()).map(Cell::I8),
        SemanticType::Int16 => int_value(cell).and_then(|v| i16::try_from(v).ok()).map(Cell::I16),
        SemanticType::Int32 => int_value(cell).and_then(|v| i32::try_from(v).ok()).map(Cell::I32),
        SemanticType::Int64 => int_value(cell).map(Cell::I64),
        SemanticType::Float32 => float_value(cell).map(|v| Cell::F32(v as f32)),
        SemanticType::Float64 => float_value(cell).map(Cell::F64),
        SemanticType::Text => match cell {
            Cell::Null | Cell::Text(_) => None,
            other => Some(Cell::Text(other.to_string())),
        },
        // Handled by coerce_column.
        SemanticType::Bool | SemanticType::Timestamp => None,
    }
}

fn int_value(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Bool(b) => Some(i64::from(*b)),
        Cell::F32(v) => integral(f64::from(*v)),
        Cell::F64(v) => integral(*v),
        Cell::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => cell.as_i64(),
    }
}

fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

fn float_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Bool(b) => Some(f64::from(u8::from(*b))),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        _ => cell.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::MockSession;
    use serde_json::json;

    fn quote_schema() -> Vec<DbColumn> {
        vec![
            DbColumn::new("date", "DATE"),
            DbColumn::new("code", "SYMBOL"),
            DbColumn::new("price", "DOUBLE"),
            DbColumn::new("volume", "LONG"),
        ]
    }

    #[test]
    fn test_no_source_yields_schema_columns_empty() {
        let typed = TypedFrame::from_schema(&quote_schema(), None).unwrap();
        let names: Vec<&str> = typed.column_names().collect();
        assert_eq!(names, vec!["date", "code", "price", "volume"]);
        assert_eq!(typed.row_count(), 0);
    }

    #[test]
    fn test_dtype_side_table() {
        let typed = TypedFrame::from_schema(&quote_schema(), None).unwrap();
        assert_eq!(typed.dtype("date"), Some(SemanticType::Timestamp));
        assert_eq!(typed.dtype("code"), Some(SemanticType::Text));
        assert_eq!(typed.dtype("price"), Some(SemanticType::Float64));
        assert_eq!(typed.dtype("volume"), Some(SemanticType::Int64));
        assert_eq!(typed.dtype("missing"), None);
    }

    #[test]
    fn test_unknown_source_columns_are_dropped() {
        let schema = vec![DbColumn::new("a", "INT"), DbColumn::new("b", "INT")];
        let source = Frame::from_json(json!({"a": [1], "b": [2], "c": [3]})).unwrap();
        let typed = TypedFrame::from_schema(&schema, Some(&source)).unwrap();
        let names: Vec<&str> = typed.column_names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_schema_columns_are_null_filled() {
        let schema = vec![DbColumn::new("a", "INT"), DbColumn::new("b", "DOUBLE")];
        let source = Frame::from_json(json!({"a": [1, 2]})).unwrap();
        let typed = TypedFrame::from_schema(&schema, Some(&source)).unwrap();
        assert_eq!(typed.row_count(), 2);
        assert_eq!(typed.frame().column("b").unwrap(), &[Cell::Null, Cell::Null]);
    }

    #[test]
    fn test_unmapped_tag_fails_construction() {
        let schema = vec![DbColumn::new("x", "DECIMAL128")];
        let err = TypedFrame::from_schema(&schema, None).unwrap_err();
        assert!(matches!(err, Error::UnmappedType { tag } if tag == "DECIMAL128"));
    }

    #[test]
    fn test_end_to_end_coercion() {
        let source = Frame::from_json(json!({
            "date": ["2023-01-01", "2023-01-02"],
            "code": ["AAPL", "MSFT"],
            "price": [150.0, 200.0],
            "volume": [1000000, 2000000],
        }))
        .unwrap();
        let typed = TypedFrame::from_schema(&quote_schema(), Some(&source)).unwrap();
        assert_eq!(typed.row_count(), 2);

        let date = typed.frame().column("date").unwrap();
        assert!(date.iter().all(|c| matches!(c, Cell::Timestamp(_))));
        assert_eq!(
            typed.frame().column("code").unwrap()[0],
            Cell::Text("AAPL".to_string())
        );
        assert_eq!(typed.frame().column("price").unwrap()[1], Cell::F64(200.0));
        assert_eq!(typed.frame().column("volume").unwrap()[0], Cell::I64(1000000));
    }

    #[test]
    fn test_bool_token_mapping() {
        let schema = vec![DbColumn::new("flag", "BOOL")];
        let source = Frame::from_json(json!({"flag": ["是", "否", "1", "0", "maybe"]})).unwrap();
        let typed = TypedFrame::from_schema(&schema, Some(&source)).unwrap();
        assert_eq!(
            typed.frame().column("flag").unwrap(),
            &[
                Cell::Bool(true),
                Cell::Bool(false),
                Cell::Bool(true),
                Cell::Bool(false),
                Cell::Null,
            ]
        );
    }

    #[test]
    fn test_bool_column_already_boolean_is_untouched() {
        let mut values = vec![Cell::Bool(true), Cell::Null, Cell::Bool(false)];
        coerce_column(&mut values, SemanticType::Bool);
        assert_eq!(values, vec![Cell::Bool(true), Cell::Null, Cell::Bool(false)]);
    }

    #[test]
    fn test_timezone_normalized_then_stripped() {
        // Midnight UTC is 08:00 in the reference zone; the result is naive.
        let ts = parse_timestamp("2023-01-01T00:00:00Z").unwrap();
        assert_eq!(
            ts,
            NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_offset_timestamps_normalize_to_same_instant() {
        let from_utc = parse_timestamp("2023-06-01T04:00:00Z").unwrap();
        let from_offset = parse_timestamp("2023-06-01T09:00:00+05:00").unwrap();
        assert_eq!(from_utc, from_offset);
    }

    #[test]
    fn test_naive_timestamps_parse_unshifted() {
        let ts = parse_timestamp("2023-01-01 12:30:00").unwrap();
        assert_eq!(ts.to_string(), "2023-01-01 12:30:00");
    }

    #[test]
    fn test_unparseable_timestamp_left_unchanged() {
        let mut values = vec![Cell::Text("not a date".to_string())];
        coerce_column(&mut values, SemanticType::Timestamp);
        assert_eq!(values, vec![Cell::Text("not a date".to_string())]);
    }

    #[test]
    fn test_failed_cast_leaves_original_value() {
        let mut values = vec![Cell::Text("abc".to_string()), Cell::Text("1.5".to_string())];
        coerce_column(&mut values, SemanticType::Float64);
        assert_eq!(
            values,
            vec![Cell::Text("abc".to_string()), Cell::F64(1.5)]
        );
    }

    #[test]
    fn test_non_integral_float_does_not_cast_to_int() {
        let mut values = vec![Cell::F64(1.5), Cell::F64(2.0)];
        coerce_column(&mut values, SemanticType::Int64);
        assert_eq!(values, vec![Cell::F64(1.5), Cell::I64(2)]);
    }

    #[test]
    fn test_int_width_range_check() {
        let mut values = vec![Cell::I64(300), Cell::I64(7)];
        coerce_column(&mut values, SemanticType::Int8);
        assert_eq!(values, vec![Cell::I64(300), Cell::I8(7)]);
    }

    #[test]
    fn test_schema_is_refetched_on_every_construction() {
        let session = MockSession::new();
        for _ in 0..2 {
            let mut defs = Frame::new();
            defs.insert_column("name", vec![Cell::Text("code".to_string())]);
            defs.insert_column("typeString", vec![Cell::Text("SYMBOL".to_string())]);
            session.push_response(defs);
        }
        TypedFrame::new(&session, "dfs://quotes", "daily", None).unwrap();
        TypedFrame::new(&session, "dfs://quotes", "daily", None).unwrap();
        assert_eq!(session.calls().len(), 2);
    }
}
