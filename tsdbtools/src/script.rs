//! Script literal helpers
//!
//! Small pure functions that render Rust values as literals in the database's
//! scripting dialect. Everything user-controllable that ends up inside a
//! script string goes through one of these.

use chrono::NaiveDateTime;

use crate::frame::{Cell, Frame};

/// Quote a string literal, escaping backslashes and embedded quotes.
///
/// # Example
///
/// ```
/// use tsdbtools::script::quote;
///
/// assert_eq!(quote("O'Neil"), r"'O\'Neil'");
/// ```
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Render a list of names as a backtick symbol vector: `` `code`date ``.
pub fn backtick_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| format!("`{}", n.as_ref()))
        .collect::<Vec<_>>()
        .join("")
}

/// A `loadTable` expression for the given database path and table name.
pub fn load_table(db_path: &str, table_name: &str) -> String {
    format!("loadTable(\"{db_path}\", \"{table_name}\")")
}

/// Timestamp in the dialect's filter-literal form, millisecond precision:
/// `2023.01.01 09:30:00.000`. Sub-millisecond digits are truncated.
pub fn timestamp_filter(ts: &NaiveDateTime) -> String {
    ts.format("%Y.%m.%d %H:%M:%S%.3f").to_string()
}

/// Timestamp in the dialect's expression-literal form, usable inside vector
/// literals: `2023.01.01T09:30:00.000`.
pub fn timestamp_literal(ts: &NaiveDateTime) -> String {
    ts.format("%Y.%m.%dT%H:%M:%S%.3f").to_string()
}

/// Float literal with a forced decimal point so the server types it as a
/// double rather than an integer.
pub fn float_literal(value: f64) -> String {
    if !value.is_finite() {
        return "NULL".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Render one cell as a script literal.
pub fn cell_literal(cell: &Cell) -> String {
    match cell {
        Cell::Null => "NULL".to_string(),
        Cell::Bool(v) => v.to_string(),
        Cell::I8(v) => v.to_string(),
        Cell::I16(v) => v.to_string(),
        Cell::I32(v) => v.to_string(),
        Cell::I64(v) => v.to_string(),
        Cell::F32(v) => float_literal(f64::from(*v)),
        Cell::F64(v) => float_literal(*v),
        Cell::Timestamp(ts) => timestamp_literal(ts),
        Cell::Text(s) => quote(s),
    }
}

/// Render a frame as an in-script table literal:
/// `table([...] as col1, [...] as col2)`.
pub fn table_literal(frame: &Frame) -> String {
    let columns: Vec<String> = frame
        .columns()
        .map(|column| {
            let values: Vec<String> = column.values().iter().map(cell_literal).collect();
            format!("[{}] as {}", values.join(", "), column.name())
        })
        .collect();
    format!("table({})", columns.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_milli_opt(h, min, s, milli)
            .unwrap()
    }

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("AAPL"), "'AAPL'");
    }

    #[test]
    fn test_quote_escapes_backslash_then_quote() {
        assert_eq!(quote(r"a\'b"), r"'a\\\'b'");
    }

    #[test]
    fn test_backtick_list() {
        assert_eq!(backtick_list(&["code", "date"]), "`code`date");
    }

    #[test]
    fn test_load_table() {
        assert_eq!(
            load_table("dfs://quotes", "daily"),
            "loadTable(\"dfs://quotes\", \"daily\")"
        );
    }

    #[test]
    fn test_timestamp_filter_truncates_to_millis() {
        let ts = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_nano_opt(9, 30, 0, 123_456_789)
            .unwrap();
        assert_eq!(timestamp_filter(&ts), "2023.01.01 09:30:00.123");
    }

    #[test]
    fn test_float_literal_keeps_integral_doubles_typed() {
        assert_eq!(float_literal(150.0), "150.0");
        assert_eq!(float_literal(150.25), "150.25");
        assert_eq!(float_literal(f64::NAN), "NULL");
    }

    #[test]
    fn test_table_literal() {
        let mut frame = Frame::new();
        frame.insert_column(
            "code",
            vec![Cell::Text("AAPL".to_string()), Cell::Text("MSFT".to_string())],
        );
        frame.insert_column("price", vec![Cell::F64(150.0), Cell::F64(200.0)]);
        frame.insert_column("day", vec![Cell::Timestamp(ts(2023, 1, 1, 0, 0, 0, 0)), Cell::Null]);
        assert_eq!(
            table_literal(&frame),
            "table(['AAPL', 'MSFT'] as code, [150.0, 200.0] as price, \
             [2023.01.01T00:00:00.000, NULL] as day)"
        );
    }
}
