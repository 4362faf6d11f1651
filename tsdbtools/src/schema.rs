//! Column definitions and DDL script generation
//!
//! Pure script builders for the database's DDL dialect. Nothing here touches
//! a session; the helpers in [`crate::db`] and [`crate::table`] execute these
//! scripts and wrap the results in status strings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;
use crate::frame::Frame;

/// One table column as declared to (or by) the database.
///
/// `dtype` is the raw type tag string. It is kept unparsed here because DDL
/// accepts parameterized tags the in-memory mapping has no business knowing
/// about; [`crate::typed::TypedFrame`] parses it when a mapping is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbColumn {
    pub name: String,
    pub dtype: String,
    pub comment: Option<String>,
    pub compress: Option<String>,
}

impl DbColumn {
    pub fn new(name: impl Into<String>, dtype: impl Into<String>) -> Self {
        DbColumn {
            name: name.into(),
            dtype: dtype.into(),
            comment: None,
            compress: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_compress(mut self, compress: impl Into<String>) -> Self {
        self.compress = Some(compress.into());
        self
    }

    /// Render the column definition line, with the annotation suffix carrying
    /// whichever of comment/compress are present.
    pub fn render(&self) -> String {
        let mut line = format!("{} {}", self.name, self.dtype);
        match (&self.comment, &self.compress) {
            (Some(comment), Some(compress)) => {
                line.push_str(&format!("[comment=\"{comment}\",compress=\"{compress}\"]"));
            }
            (Some(comment), None) => {
                line.push_str(&format!("[comment=\"{comment}\"]"));
            }
            (None, Some(compress)) => {
                line.push_str(&format!("[compress=\"{compress}\"]"));
            }
            (None, None) => {}
        }
        line
    }
}

/// The declared column set of one table, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<DbColumn>,
}

impl TableSchema {
    /// Parse the frame returned by the dialect's `schema(...).colDefs` call.
    ///
    /// Requires `name` and `typeString` columns; `comment` and
    /// `compressMethod` are picked up when the server includes them.
    pub fn from_col_defs(defs: &Frame) -> Result<Self, Error> {
        let names = defs
            .column("name")
            .ok_or_else(|| Error::Database("column listing missing 'name' column".to_string()))?;
        let types = defs.column("typeString").ok_or_else(|| {
            Error::Database("column listing missing 'typeString' column".to_string())
        })?;
        let comments = defs.column("comment");
        let compress = defs.column("compressMethod");

        let mut columns = Vec::with_capacity(names.len());
        for (row, (name, dtype)) in names.iter().zip(types.iter()).enumerate() {
            let (Some(name), Some(dtype)) = (name.as_text(), dtype.as_text()) else {
                continue;
            };
            let mut column = DbColumn::new(name, dtype);
            column.comment = cell_text_at(comments, row);
            column.compress = cell_text_at(compress, row);
            columns.push(column);
        }
        Ok(TableSchema { columns })
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

fn cell_text_at(values: Option<&[crate::frame::Cell]>, row: usize) -> Option<String> {
    values
        .and_then(|v| v.get(row))
        .and_then(|cell| cell.as_text())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Row-deduplication policy for sorted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeepDuplicates {
    All,
    First,
    Last,
}

impl fmt::Display for KeepDuplicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeepDuplicates::All => "ALL",
            KeepDuplicates::First => "FIRST",
            KeepDuplicates::Last => "LAST",
        };
        f.write_str(name)
    }
}

/// Optional clauses of a partitioned-table DDL statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTableOptions {
    /// Raw partition expression, e.g. `date, code`.
    pub partition_by: Option<String>,
    pub sort_columns: Vec<String>,
    pub keep_duplicates: Option<KeepDuplicates>,
    /// Sort-key mapping expression, e.g. `hashBucket{, 500}`.
    pub sort_key_mapping: Option<String>,
}

/// `create database` script.
pub fn create_database_script(db_path: &str, partition_plan: &str, engine: &str) -> String {
    format!(
        "create database \"{db_path}\"\npartitioned by {partition_plan},\nengine='{engine}'"
    )
}

/// `create table` script with the optional partition/sort/dedup clauses.
pub fn create_table_script(
    db_path: &str,
    table_name: &str,
    columns: &[DbColumn],
    options: &CreateTableOptions,
) -> String {
    let body: Vec<String> = columns.iter().map(|c| format!("    {}", c.render())).collect();
    let mut clauses = Vec::new();
    if let Some(partition) = &options.partition_by {
        clauses.push(format!("partitioned by {partition}"));
    }
    if !options.sort_columns.is_empty() {
        let sorts: Vec<String> = options.sort_columns.iter().map(|c| format!("`{c}")).collect();
        clauses.push(format!("sortColumns=[{}]", sorts.join(",")));
    }
    if let Some(keep) = &options.keep_duplicates {
        clauses.push(format!("keepDuplicates={keep}"));
    }
    if let Some(mapping) = &options.sort_key_mapping {
        clauses.push(format!("sortKeyMappingFunction=[{mapping}]"));
    }

    let mut script = format!(
        "create table \"{db_path}\".\"{table_name}\"(\n{}\n)",
        body.join("\n")
    );
    if !clauses.is_empty() {
        script.push('\n');
        script.push_str(&clauses.join(",\n"));
    }
    script
}

/// The fixed long-format attribute table layout: one row per
/// (datetime, code, attribute) carrying a single `value`.
pub fn attribute_table_columns(
    code_dtype: &str,
    attr_dtype: &str,
    dt_dtype: &str,
) -> Vec<DbColumn> {
    vec![
        DbColumn::new("datetime", dt_dtype)
            .with_comment("timestamp")
            .with_compress("delta"),
        DbColumn::new("code", code_dtype),
        DbColumn::new("attribute", "SYMBOL"),
        DbColumn::new("value", attr_dtype),
    ]
}
