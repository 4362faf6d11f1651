//! Table-level helpers
//!
//! Creation, inspection and alteration of tables inside one database. Same
//! conventions as [`crate::db`]: status strings for the ordinary outcomes,
//! errors only for server failures and invalid input.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::schema::{self, CreateTableOptions, DbColumn, KeepDuplicates};
use crate::script;
use crate::session::Session;

/// Partitioning, sorting and dedup metadata of one table, flattened.
///
/// The server reports these as nested sub-structures; every listed field
/// stays queryable by name on this flat record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub db_name: String,
    pub table_name: String,
    pub partition_columns: Vec<String>,
    pub sort_columns: Vec<String>,
    pub keep_duplicates: Option<String>,
    pub engine: Option<String>,
}

/// Create a partitioned table unless it already exists.
pub fn create_table(
    session: &dyn Session,
    db_path: &str,
    table_name: &str,
    columns: &[DbColumn],
    options: &CreateTableOptions,
) -> Result<String, Error> {
    if session.table_exists(db_path, table_name)? {
        return Ok(format!("table {table_name} already exists in {db_path}"));
    }
    let script = schema::create_table_script(db_path, table_name, columns, options);
    session.execute(&script)?;
    tracing::debug!(db = %db_path, table = %table_name, "table created");
    Ok(format!("table {table_name} created in {db_path}"))
}

/// Create an unpartitioned (dimensional) table unless it already exists.
pub fn create_dimensional_table(
    session: &dyn Session,
    db_path: &str,
    table_name: &str,
    columns: &[DbColumn],
) -> Result<String, Error> {
    create_table(
        session,
        db_path,
        table_name,
        columns,
        &CreateTableOptions::default(),
    )
}

/// Create a long-format attribute table unless it already exists.
///
/// Fixed layout of (datetime, code, attribute, value), partitioned by
/// datetime and attribute, sorted by (code, datetime) keeping all duplicate
/// rows, with the sort key hashed into buckets.
pub fn create_attribute_table(
    session: &dyn Session,
    db_path: &str,
    table_name: &str,
    code_dtype: &str,
    attr_dtype: &str,
    dt_dtype: &str,
) -> Result<String, Error> {
    let columns = schema::attribute_table_columns(code_dtype, attr_dtype, dt_dtype);
    let options = CreateTableOptions {
        partition_by: Some("datetime, attribute".to_string()),
        sort_columns: vec!["code".to_string(), "datetime".to_string()],
        keep_duplicates: Some(KeepDuplicates::All),
        sort_key_mapping: Some("hashBucket{, 500}".to_string()),
    };
    create_table(session, db_path, table_name, &columns, &options)
}

/// Drop a table if it exists.
pub fn delete_table(
    session: &dyn Session,
    db_path: &str,
    table_name: &str,
) -> Result<String, Error> {
    if !session.table_exists(db_path, table_name)? {
        return Ok(format!("table {table_name} does not exist in {db_path}"));
    }
    session.execute(&format!(
        "dropTable(database(\"{db_path}\"), \"{table_name}\")"
    ))?;
    tracing::debug!(db = %db_path, table = %table_name, "table dropped");
    Ok(format!("table {table_name} deleted from {db_path}"))
}

/// Append columns to an existing table.
pub fn add_columns(
    session: &dyn Session,
    db_path: &str,
    table_name: &str,
    columns: &[DbColumn],
) -> Result<String, Error> {
    if columns.is_empty() {
        return Err(Error::InvalidArgument("no columns given".to_string()));
    }
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let types: Vec<&str> = columns.iter().map(|c| c.dtype.as_str()).collect();
    session.execute(&format!(
        "addColumn({}, {}, [{}])",
        script::load_table(db_path, table_name),
        script::backtick_list(&names),
        types.join(", ")
    ))?;
    tracing::debug!(db = %db_path, table = %table_name, count = columns.len(), "columns added");
    Ok(format!(
        "added {} column(s) to {table_name}",
        columns.len()
    ))
}

/// Partitioning, sorting and dedup metadata of one table.
pub fn get_table_info(
    session: &dyn Session,
    db_path: &str,
    table_name: &str,
) -> Result<TableInfo, Error> {
    let handle = script::load_table(db_path, table_name);
    let partition_columns = session
        .execute(&format!("schema({handle}).partitionColumnName"))?
        .first_column_text();
    let sort_columns = session
        .execute(&format!("schema({handle}).sortColumns"))?
        .first_column_text();
    let keep_duplicates = session
        .execute(&format!("schema({handle}).keepDuplicates"))?
        .scalar()
        .and_then(|c| c.as_text().map(str::to_string));
    let engine = session
        .execute(&format!("schema(database(\"{db_path}\")).engineType"))?
        .scalar()
        .and_then(|c| c.as_text().map(str::to_string));
    Ok(TableInfo {
        db_name: db_path.to_string(),
        table_name: table_name.to_string(),
        partition_columns,
        sort_columns,
        keep_duplicates,
        engine,
    })
}

/// The table's declared columns, in declaration order.
pub fn get_table_columns(
    session: &dyn Session,
    db_path: &str,
    table_name: &str,
) -> Result<Vec<DbColumn>, Error> {
    Ok(session.fetch_schema(db_path, table_name)?.columns)
}

/// All table names inside one database.
pub fn get_all_tables(session: &dyn Session, db_path: &str) -> Result<Vec<String>, Error> {
    Ok(session
        .execute(&format!("getTables(database(\"{db_path}\"))"))?
        .first_column_text())
}
