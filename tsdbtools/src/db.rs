//! Database administration helpers
//!
//! Thin wrappers that render an administrative script, hand it to the
//! session, and report the outcome as a human-readable status string. The
//! success / already-exists / not-found paths all return strings; errors are
//! reserved for server failures and genuinely invalid arguments (an
//! unrecognized backup/restore kind). Callers that script these helpers rely
//! on that split, so keep it per-operation.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::schema;
use crate::session::Session;

/// Summary of one database, flattened from the server's schema output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbInfo {
    pub db_path: String,
    pub engine: Option<String>,
    pub partition_scheme: Vec<String>,
    pub tables: Vec<String>,
}

/// Create a database unless it already exists.
pub fn create_db(
    session: &dyn Session,
    db_path: &str,
    partition_plan: &str,
    engine: &str,
) -> Result<String, Error> {
    if session.database_exists(db_path)? {
        return Ok(format!("database {db_path} already exists"));
    }
    let script = schema::create_database_script(db_path, partition_plan, engine);
    session.execute(&script)?;
    tracing::debug!(db = %db_path, engine = %engine, "database created");
    Ok(format!("database {db_path} created"))
}

/// Drop a database if it exists.
pub fn delete_db(session: &dyn Session, db_path: &str) -> Result<String, Error> {
    if !session.database_exists(db_path)? {
        return Ok(format!("database {db_path} does not exist"));
    }
    session.execute(&format!("dropDatabase(\"{db_path}\")"))?;
    tracing::debug!(db = %db_path, "database dropped");
    Ok(format!("database {db_path} deleted"))
}

/// All database paths known to the server.
pub fn get_all_dbs(session: &dyn Session) -> Result<Vec<String>, Error> {
    Ok(session.execute("getDFSDatabases()")?.first_column_text())
}

/// Engine, partition scheme and table listing for one database.
///
/// A nonexistent database surfaces as the server's own error, unchanged.
pub fn get_db_info(session: &dyn Session, db_path: &str) -> Result<DbInfo, Error> {
    let engine = session
        .execute(&format!("schema(database(\"{db_path}\")).engineType"))?
        .scalar()
        .and_then(|c| c.as_text().map(str::to_string));
    let partition_scheme = session
        .execute(&format!("schema(database(\"{db_path}\")).partitionSchema"))?
        .first_column_text();
    let tables = session
        .execute(&format!("getTables(database(\"{db_path}\"))"))?
        .first_column_text();
    Ok(DbInfo {
        db_path: db_path.to_string(),
        engine,
        partition_scheme,
        tables,
    })
}

/// Back up a whole database (`kind = "database"`) or a single table
/// (`kind = "table"`, table name required) into `backup_dir`.
pub fn backup(
    session: &dyn Session,
    backup_dir: &str,
    db_path: &str,
    kind: &str,
    table: Option<&str>,
) -> Result<String, Error> {
    match kind {
        "database" => {
            if !session.database_exists(db_path)? {
                return Ok(format!("database {db_path} does not exist"));
            }
            session.execute(&format!("backupDB(\"{backup_dir}\", \"{db_path}\")"))?;
            tracing::debug!(db = %db_path, dir = %backup_dir, "database backed up");
            Ok(format!("database {db_path} backed up to {backup_dir}"))
        }
        "table" => {
            let table = table.ok_or_else(|| {
                Error::InvalidArgument("table backup requires a table name".to_string())
            })?;
            if !session.table_exists(db_path, table)? {
                return Ok(format!("table {table} does not exist in {db_path}"));
            }
            session.execute(&format!(
                "backupTable(\"{backup_dir}\", \"{db_path}\", \"{table}\")"
            ))?;
            tracing::debug!(db = %db_path, table = %table, dir = %backup_dir, "table backed up");
            Ok(format!("table {table} backed up to {backup_dir}"))
        }
        other => Err(Error::InvalidArgument(format!(
            "unrecognized backup kind: {other}"
        ))),
    }
}

/// Restore a database or table backup from `backup_dir`. Mirrors [`backup`].
pub fn restore(
    session: &dyn Session,
    backup_dir: &str,
    db_path: &str,
    kind: &str,
    table: Option<&str>,
) -> Result<String, Error> {
    match kind {
        "database" => {
            session.execute(&format!("restoreDB(\"{backup_dir}\", \"{db_path}\")"))?;
            tracing::debug!(db = %db_path, dir = %backup_dir, "database restored");
            Ok(format!("database {db_path} restored from {backup_dir}"))
        }
        "table" => {
            let table = table.ok_or_else(|| {
                Error::InvalidArgument("table restore requires a table name".to_string())
            })?;
            session.execute(&format!(
                "restoreTable(\"{backup_dir}\", \"{db_path}\", \"{table}\")"
            ))?;
            tracing::debug!(db = %db_path, table = %table, dir = %backup_dir, "table restored");
            Ok(format!("table {table} restored from {backup_dir}"))
        }
        other => Err(Error::InvalidArgument(format!(
            "unrecognized restore kind: {other}"
        ))),
    }
}

/// Replay a backup directory into the server, rebuilding whatever it holds.
pub fn migrate(session: &dyn Session, backup_dir: &str) -> Result<String, Error> {
    session.execute(&format!("migrate(\"{backup_dir}\")"))?;
    tracing::debug!(dir = %backup_dir, "backup migrated");
    Ok(format!("migrated backup {backup_dir}"))
}
