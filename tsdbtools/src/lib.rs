//! Helpers for a columnar, partitioned time-series database driven through
//! its scripting interface.
//!
//! Everything in this crate renders a script string and hands it to a
//! caller-owned [`Session`] for execution; the crate itself does no I/O.
//! Three layers sit on top of that seam:
//!
//! - administration: create/inspect/drop/backup/restore databases and tables
//!   ([`db`], [`table`]), reporting routine outcomes as status strings;
//! - querying: [`Filter`] predicates and the keyed [`Crud`] helper;
//! - typing: [`TypedFrame`], an in-memory table whose columns, order and
//!   value types are bound to a table's declared schema.
//!
//! All calls are blocking round-trips over the session handle. The crate
//! assumes at most one in-flight operation per handle and adds no pooling,
//! retry or timeout behavior of its own.

pub mod crud;
pub mod db;
pub mod dtype;
pub mod error;
pub mod filter;
pub mod frame;
pub mod schema;
pub mod script;
pub mod session;
pub mod table;
pub mod typed;

pub use crud::Crud;
pub use db::{DbInfo, backup, create_db, delete_db, get_all_dbs, get_db_info, migrate, restore};
pub use dtype::{DbType, SemanticType};
pub use error::Error;
pub use filter::{Comparator, Filter, FilterValue};
pub use frame::{Cell, Column, Frame};
pub use schema::{CreateTableOptions, DbColumn, KeepDuplicates, TableSchema};
pub use session::Session;
pub use table::{
    TableInfo, add_columns, create_attribute_table, create_dimensional_table, create_table,
    delete_table, get_all_tables, get_table_columns, get_table_info,
};
pub use typed::TypedFrame;
