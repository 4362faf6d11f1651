//! Keyed CRUD over one table
//!
//! [`Crud`] bundles the table coordinates with the key columns that decide
//! update-vs-insert identity on upsert. Long-format attribute tables (name
//! containing `attr_`) additionally support panel-mode reads: the `value`
//! column pivoted wide by `attribute` over the (datetime, code) key. The
//! naming convention only seeds the capability flag; callers can override it
//! explicitly with [`Crud::with_panel`].

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::filter::{Comparator, Filter, FilterValue};
use crate::frame::Frame;
use crate::script;
use crate::session::Session;
use crate::typed::TypedFrame;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crud {
    db_path: String,
    table_name: String,
    key_cols: Vec<String>,
    panel_capable: bool,
}

impl Crud {
    pub fn new<I, S>(db_path: impl Into<String>, table_name: impl Into<String>, key_cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table_name = table_name.into();
        let panel_capable = table_name.contains("attr_");
        Crud {
            db_path: db_path.into(),
            table_name,
            key_cols: key_cols.into_iter().map(Into::into).collect(),
            panel_capable,
        }
    }

    /// Override the panel capability derived from the table name.
    pub fn with_panel(mut self, panel_capable: bool) -> Self {
        self.panel_capable = panel_capable;
        self
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn key_cols(&self) -> &[String] {
        &self.key_cols
    }

    pub fn panel_capable(&self) -> bool {
        self.panel_capable
    }

    /// Insert-or-update rows keyed by the configured key columns. Null cells
    /// never overwrite existing values. An empty frame is a no-op.
    pub fn upsert(&self, session: &dyn Session, data: &TypedFrame) -> Result<(), Error> {
        if data.row_count() == 0 {
            tracing::debug!(table = %self.table_name, "upsert skipped, empty frame");
            return Ok(());
        }
        let script = format!(
            "upsert!({}, {}, ignoreNull=true, keyColNames={})",
            self.load_table(),
            script::table_literal(data.frame()),
            script::backtick_list(&self.key_cols)
        );
        session.execute(&script)?;
        tracing::debug!(table = %self.table_name, rows = data.row_count(), "rows upserted");
        Ok(())
    }

    /// Delete the rows matching every given (column, value) equality pair.
    /// With no pairs, deletes every row.
    pub fn delete(
        &self,
        session: &dyn Session,
        matches: &[(&str, FilterValue)],
    ) -> Result<(), Error> {
        let conditions: Vec<Filter> = matches
            .iter()
            .map(|(column, value)| Filter::new(*column, Comparator::Eq, value.clone()))
            .collect();
        let script = format!(
            "delete from {}{}",
            self.load_table(),
            where_clause(&conditions)
        );
        session.execute(&script)?;
        tracing::debug!(table = %self.table_name, conditions = conditions.len(), "rows deleted");
        Ok(())
    }

    /// Query the table, narrowing by every filter in turn.
    ///
    /// With `panel` requested on a panel-capable table, the result is the
    /// `value` column pivoted wide by `attribute`, sorted by the composite
    /// (datetime, code) key; otherwise a plain select-all.
    pub fn get(
        &self,
        session: &dyn Session,
        filters: &[Filter],
        panel: bool,
    ) -> Result<Frame, Error> {
        let clause = where_clause(filters);
        if panel && self.panel_capable {
            let query = format!(
                "select value from {}{clause} pivot by datetime, code, attribute",
                self.load_table()
            );
            let mut frame = session.fetch_frame(&query)?;
            if !frame.is_empty() {
                frame.sort_rows_by(&["datetime", "code"]);
            }
            Ok(frame)
        } else {
            session.fetch_frame(&format!("select * from {}{clause}", self.load_table()))
        }
    }

    fn load_table(&self) -> String {
        script::load_table(&self.db_path, &self.table_name)
    }
}

fn where_clause(filters: &[Filter]) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let clauses: Vec<&str> = filters.iter().map(Filter::clause).collect();
    format!(" where {}", clauses.join(" and "))
}
