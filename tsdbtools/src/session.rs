//! The external database session interface
//!
//! Every operation in this crate ultimately renders a script string and hands
//! it to a caller-owned session for execution. [`Session`] is that seam: one
//! required method, plus default methods that cover the common introspection
//! calls by rendering the dialect's builtin functions. Clients whose driver
//! exposes these natively can override the defaults.
//!
//! Calls are blocking round-trips. The crate assumes at most one in-flight
//! logical operation per session handle; sharing a handle across threads is
//! the caller's problem to synchronize.

use crate::error::Error;
use crate::frame::{Cell, Frame};
use crate::schema::TableSchema;
use crate::script;

pub trait Session {
    /// Run a script and return its (possibly empty) tabular result.
    ///
    /// Scalar results come back as a 1x1 frame. Server-side failures are
    /// reported as [`Error::Database`], unchanged.
    fn execute(&self, script: &str) -> Result<Frame, Error>;

    fn database_exists(&self, db_path: &str) -> Result<bool, Error> {
        let result = self.execute(&format!("existsDatabase(\"{db_path}\")"))?;
        Ok(result.scalar().and_then(Cell::as_bool).unwrap_or(false))
    }

    fn table_exists(&self, db_path: &str, table_name: &str) -> Result<bool, Error> {
        let result = self.execute(&format!("existsTable('{db_path}', `{table_name})"))?;
        Ok(result.scalar().and_then(Cell::as_bool).unwrap_or(false))
    }

    /// Run a query and return the result frame. Alias of [`Session::execute`]
    /// by default; drivers with a dedicated query path can override.
    fn fetch_frame(&self, query: &str) -> Result<Frame, Error> {
        self.execute(query)
    }

    /// Fetch a table's declared column schema.
    fn fetch_schema(&self, db_path: &str, table_name: &str) -> Result<TableSchema, Error> {
        let defs = self.execute(&format!(
            "schema({}).colDefs",
            script::load_table(db_path, table_name)
        ))?;
        TableSchema::from_col_defs(&defs)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted session double: records every script it is handed and
    //! replays canned response frames in order.

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    #[derive(Default)]
    pub struct MockSession {
        calls: RefCell<Vec<String>>,
        responses: RefCell<VecDeque<Frame>>,
    }

    impl MockSession {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response; `execute` pops responses in FIFO order and
        /// falls back to an empty frame when the queue runs dry.
        pub fn push_response(&self, frame: Frame) {
            self.responses.borrow_mut().push_back(frame);
        }

        pub fn push_scalar(&self, cell: Cell) {
            let mut frame = Frame::new();
            frame.insert_column("value", vec![cell]);
            self.push_response(frame);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        pub fn last_call(&self) -> String {
            self.calls.borrow().last().cloned().unwrap_or_default()
        }
    }

    impl Session for MockSession {
        fn execute(&self, script: &str) -> Result<Frame, Error> {
            self.calls.borrow_mut().push(script.to_string());
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_default())
        }
    }
}
