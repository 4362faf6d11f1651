//! Crate error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Server-side script failure, passed through from the session verbatim.
    #[error("Database error: {0}")]
    Database(String),

    /// A column type tag with no entry in the database-to-memory type mapping.
    #[error("Unmapped column type: {tag}")]
    UnmappedType { tag: String },

    /// Caller input that cannot be turned into a valid script.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
