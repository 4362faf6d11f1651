//! Database column type tags and their in-memory counterparts
//!
//! The server declares every table column with a native type tag (the
//! `typeString` of its schema output). [`DbType`] is the closed set of tags
//! this crate understands; [`DbType::semantic`] is the fixed mapping onto the
//! in-memory type family used when coercing frame columns. Adding a tag
//! without extending the mapping is a compile error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Native column type tag as declared by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbType {
    Bool,
    Char,
    Short,
    Int,
    Long,
    Date,
    Month,
    Time,
    Minute,
    Second,
    Datetime,
    Nanotime,
    Timestamp,
    Nanotimestamp,
    Float,
    Double,
    Symbol,
    String,
}

/// In-memory type family a frame column is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Timestamp,
    Float32,
    Float64,
    Text,
}

impl DbType {
    /// Map a database type tag onto its in-memory type family.
    ///
    /// All calendar tags collapse onto [`SemanticType::Timestamp`]; the
    /// sub-day resolution they encode is the server's concern, not ours.
    pub fn semantic(self) -> SemanticType {
        match self {
            DbType::Bool => SemanticType::Bool,
            DbType::Char => SemanticType::Int8,
            DbType::Short => SemanticType::Int16,
            DbType::Int => SemanticType::Int32,
            DbType::Long => SemanticType::Int64,
            DbType::Date
            | DbType::Month
            | DbType::Time
            | DbType::Minute
            | DbType::Second
            | DbType::Datetime
            | DbType::Nanotime
            | DbType::Timestamp
            | DbType::Nanotimestamp => SemanticType::Timestamp,
            DbType::Float => SemanticType::Float32,
            DbType::Double => SemanticType::Float64,
            DbType::Symbol | DbType::String => SemanticType::Text,
        }
    }

    /// The tag exactly as the server spells it.
    pub fn tag(self) -> &'static str {
        match self {
            DbType::Bool => "BOOL",
            DbType::Char => "CHAR",
            DbType::Short => "SHORT",
            DbType::Int => "INT",
            DbType::Long => "LONG",
            DbType::Date => "DATE",
            DbType::Month => "MONTH",
            DbType::Time => "TIME",
            DbType::Minute => "MINUTE",
            DbType::Second => "SECOND",
            DbType::Datetime => "DATETIME",
            DbType::Nanotime => "NANOTIME",
            DbType::Timestamp => "TIMESTAMP",
            DbType::Nanotimestamp => "NANOTIMESTAMP",
            DbType::Float => "FLOAT",
            DbType::Double => "DOUBLE",
            DbType::Symbol => "SYMBOL",
            DbType::String => "STRING",
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DbType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dtype = match s {
            "BOOL" => DbType::Bool,
            "CHAR" => DbType::Char,
            "SHORT" => DbType::Short,
            "INT" => DbType::Int,
            "LONG" => DbType::Long,
            "DATE" => DbType::Date,
            "MONTH" => DbType::Month,
            "TIME" => DbType::Time,
            "MINUTE" => DbType::Minute,
            "SECOND" => DbType::Second,
            "DATETIME" => DbType::Datetime,
            "NANOTIME" => DbType::Nanotime,
            "TIMESTAMP" => DbType::Timestamp,
            "NANOTIMESTAMP" => DbType::Nanotimestamp,
            "FLOAT" => DbType::Float,
            "DOUBLE" => DbType::Double,
            "SYMBOL" => DbType::Symbol,
            "STRING" => DbType::String,
            other => {
                return Err(Error::UnmappedType {
                    tag: other.to_string(),
                });
            }
        };
        Ok(dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for tag in [
            "BOOL",
            "CHAR",
            "SHORT",
            "INT",
            "LONG",
            "DATE",
            "MONTH",
            "TIME",
            "MINUTE",
            "SECOND",
            "DATETIME",
            "NANOTIME",
            "TIMESTAMP",
            "NANOTIMESTAMP",
            "FLOAT",
            "DOUBLE",
            "SYMBOL",
            "STRING",
        ] {
            let dtype: DbType = tag.parse().unwrap();
            assert_eq!(dtype.to_string(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let err = "UUID".parse::<DbType>().unwrap_err();
        assert!(matches!(err, Error::UnmappedType { tag } if tag == "UUID"));
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(DbType::Char.semantic(), SemanticType::Int8);
        assert_eq!(DbType::Short.semantic(), SemanticType::Int16);
        assert_eq!(DbType::Int.semantic(), SemanticType::Int32);
        assert_eq!(DbType::Long.semantic(), SemanticType::Int64);
    }

    #[test]
    fn test_calendar_tags_collapse_to_timestamp() {
        for dtype in [
            DbType::Date,
            DbType::Month,
            DbType::Time,
            DbType::Minute,
            DbType::Second,
            DbType::Datetime,
            DbType::Nanotime,
            DbType::Timestamp,
            DbType::Nanotimestamp,
        ] {
            assert_eq!(dtype.semantic(), SemanticType::Timestamp);
        }
    }

    #[test]
    fn test_text_types() {
        assert_eq!(DbType::Symbol.semantic(), SemanticType::Text);
        assert_eq!(DbType::String.semantic(), SemanticType::Text);
    }
}
