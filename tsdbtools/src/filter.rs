//! Filter predicate construction
//!
//! A [`Filter`] turns a (column, comparator, value) triple into a predicate
//! fragment in the database's query dialect. The clause is rendered once, at
//! construction, and never changes afterwards; callers combine clauses
//! conjunctively when building a full query.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::script;

/// Predicate operator.
///
/// `Ge` and `Le` render as `>=` / `<=` — the inclusive forms, never the
/// strict ones. Downstream queries rely on the inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Ge,
    Le,
    Like,
    In,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Comparator::Eq => "=",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
            Comparator::Like => "like",
            Comparator::In => "in",
        };
        f.write_str(op)
    }
}

/// A value on the right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Literal form: text quoted, timestamps in filter form, lists bracketed.
    fn literal(&self) -> String {
        match self {
            FilterValue::Int(v) => v.to_string(),
            FilterValue::Float(v) => script::float_literal(*v),
            FilterValue::Text(s) => script::quote(s),
            FilterValue::Timestamp(ts) => script::timestamp_filter(ts),
            FilterValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(FilterValue::literal).collect();
                format!("[{}]", rendered.join(", "))
            }
        }
    }

    /// Raw form used inside `like` patterns: no quoting of any kind.
    fn raw(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(FilterValue::raw).collect();
                format!("[{}]", rendered.join(", "))
            }
            other => other.literal(),
        }
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(i64::from(v))
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Float(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(v: NaiveDateTime) -> Self {
        FilterValue::Timestamp(v)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(items: Vec<T>) -> Self {
        FilterValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// One filter predicate with its clause rendered eagerly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    column: String,
    comparator: Comparator,
    value: FilterValue,
    clause: String,
}

impl Filter {
    pub fn new(
        column: impl Into<String>,
        comparator: Comparator,
        value: impl Into<FilterValue>,
    ) -> Self {
        let column = column.into();
        let value = value.into();
        let clause = render_clause(&column, comparator, &value);
        Filter {
            column,
            comparator,
            value,
            clause,
        }
    }

    /// Equality filter, the most common case.
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Filter::new(column, Comparator::Eq, value)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// The rendered predicate fragment.
    pub fn clause(&self) -> &str {
        &self.clause
    }
}

fn render_clause(column: &str, comparator: Comparator, value: &FilterValue) -> String {
    match comparator {
        Comparator::Eq | Comparator::Ge | Comparator::Le | Comparator::In => {
            format!("{column} {comparator} {}", value.literal())
        }
        Comparator::Like => {
            // A scalar is treated as a one-element sequence; a sequence of N
            // values becomes an N-way OR of substring matches.
            let singleton;
            let elements = match value {
                FilterValue::List(items) => items.as_slice(),
                scalar => {
                    singleton = [scalar.clone()];
                    &singleton[..]
                }
            };
            let conditions: Vec<String> = elements
                .iter()
                .map(|v| format!("{column} like '%{}%'", v.raw()))
                .collect();
            conditions.join(" or ")
        }
    }
}
