//! Filter specification types.
//!
//! A [`FilterSpec`] is the caller-facing description of a query: where
//! clauses over dotted field paths, sort keys, pagination and the set of
//! relations to expand in the result.

use crate::error::Error;
use crate::value::ClauseValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a where clause.
///
/// Unrecognized operator names are kept verbatim in [`Operator::Unknown`] so
/// that decoding a spec never fails; the translator rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Nin,
    /// Case-insensitive pattern match.
    Contains,
    /// Negated case-insensitive pattern match.
    NContains,
    /// Case-sensitive pattern match.
    ContainsS,
    /// Negated case-sensitive pattern match.
    NContainsS,
    /// Anything else.
    Unknown(String),
}

impl Operator {
    /// The operator's wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::In => "in",
            Operator::Nin => "nin",
            Operator::Contains => "contains",
            Operator::NContains => "ncontains",
            Operator::ContainsS => "containss",
            Operator::NContainsS => "ncontainss",
            Operator::Unknown(name) => name,
        }
    }
}

impl FromStr for Operator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "in" => Operator::In,
            "nin" => Operator::Nin,
            "contains" => Operator::Contains,
            "ncontains" => Operator::NContains,
            "containss" => Operator::ContainsS,
            "ncontainss" => Operator::NContainsS,
            other => Operator::Unknown(other.to_string()),
        })
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(op) => op,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Operator::from(s.to_string())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter condition on a dotted field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    /// Dotted path: zero or more association aliases, then an attribute.
    pub field: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Right-hand side value.
    pub value: ClauseValue,
}

impl WhereClause {
    /// Create a where clause.
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<ClauseValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Create an equality clause.
    pub fn eq(field: impl Into<String>, value: impl Into<ClauseValue>) -> Self {
        Self::new(field, Operator::Eq, value)
    }
}

/// Sort direction.
///
/// Decoded leniently: `"asc"` is ascending, any other value (including
/// missing or malformed input) is descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "String")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a direction, treating anything but `asc` as descending.
    pub fn parse(s: &str) -> Self {
        if s == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    /// Numeric direction code used by sort stages.
    pub fn code(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

impl From<serde_json::Value> for SortDirection {
    fn from(value: serde_json::Value) -> Self {
        match value.as_str() {
            Some(s) => SortDirection::parse(s),
            None => SortDirection::Desc,
        }
    }
}

impl From<SortDirection> for String {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => "asc".to_string(),
            SortDirection::Desc => "desc".to_string(),
        }
    }
}

/// A sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to sort on.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create an ascending sort key.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Create a descending sort key.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A complete filter specification for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Where clauses, AND-ed in order.
    #[serde(rename = "where", default)]
    pub where_clauses: Vec<WhereClause>,
    /// Sort keys in priority order.
    #[serde(default)]
    pub sort: Vec<SortSpec>,
    /// Number of documents to skip.
    #[serde(default)]
    pub start: Option<u64>,
    /// Maximum number of documents; negative values mean no limit.
    #[serde(default)]
    pub limit: Option<i64>,
    /// Association aliases to expand in the result.
    #[serde(default)]
    pub populate: Option<Vec<String>>,
}

impl FilterSpec {
    /// Create an empty filter spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a filter spec from JSON text.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(Error::decode)
    }

    /// Add a where clause.
    pub fn with_where(mut self, clause: WhereClause) -> Self {
        self.where_clauses.push(clause);
        self
    }

    /// Add a sort key.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    /// Set the skip offset.
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the relations to expand.
    pub fn with_populate<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.populate = Some(aliases.into_iter().map(Into::into).collect());
        self
    }

    /// Field paths referenced by the where clauses, in clause order.
    pub fn where_fields(&self) -> Vec<&str> {
        self.where_clauses.iter().map(|c| c.field.as_str()).collect()
    }

    /// The limit, if it should be applied.
    pub fn effective_limit(&self) -> Option<u64> {
        self.limit.and_then(|n| u64::try_from(n).ok())
    }
}
