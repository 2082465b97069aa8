//! Fluent SOQL query builder.
//!
//! The builder accumulates selection, filter, ordering, and limit state
//! for one target table and renders it on demand with [`QueryBuilder::to_soql`].
//! Rendering is a pure function of the accumulated state; the builder
//! itself never fails and never touches the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use forcetable::QueryBuilder;
//!
//! let soql = QueryBuilder::new("Account")
//!     .select(["Id", "Name"])
//!     .filter("Industry", "Technology")
//!     .order_by("Name")
//!     .limit(10)
//!     .to_soql();
//!
//! assert_eq!(
//!     soql,
//!     "SELECT Id, Name FROM Account WHERE Industry = 'Technology' ORDER BY Name ASC LIMIT 10"
//! );
//! ```

use std::fmt;
use std::str::FromStr;

/// A value usable on the right-hand side of a filter clause.
///
/// Strings render single-quoted with embedded quotes escaped, numbers
/// render unquoted, and [`SoqlValue::Null`] renders the bare `null`
/// keyword (never the quoted string `'null'`).
#[derive(Debug, Clone, PartialEq)]
pub enum SoqlValue {
    Str(String),
    Int(i64),
    Float(f64),
    Null,
}

impl SoqlValue {
    /// Render this value as a SOQL literal.
    pub(crate) fn render(&self) -> String {
        match self {
            SoqlValue::Str(s) => format!("'{}'", s.replace('\'', "\\'")),
            SoqlValue::Int(i) => i.to_string(),
            SoqlValue::Float(f) => f.to_string(),
            SoqlValue::Null => "null".to_string(),
        }
    }
}

/// Displays the raw value text without SOQL quoting, for messages.
impl fmt::Display for SoqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoqlValue::Str(s) => f.write_str(s),
            SoqlValue::Int(i) => write!(f, "{i}"),
            SoqlValue::Float(v) => write!(f, "{v}"),
            SoqlValue::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for SoqlValue {
    fn from(value: &str) -> Self {
        SoqlValue::Str(value.to_string())
    }
}

impl From<String> for SoqlValue {
    fn from(value: String) -> Self {
        SoqlValue::Str(value)
    }
}

impl From<&String> for SoqlValue {
    fn from(value: &String) -> Self {
        SoqlValue::Str(value.clone())
    }
}

impl From<i64> for SoqlValue {
    fn from(value: i64) -> Self {
        SoqlValue::Int(value)
    }
}

impl From<i32> for SoqlValue {
    fn from(value: i32) -> Self {
        SoqlValue::Int(value.into())
    }
}

impl From<u32> for SoqlValue {
    fn from(value: u32) -> Self {
        SoqlValue::Int(value.into())
    }
}

impl From<f64> for SoqlValue {
    fn from(value: f64) -> Self {
        SoqlValue::Float(value)
    }
}

impl<T: Into<SoqlValue>> From<Option<T>> for SoqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => SoqlValue::Null,
        }
    }
}

/// The closed set of filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Operator {
    /// The operator's SOQL token.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an operator token fails.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized operator: {0}")]
pub struct UnknownOperator(String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    /// Parse an exact operator token. Anything outside the closed set
    /// (including lowercase `like`) is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "LIKE" => Ok(Operator::Like),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// Conversion for arguments that accept one field name or a list.
pub trait IntoFields {
    fn into_fields(self) -> Vec<String>;
}

impl IntoFields for &str {
    fn into_fields(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoFields for String {
    fn into_fields(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: Into<String>> IntoFields for Vec<S> {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String> + Clone> IntoFields for &[S] {
    fn into_fields(self) -> Vec<String> {
        self.iter().cloned().map(Into::into).collect()
    }
}

impl<S: Into<String>, const N: usize> IntoFields for [S; N] {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

/// Conversion for arguments that accept one filter value or a list.
pub trait IntoValues {
    fn into_values(self) -> Vec<SoqlValue>;
}

impl IntoValues for &str {
    fn into_values(self) -> Vec<SoqlValue> {
        vec![self.into()]
    }
}

impl IntoValues for String {
    fn into_values(self) -> Vec<SoqlValue> {
        vec![self.into()]
    }
}

impl IntoValues for i64 {
    fn into_values(self) -> Vec<SoqlValue> {
        vec![self.into()]
    }
}

impl IntoValues for i32 {
    fn into_values(self) -> Vec<SoqlValue> {
        vec![self.into()]
    }
}

impl IntoValues for f64 {
    fn into_values(self) -> Vec<SoqlValue> {
        vec![self.into()]
    }
}

impl IntoValues for SoqlValue {
    fn into_values(self) -> Vec<SoqlValue> {
        vec![self]
    }
}

impl<V: Into<SoqlValue>> IntoValues for Vec<V> {
    fn into_values(self) -> Vec<SoqlValue> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<V: Into<SoqlValue> + Clone> IntoValues for &[V] {
    fn into_values(self) -> Vec<SoqlValue> {
        self.iter().cloned().map(Into::into).collect()
    }
}

impl<V: Into<SoqlValue>, const N: usize> IntoValues for [V; N] {
    fn into_values(self) -> Vec<SoqlValue> {
        self.into_iter().map(Into::into).collect()
    }
}

/// One filter condition, stored with its value already rendered.
#[derive(Debug, Clone)]
struct WhereClause {
    field: String,
    operator: &'static str,
    value: String,
}

impl WhereClause {
    fn render(&self) -> String {
        format!("{} {} {}", self.field, self.operator, self.value)
    }
}

/// Accumulates query state for one table and renders SOQL on demand.
///
/// Every method except [`to_soql`](Self::to_soql) consumes and returns
/// the builder for chaining. Filter clauses are append-only and always
/// AND-combined in insertion order. There is a single ORDER BY
/// direction and a single NULLS placement for the whole query.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    fields: Option<Vec<String>>,
    where_clauses: Vec<WhereClause>,
    order_fields: Vec<String>,
    sort_ascending: bool,
    sort_nulls_first: bool,
    limit: Option<i64>,
}

impl QueryBuilder {
    /// Create a builder targeting the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: None,
            where_clauses: Vec::new(),
            order_fields: Vec::new(),
            sort_ascending: true,
            sort_nulls_first: true,
            limit: None,
        }
    }

    /// The target table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Replace the selected field list.
    ///
    /// Not additive: each call overwrites the previous selection. An
    /// empty list restores the wildcard selection. Field names are not
    /// validated.
    pub fn select(mut self, fields: impl IntoFields) -> Self {
        let fields = fields.into_fields();
        self.fields = if fields.is_empty() { None } else { Some(fields) };
        self
    }

    /// Append an equality filter clause.
    ///
    /// `None` values render the bare `null` keyword.
    pub fn filter(self, field: impl Into<String>, value: impl Into<SoqlValue>) -> Self {
        self.filter_op(field, Operator::Eq, value)
    }

    /// Append a filter clause with an explicit operator.
    pub fn filter_op(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<SoqlValue>,
    ) -> Self {
        self.where_clauses.push(WhereClause {
            field: field.into(),
            operator: operator.as_str(),
            value: value.into().render(),
        });
        self
    }

    /// Append an `IN (…)` filter clause over one value or a list.
    pub fn filter_in(mut self, field: impl Into<String>, values: impl IntoValues) -> Self {
        let rendered: Vec<String> = values.into_values().iter().map(SoqlValue::render).collect();
        self.where_clauses.push(WhereClause {
            field: field.into(),
            operator: "IN",
            value: format!("({})", rendered.join(", ")),
        });
        self
    }

    /// Append field(s) to the accumulated ORDER BY list, ascending.
    ///
    /// Additive across calls: successive calls extend the one ORDER BY
    /// clause rather than starting a new one. A previously requested
    /// descending direction is kept.
    pub fn order_by(mut self, fields: impl IntoFields) -> Self {
        self.order_fields.extend(fields.into_fields());
        self
    }

    /// Append field(s) to the ORDER BY list and switch the whole query
    /// to descending order.
    ///
    /// The direction is one global flag: it applies to fields added by
    /// earlier and later `order_by` calls alike, and cannot be flipped
    /// back to ascending afterwards.
    pub fn order_by_desc(mut self, fields: impl IntoFields) -> Self {
        self.order_fields.extend(fields.into_fields());
        self.sort_ascending = false;
        self
    }

    /// Sort null values last instead of first.
    ///
    /// Only visible when at least one order field exists; on its own it
    /// never produces an ORDER BY clause.
    pub fn nulls_last(mut self) -> Self {
        self.sort_nulls_first = false;
        self
    }

    /// Set or replace the record limit.
    ///
    /// Not validated: a zero or negative value renders verbatim.
    pub fn limit(mut self, records: i64) -> Self {
        self.limit = Some(records);
        self
    }

    /// Render the accumulated state to a SOQL string.
    ///
    /// Idempotent and side-effect free; clause order is fixed as
    /// SELECT, WHERE, ORDER BY, LIMIT.
    pub fn to_soql(&self) -> String {
        let fields = match &self.fields {
            Some(fields) => fields.join(", "),
            None => "FIELDS(ALL)".to_string(),
        };
        let mut query = format!("SELECT {} FROM {}", fields, self.table);

        if !self.where_clauses.is_empty() {
            let statements: Vec<String> =
                self.where_clauses.iter().map(WhereClause::render).collect();
            query.push_str(" WHERE ");
            query.push_str(&statements.join(" AND "));
        }

        if !self.order_fields.is_empty() {
            query.push_str(" ORDER BY ");
            query.push_str(&self.order_fields.join(", "));
            query.push_str(if self.sort_ascending { " ASC" } else { " DESC" });
            if !self.sort_nulls_first {
                query.push_str(" NULLS LAST");
            }
        }

        if let Some(limit) = self.limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        query
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_soql())
    }
}
