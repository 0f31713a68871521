use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_match::FilterMatch;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, FilterWhereInfo, SqlResult};

/// Row predicate evaluated by the storage layer.
///
/// Postgres sessions render it to a parameterised `WHERE` clause; the memory
/// store evaluates it against stored rows with SQL three-valued logic, so both
/// backends select the same rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Condition(FilterWhereInfo),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    fn condition(column: impl Into<String>, operator: FilterOp, data: Value) -> Self {
        Filter::Condition(FilterWhereInfo { column: column.into(), operator, data })
    }

    /// `column = value`. A null value means `column IS NULL`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(column, FilterOp::Eq, value.into())
    }

    /// `column <> value`. A null value means `column IS NOT NULL`.
    pub fn neq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(column, FilterOp::Neq, value.into())
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(column, FilterOp::Gt, value.into())
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(column, FilterOp::Gte, value.into())
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(column, FilterOp::Lt, value.into())
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(column, FilterOp::Lte, value.into())
    }

    /// SQL `LIKE` with `%` and `_` wildcards
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::condition(column, FilterOp::Like, Value::String(pattern.into()))
    }

    pub fn is_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        Self::condition(column, FilterOp::In, Value::Array(values))
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::condition(column, FilterOp::Null, Value::Null)
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::condition(column, FilterOp::NotNull, Value::Null)
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    /// Rows that have not been soft-deleted: `is_deleted` unset or false.
    pub fn active() -> Self {
        Filter::or([Filter::is_null("is_deleted"), Filter::eq("is_deleted", false)])
    }

    /// Combine with another filter under AND, flattening nested ANDs.
    pub fn and_also(self, other: Filter) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Render the WHERE clause body (without the `WHERE` keyword).
    /// Placeholders are numbered from `starting_param_index + 1`.
    pub fn to_where_sql(&self, starting_param_index: usize) -> Result<SqlResult, FilterError> {
        FilterWhere::generate(self, starting_param_index)
    }

    /// Evaluate against a stored row. Missing columns read as NULL.
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        FilterMatch::evaluate(self, row) == Some(true)
    }

    pub(crate) fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    pub(crate) fn validate_column(name: &str) -> Result<(), FilterError> {
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", name)));
        }
        Ok(())
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }
}
