use serde_json::Value;

use super::error::FilterError;
use super::filter::Filter;
use super::types::{FilterOp, FilterWhereInfo, SqlResult};

pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(filter: &Filter, starting_param_index: usize) -> Result<SqlResult, FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let query = filter_where.build(filter)?;
        Ok(SqlResult { query, params: filter_where.param_values })
    }

    fn build(&mut self, filter: &Filter) -> Result<String, FilterError> {
        match filter {
            Filter::Condition(condition) => self.build_sql_condition(condition),
            Filter::And(parts) => self.build_group(parts, " AND ", "1=1"),
            Filter::Or(parts) => self.build_group(parts, " OR ", "1=0"),
            Filter::Not(inner) => Ok(format!("NOT ({})", self.build(inner)?)),
        }
    }

    fn build_group(&mut self, parts: &[Filter], joiner: &str, empty: &str) -> Result<String, FilterError> {
        if parts.is_empty() {
            return Ok(empty.to_string());
        }
        let mut sql_parts = Vec::with_capacity(parts.len());
        for part in parts {
            sql_parts.push(self.build(part)?);
        }
        Ok(format!("({})", sql_parts.join(joiner)))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        Filter::validate_column(&condition.column)?;

        let quoted_column = format!("\"{}\"", condition.column);
        let data = condition.data.clone();
        Ok(match condition.operator {
            FilterOp::Eq if data.is_null() => format!("{} IS NULL", quoted_column),
            FilterOp::Eq => format!("{} = {}", quoted_column, self.param(data)),
            FilterOp::Neq if data.is_null() => format!("{} IS NOT NULL", quoted_column),
            FilterOp::Neq => format!("{} <> {}", quoted_column, self.param(data)),
            FilterOp::Gt => format!("{} > {}", quoted_column, self.scalar_param(data, ">")?),
            FilterOp::Gte => format!("{} >= {}", quoted_column, self.scalar_param(data, ">=")?),
            FilterOp::Lt => format!("{} < {}", quoted_column, self.scalar_param(data, "<")?),
            FilterOp::Lte => format!("{} <= {}", quoted_column, self.scalar_param(data, "<=")?),
            FilterOp::Like => match data {
                Value::String(_) => format!("{} LIKE {}", quoted_column, self.param(data)),
                _ => return Err(FilterError::InvalidOperatorData("LIKE requires a string pattern".to_string())),
            },
            FilterOp::In => match data {
                Value::Array(values) if values.is_empty() => "1=0".to_string(),
                Value::Array(values) => {
                    let params: Vec<String> = values.into_iter().map(|v| self.param(v)).collect();
                    format!("{} IN ({})", quoted_column, params.join(", "))
                }
                other => format!("{} = {}", quoted_column, self.param(other)),
            },
            FilterOp::Null => format!("{} IS NULL", quoted_column),
            FilterOp::NotNull => format!("{} IS NOT NULL", quoted_column),
        })
    }

    fn scalar_param(&mut self, value: Value, op: &str) -> Result<String, FilterError> {
        match value {
            Value::Null | Value::Array(_) | Value::Object(_) => Err(FilterError::InvalidOperatorData(format!(
                "{} requires a number or string",
                op
            ))),
            v => Ok(self.param(v)),
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_placeholders_from_offset() {
        let filter = Filter::and([Filter::eq("last_name", "Lee"), Filter::gte("id", 2)]);
        let sql = FilterWhere::generate(&filter, 3).unwrap();
        assert_eq!(sql.query, "(\"last_name\" = $4 AND \"id\" >= $5)");
        assert_eq!(sql.params, vec![json!("Lee"), json!(2)]);
    }

    #[test]
    fn null_equality_becomes_is_null() {
        let sql = FilterWhere::generate(&Filter::eq("middle_name", Value::Null), 0).unwrap();
        assert_eq!(sql.query, "\"middle_name\" IS NULL");
        assert!(sql.params.is_empty());

        let sql = FilterWhere::generate(&Filter::neq("middle_name", Value::Null), 0).unwrap();
        assert_eq!(sql.query, "\"middle_name\" IS NOT NULL");
    }

    #[test]
    fn in_list_expands_and_empty_is_false() {
        let sql = FilterWhere::generate(&Filter::is_in("id", [1, 2, 3]), 0).unwrap();
        assert_eq!(sql.query, "\"id\" IN ($1, $2, $3)");
        assert_eq!(sql.params.len(), 3);

        let empty: [i32; 0] = [];
        let sql = FilterWhere::generate(&Filter::is_in("id", empty), 0).unwrap();
        assert_eq!(sql.query, "1=0");
    }

    #[test]
    fn not_and_empty_groups() {
        let sql = FilterWhere::generate(&Filter::not(Filter::active()), 0).unwrap();
        assert_eq!(sql.query, "NOT ((\"is_deleted\" IS NULL OR \"is_deleted\" = $1))");

        assert_eq!(FilterWhere::generate(&Filter::and([]), 0).unwrap().query, "1=1");
        assert_eq!(FilterWhere::generate(&Filter::or([]), 0).unwrap().query, "1=0");
    }

    #[test]
    fn comparison_rejects_null() {
        let err = FilterWhere::generate(&Filter::gt("id", Value::Null), 0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorData(_)));
    }
}
