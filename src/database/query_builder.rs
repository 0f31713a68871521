use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::Postgres;

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, SqlResult};

/// SQL text for the generic repository. Identifiers are validated and quoted;
/// every value goes through a `$n` placeholder.
pub struct QueryBuilder {
    table_name: String,
}

impl QueryBuilder {
    pub fn new(table_name: &str) -> Result<Self, DatabaseError> {
        Filter::validate_table_name(table_name)?;
        Ok(Self {
            table_name: table_name.to_string(),
        })
    }

    pub fn select_by_id(&self) -> String {
        format!("SELECT * FROM \"{}\" WHERE \"id\" = $1", self.table_name)
    }

    pub fn select(&self, filter: Option<&Filter>) -> Result<SqlResult, DatabaseError> {
        let (where_clause, params) = match filter {
            Some(filter) => {
                let sql = filter.to_where_sql(0)?;
                (format!(" WHERE {}", sql.query), sql.params)
            }
            None => (String::new(), vec![]),
        };
        Ok(SqlResult {
            query: format!("SELECT * FROM \"{}\"{} ORDER BY \"id\"", self.table_name, where_clause),
            params,
        })
    }

    pub fn insert(&self, columns: &[&str]) -> Result<String, DatabaseError> {
        let names = Self::quoted_columns(columns)?;
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
        Ok(format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
            self.table_name,
            names.join(", "),
            placeholders.join(", ")
        ))
    }

    /// Full-row update; the id is the last placeholder.
    pub fn update(&self, columns: &[&str]) -> Result<String, DatabaseError> {
        let names = Self::quoted_columns(columns)?;
        let assignments: Vec<String> = names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{} = ${}", name, i + 1))
            .collect();
        Ok(format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ${} RETURNING *",
            self.table_name,
            assignments.join(", "),
            columns.len() + 1
        ))
    }

    pub fn delete_by_id(&self) -> String {
        format!("DELETE FROM \"{}\" WHERE \"id\" = $1", self.table_name)
    }

    pub fn delete_by_ids(&self) -> String {
        format!("DELETE FROM \"{}\" WHERE \"id\" = ANY($1)", self.table_name)
    }

    fn quoted_columns(columns: &[&str]) -> Result<Vec<String>, DatabaseError> {
        if columns.is_empty() {
            return Err(DatabaseError::QueryError("no columns to write".to_string()));
        }
        columns
            .iter()
            .map(|c| {
                Filter::validate_column(c)?;
                Ok(format!("\"{}\"", c))
            })
            .collect()
    }
}

/// Bind a filter parameter by its JSON type
pub(crate) fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &Value,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments> {
    match v {
        Value::Null => q.bind(None::<String>),
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        // JSONB
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_insert_and_update() {
        let qb = QueryBuilder::new("employees").unwrap();
        assert_eq!(
            qb.insert(&["first_name", "last_name"]).unwrap(),
            "INSERT INTO \"employees\" (\"first_name\", \"last_name\") VALUES ($1, $2) RETURNING *"
        );
        assert_eq!(
            qb.update(&["first_name", "last_name"]).unwrap(),
            "UPDATE \"employees\" SET \"first_name\" = $1, \"last_name\" = $2 WHERE \"id\" = $3 RETURNING *"
        );
    }

    #[test]
    fn builds_select_with_filter() {
        let qb = QueryBuilder::new("employees").unwrap();
        let plain = qb.select(None).unwrap();
        assert_eq!(plain.query, "SELECT * FROM \"employees\" ORDER BY \"id\"");
        assert!(plain.params.is_empty());

        let active = qb.select(Some(&Filter::active())).unwrap();
        assert_eq!(
            active.query,
            "SELECT * FROM \"employees\" WHERE (\"is_deleted\" IS NULL OR \"is_deleted\" = $1) ORDER BY \"id\""
        );
        assert_eq!(active.params, vec![json!(false)]);
    }

    #[test]
    fn builds_deletes() {
        let qb = QueryBuilder::new("users").unwrap();
        assert_eq!(qb.select_by_id(), "SELECT * FROM \"users\" WHERE \"id\" = $1");
        assert_eq!(qb.delete_by_id(), "DELETE FROM \"users\" WHERE \"id\" = $1");
        assert_eq!(qb.delete_by_ids(), "DELETE FROM \"users\" WHERE \"id\" = ANY($1)");
    }

    #[test]
    fn rejects_bad_names() {
        assert!(QueryBuilder::new("emp; drop").is_err());
        let qb = QueryBuilder::new("employees").unwrap();
        assert!(qb.insert(&[]).is_err());
        assert!(qb.insert(&["ok", "not ok"]).is_err());
    }
}
