use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::filter::Filter;
use super::types::{FilterOp, FilterWhereInfo};

/// In-process evaluation of a [`Filter`] with SQL NULL semantics.
/// `None` is UNKNOWN; only `Some(true)` selects a row.
pub struct FilterMatch;

impl FilterMatch {
    pub fn evaluate(filter: &Filter, row: &Map<String, Value>) -> Option<bool> {
        match filter {
            Filter::Condition(condition) => Self::condition(condition, row),
            Filter::And(parts) => {
                let mut result = Some(true);
                for part in parts {
                    match Self::evaluate(part, row) {
                        Some(false) => return Some(false),
                        None => result = None,
                        Some(true) => {}
                    }
                }
                result
            }
            Filter::Or(parts) => {
                let mut result = Some(false);
                for part in parts {
                    match Self::evaluate(part, row) {
                        Some(true) => return Some(true),
                        None => result = None,
                        Some(false) => {}
                    }
                }
                result
            }
            Filter::Not(inner) => Self::evaluate(inner, row).map(|b| !b),
        }
    }

    fn condition(condition: &FilterWhereInfo, row: &Map<String, Value>) -> Option<bool> {
        let cell = row.get(&condition.column).unwrap_or(&Value::Null);
        let data = &condition.data;

        match condition.operator {
            FilterOp::Null => Some(cell.is_null()),
            FilterOp::NotNull => Some(!cell.is_null()),
            FilterOp::Eq if data.is_null() => Some(cell.is_null()),
            FilterOp::Neq if data.is_null() => Some(!cell.is_null()),
            FilterOp::Eq => Self::compare(cell, data).map(|o| o == Ordering::Equal),
            FilterOp::Neq => Self::compare(cell, data).map(|o| o != Ordering::Equal),
            FilterOp::Gt => Self::compare(cell, data).map(|o| o == Ordering::Greater),
            FilterOp::Gte => Self::compare(cell, data).map(|o| o != Ordering::Less),
            FilterOp::Lt => Self::compare(cell, data).map(|o| o == Ordering::Less),
            FilterOp::Lte => Self::compare(cell, data).map(|o| o != Ordering::Greater),
            FilterOp::Like => match (cell, data) {
                (Value::String(text), Value::String(pattern)) => Some(like(text, pattern)),
                _ => None,
            },
            FilterOp::In => match data {
                Value::Array(values) => {
                    let mut result = Some(false);
                    for value in values {
                        match Self::compare(cell, value) {
                            Some(Ordering::Equal) => return Some(true),
                            None => result = None,
                            Some(_) => {}
                        }
                    }
                    result
                }
                other => Self::compare(cell, other).map(|o| o == Ordering::Equal),
            },
        }
    }

    /// Ordering between two scalars, or UNKNOWN when either side is NULL or the
    /// types are not comparable.
    fn compare(left: &Value, right: &Value) -> Option<Ordering> {
        match (left, right) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            },
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// SQL LIKE: `%` matches any run, `_` matches one character. Case-sensitive.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = backtrack {
            p = star_p + 1;
            t = star_t + 1;
            backtrack = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}
