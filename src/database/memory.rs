use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::filter::Filter;

pub type Row = Map<String, Value>;

/// In-process storage with one table per entity type.
///
/// Ids come from a per-table sequence starting at 1 and are never reused.
/// Rows are kept as JSON objects keyed by column name.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<HashMap<&'static str, MemoryTable>>>,
}

#[derive(Default)]
struct MemoryTable {
    last_id: i32,
    rows: BTreeMap<i32, Row>,
}

impl MemoryTable {
    fn insert(&mut self, mut row: Row) -> Row {
        self.last_id += 1;
        row.insert("id".to_string(), Value::from(self.last_id));
        self.rows.insert(self.last_id, row.clone());
        row
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find(&self, table: &'static str, id: i32) -> Option<Row> {
        let tables = self.tables.read().await;
        tables.get(table).and_then(|t| t.rows.get(&id).cloned())
    }

    /// Rows in id order
    pub async fn select(&self, table: &'static str, filter: Option<&Filter>) -> Vec<Row> {
        let tables = self.tables.read().await;
        let Some(t) = tables.get(table) else {
            return vec![];
        };
        t.rows
            .values()
            .filter(|row| filter.map_or(true, |f| f.matches(row)))
            .cloned()
            .collect()
    }

    /// Insert and return the row with its generated `id`
    pub async fn insert(&self, table: &'static str, row: Row) -> Row {
        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().insert(row)
    }

    /// Insert every row under one write lock
    pub async fn insert_many(&self, table: &'static str, rows: Vec<Row>) -> Vec<Row> {
        let mut tables = self.tables.write().await;
        let t = tables.entry(table).or_default();
        rows.into_iter().map(|row| t.insert(row)).collect()
    }

    /// Overwrite an existing row. Returns `None` when the id is unknown.
    pub async fn replace(&self, table: &'static str, id: i32, mut row: Row) -> Option<Row> {
        let mut tables = self.tables.write().await;
        let slot = tables.get_mut(table)?.rows.get_mut(&id)?;
        row.insert("id".to_string(), Value::from(id));
        *slot = row.clone();
        Some(row)
    }

    /// Remove rows by id, returning how many existed
    pub async fn remove(&self, table: &'static str, ids: &[i32]) -> u64 {
        let mut tables = self.tables.write().await;
        let Some(t) = tables.get_mut(table) else {
            return 0;
        };
        ids.iter().filter(|id| t.rows.remove(id).is_some()).count() as u64
    }

    pub async fn count(&self, table: &'static str) -> usize {
        self.tables.read().await.get(table).map_or(0, |t| t.rows.len())
    }
}
