use std::marker::PhantomData;

use chrono::Utc;
use serde_json::Value;
use sqlx::Connection as _;
use tracing::debug;

use crate::database::entity::Entity;
use crate::database::manager::{Connection, DatabaseError, Session};
use crate::database::memory::Row;
use crate::database::query_builder::{bind_param_query_as, QueryBuilder};
use crate::filter::Filter;

/// Data access for one entity type over a shared [`Session`].
///
/// Every mutating call is committed before it returns.
pub struct Repository<T> {
    session: Session,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            _phantom: PhantomData,
        }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<T>, DatabaseError> {
        debug!(table = T::TABLE, id, "get_by_id");
        let mut guard = self.session.lock().await;
        match guard.as_mut().ok_or(DatabaseError::SessionClosed)? {
            Connection::Postgres(conn) => {
                let sql = QueryBuilder::new(T::TABLE)?.select_by_id();
                let row = sqlx::query_as::<_, T>(&sql)
                    .bind(id)
                    .fetch_optional(&mut **conn)
                    .await?;
                Ok(row)
            }
            Connection::Memory(db) => db.find(T::TABLE, id).await.map(from_row::<T>).transpose(),
        }
    }

    /// All rows matching `filter`, evaluated by storage. `None` returns every row.
    pub async fn get_all(&self, filter: Option<Filter>) -> Result<Vec<T>, DatabaseError> {
        debug!(table = T::TABLE, filtered = filter.is_some(), "get_all");
        let mut guard = self.session.lock().await;
        match guard.as_mut().ok_or(DatabaseError::SessionClosed)? {
            Connection::Postgres(conn) => {
                let sql = QueryBuilder::new(T::TABLE)?.select(filter.as_ref())?;
                let mut q = sqlx::query_as::<_, T>(&sql.query);
                for p in sql.params.iter() {
                    q = bind_param_query_as(q, p);
                }
                Ok(q.fetch_all(&mut **conn).await?)
            }
            Connection::Memory(db) => {
                if let Some(filter) = &filter {
                    // Same validation the SQL path applies
                    filter.to_where_sql(0)?;
                }
                db.select(T::TABLE, filter.as_ref())
                    .await
                    .into_iter()
                    .map(from_row::<T>)
                    .collect()
            }
        }
    }

    /// Insert one row and return it with its generated id
    pub async fn add(&self, entity: T) -> Result<T, DatabaseError> {
        debug!(table = T::TABLE, "add");
        let mut guard = self.session.lock().await;
        match guard.as_mut().ok_or(DatabaseError::SessionClosed)? {
            Connection::Postgres(conn) => {
                let sql = QueryBuilder::new(T::TABLE)?.insert(T::COLUMNS)?;
                let row = entity
                    .bind_columns(sqlx::query_as::<_, T>(&sql))
                    .fetch_one(&mut **conn)
                    .await?;
                Ok(row)
            }
            Connection::Memory(db) => from_row(db.insert(T::TABLE, to_row(&entity)?).await),
        }
    }

    /// Insert a batch in one transaction
    pub async fn add_range(&self, entities: Vec<T>) -> Result<bool, DatabaseError> {
        debug!(table = T::TABLE, count = entities.len(), "add_range");
        if entities.is_empty() {
            return Ok(true);
        }

        let mut guard = self.session.lock().await;
        match guard.as_mut().ok_or(DatabaseError::SessionClosed)? {
            Connection::Postgres(conn) => {
                let sql = QueryBuilder::new(T::TABLE)?.insert(T::COLUMNS)?;
                let mut tx = conn.begin().await?;
                for entity in &entities {
                    entity
                        .bind_columns(sqlx::query_as::<_, T>(&sql))
                        .fetch_one(&mut *tx)
                        .await?;
                }
                tx.commit().await?;
            }
            Connection::Memory(db) => {
                let rows = entities.iter().map(to_row).collect::<Result<Vec<_>, _>>()?;
                db.insert_many(T::TABLE, rows).await;
            }
        }
        Ok(true)
    }

    /// Overwrite every writable column of an existing row
    pub async fn update(&self, entity: T) -> Result<T, DatabaseError> {
        let id = entity.id();
        debug!(table = T::TABLE, id, "update");
        let mut guard = self.session.lock().await;
        let updated = match guard.as_mut().ok_or(DatabaseError::SessionClosed)? {
            Connection::Postgres(conn) => {
                let sql = QueryBuilder::new(T::TABLE)?.update(T::COLUMNS)?;
                entity
                    .bind_columns(sqlx::query_as::<_, T>(&sql))
                    .bind(id)
                    .fetch_optional(&mut **conn)
                    .await?
            }
            Connection::Memory(db) => db
                .replace(T::TABLE, id, to_row(&entity)?)
                .await
                .map(from_row::<T>)
                .transpose()?,
        };
        updated.ok_or_else(|| DatabaseError::NotFound(format!("{} row {} not found", T::TABLE, id)))
    }

    /// Soft delete by id. An unknown id is a silent no-op.
    pub async fn delete(&self, id: i32, acting_user_id: i32) -> Result<(), DatabaseError> {
        if let Some(entity) = self.get_by_id(id).await? {
            self.soft_delete(entity, acting_user_id).await?;
        }
        Ok(())
    }

    /// Flag a loaded row as deleted by `acting_user_id` now, and persist it
    pub async fn soft_delete(&self, mut entity: T, acting_user_id: i32) -> Result<T, DatabaseError> {
        debug!(table = T::TABLE, id = entity.id(), acting_user_id, "soft_delete");
        entity.audit_mut().mark_deleted(acting_user_id, Utc::now());
        self.update(entity).await
    }

    /// Physically remove one row
    pub async fn hard_delete(&self, entity: &T) -> Result<(), DatabaseError> {
        self.hard_delete_ids(&[entity.id()]).await
    }

    /// Physically remove several rows in one statement
    pub async fn hard_delete_range(&self, entities: &[T]) -> Result<(), DatabaseError> {
        let ids: Vec<i32> = entities.iter().map(Entity::id).collect();
        self.hard_delete_ids(&ids).await
    }

    async fn hard_delete_ids(&self, ids: &[i32]) -> Result<(), DatabaseError> {
        debug!(table = T::TABLE, ?ids, "hard_delete");
        if ids.is_empty() {
            return Ok(());
        }

        let mut guard = self.session.lock().await;
        match guard.as_mut().ok_or(DatabaseError::SessionClosed)? {
            Connection::Postgres(conn) => {
                let qb = QueryBuilder::new(T::TABLE)?;
                if let [id] = ids {
                    sqlx::query(&qb.delete_by_id()).bind(*id).execute(&mut **conn).await?;
                } else {
                    sqlx::query(&qb.delete_by_ids()).bind(ids.to_vec()).execute(&mut **conn).await?;
                }
            }
            Connection::Memory(db) => {
                db.remove(T::TABLE, ids).await;
            }
        }
        Ok(())
    }
}

fn to_row<T: Entity>(entity: &T) -> Result<Row, DatabaseError> {
    match serde_json::to_value(entity)? {
        Value::Object(mut row) => {
            row.remove("id");
            Ok(row)
        }
        _ => Err(DatabaseError::QueryError(format!("{} did not serialize to a row", T::TABLE))),
    }
}

fn from_row<T: Entity>(row: Row) -> Result<T, DatabaseError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}
