use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, Postgres};

pub type PgQueryAs<'q, O> = sqlx::query::QueryAs<'q, Postgres, O, PgArguments>;

/// Who created, updated and deleted a row, and when.
///
/// `is_deleted` is tri-state: unset rows are active, same as `Some(false)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AuditFields {
    pub created_by: Option<i32>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_by: Option<i32>,
    pub updated_on: Option<DateTime<Utc>>,
    pub is_deleted: Option<bool>,
    pub deleted_by: Option<i32>,
    pub deleted_on: Option<DateTime<Utc>>,
}

impl AuditFields {
    /// Column order used by [`AuditFields::bind_columns`]
    pub const COLUMNS: &'static [&'static str] = &[
        "created_by",
        "created_on",
        "updated_by",
        "updated_on",
        "is_deleted",
        "deleted_by",
        "deleted_on",
    ];

    pub fn is_active(&self) -> bool {
        self.is_deleted != Some(true)
    }

    pub fn stamp_created(&mut self, user_id: Option<i32>, at: DateTime<Utc>) {
        self.created_by = user_id;
        self.created_on = Some(at);
        self.is_deleted = Some(false);
    }

    pub fn stamp_updated(&mut self, user_id: i32, at: DateTime<Utc>) {
        self.updated_by = Some(user_id);
        self.updated_on = Some(at);
    }

    pub fn mark_deleted(&mut self, user_id: i32, at: DateTime<Utc>) {
        self.is_deleted = Some(true);
        self.deleted_by = Some(user_id);
        self.deleted_on = Some(at);
    }

    pub fn bind_columns<'q, O>(&self, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(self.created_by)
            .bind(self.created_on)
            .bind(self.updated_by)
            .bind(self.updated_on)
            .bind(self.is_deleted)
            .bind(self.deleted_by)
            .bind(self.deleted_on)
    }
}

/// Typed access to the audit columns every persisted entity carries.
pub trait Auditable {
    fn audit(&self) -> &AuditFields;
    fn audit_mut(&mut self) -> &mut AuditFields;

    fn is_active(&self) -> bool {
        self.audit().is_active()
    }
}

/// A row type the generic repository can persist.
///
/// Serde field names must match column names: the memory store keeps rows as
/// serialized JSON objects and filters on those keys.
pub trait Entity:
    Auditable + Clone + Serialize + DeserializeOwned + for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static
{
    const TABLE: &'static str;

    /// Writable columns in bind order. Excludes `id`, which storage generates.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i32;

    /// Bind every [`Entity::COLUMNS`] value, in order.
    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_false_are_active() {
        let mut audit = AuditFields::default();
        assert!(audit.is_active());
        audit.is_deleted = Some(false);
        assert!(audit.is_active());
        audit.mark_deleted(7, Utc::now());
        assert!(!audit.is_active());
        assert_eq!(audit.deleted_by, Some(7));
        assert!(audit.deleted_on.is_some());
    }

    #[test]
    fn stamping_leaves_other_fields() {
        let now = Utc::now();
        let mut audit = AuditFields::default();
        audit.stamp_created(Some(3), now);
        audit.stamp_updated(4, now);
        assert_eq!(audit.created_by, Some(3));
        assert_eq!(audit.updated_by, Some(4));
        assert_eq!(audit.is_deleted, Some(false));
        assert!(audit.deleted_by.is_none());
    }
}
