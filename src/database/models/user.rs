use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::entity::{AuditFields, Auditable, Entity, PgQueryAs};

/// Login account. `password_hash` is the lowercase hex SHA-256 of the password.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    #[serde(default)]
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: AuditFields,
}

impl Auditable for User {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";

    const COLUMNS: &'static [&'static str] = &[
        "username",
        "password_hash",
        "full_name",
        "email",
        "created_by",
        "created_on",
        "updated_by",
        "updated_on",
        "is_deleted",
        "deleted_by",
        "deleted_on",
    ];

    fn id(&self) -> i32 {
        self.id
    }

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        let query = query
            .bind(self.username.clone())
            .bind(self.password_hash.clone())
            .bind(self.full_name.clone())
            .bind(self.email.clone());
        self.audit.bind_columns(query)
    }
}
