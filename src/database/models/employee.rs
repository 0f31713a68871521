use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::entity::{AuditFields, Auditable, Entity, PgQueryAs};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    #[serde(default)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: AuditFields,
}

impl Auditable for Employee {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl Entity for Employee {
    const TABLE: &'static str = "employees";

    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "middle_name",
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
            .bind(self.first_name.clone())
            .bind(self.last_name.clone())
            .bind(self.middle_name.clone());
        self.audit.bind_columns(query)
    }
}
