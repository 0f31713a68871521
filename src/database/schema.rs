use tracing::info;

use crate::database::manager::{Database, DatabaseError};

/// Idempotent DDL for every table the repositories use
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "employees",
        r#"
        CREATE TABLE IF NOT EXISTS "employees" (
            "id"          SERIAL PRIMARY KEY,
            "first_name"  TEXT NOT NULL,
            "last_name"   TEXT NOT NULL,
            "middle_name" TEXT,
            "created_by"  INTEGER,
            "created_on"  TIMESTAMPTZ,
            "updated_by"  INTEGER,
            "updated_on"  TIMESTAMPTZ,
            "is_deleted"  BOOLEAN,
            "deleted_by"  INTEGER,
            "deleted_on"  TIMESTAMPTZ
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS "users" (
            "id"            SERIAL PRIMARY KEY,
            "username"      TEXT NOT NULL UNIQUE,
            "password_hash" TEXT NOT NULL,
            "full_name"     TEXT,
            "email"         TEXT,
            "created_by"    INTEGER,
            "created_on"    TIMESTAMPTZ,
            "updated_by"    INTEGER,
            "updated_on"    TIMESTAMPTZ,
            "is_deleted"    BOOLEAN,
            "deleted_by"    INTEGER,
            "deleted_on"    TIMESTAMPTZ
        )
        "#,
    ),
];

impl Database {
    /// Create missing tables. The memory store needs no schema.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        let Database::Postgres(pool) = self else {
            return Ok(());
        };
        for (table, ddl) in MIGRATIONS {
            sqlx::query(ddl).execute(pool).await?;
            info!("Ensured table: {}", table);
        }
        Ok(())
    }
}
