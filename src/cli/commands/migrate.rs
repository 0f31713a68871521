use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::Database;

pub async fn handle(db: &Database, output_format: OutputFormat) -> anyhow::Result<()> {
    db.migrate().await?;
    output_success(
        &output_format,
        "Database schema is up to date",
        Some(json!({ "backend": db.backend_name() })),
    )
}
