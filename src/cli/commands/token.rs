use serde_json::json;

use crate::api::LoginDto;
use crate::auth::generate_jwt;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{Database, UnitOfWork};
use crate::services::UserService;

pub async fn handle(
    db: &Database,
    config: &AppConfig,
    username: String,
    password: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut uow = UnitOfWork::begin(db).await?;
    let login = UserService::new(&uow).login(&LoginDto { username, password }).await;
    uow.dispose().await;

    let Some(user) = login? else {
        output_error(&output_format, "Please enter Valid Username and Password.", Some("INVALID_CREDENTIALS"))?;
        anyhow::bail!("invalid credentials");
    };

    let (token, expiry) = generate_jwt(&config.security, user.user_id, &user.username)?;
    output_success(
        &output_format,
        &format!("Issued token for '{}'", user.username),
        Some(json!({ "accessToken": token, "expiry": expiry })),
    )
}
