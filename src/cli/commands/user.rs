use clap::Subcommand;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::database::{Database, UnitOfWork};
use crate::services::{NewUser, UserError, UserService};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a login account")]
    Create {
        #[arg(help = "Username (must be unique)")]
        username: String,
        #[arg(help = "Password")]
        password: String,
        #[arg(long, help = "Display name")]
        full_name: Option<String>,
        #[arg(long, help = "Email address")]
        email: Option<String>,
    },
}

pub async fn handle(cmd: UserCommands, db: &Database, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create {
            username,
            password,
            full_name,
            email,
        } => {
            db.migrate().await?;

            let mut uow = UnitOfWork::begin(db).await?;
            let result = UserService::new(&uow)
                .create_user(NewUser {
                    username,
                    password,
                    full_name,
                    email,
                    created_by: None,
                })
                .await;
            uow.dispose().await;

            match result {
                Ok(user) => output_success(
                    &output_format,
                    &format!("Created user '{}'", user.username),
                    Some(serde_json::to_value(&user)?),
                ),
                Err(UserError::AlreadyExists(name)) => {
                    output_error(&output_format, &format!("User '{}' already exists", name), Some("USER_EXISTS"))?;
                    anyhow::bail!("user '{}' already exists", name)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}
