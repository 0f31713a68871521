pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::Database;

#[derive(Parser)]
#[command(name = "ems")]
#[command(about = "EMS CLI - schema migration and user management for the EMS API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create missing database tables")]
    Migrate,

    #[command(about = "Login account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Verify credentials and print an access token")]
    Token {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Password")]
        password: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let db = Database::connect(&config.database).await?;
    if db.is_memory() {
        anyhow::bail!(
            "DATABASE_URL is not set: the ems CLI needs a postgres:// database, memory storage ends with this command"
        );
    }

    let result = match cli.command {
        Commands::Migrate => commands::migrate::handle(&db, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, &db, output_format).await,
        Commands::Token { username, password } => {
            commands::token::handle(&db, config, username, password, output_format).await
        }
    };

    db.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commands_refuse_memory_storage() {
        let config = AppConfig::development();
        assert!(config.database.url.is_none());

        for args in [
            vec!["ems", "migrate"],
            vec!["ems", "user", "create", "admin", "secret"],
            vec!["ems", "token", "admin", "secret"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            let err = run(cli, &config).await.unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"), "{}", err);
        }
    }

    #[test]
    fn parses_user_create_options() {
        let cli = Cli::try_parse_from([
            "ems", "--json", "user", "create", "ann", "pw", "--full-name", "Ann Lee", "--email", "ann@example.com",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::User {
            cmd: commands::user::UserCommands::Create { username, full_name, email, .. },
        } = cli.command
        else {
            panic!("expected user create");
        };
        assert_eq!(username, "ann");
        assert_eq!(full_name.as_deref(), Some("Ann Lee"));
        assert_eq!(email.as_deref(), Some("ann@example.com"));
    }
}
