use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{LoggedInUser, LoginDto};
use crate::auth::hash_password;
use crate::config::BootstrapConfig;
use crate::database::models::User;
use crate::database::{Database, DatabaseError, UnitOfWork};
use crate::filter::Filter;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Input for creating a login account
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    /// Absent for bootstrap users created from the CLI
    pub created_by: Option<i32>,
}

pub struct UserService<'a> {
    uow: &'a UnitOfWork,
}

impl<'a> UserService<'a> {
    pub fn new(uow: &'a UnitOfWork) -> Self {
        Self { uow }
    }

    /// Check credentials. `None` for an unknown user or a wrong password.
    pub async fn login(&self, request: &LoginDto) -> Result<Option<LoggedInUser>, DatabaseError> {
        let Some(user) = self.find_active(&request.username).await? else {
            warn!("Login failed: unknown user '{}'", request.username);
            return Ok(None);
        };

        if user.password_hash != hash_password(&request.password) {
            warn!("Login failed: wrong password for '{}'", request.username);
            return Ok(None);
        }

        Ok(Some(user.into()))
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<LoggedInUser, UserError> {
        if self.find_active(&new_user.username).await?.is_some() {
            return Err(UserError::AlreadyExists(new_user.username));
        }

        let mut user = User {
            username: new_user.username,
            password_hash: hash_password(&new_user.password),
            full_name: new_user.full_name,
            email: new_user.email,
            ..Default::default()
        };
        user.audit.stamp_created(new_user.created_by, Utc::now());

        let saved = self.uow.users().add(user).await?;
        info!("Created user '{}' ({})", saved.username, saved.id);
        Ok(saved.into())
    }

    async fn find_active(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let filter = Filter::eq("username", username).and_also(Filter::active());
        let users = self.uow.users().get_all(Some(filter)).await?;
        Ok(users.into_iter().next())
    }
}

/// Create the configured bootstrap admin unless an active user already has
/// that name. Returns the user when one was created.
pub async fn seed_admin(db: &Database, bootstrap: &BootstrapConfig) -> Result<Option<LoggedInUser>, DatabaseError> {
    let Some((username, password)) = bootstrap.admin() else {
        return Ok(None);
    };

    let mut uow = UnitOfWork::begin(db).await?;
    let result = UserService::new(&uow)
        .create_user(NewUser {
            username: username.to_string(),
            password: password.to_string(),
            full_name: Some("Administrator".to_string()),
            ..Default::default()
        })
        .await;
    uow.dispose().await;

    match result {
        Ok(user) => Ok(Some(user)),
        Err(UserError::AlreadyExists(_)) => Ok(None),
        Err(UserError::Database(e)) => Err(e),
    }
}
