use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::database::models::{Employee, User};

/// API shape of an employee. Audit fields are filled on output and ignored
/// on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    #[validate(
        length(min = 1, max = 100, message = "FirstName is required and cannot exceed 100 characters."),
        custom(function = "not_blank", message = "FirstName is required.")
    )]
    pub first_name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, max = 200, message = "LastName is required and cannot exceed 200 characters."),
        custom(function = "not_blank", message = "LastName is required.")
    )]
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,

    #[serde(default)]
    pub created_by: Option<i32>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<i32>,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
    #[serde(default)]
    pub deleted_by: Option<i32>,
    #[serde(default)]
    pub deleted_on: Option<DateTime<Utc>>,
}

impl From<Employee> for EmployeeDto {
    fn from(employee: Employee) -> Self {
        let audit = employee.audit;
        Self {
            id: employee.id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            middle_name: employee.middle_name,
            created_by: audit.created_by,
            created_on: audit.created_on,
            updated_by: audit.updated_by,
            updated_on: audit.updated_on,
            is_deleted: audit.is_deleted,
            deleted_by: audit.deleted_by,
            deleted_on: audit.deleted_on,
        }
    }
}

/// Rejects strings made only of whitespace
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// Audit fields are owned by the service and never copied from input.
impl From<EmployeeDto> for Employee {
    fn from(dto: EmployeeDto) -> Self {
        Self {
            id: dto.id,
            first_name: dto.first_name,
            last_name: dto.last_name,
            middle_name: dto.middle_name,
            audit: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortListDto {
    pub id: i32,
    pub title: String,
}

impl From<&Employee> for ShortListDto {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            title: employee.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedInUser {
    pub user_id: i32,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl From<User> for LoggedInUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub expiry: DateTime<Utc>,
    pub response: LoggedInUser,
}
