pub mod employee_service;
pub mod user_service;

pub use employee_service::EmployeeService;
pub use user_service::{seed_admin, NewUser, UserError, UserService};

/// The authenticated caller, as the services see it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
}
