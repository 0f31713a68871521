pub mod employee;
pub mod user;

pub use employee::Employee;
pub use user::User;
