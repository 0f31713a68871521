pub mod dto;

pub use dto::{EmployeeDto, LoggedInUser, LoginDto, ShortListDto, TokenResponse};
