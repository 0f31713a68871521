pub mod token;

pub use token::token_create;
