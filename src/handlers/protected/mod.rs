// Employee CRUD under /api/employees. Every route here sits behind
// jwt_auth_middleware, which injects the AuthUser extension.
pub mod employees;

pub use employees::*;
