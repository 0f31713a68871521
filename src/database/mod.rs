pub mod entity;
pub mod manager;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod schema;
pub mod unit_of_work;

pub use entity::{AuditFields, Auditable, Entity};
pub use manager::{Database, DatabaseError, Session};
pub use memory::MemoryDatabase;
pub use repository::Repository;
pub use unit_of_work::UnitOfWork;
