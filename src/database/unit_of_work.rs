use once_cell::sync::OnceCell;
use tracing::debug;

use crate::database::manager::{Database, DatabaseError, Session};
use crate::database::models::{Employee, User};
use crate::database::repository::Repository;

/// One storage session plus one lazily built repository per entity type.
///
/// Every repository handed out shares the session, so calls made through a
/// unit of work run on the same connection, one after another.
pub struct UnitOfWork {
    session: Session,
    employees: OnceCell<Repository<Employee>>,
    users: OnceCell<Repository<User>>,
    disposed: bool,
}

impl UnitOfWork {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            employees: OnceCell::new(),
            users: OnceCell::new(),
            disposed: false,
        }
    }

    /// Open a fresh session on `db`
    pub async fn begin(db: &Database) -> Result<Self, DatabaseError> {
        Ok(Self::new(db.session().await?))
    }

    pub fn employees(&self) -> &Repository<Employee> {
        self.employees.get_or_init(|| Repository::new(self.session.clone()))
    }

    pub fn users(&self) -> &Repository<User> {
        self.users.get_or_init(|| Repository::new(self.session.clone()))
    }

    /// Release the session. Later calls are no-ops.
    pub async fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.session.close().await;
        self.disposed = true;
        debug!("unit of work disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
