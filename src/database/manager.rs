use std::sync::Arc;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::memory::MemoryDatabase;
use crate::filter::FilterError;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Storage session is closed")]
    SessionClosed,

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Row serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Application-wide storage handle. Cheap to clone.
#[derive(Clone)]
pub enum Database {
    Postgres(PgPool),
    Memory(MemoryDatabase),
}

impl Database {
    /// Connect using the configured URL. No URL (or `memory`) gives an empty
    /// in-process store.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let Some(raw) = config.url.as_deref().filter(|u| *u != "memory") else {
            info!("Using in-memory storage");
            return Ok(Self::memory());
        };

        let url = url::Url::parse(raw).map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url.as_str())
            .await?;

        info!(
            "Created database pool for: {}{}",
            url.host_str().unwrap_or("localhost"),
            url.path()
        );
        Ok(Database::Postgres(pool))
    }

    pub fn memory() -> Self {
        Database::Memory(MemoryDatabase::new())
    }

    /// Open a session. For Postgres this checks a connection out of the pool;
    /// it goes back when the session is closed or dropped.
    pub async fn session(&self) -> Result<Session, DatabaseError> {
        let connection = match self {
            Database::Postgres(pool) => Connection::Postgres(pool.acquire().await?),
            Database::Memory(db) => Connection::Memory(db.clone()),
        };
        Ok(Session::new(connection))
    }

    /// Pings the store to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match self {
            Database::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            Database::Memory(_) => Ok(()),
        }
    }

    /// True for the in-process store, whose rows end with the process
    pub fn is_memory(&self) -> bool {
        matches!(self, Database::Memory(_))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Database::Postgres(_) => "postgres",
            Database::Memory(_) => "memory",
        }
    }

    pub async fn close(&self) {
        if let Database::Postgres(pool) = self {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}

/// The live connection behind a session
pub enum Connection {
    Postgres(PoolConnection<Postgres>),
    Memory(MemoryDatabase),
}

/// One storage scope shared by every repository of a unit of work.
///
/// Calls are serialised through an async mutex. Closing takes the connection
/// out, after which every call fails with [`DatabaseError::SessionClosed`].
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<Option<Connection>>>,
}

impl Session {
    pub fn new(connection: Connection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(connection))),
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.inner.lock().await
    }

    /// Release the connection. Safe to call more than once.
    pub async fn close(&self) -> bool {
        self.inner.lock().await.take().is_some()
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}
