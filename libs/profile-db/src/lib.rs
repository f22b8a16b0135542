//! Database handle for the profile server.
//!
//! Builds a sqlx pool for the engine named by the DSN scheme (SQLite or
//! PostgreSQL) and wraps it into a SeaORM `DatabaseConnection`, which is what
//! the repositories consume. Startup code goes through
//! [`DbHandle::connect_with_retry`] so a database that is still booting does
//! not take the server down.
//!
//! ```rust,no_run
//! # async fn demo() -> profile_db::Result<()> {
//! use profile_db::{ConnectOpts, DbHandle, RetryPolicy};
//!
//! let db = DbHandle::connect_with_retry(
//!     "sqlite::memory:",
//!     ConnectOpts::default(),
//!     RetryPolicy::default(),
//! )
//! .await?;
//! let conn = db.sea();
//! # drop(conn);
//! # Ok(())
//! # }
//! ```

pub mod dsn;
pub mod retry;

pub use dsn::{absolutize_sqlite_dsn, expand_env_vars, is_memory_dsn, redact_credentials_in_dsn};
pub use retry::RetryPolicy;

use std::str::FromStr;
use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlxPostgresConnector, SqlxSqliteConnector};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Invalid DSN: {0}")]
    InvalidDsn(String),

    #[error("Environment variable '{0}' referenced in DSN is not set")]
    MissingEnvVar(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Configuration mistakes never heal by waiting; driver and I/O failures might.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Sqlx(_) | DbError::Sea(_) | DbError::Io(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Pool knobs; each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(30)),
            sqlite_busy_timeout: Some(Duration::from_millis(5000)),
            create_sqlite_dirs: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbHandle {
    engine: DbEngine,
    dsn: String,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN scheme.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(Some(dsn))))
        }
    }

    /// Connect once and verify the connection with a ping.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let dsn = expand_env_vars(dsn.trim())?;
        let engine = Self::detect(&dsn)?;

        let sea = match engine {
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect(&dsn).await?;
                SqlxPostgresConnector::from_sqlx_postgres_pool(pool)
            }
            DbEngine::Sqlite => {
                let memory = is_memory_dsn(&dsn);
                if !memory && opts.create_sqlite_dirs {
                    dsn::create_sqlite_parent_dir(&dsn)?;
                }

                let mut connect = SqliteConnectOptions::from_str(&dsn)?
                    .create_if_missing(true)
                    .foreign_keys(true);
                if let Some(t) = opts.sqlite_busy_timeout {
                    connect = connect.busy_timeout(t);
                }
                connect = connect.journal_mode(if memory {
                    SqliteJournalMode::Memory
                } else {
                    SqliteJournalMode::Wal
                });

                let mut o = SqlitePoolOptions::new();
                if memory {
                    // Every connection to :memory: opens a fresh database; keep exactly one alive.
                    o = o
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                } else if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect_with(connect).await?;
                SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)
            }
        };

        sea.ping().await?;

        Ok(Self { engine, dsn, sea })
    }

    /// Connect, retrying transient failures according to `policy`.
    pub async fn connect_with_retry(
        dsn: &str,
        opts: ConnectOpts,
        policy: RetryPolicy,
    ) -> Result<Self> {
        let redacted = redact_credentials_in_dsn(Some(dsn));
        policy
            .run(
                |attempt| {
                    tracing::info!(attempt, dsn = %redacted, "Connecting to database");
                    Self::connect(dsn, opts.clone())
                },
                DbError::is_transient,
            )
            .await
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// SeaORM connection (cheap clone of the pooled handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    pub async fn close(self) -> Result<()> {
        self.sea.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_engines() {
        assert_eq!(
            DbHandle::detect("postgres://u:p@h/db").unwrap(),
            DbEngine::Postgres
        );
        assert_eq!(
            DbHandle::detect("postgresql://h/db").unwrap(),
            DbEngine::Postgres
        );
        assert_eq!(DbHandle::detect("sqlite::memory:").unwrap(), DbEngine::Sqlite);
        assert_eq!(
            DbHandle::detect("  sqlite:///tmp/x.db").unwrap(),
            DbEngine::Sqlite
        );
    }

    #[test]
    fn unknown_dsn_is_redacted_and_not_transient() {
        let err = DbHandle::detect("mysql://root:secret@h/db").unwrap_err();
        assert!(!err.to_string().contains("secret"));
        assert!(!err.is_transient());
    }
}
