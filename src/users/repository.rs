//! User storage.
//!
//! [`SqliteUserRepository`] keeps one connection behind a mutex and runs
//! every statement on the blocking pool, so the single-threaded runtime
//! never waits on disk.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::debug;

use super::entity::{NewUser, User};
use super::error::UserError;
use crate::config::DatabaseConfig;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        email         TEXT NOT NULL UNIQUE,
        first_name    TEXT NOT NULL,
        last_name     TEXT NOT NULL,
        date_of_birth TEXT NOT NULL,
        password      TEXT NOT NULL
    ) STRICT;
";

const SELECT_COLUMNS: &str =
    "SELECT id, email, first_name, last_name, date_of_birth, password FROM users";

/// Persistence seam for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Fails with [`UserError::AlreadyExists`] on a duplicate email.
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// All users in insertion order.
    async fn find_all(&self) -> Result<Vec<User>, UserError>;
}

/// SQLite-backed repository.
#[derive(Clone)]
pub struct SqliteUserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserRepository {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, UserError> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened user database");
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, UserError> {
        Self::init(Connection::open_in_memory()?)
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self, UserError> {
        if config.is_in_memory() {
            Self::open_in_memory()
        } else {
            Self::open(&config.path)
        }
    }

    fn init(conn: Connection) -> Result<Self, UserError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, UserError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, UserError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&*guard)
        })
        .await
        .map_err(|e| UserError::Storage(format!("storage task failed: {}", e)))?
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        date_of_birth: row.get(4)?,
        password_hash: row.get(5)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO users (email, first_name, last_name, date_of_birth, password)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.email,
                    user.first_name,
                    user.last_name,
                    user.date_of_birth,
                    user.password_hash
                ],
            );

            match inserted {
                Ok(_) => {
                    let id = conn.last_insert_rowid();
                    Ok(user.with_id(id))
                }
                Err(e) if is_unique_violation(&e) => Err(UserError::AlreadyExists(user.email)),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            let sql = format!("{} WHERE email = ?1", SELECT_COLUMNS);
            let user = conn
                .query_row(&sql, params![email], row_to_user)
                .optional()?;
            Ok(user)
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<User>, UserError> {
        self.with_conn(|conn| {
            let sql = format!("{} ORDER BY id", SELECT_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let users = stmt
                .query_map([], row_to_user)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(users)
        })
        .await
    }
}
