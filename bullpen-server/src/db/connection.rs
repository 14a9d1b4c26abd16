use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use super::schema::{DEMO_DATA, SCHEMA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

/// Every pooled connection enforces foreign keys
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// File databases additionally run in WAL mode and wait on writers
const FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool with the default size
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_pool_size(path, 8)
    }

    /// Create a database connection pool
    ///
    /// # Arguments
    /// * `path` - Database file path or ":memory:" for in-memory database
    /// * `pool_size` - Maximum pooled connections for file databases
    ///
    /// An in-memory database lives inside a single connection, so its pool is
    /// capped at one connection regardless of `pool_size`.
    pub fn with_pool_size<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self> {
        let (manager, is_memory) = Self::create_connection_manager(path);
        let max_size = if is_memory { 1 } else { pool_size.max(1) };
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    fn create_connection_manager<P: AsRef<Path>>(path: P) -> (SqliteConnectionManager, bool) {
        let path_str = path.as_ref().to_string_lossy();
        let trimmed_path = path_str.trim();

        if trimmed_path.eq_ignore_ascii_case(MEMORY_DB_PATH) {
            let manager = SqliteConnectionManager::memory()
                .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));
            (manager, true)
        } else {
            let manager = SqliteConnectionManager::file(path).with_init(|conn| {
                conn.execute_batch(CONNECTION_PRAGMAS)?;
                conn.execute_batch(FILE_PRAGMAS)
            });
            (manager, false)
        }
    }

    /// Create an in-memory database pool with the schema applied (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let db = Self::new(MEMORY_DB_PATH)?;
        db.initialize()?;
        Ok(db)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Seed the database with demo users, posts and interactions
    pub fn seed_demo_data(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(DEMO_DATA)
            .context("Failed to seed demo data")?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
