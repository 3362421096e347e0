//! Database module for handling PostgreSQL connections
//!
//! Two connection strategies are supported. The default opens one physical
//! connection per logical session and closes it afterwards; the pooled
//! strategy keeps a bounded sqlx pool around instead.

use crate::error::{DatabaseError, DatabaseResult};
use sqlx::{
    Connection, PgConnection, PgPool, Postgres,
    migrate::MigrateDatabase,
    pool::PoolConnection,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::ops::{Deref, DerefMut};
use tracing::{debug, info};

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub database_url: String,
    /// Keep a connection pool instead of connecting per session
    pub pooling: bool,
    /// Maximum number of connections in the pool (pooled mode only)
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Configuration for an unpooled database at `database_url`
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pooling: false,
            max_connections: 10,
        }
    }

    fn connect_options(&self) -> DatabaseResult<PgConnectOptions> {
        self.database_url
            .parse()
            .map_err(|e| DatabaseError::Configuration(format!("Invalid database URL: {}", e)))
    }
}

/// Handle used to open database sessions
#[derive(Debug, Clone)]
pub enum Database {
    Pooled(PgPool),
    Unpooled(PgConnectOptions),
}

/// A single logical database session
///
/// Dereferences to the underlying [`PgConnection`], so it can be used as a
/// query executor with `&mut *session`.
pub enum Session {
    Pooled(PoolConnection<Postgres>),
    Unpooled(PgConnection),
}

impl Deref for Session {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        match self {
            Session::Pooled(conn) => &**conn,
            Session::Unpooled(conn) => conn,
        }
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Session::Pooled(conn) => &mut **conn,
            Session::Unpooled(conn) => conn,
        }
    }
}

impl Session {
    /// End the session: pooled connections go back to the pool, unpooled
    /// connections are closed gracefully.
    pub async fn close(self) -> DatabaseResult<()> {
        match self {
            Session::Pooled(conn) => {
                drop(conn);
                Ok(())
            }
            Session::Unpooled(conn) => conn.close().await.map_err(DatabaseError::Connection),
        }
    }
}

impl Database {
    /// Open a new session
    pub async fn session(&self) -> DatabaseResult<Session> {
        match self {
            Database::Pooled(pool) => pool
                .acquire()
                .await
                .map(Session::Pooled)
                .map_err(DatabaseError::Connection),
            Database::Unpooled(options) => {
                debug!("Opening unpooled database connection");
                PgConnection::connect_with(options)
                    .await
                    .map(Session::Unpooled)
                    .map_err(DatabaseError::Connection)
            }
        }
    }
}

/// Initialize the database handle
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// * `DatabaseResult<Database>` - Pooled or unpooled handle, depending on `config.pooling`
pub async fn init_database(config: &DatabaseConfig) -> DatabaseResult<Database> {
    let options = config.connect_options()?;

    if !config.pooling {
        info!("Database pooling disabled, connecting per session");
        return Ok(Database::Unpooled(options));
    }

    // Connections are opened on first use, so a missing database can still
    // be created through `ensure_database_exists` afterwards
    info!(
        "Initializing database connection pool (max {} connections)",
        config.max_connections
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy_with(options);

    Ok(Database::Pooled(pool))
}

/// Create the database named in `database_url` if it does not exist yet
///
/// # Returns
///
/// * `DatabaseResult<bool>` - True if the database had to be created
pub async fn ensure_database_exists(database_url: &str) -> DatabaseResult<bool> {
    if Postgres::database_exists(database_url)
        .await
        .map_err(DatabaseError::Connection)?
    {
        return Ok(false);
    }

    info!("Database does not exist, creating it");
    Postgres::create_database(database_url)
        .await
        .map_err(DatabaseError::Schema)?;

    Ok(true)
}

/// Check database connectivity
///
/// # Arguments
///
/// * `database` - Database handle
///
/// # Returns
///
/// * `DatabaseResult<bool>` - True if connection is successful
pub async fn health_check(database: &Database) -> DatabaseResult<bool> {
    let mut session = database.session().await?;

    sqlx::query("SELECT 1")
        .execute(&mut *session)
        .await
        .map_err(DatabaseError::Query)?;

    session.close().await?;
    Ok(true)
}
