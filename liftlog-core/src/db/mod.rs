pub mod models;
pub mod operations;
pub mod schema;

use anyhow::Result;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{debug, info};
use std::env;
use tokio::sync::OnceCell;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

static DB_PATH: OnceCell<String> = OnceCell::const_new();

/// Database path set through [`set_db_path`], falling back to `DATABASE_URL`.
pub fn get_db_path() -> Result<String> {
    if let Some(path) = DB_PATH.get() {
        return Ok(path.clone());
    }
    env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be specified or present in the environment"))
}

pub fn set_db_path(path: &str) -> Result<()> {
    DB_PATH
        .set(path.to_string())
        .map_err(|e| anyhow::anyhow!(format!("Failed to set DB_PATH: {:?}", e)))
}

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; \
             PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn create_pool(db_path: &str) -> Result<DbPool> {
    debug!("Creating SQLite pool for {}", db_path);
    Pool::builder()
        .max_size(4)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(ConnectionManager::<SqliteConnection>::new(db_path))
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))
}

pub fn init_database(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    for version in applied {
        info!("Applied migration {}", version);
    }
    Ok(())
}

/// Create a pool for `db_path` and bring its schema up to date.
pub fn open(db_path: &str) -> Result<DbPool> {
    let pool = create_pool(db_path)?;
    let mut conn = pool.get()?;
    init_database(&mut conn)?;
    Ok(pool)
}

pub fn drop_all_tables(conn: &mut SqliteConnection) -> Result<()> {
    use schema::{workout_exercises, workout_sets, workouts};

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        diesel::delete(workout_sets::table).execute(conn)?;
        diesel::delete(workout_exercises::table).execute(conn)?;
        diesel::delete(workouts::table).execute(conn)?;
        Ok(())
    })
}
