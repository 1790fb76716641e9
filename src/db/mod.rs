//! Database layer
//!
//! Supports SQLite (default, single-binary deployment) and MySQL. The driver is
//! selected by configuration; repositories dispatch on the concrete backend.
//!
//! Everything the content core does against the store is a read. Migrations are
//! startup plumbing that create the schema the repositories read from.
//!
//! ```ignore
//! let pool = folio::db::create_pool(&config.database).await?;
//! folio::db::migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    bounded, create_pool, create_test_pool, Backend, DatabasePool, DynDatabasePool,
    MysqlDatabase, SqliteDatabase,
};
