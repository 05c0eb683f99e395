//! Database configuration module for decant-desk.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity`, so the database schema
//! always matches the entity definitions without hand-written SQL.

use crate::entities::{Order, OrderLine, Product, Purchase, Shipment};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::debug;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/decant_desk.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns the
/// default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Creates the directory holding a file-backed `SQLite` database, if there is one.
fn ensure_sqlite_directory(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)?,
        _ => {}
    }
    Ok(())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    ensure_sqlite_directory(&database_url)?;
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table_if_missing<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table (products, orders, order lines, shipments, purchases) if it does not
/// exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table_if_missing(db, &schema, Product).await?;
    create_table_if_missing(db, &schema, Order).await?;
    create_table_if_missing(db, &schema, OrderLine).await?;
    create_table_if_missing(db, &schema, Shipment).await?;
    create_table_if_missing(db, &schema, Purchase).await?;

    Ok(())
}
