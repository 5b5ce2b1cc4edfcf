//! Database configuration module for jukebot.
//!
//! This module handles `SQLite` database connection and table creation using
//! `SeaORM`. Table creation uses `Schema::create_table_from_entity` so the
//! database schema always matches the entity definitions without manual SQL.

use crate::entities::PlayHistory;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database described by `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
///
/// Safe to call on every startup; existing tables are left untouched.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut history_table = schema.create_table_from_entity(PlayHistory);
    history_table.if_not_exists();

    db.execute(builder.build(&history_table)).await?;

    Ok(())
}
