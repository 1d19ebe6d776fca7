use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::config::YatubeConfig;

pub mod migrator;

pub async fn open_or_create_db(config: &YatubeConfig) -> Result<DatabaseConnection, DbErr> {
    let connection_string = format!("sqlite://{}?mode=rwc", config.database_path.display());

    tracing::debug!(%connection_string, "opening database");
    Database::connect(&connection_string).await
}

pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await
}
