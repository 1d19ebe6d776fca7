use sea_orm::DbErr;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("data store error: {0}")]
    Database(#[from] DbErr),
}
