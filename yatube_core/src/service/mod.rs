pub mod comments;
pub mod feeds;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod sessions;
pub mod users;

use sea_orm::{DbErr, SqlErr};

/// True when the insert failed because a unique index already holds the row.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
