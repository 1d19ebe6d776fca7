use chrono::Duration;
use rand::{distr::Alphanumeric, Rng};
use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{entity::prelude::*, ids::UserId, timestamps};

pub const SESSION_KEY_LEN: usize = 40;

#[derive(Debug, Error)]
pub enum SessionsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),
}

/// Login sessions keyed by the random value carried in the session cookie.
#[derive(Clone)]
pub struct SessionsService {
    db: DatabaseConnection,
    ttl: Duration,
}

impl SessionsService {
    pub fn new(db: DatabaseConnection, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    pub async fn open(&self, user_id: UserId) -> Result<SessionModel, SessionsServiceError> {
        let key: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_KEY_LEN)
            .map(char::from)
            .collect();

        let session = SessionActiveModel {
            key: Set(key),
            user_id: Set(user_id),
            created_at: Set(timestamps::now()),
        };

        let session = Session::insert(session)
            .exec_with_returning(&self.db)
            .await?;

        tracing::debug!(%user_id, "session opened");
        Ok(session)
    }

    /// The user behind a live session. Expired sessions are removed here.
    pub async fn resolve(&self, key: &str) -> Result<Option<UserModel>, SessionsServiceError> {
        let Some(session) = Session::find_by_id(key.to_string()).one(&self.db).await? else {
            return Ok(None);
        };

        if session.created_at < timestamps::ago(self.ttl) {
            tracing::debug!(user_id = %session.user_id, "session expired");
            session.delete(&self.db).await?;
            return Ok(None);
        }

        Ok(User::find_by_id(session.user_id).one(&self.db).await?)
    }

    pub async fn close(&self, key: &str) -> Result<(), SessionsServiceError> {
        Session::delete_by_id(key.to_string()).exec(&self.db).await?;
        Ok(())
    }

    /// Drops every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, SessionsServiceError> {
        let result = Session::delete_many()
            .filter(SessionColumn::CreatedAt.lt(timestamps::ago(self.ttl)))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
