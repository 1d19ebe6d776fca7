use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{entity::prelude::*, ids::UserId, service::is_unique_violation, timestamps};

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("username already taken")]
    UsernameTaken,

    #[error("failed to hash password: {0}")]
    PasswordHash(String),
}

#[derive(Clone)]
pub struct UsersService {
    db: DatabaseConnection,
}

impl UsersService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a new user with an argon2 hash of `password`
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserModel, UsersServiceError> {
        let taken = User::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?
            .is_some();

        if taken {
            return Err(UsersServiceError::UsernameTaken);
        }

        let password_hash = hash_password(password)?;

        let user = UserActiveModel {
            id: Set(UserId::new()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(timestamps::now()),
        };

        let user = User::insert(user)
            .exec_with_returning(&self.db)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UsersServiceError::UsernameTaken
                } else {
                    err.into()
                }
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Returns the user when the credentials match, `None` otherwise
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserModel>, UsersServiceError> {
        let Some(user) = User::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            tracing::debug!(%username, "rejected login");
            Ok(None)
        }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<UserModel, UsersServiceError> {
        User::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(UsersServiceError::UserNotFound)
    }
}

fn hash_password(password: &str) -> Result<String, UsersServiceError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| UsersServiceError::PasswordHash(err.to_string()))
}

// Unparseable hashes (e.g. fixture users) never match.
fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
