use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{FollowId, UserId},
    service::is_unique_violation,
    timestamps,
};

#[derive(Debug, Error)]
pub enum FollowsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("author not found")]
    AuthorNotFound,

    #[error("not following this author")]
    FollowNotFound,
}

/// What a follow request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    /// Users cannot follow themselves; nothing was stored.
    SelfFollowIgnored,
}

#[derive(Clone)]
pub struct FollowsService {
    db: DatabaseConnection,
}

impl FollowsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn author_by_username(&self, username: &str) -> Result<UserModel, FollowsServiceError> {
        User::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(FollowsServiceError::AuthorNotFound)
    }

    /// Start receiving the posts of `author_username` in the follow feed.
    pub async fn follow(
        &self,
        follower_id: UserId,
        author_username: &str,
    ) -> Result<FollowOutcome, FollowsServiceError> {
        let author = self.author_by_username(author_username).await?;

        if author.id == follower_id {
            return Ok(FollowOutcome::SelfFollowIgnored);
        }

        if self.is_following(follower_id, author.id).await? {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        let edge = FollowActiveModel {
            id: Set(FollowId::new()),
            user_id: Set(follower_id),
            author_id: Set(author.id),
            created: Set(timestamps::now()),
        };

        // A concurrent request may have inserted the same pair in between.
        match Follow::insert(edge).exec(&self.db).await {
            Ok(_) => {
                tracing::info!(%follower_id, author_id = %author.id, "follow created");
                Ok(FollowOutcome::Created)
            }
            Err(err) if is_unique_violation(&err) => Ok(FollowOutcome::AlreadyFollowing),
            Err(err) => Err(err.into()),
        }
    }

    /// Stop following `author_username`. Fails when no edge exists.
    pub async fn unfollow(
        &self,
        follower_id: UserId,
        author_username: &str,
    ) -> Result<(), FollowsServiceError> {
        let author = self.author_by_username(author_username).await?;

        let result = Follow::delete_many()
            .filter(FollowColumn::UserId.eq(follower_id))
            .filter(FollowColumn::AuthorId.eq(author.id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(FollowsServiceError::FollowNotFound);
        }

        tracing::info!(%follower_id, author_id = %author.id, "follow removed");
        Ok(())
    }

    pub async fn is_following(
        &self,
        follower_id: UserId,
        author_id: UserId,
    ) -> Result<bool, FollowsServiceError> {
        let count = Follow::find()
            .filter(FollowColumn::UserId.eq(follower_id))
            .filter(FollowColumn::AuthorId.eq(author_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    pub async fn followed_author_ids(
        &self,
        follower_id: UserId,
    ) -> Result<Vec<UserId>, FollowsServiceError> {
        let edges = Follow::find()
            .filter(FollowColumn::UserId.eq(follower_id))
            .all(&self.db)
            .await?;

        Ok(edges.into_iter().map(|edge| edge.author_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    async fn setup_test_service() -> FollowsService {
        FollowsService::new(test_utils::setup_test_db().await)
    }

    async fn edge_count(service: &FollowsService) -> u64 {
        Follow::find().count(&service.db).await.unwrap()
    }

    #[tokio::test]
    async fn test_follow_creates_one_edge() {
        let service = setup_test_service().await;
        let reader = test_utils::create_user(&service.db, "reader").await;
        let author = test_utils::create_user(&service.db, "author").await;

        let first = service.follow(reader, "author").await.unwrap();
        let second = service.follow(reader, "author").await.unwrap();

        assert_eq!(first, FollowOutcome::Created);
        assert_eq!(second, FollowOutcome::AlreadyFollowing);
        assert_eq!(edge_count(&service).await, 1);
        assert!(service.is_following(reader, author).await.unwrap());
        assert!(!service.is_following(author, reader).await.unwrap());
    }

    #[tokio::test]
    async fn test_self_follow_is_ignored() {
        let service = setup_test_service().await;
        let user = test_utils::create_user(&service.db, "solo").await;

        let outcome = service.follow(user, "solo").await.unwrap();

        assert_eq!(outcome, FollowOutcome::SelfFollowIgnored);
        assert_eq!(edge_count(&service).await, 0);
    }

    #[tokio::test]
    async fn test_follow_unknown_author() {
        let service = setup_test_service().await;
        let reader = test_utils::create_user(&service.db, "reader").await;

        let result = service.follow(reader, "ghost").await;
        assert!(matches!(result, Err(FollowsServiceError::AuthorNotFound)));
    }

    #[tokio::test]
    async fn test_unfollow() {
        let service = setup_test_service().await;
        let reader = test_utils::create_user(&service.db, "reader").await;
        let author = test_utils::create_user(&service.db, "author").await;
        service.follow(reader, "author").await.unwrap();

        service.unfollow(reader, "author").await.unwrap();

        assert!(!service.is_following(reader, author).await.unwrap());
        assert!(matches!(
            service.unfollow(reader, "author").await,
            Err(FollowsServiceError::FollowNotFound)
        ));
        assert!(matches!(
            service.unfollow(reader, "ghost").await,
            Err(FollowsServiceError::AuthorNotFound)
        ));
    }

    #[tokio::test]
    async fn test_followed_author_ids() {
        let service = setup_test_service().await;
        let reader = test_utils::create_user(&service.db, "reader").await;
        let first = test_utils::create_user(&service.db, "first").await;
        let second = test_utils::create_user(&service.db, "second").await;
        let other = test_utils::create_user(&service.db, "other").await;

        service.follow(reader, "first").await.unwrap();
        service.follow(reader, "second").await.unwrap();
        service.follow(other, "first").await.unwrap();

        let mut ids = service.followed_author_ids(reader).await.unwrap();
        ids.sort();
        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(ids, expected);

        assert!(service.followed_author_ids(first).await.unwrap().is_empty());
    }
}
