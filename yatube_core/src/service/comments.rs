use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{CommentId, PostId, UserId},
    timestamps,
};

#[derive(Debug, Error)]
pub enum CommentsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("post not found")]
    PostNotFound,
}

#[derive(Clone)]
pub struct CommentsService {
    db: DatabaseConnection,
}

impl CommentsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append a comment to an existing post
    pub async fn add(
        &self,
        post_id: PostId,
        author_id: UserId,
        text: String,
    ) -> Result<CommentModel, CommentsServiceError> {
        let post_exists = Post::find_by_id(post_id).one(&self.db).await?.is_some();
        if !post_exists {
            return Err(CommentsServiceError::PostNotFound);
        }

        let comment = CommentActiveModel {
            id: Set(CommentId::new()),
            post_id: Set(post_id),
            author_id: Set(author_id),
            text: Set(text),
            created: Set(timestamps::now()),
        };

        let comment = Comment::insert(comment)
            .exec_with_returning(&self.db)
            .await?;

        tracing::debug!(%post_id, %author_id, "comment added");
        Ok(comment)
    }

    /// Comments of a post in the order they were written
    pub async fn list_for_post(
        &self,
        post_id: PostId,
    ) -> Result<Vec<CommentModel>, CommentsServiceError> {
        Ok(Comment::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .order_by_asc(CommentColumn::Created)
            .order_by_asc(CommentColumn::Id)
            .all(&self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    async fn setup_test_service() -> CommentsService {
        CommentsService::new(test_utils::setup_test_db().await)
    }

    #[tokio::test]
    async fn test_add_and_list_comments() {
        let service = setup_test_service().await;
        let author = test_utils::create_user(&service.db, "auth").await;
        let reader = test_utils::create_user(&service.db, "reader").await;
        let post = test_utils::create_post(&service.db, author, None, "text", 0).await;

        service
            .add(post, reader, "first".to_string())
            .await
            .unwrap();
        service
            .add(post, author, "second".to_string())
            .await
            .unwrap();

        let comments = service.list_for_post(post).await.unwrap();
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(comments[0].author_id, reader);
    }

    #[tokio::test]
    async fn test_comments_stay_with_their_post() {
        let service = setup_test_service().await;
        let author = test_utils::create_user(&service.db, "auth").await;
        let one = test_utils::create_post(&service.db, author, None, "one", 0).await;
        let two = test_utils::create_post(&service.db, author, None, "two", 1).await;

        service.add(one, author, "on one".to_string()).await.unwrap();

        assert_eq!(service.list_for_post(one).await.unwrap().len(), 1);
        assert!(service.list_for_post(two).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let service = setup_test_service().await;
        let author = test_utils::create_user(&service.db, "auth").await;

        let result = service.add(PostId::new(), author, "hello".to_string()).await;
        assert!(matches!(result, Err(CommentsServiceError::PostNotFound)));
    }
}
