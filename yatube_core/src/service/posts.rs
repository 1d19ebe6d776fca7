use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{GroupId, PostId, UserId},
    timestamps,
};

#[derive(Debug, Error)]
pub enum PostsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("post not found")]
    PostNotFound,

    #[error("group not found")]
    GroupNotFound,

    #[error("user not found")]
    AuthorNotFound,

    #[error("unauthorized: not post author")]
    NotPostAuthor,
}

/// Content of a post as submitted by its author.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<GroupId>,
    /// Media-relative path of an already stored image. On edit, `None`
    /// keeps the current image.
    pub image: Option<String>,
}

#[derive(Clone)]
pub struct PostsService {
    db: DatabaseConnection,
}

impl PostsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_group(&self, group_id: Option<GroupId>) -> Result<(), PostsServiceError> {
        let Some(group_id) = group_id else {
            return Ok(());
        };

        let exists = Group::find_by_id(group_id).one(&self.db).await?.is_some();
        if !exists {
            return Err(PostsServiceError::GroupNotFound);
        }

        Ok(())
    }

    /// Publish a new post by `author_id`
    pub async fn create(
        &self,
        author_id: UserId,
        draft: PostDraft,
    ) -> Result<PostModel, PostsServiceError> {
        let author_exists = User::find_by_id(author_id).one(&self.db).await?.is_some();
        if !author_exists {
            return Err(PostsServiceError::AuthorNotFound);
        }

        self.ensure_group(draft.group_id).await?;

        let post = PostActiveModel {
            id: Set(PostId::new()),
            text: Set(draft.text),
            image: Set(draft.image),
            pub_date: Set(timestamps::now()),
            author_id: Set(author_id),
            group_id: Set(draft.group_id),
        };

        let post = Post::insert(post).exec_with_returning(&self.db).await?;

        tracing::info!(post_id = %post.id, %author_id, "post created");
        Ok(post)
    }

    pub async fn get(&self, post_id: PostId) -> Result<PostModel, PostsServiceError> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::PostNotFound)
    }

    /// Rewrite a post. Only its author may do so.
    pub async fn update(
        &self,
        post_id: PostId,
        editor_id: UserId,
        draft: PostDraft,
    ) -> Result<PostModel, PostsServiceError> {
        let post = self.get(post_id).await?;

        if post.author_id != editor_id {
            return Err(PostsServiceError::NotPostAuthor);
        }

        self.ensure_group(draft.group_id).await?;

        let mut post: PostActiveModel = post.into();
        post.text = Set(draft.text);
        post.group_id = Set(draft.group_id);
        if let Some(image) = draft.image {
            post.image = Set(Some(image));
        }

        let post = post.update(&self.db).await?;

        tracing::info!(%post_id, "post updated");
        Ok(post)
    }

    /// Administrative removal; comments go with the post.
    pub async fn delete(&self, post_id: PostId) -> Result<(), PostsServiceError> {
        let result = Post::delete_by_id(post_id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(PostsServiceError::PostNotFound);
        }

        tracing::info!(%post_id, "post deleted");
        Ok(())
    }

    pub async fn count_by_author(&self, author_id: UserId) -> Result<u64, PostsServiceError> {
        Ok(Post::find()
            .filter(PostColumn::AuthorId.eq(author_id))
            .count(&self.db)
            .await?)
    }
}
