use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{entity::prelude::*, ids::GroupId, service::is_unique_violation};

#[derive(Debug, Error)]
pub enum GroupsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("group not found")]
    GroupNotFound,

    #[error("a group with this slug already exists")]
    SlugTaken,
}

#[derive(Clone)]
pub struct GroupsService {
    db: DatabaseConnection,
}

impl GroupsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new group. Groups are created administratively only.
    pub async fn create(
        &self,
        slug: &str,
        title: &str,
        description: &str,
    ) -> Result<GroupModel, GroupsServiceError> {
        let group = GroupActiveModel {
            id: Set(GroupId::new()),
            slug: Set(slug.to_string()),
            title: Set(title.to_string()),
            description: Set(description.to_string()),
        };

        let group = Group::insert(group)
            .exec_with_returning(&self.db)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    GroupsServiceError::SlugTaken
                } else {
                    err.into()
                }
            })?;

        tracing::info!(slug = %group.slug, "group created");
        Ok(group)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<GroupModel, GroupsServiceError> {
        Group::find()
            .filter(GroupColumn::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or(GroupsServiceError::GroupNotFound)
    }

    /// All groups, ordered by title, as offered by the post form
    pub async fn list(&self) -> Result<Vec<GroupModel>, GroupsServiceError> {
        Ok(Group::find()
            .order_by_asc(GroupColumn::Title)
            .all(&self.db)
            .await?)
    }
}
