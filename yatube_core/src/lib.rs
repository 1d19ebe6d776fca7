pub mod config;
pub mod entity;
pub mod error;
pub mod forms;
pub mod ids;
pub mod models;
pub mod pagination;
pub mod service;
pub mod test_utils;
pub mod timestamps;

use sea_orm::DatabaseConnection;

use crate::config::YatubeConfig;
use crate::error::CoreError;
use crate::service::{
    comments::CommentsService, feeds::FeedService, follows::FollowsService,
    groups::GroupsService, posts::PostsService, sessions::SessionsService, users::UsersService,
};

/// Main runtime handle for Yatube.
pub struct YatubeCore {
    pub config: YatubeConfig,
    pub db: DatabaseConnection,

    pub users: UsersService,
    pub sessions: SessionsService,
    pub groups: GroupsService,
    pub posts: PostsService,
    pub comments: CommentsService,
    pub follows: FollowsService,

    /// Read side: listings, profile and post detail.
    pub feeds: FeedService,
}

impl YatubeCore {
    /// Opens (or creates) the configured database and applies pending
    /// migrations.
    pub async fn start(config: YatubeConfig) -> Result<Self, CoreError> {
        tracing::info!(database = %config.database_path.display(), "starting core");

        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;

        Self::from_connection(config, db)
    }

    /// Wires the services over an already migrated connection.
    pub fn from_connection(
        config: YatubeConfig,
        db: DatabaseConnection,
    ) -> Result<Self, CoreError> {
        let session_ttl = config.session_ttl()?;

        Ok(Self {
            users: UsersService::new(db.clone()),
            sessions: SessionsService::new(db.clone(), session_ttl),
            groups: GroupsService::new(db.clone()),
            posts: PostsService::new(db.clone()),
            comments: CommentsService::new(db.clone()),
            follows: FollowsService::new(db.clone()),
            feeds: FeedService::new(db.clone(), config.page_size),
            config,
            db,
        })
    }

    pub async fn shutdown(self) -> Result<(), CoreError> {
        self.db.close().await?;
        Ok(())
    }
}

pub mod prelude {
    pub use super::ids;
    pub use super::entity;
    pub use super::models;

    pub use super::service;

    pub use super::error;

    pub use super::config;

    pub use super::forms;
    pub use super::pagination;

    pub use super::YatubeCore;
}
