//! Database setup and fixtures shared by the unit tests here and the HTTP
//! tests of the web crate.

use std::path::Path;

use chrono::{Duration, TimeZone, Utc};
use sea_orm_migration::MigratorTrait;

use crate::config::YatubeConfig;
use crate::entity::prelude::*;
use crate::ids::{CommentId, FollowId, GroupId, PostId, UserId};
use crate::models::migrator::Migrator;
use crate::service::sessions::SessionsService;
use crate::timestamps;

/// Create a fresh in-memory SQLite database with all migrations applied.
/// Each call creates an isolated database.
///
/// # Example
/// ```ignore
/// use yatube_core::test_utils;
///
/// #[tokio::test]
/// async fn my_test() {
///     let db = test_utils::setup_test_db().await;
///     // Database is ready to use!
/// }
/// ```
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Default configuration with media stored under `dir`.
pub fn test_config(dir: &Path) -> YatubeConfig {
    YatubeConfig::in_dir(dir)
}

/// A user whose password hash matches no password.
pub async fn create_user(db: &DatabaseConnection, username: &str) -> UserId {
    let user_id = UserId::new();
    let user = UserActiveModel {
        id: Set(user_id),
        username: Set(username.to_string()),
        password_hash: Set("!".to_string()),
        created_at: Set(timestamps::now()),
    };
    User::insert(user).exec(db).await.expect("Failed to insert user");
    user_id
}

pub async fn create_group(db: &DatabaseConnection, slug: &str) -> GroupId {
    let group_id = GroupId::new();
    let group = GroupActiveModel {
        id: Set(group_id),
        slug: Set(slug.to_string()),
        title: Set(format!("Группа {slug}")),
        description: Set("Тестовое описание".to_string()),
    };
    Group::insert(group).exec(db).await.expect("Failed to insert group");
    group_id
}

/// A post published `minute` minutes after a fixed instant, so tests control
/// feed order.
pub async fn create_post(
    db: &DatabaseConnection,
    author_id: UserId,
    group_id: Option<GroupId>,
    text: &str,
    minute: i64,
) -> PostId {
    let base = Utc
        .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixture instant");

    let post_id = PostId::new();
    let post = PostActiveModel {
        id: Set(post_id),
        text: Set(text.to_string()),
        image: Set(None),
        pub_date: Set(timestamps::format(base + Duration::minutes(minute))),
        author_id: Set(author_id),
        group_id: Set(group_id),
    };
    Post::insert(post).exec(db).await.expect("Failed to insert post");
    post_id
}

pub async fn create_comment(
    db: &DatabaseConnection,
    post_id: PostId,
    author_id: UserId,
    text: &str,
) -> CommentId {
    let comment_id = CommentId::new();
    let comment = CommentActiveModel {
        id: Set(comment_id),
        post_id: Set(post_id),
        author_id: Set(author_id),
        text: Set(text.to_string()),
        created: Set(timestamps::now()),
    };
    Comment::insert(comment)
        .exec(db)
        .await
        .expect("Failed to insert comment");
    comment_id
}

pub async fn create_follow(db: &DatabaseConnection, user_id: UserId, author_id: UserId) -> FollowId {
    let follow_id = FollowId::new();
    let follow = FollowActiveModel {
        id: Set(follow_id),
        user_id: Set(user_id),
        author_id: Set(author_id),
        created: Set(timestamps::now()),
    };
    Follow::insert(follow)
        .exec(db)
        .await
        .expect("Failed to insert follow");
    follow_id
}

/// Logs `user_id` in and returns the session key for the cookie.
pub async fn open_session(db: &DatabaseConnection, user_id: UserId) -> String {
    SessionsService::new(db.clone(), Duration::hours(1))
        .open(user_id)
        .await
        .expect("Failed to open session")
        .key
}
