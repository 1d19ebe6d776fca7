#[cfg(test)]
mod entity_tests {
    use crate::entity::prelude::*;
    use crate::ids::*;
    use crate::models::migrator::Migrator;
    use crate::timestamps;
    use sea_orm_migration::MigratorTrait;

    /// Test helper to create and migrate an in-memory database
    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    async fn insert_user(db: &DatabaseConnection, username: &str) -> UserId {
        let id = UserId::new();
        User::insert(UserActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            password_hash: Set("!".to_string()),
            created_at: Set(timestamps::now()),
        })
        .exec(db)
        .await
        .expect("Failed to insert user");
        id
    }

    async fn insert_group(db: &DatabaseConnection, slug: &str) -> GroupId {
        let id = GroupId::new();
        Group::insert(GroupActiveModel {
            id: Set(id),
            slug: Set(slug.to_string()),
            title: Set(format!("Group {slug}")),
            description: Set(String::new()),
        })
        .exec(db)
        .await
        .expect("Failed to insert group");
        id
    }

    async fn insert_post(
        db: &DatabaseConnection,
        author_id: UserId,
        group_id: Option<GroupId>,
        text: &str,
    ) -> PostId {
        let id = PostId::new();
        Post::insert(PostActiveModel {
            id: Set(id),
            text: Set(text.to_string()),
            image: Set(None),
            pub_date: Set(timestamps::now()),
            author_id: Set(author_id),
            group_id: Set(group_id),
        })
        .exec(db)
        .await
        .expect("Failed to insert post");
        id
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = setup_test_db().await;
        let user_id = insert_user(&db, "leo").await;

        let found = User::find_by_id(user_id)
            .one(&db)
            .await
            .expect("Failed to query user")
            .unwrap();

        assert_eq!(found.username, "leo");

        let by_name = User::find()
            .filter(UserColumn::Username.eq("leo"))
            .one(&db)
            .await
            .unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(user_id));
    }

    #[tokio::test]
    async fn test_username_is_unique() {
        let db = setup_test_db().await;
        insert_user(&db, "leo").await;

        let duplicate = User::insert(UserActiveModel {
            id: Set(UserId::new()),
            username: Set("leo".to_string()),
            password_hash: Set("!".to_string()),
            created_at: Set(timestamps::now()),
        })
        .exec(&db)
        .await;

        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_password_hash_is_never_serialized() {
        let db = setup_test_db().await;
        let user_id = insert_user(&db, "leo").await;
        let user = User::find_by_id(user_id).one(&db).await.unwrap().unwrap();

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("leo"));
        assert!(!json.contains("password_hash"));
    }

    #[tokio::test]
    async fn test_post_with_and_without_group() {
        let db = setup_test_db().await;
        let author = insert_user(&db, "auth").await;
        let group = insert_group(&db, "cats").await;

        let grouped = insert_post(&db, author, Some(group), "with a group").await;
        let loose = insert_post(&db, author, None, "without a group").await;

        let grouped = Post::find_by_id(grouped).one(&db).await.unwrap().unwrap();
        let loose = Post::find_by_id(loose).one(&db).await.unwrap().unwrap();

        assert_eq!(grouped.group_id, Some(group));
        assert_eq!(loose.group_id, None);

        let in_group = Post::find()
            .filter(PostColumn::GroupId.eq(group))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(in_group.len(), 1);
        assert_eq!(in_group[0].id, grouped.id);
    }

    #[tokio::test]
    async fn test_null_group_id_decodes_as_none() {
        let db = setup_test_db().await;
        let author = insert_user(&db, "auth").await;
        let post_id = insert_post(&db, author, None, "no group").await;

        let group_ids: Vec<Option<GroupId>> = Post::find()
            .select_only()
            .column(PostColumn::GroupId)
            .into_tuple()
            .all(&db)
            .await
            .unwrap();
        assert_eq!(group_ids, vec![None]);

        let posts = Post::find().all(&db).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, post_id);
        assert_eq!(posts[0].group_id, None);
    }

    #[tokio::test]
    async fn test_deleting_group_keeps_its_posts() {
        let db = setup_test_db().await;
        let author = insert_user(&db, "auth").await;
        let group = insert_group(&db, "cats").await;
        let post_id = insert_post(&db, author, Some(group), "survives").await;

        Group::delete_by_id(group).exec(&db).await.unwrap();

        let post = Post::find_by_id(post_id).one(&db).await.unwrap().unwrap();
        assert_eq!(post.group_id, None);
    }

    #[tokio::test]
    async fn test_deleting_author_cascades_to_posts_and_comments() {
        let db = setup_test_db().await;
        let author = insert_user(&db, "auth").await;
        let post_id = insert_post(&db, author, None, "short lived").await;

        Comment::insert(CommentActiveModel {
            id: Set(CommentId::new()),
            post_id: Set(post_id),
            author_id: Set(author),
            text: Set("first".to_string()),
            created: Set(timestamps::now()),
        })
        .exec(&db)
        .await
        .unwrap();

        User::delete_by_id(author).exec(&db).await.unwrap();

        assert_eq!(Post::find().count(&db).await.unwrap(), 0);
        assert_eq!(Comment::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_related_comments() {
        let db = setup_test_db().await;
        let author = insert_user(&db, "auth").await;
        let reader = insert_user(&db, "reader").await;
        let post_id = insert_post(&db, author, None, "talk to me").await;

        for (who, text) in [(reader, "hello"), (author, "hi back")] {
            Comment::insert(CommentActiveModel {
                id: Set(CommentId::new()),
                post_id: Set(post_id),
                author_id: Set(who),
                text: Set(text.to_string()),
                created: Set(timestamps::now()),
            })
            .exec(&db)
            .await
            .unwrap();
        }

        let post = Post::find_by_id(post_id).one(&db).await.unwrap().unwrap();
        let comments = post.find_related(Comment).all(&db).await.unwrap();
        assert_eq!(comments.len(), 2);
    }

    #[tokio::test]
    async fn test_follow_pair_is_unique() {
        let db = setup_test_db().await;
        let follower = insert_user(&db, "follower").await;
        let author = insert_user(&db, "author").await;

        let edge = |id| FollowActiveModel {
            id: Set(id),
            user_id: Set(follower),
            author_id: Set(author),
            created: Set(timestamps::now()),
        };

        Follow::insert(edge(FollowId::new()))
            .exec(&db)
            .await
            .expect("first edge should insert");

        let second = Follow::insert(edge(FollowId::new())).exec(&db).await;
        assert!(second.is_err());

        let count = Follow::find()
            .filter(FollowColumn::UserId.eq(follower))
            .filter(FollowColumn::AuthorId.eq(author))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_session_key_is_primary_key() {
        let db = setup_test_db().await;
        let user_id = insert_user(&db, "leo").await;

        Session::insert(SessionActiveModel {
            key: Set("k".repeat(40)),
            user_id: Set(user_id),
            created_at: Set(timestamps::now()),
        })
        .exec(&db)
        .await
        .unwrap();

        let found = Session::find_by_id("k".repeat(40))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, user_id);
    }

    #[test]
    fn test_post_displays_first_fifteen_chars() {
        let post = PostModel {
            id: PostId::new(),
            text: "Тестовый пост длиннее пятнадцати символов".to_string(),
            image: None,
            pub_date: timestamps::now(),
            author_id: UserId::new(),
            group_id: None,
        };

        assert_eq!(post.to_string(), "Тестовый пост д");
        assert_eq!(post.to_string().chars().count(), 15);
    }

    #[test]
    fn test_group_displays_title() {
        let group = GroupModel {
            id: GroupId::new(),
            slug: "test-slug".to_string(),
            title: "Тестовая группа".to_string(),
            description: "Тестовое описание".to_string(),
        };

        assert_eq!(group.to_string(), "Тестовая группа");
    }
}
