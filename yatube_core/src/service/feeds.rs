use std::collections::HashMap;

use sea_orm::{DatabaseConnection, Select};
use serde::Serialize;
use thiserror::Error;

use crate::{
    entity::{post, prelude::*},
    ids::{GroupId, PostId, UserId},
    pagination::{load_page, Page, PageRequest},
    service::{
        comments::{CommentsService, CommentsServiceError},
        follows::{FollowsService, FollowsServiceError},
        posts::{PostsService, PostsServiceError},
    },
    timestamps,
};

/// Failures of the read side. Errors of the services it builds on are
/// passed through unchanged.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("group not found")]
    GroupNotFound,

    #[error("author not found")]
    AuthorNotFound,

    #[error(transparent)]
    Posts(#[from] PostsServiceError),

    #[error(transparent)]
    Comments(#[from] CommentsServiceError),

    #[error(transparent)]
    Follows(#[from] FollowsServiceError),
}

/// A post together with what a listing shows next to it.
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub post: PostModel,
    pub author: String,
    pub group: Option<GroupModel>,
}

impl PostCard {
    pub fn published(&self) -> String {
        timestamps::display(&self.post.pub_date)
    }

    pub fn title(&self) -> String {
        self.post.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub comment: CommentModel,
    pub author: String,
}

impl CommentView {
    pub fn written(&self) -> String {
        timestamps::display(&self.comment.created)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    pub group: GroupModel,
    pub page: Page<PostCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileFeed {
    pub author: UserModel,
    pub posts_count: u64,
    /// Whether the viewer follows this author; never true on one's own profile.
    pub following: bool,
    pub page: Page<PostCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub card: PostCard,
    pub comments: Vec<CommentView>,
    pub author_posts_count: u64,
}

/// Read side of the content store: every listing a page renders.
#[derive(Clone)]
pub struct FeedService {
    db: DatabaseConnection,
    page_size: u64,
    posts: PostsService,
    comments: CommentsService,
    follows: FollowsService,
}

impl FeedService {
    pub fn new(db: DatabaseConnection, page_size: u64) -> Self {
        Self {
            posts: PostsService::new(db.clone()),
            comments: CommentsService::new(db.clone()),
            follows: FollowsService::new(db.clone()),
            db,
            page_size: page_size.max(1),
        }
    }

    /// Every post, newest first.
    pub async fn index(&self, request: PageRequest) -> Result<Page<PostCard>, FeedError> {
        self.cards(Post::find(), request).await
    }

    pub async fn group(&self, slug: &str, request: PageRequest) -> Result<GroupFeed, FeedError> {
        let group = Group::find()
            .filter(GroupColumn::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or(FeedError::GroupNotFound)?;

        let page = self
            .cards(Post::find().filter(PostColumn::GroupId.eq(group.id)), request)
            .await?;

        Ok(GroupFeed { group, page })
    }

    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<UserId>,
        request: PageRequest,
    ) -> Result<ProfileFeed, FeedError> {
        let author = User::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(FeedError::AuthorNotFound)?;

        let page = self
            .cards(Post::find().filter(PostColumn::AuthorId.eq(author.id)), request)
            .await?;

        let following = match viewer {
            Some(viewer) if viewer != author.id => {
                self.follows.is_following(viewer, author.id).await?
            }
            _ => false,
        };

        Ok(ProfileFeed {
            posts_count: page.total,
            author,
            following,
            page,
        })
    }

    /// Posts by the authors `viewer` follows. Following nobody is an empty page.
    pub async fn follow_feed(
        &self,
        viewer: UserId,
        request: PageRequest,
    ) -> Result<Page<PostCard>, FeedError> {
        let author_ids = self.follows.followed_author_ids(viewer).await?;

        if author_ids.is_empty() {
            return Ok(Page::empty());
        }

        self.cards(
            Post::find().filter(PostColumn::AuthorId.is_in(author_ids)),
            request,
        )
        .await
    }

    pub async fn post_detail(&self, post_id: PostId) -> Result<PostDetail, FeedError> {
        let post = self.posts.get(post_id).await?;
        let author_posts_count = self.posts.count_by_author(post.author_id).await?;
        let comments = self.comments.list_for_post(post_id).await?;

        let mut user_ids: Vec<UserId> = comments.iter().map(|c| c.author_id).collect();
        user_ids.push(post.author_id);
        let usernames = self.usernames(user_ids).await?;
        let groups = self.groups(post.group_id.into_iter().collect()).await?;

        let comments = comments
            .into_iter()
            .map(|comment| CommentView {
                author: usernames.get(&comment.author_id).cloned().unwrap_or_default(),
                comment,
            })
            .collect();

        Ok(PostDetail {
            card: hydrate(post, &usernames, &groups),
            comments,
            author_posts_count,
        })
    }

    /// Orders newest first, pages and hydrates a post listing.
    async fn cards(
        &self,
        select: Select<post::Entity>,
        request: PageRequest,
    ) -> Result<Page<PostCard>, FeedError> {
        let paginator = newest_first(select).paginate(&self.db, self.page_size);
        let mut page = load_page(paginator, request).await?;
        let posts = std::mem::take(&mut page.items);

        let usernames = self
            .usernames(posts.iter().map(|p| p.author_id).collect())
            .await?;
        let groups = self
            .groups(posts.iter().filter_map(|p| p.group_id).collect())
            .await?;

        let items = posts
            .into_iter()
            .map(|post| hydrate(post, &usernames, &groups))
            .collect();

        Ok(page.with_items(items))
    }

    async fn usernames(&self, mut ids: Vec<UserId>) -> Result<HashMap<UserId, String>, FeedError> {
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = User::find()
            .filter(UserColumn::Id.is_in(ids))
            .all(&self.db)
            .await?;

        Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
    }

    async fn groups(
        &self,
        mut ids: Vec<GroupId>,
    ) -> Result<HashMap<GroupId, GroupModel>, FeedError> {
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let groups = Group::find()
            .filter(GroupColumn::Id.is_in(ids))
            .all(&self.db)
            .await?;

        Ok(groups.into_iter().map(|g| (g.id, g)).collect())
    }
}

fn newest_first(select: Select<post::Entity>) -> Select<post::Entity> {
    select
        .order_by_desc(PostColumn::PubDate)
        .order_by_desc(PostColumn::Id)
}

fn hydrate(
    post: PostModel,
    usernames: &HashMap<UserId, String>,
    groups: &HashMap<GroupId, GroupModel>,
) -> PostCard {
    PostCard {
        author: usernames.get(&post.author_id).cloned().unwrap_or_default(),
        group: post.group_id.and_then(|id| groups.get(&id).cloned()),
        post,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    const PAGE_SIZE: u64 = 10;

    async fn setup_test_service() -> FeedService {
        FeedService::new(test_utils::setup_test_db().await, PAGE_SIZE)
    }

    fn texts(page: &Page<PostCard>) -> Vec<&str> {
        page.items.iter().map(|card| card.post.text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_index_is_newest_first_and_paged() {
        let service = setup_test_service().await;
        let author = test_utils::create_user(&service.db, "auth").await;

        for minute in 0..13 {
            test_utils::create_post(&service.db, author, None, &format!("post {minute}"), minute)
                .await;
        }

        let first = service.index(PageRequest::First).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first.total, 13);
        assert_eq!(first.num_pages, 2);
        assert_eq!(first.items[0].post.text, "post 12");
        assert_eq!(first.items[0].author, "auth");

        let second = service.index(PageRequest::Number(2)).await.unwrap();
        assert_eq!(texts(&second), vec!["post 2", "post 1", "post 0"]);

        let beyond = service.index(PageRequest::Number(40)).await.unwrap();
        assert_eq!(beyond.number, 2);
        assert_eq!(beyond.len(), 3);
    }

    #[tokio::test]
    async fn test_same_pub_date_breaks_ties_by_id() {
        let service = setup_test_service().await;
        let author = test_utils::create_user(&service.db, "auth").await;

        let older = test_utils::create_post(&service.db, author, None, "older", 5).await;
        let newer = test_utils::create_post(&service.db, author, None, "newer", 5).await;
        assert!(newer > older);

        let page = service.index(PageRequest::First).await.unwrap();
        assert_eq!(texts(&page), vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_empty_index_is_one_empty_page() {
        let service = setup_test_service().await;

        let page = service.index(PageRequest::Number(3)).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
    }

    #[tokio::test]
    async fn test_group_feed_holds_only_group_posts() {
        let service = setup_test_service().await;
        let author = test_utils::create_user(&service.db, "auth").await;
        let cats = test_utils::create_group(&service.db, "cats").await;
        let dogs = test_utils::create_group(&service.db, "dogs").await;

        test_utils::create_post(&service.db, author, Some(cats), "cat post", 0).await;
        test_utils::create_post(&service.db, author, Some(dogs), "dog post", 1).await;
        test_utils::create_post(&service.db, author, None, "loose post", 2).await;

        let feed = service.group("cats", PageRequest::First).await.unwrap();
        assert_eq!(feed.group.id, cats);
        assert_eq!(texts(&feed.page), vec!["cat post"]);
        assert_eq!(
            feed.page.items[0].group.as_ref().map(|g| g.id),
            Some(cats)
        );

        assert!(matches!(
            service.group("birds", PageRequest::First).await,
            Err(FeedError::GroupNotFound)
        ));
    }

    #[tokio::test]
    async fn test_profile_counts_and_follow_flag() {
        let service = setup_test_service().await;
        let author = test_utils::create_user(&service.db, "auth").await;
        let reader = test_utils::create_user(&service.db, "reader").await;
        let stranger = test_utils::create_user(&service.db, "stranger").await;

        for minute in 0..12 {
            test_utils::create_post(&service.db, author, None, "text", minute).await;
        }
        test_utils::create_post(&service.db, reader, None, "not on profile", 99).await;
        test_utils::create_follow(&service.db, reader, author).await;

        let as_reader = service
            .profile("auth", Some(reader), PageRequest::First)
            .await
            .unwrap();
        assert_eq!(as_reader.author.id, author);
        assert_eq!(as_reader.posts_count, 12);
        assert_eq!(as_reader.page.len(), 10);
        assert!(as_reader.following);

        let as_stranger = service
            .profile("auth", Some(stranger), PageRequest::First)
            .await
            .unwrap();
        assert!(!as_stranger.following);

        let anonymous = service
            .profile("auth", None, PageRequest::Number(2))
            .await
            .unwrap();
        assert!(!anonymous.following);
        assert_eq!(anonymous.page.len(), 2);

        let own = service
            .profile("auth", Some(author), PageRequest::First)
            .await
            .unwrap();
        assert!(!own.following);

        assert!(matches!(
            service.profile("ghost", None, PageRequest::First).await,
            Err(FeedError::AuthorNotFound)
        ));
    }

    #[tokio::test]
    async fn test_follow_feed_holds_followed_authors_only() {
        let service = setup_test_service().await;
        let reader = test_utils::create_user(&service.db, "reader").await;
        let loner = test_utils::create_user(&service.db, "loner").await;
        let author = test_utils::create_user(&service.db, "auth").await;
        let other = test_utils::create_user(&service.db, "other").await;

        test_utils::create_post(&service.db, author, None, "followed", 0).await;
        test_utils::create_post(&service.db, other, None, "not followed", 1).await;
        test_utils::create_follow(&service.db, reader, author).await;

        let feed = service.follow_feed(reader, PageRequest::First).await.unwrap();
        assert_eq!(texts(&feed), vec!["followed"]);

        let empty = service.follow_feed(loner, PageRequest::First).await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.number, 1);
    }

    #[tokio::test]
    async fn test_post_detail() {
        let service = setup_test_service().await;
        let author = test_utils::create_user(&service.db, "auth").await;
        let reader = test_utils::create_user(&service.db, "reader").await;
        let group = test_utils::create_group(&service.db, "cats").await;

        let post = test_utils::create_post(&service.db, author, Some(group), "detail", 0).await;
        test_utils::create_post(&service.db, author, None, "another", 1).await;
        test_utils::create_comment(&service.db, post, reader, "first!").await;
        test_utils::create_comment(&service.db, post, author, "thanks").await;

        let detail = service.post_detail(post).await.unwrap();
        assert_eq!(detail.card.post.id, post);
        assert_eq!(detail.card.author, "auth");
        assert_eq!(detail.card.group.as_ref().map(|g| g.id), Some(group));
        assert_eq!(detail.author_posts_count, 2);

        let comments: Vec<(&str, &str)> = detail
            .comments
            .iter()
            .map(|c| (c.author.as_str(), c.comment.text.as_str()))
            .collect();
        assert_eq!(comments, vec![("reader", "first!"), ("auth", "thanks")]);

        assert!(matches!(
            service.post_detail(PostId::new()).await,
            Err(FeedError::Posts(PostsServiceError::PostNotFound))
        ));
    }
}
