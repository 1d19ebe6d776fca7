use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::Uri,
    response::{Html, IntoResponse, Response},
    Form,
};
use yatube_core::{
    entity::prelude::{GroupModel, UserModel},
    forms::{CleanPost, CommentForm, FormErrors, PostForm},
    ids::PostId,
    service::posts::PostDraft,
};

use crate::{
    cache::PageCache,
    error::AppError,
    extract::{RequireUser, Viewer},
    handlers::{found, parse_post_id, render, PageQuery},
    multipart::read_post_form,
    state::AppState,
    templates::{
        FollowTemplate, GroupListTemplate, GroupOption, IndexTemplate, PostDetailTemplate,
        PostFormTemplate, ProfileTemplate,
    },
    urls,
};

/// Home feed. Rendered pages are served from the page cache until they expire.
pub async fn index(
    State(state): State<AppState>,
    viewer: Viewer,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let key = PageCache::key(viewer.user_id(), &uri);
    if let Some(body) = state.cache.get(&key).await {
        return Ok(Html(body).into_response());
    }

    let page = state.core.feeds.index(query.request()).await?;
    let body = IndexTemplate {
        viewer: viewer.username(),
        page,
    }
    .render()?;

    state.cache.insert(key, body.clone()).await;
    Ok(Html(body).into_response())
}

pub async fn group_posts(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let feed = state.core.feeds.group(&slug, query.request()).await?;

    render(GroupListTemplate {
        viewer: viewer.username(),
        group: feed.group,
        page: feed.page,
    })
}

pub async fn profile(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let feed = state
        .core
        .feeds
        .profile(&username, viewer.user_id(), query.request())
        .await?;

    let can_follow = viewer
        .user_id()
        .is_some_and(|viewer_id| viewer_id != feed.author.id);

    render(ProfileTemplate {
        viewer: viewer.username(),
        author: feed.author,
        posts_count: feed.posts_count,
        following: feed.following,
        can_follow,
        page: feed.page,
    })
}

pub async fn post_detail(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let detail = state.core.feeds.post_detail(post_id).await?;

    let can_edit = viewer.user_id() == Some(detail.card.post.author_id);

    render(PostDetailTemplate {
        viewer: viewer.username(),
        detail,
        can_edit,
    })
}

fn form_page(
    user: &UserModel,
    edit: Option<PostId>,
    form: &PostForm,
    groups: &[GroupModel],
    errors: FormErrors,
) -> Result<Response, AppError> {
    let action = match edit {
        Some(post_id) => format!("{}edit/", urls::post_detail(post_id)),
        None => urls::POST_CREATE.to_string(),
    };

    render(PostFormTemplate {
        viewer: Some(user.username.clone()),
        is_edit: edit.is_some(),
        action,
        text: form.text.clone(),
        groups: GroupOption::list(groups, form.selected_group()),
        errors,
    })
}

/// Stores the uploaded image, if any, and turns the clean form into a draft.
async fn into_draft(state: &AppState, clean: CleanPost) -> Result<PostDraft, AppError> {
    let image = match &clean.image {
        Some(image) => Some(state.media.save_post_image(image).await?),
        None => None,
    };

    Ok(PostDraft {
        text: clean.text,
        group_id: clean.group_id,
        image,
    })
}

pub async fn post_create_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Response, AppError> {
    let groups = state.core.groups.list().await?;

    form_page(&user, None, &PostForm::default(), &groups, FormErrors::new())
}

pub async fn post_create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let groups = state.core.groups.list().await?;
    let mut form = read_post_form(multipart).await?;

    let clean = match form.clean(&groups) {
        Ok(clean) => clean,
        Err(errors) => return form_page(&user, None, &form, &groups, errors),
    };

    let draft = into_draft(&state, clean).await?;
    state.core.posts.create(user.id, draft).await?;

    Ok(found(&urls::profile(&user.username)))
}

pub async fn post_edit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let post = state.core.posts.get(post_id).await?;

    if post.author_id != user.id {
        return Ok(found(&urls::post_detail(post_id)));
    }

    let groups = state.core.groups.list().await?;
    let form = PostForm::for_edit(&post.text, post.group_id);

    form_page(&user, Some(post_id), &form, &groups, FormErrors::new())
}

pub async fn post_edit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let post = state.core.posts.get(post_id).await?;

    if post.author_id != user.id {
        return Ok(found(&urls::post_detail(post_id)));
    }

    let groups = state.core.groups.list().await?;
    let mut form = read_post_form(multipart).await?;

    let clean = match form.clean(&groups) {
        Ok(clean) => clean,
        Err(errors) => return form_page(&user, Some(post_id), &form, &groups, errors),
    };

    let draft = into_draft(&state, clean).await?;
    state.core.posts.update(post_id, user.id, draft).await?;

    Ok(found(&urls::post_detail(post_id)))
}

/// Adds a comment; an empty comment is dropped without complaint.
pub async fn add_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let post_id = parse_post_id(&post_id)?;
    state.core.posts.get(post_id).await?;

    if let Ok(text) = form.clean() {
        state.core.comments.add(post_id, user.id, text).await?;
    }

    Ok(found(&urls::post_detail(post_id)))
}

pub async fn follow_index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = state
        .core
        .feeds
        .follow_feed(user.id, query.request())
        .await?;

    render(FollowTemplate {
        viewer: Some(user.username),
        page,
    })
}
