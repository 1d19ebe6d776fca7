use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use thiserror::Error;
use yatube_core::{
    entity::prelude::DbErr,
    service::{
        comments::CommentsServiceError, feeds::FeedError, follows::FollowsServiceError,
        groups::GroupsServiceError, posts::PostsServiceError, sessions::SessionsServiceError,
        users::UsersServiceError,
    },
};

use crate::{
    extract::SESSION_COOKIE,
    state::AppState,
    templates::{NotFoundTemplate, ServerErrorTemplate},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("malformed form submission: {0}")]
    Multipart(#[from] MultipartError),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("data store error: {0}")]
    Db(#[from] DbErr),

    #[error("media storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl From<FeedError> for AppError {
    fn from(error: FeedError) -> Self {
        match error {
            FeedError::DbError(error) => AppError::Db(error),
            FeedError::GroupNotFound | FeedError::AuthorNotFound => AppError::NotFound,
            FeedError::Posts(error) => error.into(),
            FeedError::Comments(error) => error.into(),
            FeedError::Follows(error) => error.into(),
        }
    }
}

impl From<PostsServiceError> for AppError {
    fn from(error: PostsServiceError) -> Self {
        match error {
            PostsServiceError::DbError(error) => AppError::Db(error),
            PostsServiceError::PostNotFound
            | PostsServiceError::GroupNotFound
            | PostsServiceError::AuthorNotFound => AppError::NotFound,
            // handlers redirect non-authors before reaching the service
            PostsServiceError::NotPostAuthor => AppError::Internal(error.to_string()),
        }
    }
}

impl From<CommentsServiceError> for AppError {
    fn from(error: CommentsServiceError) -> Self {
        match error {
            CommentsServiceError::DbError(error) => AppError::Db(error),
            CommentsServiceError::PostNotFound => AppError::NotFound,
        }
    }
}

impl From<FollowsServiceError> for AppError {
    fn from(error: FollowsServiceError) -> Self {
        match error {
            FollowsServiceError::DbError(error) => AppError::Db(error),
            FollowsServiceError::AuthorNotFound | FollowsServiceError::FollowNotFound => {
                AppError::NotFound
            }
        }
    }
}

impl From<GroupsServiceError> for AppError {
    fn from(error: GroupsServiceError) -> Self {
        match error {
            GroupsServiceError::DbError(error) => AppError::Db(error),
            GroupsServiceError::GroupNotFound => AppError::NotFound,
            GroupsServiceError::SlugTaken => AppError::Internal(error.to_string()),
        }
    }
}

impl From<UsersServiceError> for AppError {
    fn from(error: UsersServiceError) -> Self {
        match error {
            UsersServiceError::DbError(error) => AppError::Db(error),
            UsersServiceError::UserNotFound => AppError::NotFound,
            UsersServiceError::UsernameTaken | UsersServiceError::PasswordHash(_) => {
                AppError::Internal(error.to_string())
            }
        }
    }
}

impl From<SessionsServiceError> for AppError {
    fn from(error: SessionsServiceError) -> Self {
        match error {
            SessionsServiceError::DbError(error) => AppError::Db(error),
        }
    }
}

/// Set on not-found pages rendered from an error, where the viewer is unknown.
#[derive(Debug, Clone, Copy)]
struct AnonymousNotFound;

pub fn not_found_page(viewer: Option<String>) -> Response {
    let body = NotFoundTemplate { viewer }
        .render()
        .unwrap_or_else(|_| "Not Found".to_string());

    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

/// Renders not-found pages raised by handler errors again with the
/// navigation of the logged-in viewer.
pub async fn not_found_for_viewer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let session_key = CookieJar::from_headers(request.headers())
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    let response = next.run(request).await;
    if response.extensions().get::<AnonymousNotFound>().is_none() {
        return response;
    }
    let Some(session_key) = session_key else {
        return response;
    };

    match state.core.sessions.resolve(&session_key).await {
        Ok(Some(user)) => not_found_page(Some(user.username)),
        Ok(None) => response,
        Err(error) => {
            tracing::warn!(%error, "could not resolve viewer for not-found page");
            response
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                let mut response = not_found_page(None);
                response.extensions_mut().insert(AnonymousNotFound);
                response
            }
            AppError::Multipart(error) => {
                tracing::warn!(%error, "rejected form submission");
                (error.status(), error.body_text()).into_response()
            }
            error => {
                tracing::error!(%error, "request failed");
                let body = ServerErrorTemplate { viewer: None }
                    .render()
                    .unwrap_or_else(|_| "Internal Server Error".to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: FeedError) -> StatusCode {
        AppError::from(error).into_response().status()
    }

    #[test]
    fn feed_errors_keep_the_underlying_service_error() {
        assert_eq!(
            status_of(FeedError::Posts(PostsServiceError::PostNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(FeedError::Follows(FollowsServiceError::FollowNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(FeedError::Comments(CommentsServiceError::PostNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(FeedError::GroupNotFound), StatusCode::NOT_FOUND);

        assert!(matches!(
            AppError::from(FeedError::Posts(PostsServiceError::NotPostAuthor)),
            AppError::Internal(_)
        ));
        assert_eq!(
            status_of(FeedError::Posts(PostsServiceError::NotPostAuthor)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_from_an_error_is_marked_for_the_viewer() {
        let response = AppError::NotFound.into_response();
        assert!(response.extensions().get::<AnonymousNotFound>().is_some());

        let response = not_found_page(Some("leo".to_string()));
        assert!(response.extensions().get::<AnonymousNotFound>().is_none());
    }
}
