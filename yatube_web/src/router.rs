use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::not_found_for_viewer;
use crate::handlers::{about, auth, follows, not_found, posts};
use crate::state::AppState;

/// Largest accepted request body; uploads are the only large ones.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn app_router(state: AppState) -> Router {
    let media = ServeDir::new(state.media.root());

    Router::new()
        .route("/", get(posts::index))
        .route("/group/{slug}/", get(posts::group_posts))
        .route("/profile/{username}/", get(posts::profile))
        .route("/profile/{username}/follow/", post(follows::profile_follow))
        .route("/profile/{username}/unfollow/", post(follows::profile_unfollow))
        .route("/posts/{post_id}/", get(posts::post_detail))
        .route(
            "/posts/{post_id}/edit/",
            get(posts::post_edit_form).post(posts::post_edit),
        )
        .route("/posts/{post_id}/comment/", post(posts::add_comment))
        .route(
            "/create/",
            get(posts::post_create_form).post(posts::post_create),
        )
        .route("/follow/", get(posts::follow_index))
        .route("/about/author/", get(about::author))
        .route("/about/tech/", get(about::tech))
        .route("/auth/login/", get(auth::login_form).post(auth::login))
        .route("/auth/signup/", get(auth::signup_form).post(auth::signup))
        .route("/auth/logout/", get(auth::logout).post(auth::logout))
        .nest_service("/media", media)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            not_found_for_viewer,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
